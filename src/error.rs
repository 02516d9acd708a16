use std::path::PathBuf;

/// Fatal startup errors. Everything that can go wrong once the window is
/// up is handled in place (clamped, defaulted or shown as a status).
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for `{name}`: {value}")]
    InvalidOption { name: &'static str, value: String },

    #[error("invalid color `{0}`")]
    Color(String),

    #[error("invalid keybinding table: {0}")]
    KeymapSyntax(#[from] toml::de::Error),

    #[error("unknown context `{0}` in keybinding table")]
    UnknownContext(String),

    #[error("unknown action `{action}` in context `{context}`")]
    UnknownAction { context: String, action: String },

    #[error("invalid key `{key}` in context `{context}`")]
    InvalidKey { context: String, key: String },

    #[error("no images found in {0}")]
    EmptyGallery(PathBuf),

    #[error("failed to write thumbnail {path}: {source}")]
    Thumbnail {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
