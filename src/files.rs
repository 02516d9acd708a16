use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Instant;
use url::Url;

use crate::error::{GalleryError, Result};

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff", "ico", "tga", "pnm", "pbm",
    "pgm", "ppm", "qoi",
];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Gallery: the fixed, ordered item list for a session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Gallery {
    pub title: String,
    /// Gallery directory; `thumbs/` lives here.
    pub root: PathBuf,
    /// Directory the item identifiers are relative to.
    pub image_dir: PathBuf,
    /// `/`-separated identifiers, 0-based internally, 1-based to the user.
    pub items: Vec<String>,
}

impl Gallery {
    /// Collect the items under `root`. A `root/imgs` directory takes
    /// precedence over `root` itself. A file list, when given, replaces the
    /// directory scan.
    pub fn open(
        root: &Path,
        file_list: Option<&Path>,
        recursive: bool,
        title: Option<String>,
    ) -> Result<Self> {
        let imgs = root.join("imgs");
        let image_dir = if imgs.is_dir() { imgs } else { root.to_path_buf() };

        let start_time = Instant::now();
        let items = match file_list {
            Some(list) => read_file_list(list)?,
            None => {
                let mut items = Vec::new();
                scan_dir(&image_dir, "", recursive, &mut items).map_err(|source| {
                    GalleryError::Io {
                        path: image_dir.clone(),
                        source,
                    }
                })?;
                items.sort();
                items
            }
        };

        if items.is_empty() {
            return Err(GalleryError::EmptyGallery(image_dir));
        }

        log::info!(
            "Found {} images in {:?} ({:.2}s)",
            items.len(),
            image_dir,
            start_time.elapsed().as_secs_f64()
        );

        let title = title.unwrap_or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "untitled".to_string())
        });

        Ok(Self {
            title,
            root: root.to_path_buf(),
            image_dir,
            items,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Identifier of the 1-based item `n`.
    pub fn name(&self, n: usize) -> &str {
        n.checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn path(&self, id: &str) -> PathBuf {
        self.image_dir.join(id)
    }

    pub fn thumbnail_path(&self, id: &str) -> PathBuf {
        let base = id.rsplit('/').next().unwrap_or(id);
        self.root.join("thumbs").join(format!("{}.png", base))
    }
}

/// Served location of an item: `imgs/` followed by the percent-encoded
/// identifier, one path segment at a time.
pub fn source(id: &str) -> String {
    let Ok(mut url) = Url::parse("gallery:/imgs/") else {
        return format!("imgs/{}", id);
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(id.split('/'));
    }
    url.path().trim_start_matches('/').to_string()
}

fn read_file_list(list: &Path) -> Result<Vec<String>> {
    let io_err = |source: io::Error| GalleryError::Io {
        path: list.to_path_buf(),
        source,
    };
    let file = fs::File::open(list).map_err(io_err)?;
    let mut items = Vec::new();
    for line in io::BufReader::new(file).lines() {
        let line = line.map_err(io_err)?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if is_image_file(Path::new(trimmed)) {
            items.push(trimmed.replace('\\', "/"));
        } else {
            log::debug!("Skipping non-image list entry {:?}", trimmed);
        }
    }
    Ok(items)
}

fn scan_dir(dir: &Path, prefix: &str, recursive: bool, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let Ok(ft) = entry.file_type() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let id = format!("{}{}", prefix, name);
        let p = entry.path();
        if ft.is_dir() {
            // generated thumbnails are not gallery items
            if recursive && !(prefix.is_empty() && name == "thumbs") {
                if let Err(e) = scan_dir(&p, &format!("{}/", id), true, out) {
                    log::warn!("Skipping {:?}: {}", p, e);
                }
            }
        } else if is_image_file(&p) {
            out.push(id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(p: &Path) {
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, b"").unwrap();
    }

    #[test]
    fn scans_sorted_with_relative_ids() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.JPG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub/c.gif"));
        touch(&dir.path().join("thumbs/b.png.png"));

        let flat = Gallery::open(dir.path(), None, false, Some("t".into())).unwrap();
        assert_eq!(flat.items, vec!["a.JPG", "b.png"]);

        let deep = Gallery::open(dir.path(), None, true, None).unwrap();
        assert_eq!(deep.items, vec!["a.JPG", "b.png", "sub/c.gif"]);
        assert_eq!(deep.name(3), "sub/c.gif");
        assert_eq!(deep.name(0), "");
        assert_eq!(deep.path("sub/c.gif"), dir.path().join("sub/c.gif"));
    }

    #[test]
    fn imgs_subdirectory_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cover.png"));
        touch(&dir.path().join("imgs/x.png"));
        let g = Gallery::open(dir.path(), None, false, None).unwrap();
        assert_eq!(g.items, vec!["x.png"]);
        assert_eq!(g.image_dir, dir.path().join("imgs"));
        assert_eq!(g.thumbnail_path("x.png"), dir.path().join("thumbs/x.png.png"));
    }

    #[test]
    fn empty_gallery_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Gallery::open(dir.path(), None, true, None),
            Err(GalleryError::EmptyGallery(_))
        ));
    }

    #[test]
    fn file_list_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("items.txt");
        fs::write(&list, "z.png\n\n# comment\nreadme.md\na/b.jpg\n").unwrap();
        let g = Gallery::open(dir.path(), Some(&list), false, None).unwrap();
        assert_eq!(g.items, vec!["z.png", "a/b.jpg"]);
    }

    #[test]
    fn source_is_percent_encoded() {
        assert_eq!(source("a.jpg"), "imgs/a.jpg");
        assert_eq!(source("my photo.jpg"), "imgs/my%20photo.jpg");
        assert_eq!(source("trip/c#1?.png"), "imgs/trip/c%231%3F.png");
    }
}
