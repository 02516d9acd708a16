use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GalleryError, Result};

pub type Rgba = (u8, u8, u8, u8);

/// Viewer options. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Window title; see [`Config::format_title`].
    pub title_fmt: String,

    pub zoom_step: f64,
    pub brightness_step: f64,

    pub progress_radius: u32,
    pub progress_width: u32,
    pub progress_bg: String,
    pub progress_fg: String,

    pub font_size: u32,
    pub thumbnail_min_width: u32,
    pub thumbnail_max_width: u32,

    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub wrap: bool,
    pub autonext: bool,

    /// Milliseconds the info overlay stays up.
    pub pop_info_delay: u64,
    /// Milliseconds between slideshow steps.
    pub slideshow_delay: u64,
    pub preload_images: usize,

    pub show_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title_fmt: "%{title}: %{now}/%{max} \"%{filename}\"".to_string(),
            zoom_step: 0.125,
            brightness_step: 0.1,
            progress_radius: 22,
            progress_width: 4,
            progress_bg: "rgba(200,200,200,0.4)".to_string(),
            progress_fg: "white".to_string(),
            font_size: 16,
            thumbnail_min_width: 100,
            thumbnail_max_width: 300,
            autoplay: false,
            wrap: false,
            autonext: false,
            pop_info_delay: 2000,
            slideshow_delay: 5000,
            preload_images: 2,
            show_keys: false,
        }
    }
}

impl Config {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| GalleryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| GalleryError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        parse_color(&self.progress_bg)?;
        parse_color(&self.progress_fg)?;
        check("zoom_step", self.zoom_step, positive_step)?;
        check("brightness_step", self.brightness_step, positive_step)?;
        check("font_size", self.font_size, |v: &u32| *v > 0)?;
        check("slideshow_delay", self.slideshow_delay, |v: &u64| *v > 0)?;
        check("preload_images", self.preload_images, within_preload_limit)?;
        Ok(())
    }

    /// Apply `key=value` overrides from a query string. Keys that are not
    /// overridable options are skipped silently (navigation parameters live
    /// in the same string); bad values are skipped with a warning.
    pub fn apply_overrides(&mut self, pairs: &[(String, String)]) {
        for (key, value) in pairs {
            let applied = match key.as_str() {
                "zoom_step" => set_parsed(&mut self.zoom_step, value, positive_step),
                "brightness_step" => set_parsed(&mut self.brightness_step, value, positive_step),
                "font_size" => set_parsed(&mut self.font_size, value, |v: &u32| *v > 0),
                "autoplay" => set_parsed(&mut self.autoplay, value, |_| true),
                "loop" => set_parsed(&mut self.wrap, value, |_| true),
                "autonext" => set_parsed(&mut self.autonext, value, |_| true),
                "slideshow_delay" => set_parsed(&mut self.slideshow_delay, value, |v: &u64| *v > 0),
                "pop_info_delay" => set_parsed(&mut self.pop_info_delay, value, |_| true),
                "preload_images" => {
                    set_parsed(&mut self.preload_images, value, within_preload_limit)
                }
                "show_keys" => set_parsed(&mut self.show_keys, value, |_| true),
                _ => continue,
            };
            if applied {
                log::debug!("config override {}={}", key, value);
            } else {
                log::warn!("Ignoring invalid config override {}={}", key, value);
            }
        }
    }

    pub fn progress_colors(&self) -> (Rgba, Rgba) {
        (
            parse_color(&self.progress_bg).unwrap_or((200, 200, 200, 102)),
            parse_color(&self.progress_fg).unwrap_or((255, 255, 255, 255)),
        )
    }

    /// Expand `%{title}`, `%{now}`, `%{max}`, `%{filename}`, `%{remaining}`.
    pub fn format_title(&self, title: &str, now: usize, max: usize, filename: &str) -> String {
        self.title_fmt
            .replace("%{title}", title)
            .replace("%{now}", &now.to_string())
            .replace("%{max}", &max.to_string())
            .replace("%{remaining}", &max.saturating_sub(now).to_string())
            .replace("%{filename}", filename)
    }

    /// Bitmap font scale derived from `font_size` (the glyphs are 7px tall).
    pub fn text_scale(&self) -> u32 {
        (self.font_size / 8).max(1)
    }
}

/// Most images decoded ahead of the current one.
const MAX_PRELOAD: usize = 64;

fn positive_step(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

fn within_preload_limit(v: &usize) -> bool {
    *v <= MAX_PRELOAD
}

fn check<T: std::fmt::Display>(name: &'static str, value: T, ok: impl Fn(&T) -> bool) -> Result<()> {
    if ok(&value) {
        Ok(())
    } else {
        Err(GalleryError::InvalidOption { name, value: value.to_string() })
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, value: &str, ok: impl Fn(&T) -> bool) -> bool {
    match value.trim().parse::<T>() {
        Ok(v) if ok(&v) => {
            *slot = v;
            true
        }
        _ => false,
    }
}

/// Parse `#rgb`, `#rrggbb`, `rgb(r,g,b)`, `rgba(r,g,b,a)` or a few names.
pub fn parse_color(s: &str) -> Result<Rgba> {
    let bad = || GalleryError::Color(s.to_string());
    let t = s.trim().to_ascii_lowercase();

    let named = match t.as_str() {
        "white" => Some((255, 255, 255, 255)),
        "black" => Some((0, 0, 0, 255)),
        "red" => Some((255, 0, 0, 255)),
        "green" => Some((0, 128, 0, 255)),
        "blue" => Some((0, 0, 255, 255)),
        "yellow" => Some((255, 255, 0, 255)),
        "gray" | "grey" => Some((128, 128, 128, 255)),
        _ => None,
    };
    if let Some(c) = named {
        return Ok(c);
    }

    if let Some(hex) = t.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(bad)?;
        return match digits.as_slice() {
            [r, g, b] => Ok((r * 17, g * 17, b * 17, 255)),
            [r1, r2, g1, g2, b1, b2] => Ok((r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255)),
            _ => Err(bad()),
        };
    }

    let (body, with_alpha) = if let Some(b) = t.strip_prefix("rgba(") {
        (b, true)
    } else if let Some(b) = t.strip_prefix("rgb(") {
        (b, false)
    } else {
        return Err(bad());
    };
    let body = body.strip_suffix(')').ok_or_else(bad)?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |p: &str| p.parse::<u8>().map_err(|_| bad());
    match (parts.as_slice(), with_alpha) {
        ([r, g, b], false) => Ok((channel(*r)?, channel(*g)?, channel(*b)?, 255)),
        ([r, g, b, a], true) => {
            let a: f64 = a.parse().map_err(|_| bad())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(bad());
            }
            Ok((channel(*r)?, channel(*g)?, channel(*b)?, (a * 255.0).round() as u8))
        }
        _ => Err(bad()),
    }
}
