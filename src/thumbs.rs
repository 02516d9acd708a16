use std::fs;
use std::time::Instant;

use crate::error::{GalleryError, Result};
use crate::files::Gallery;

/// Write `thumbs/<basename>.png` for every item, at most `resolution`
/// pixels on the long side. The previous thumbs directory is replaced.
/// Items that fail to decode are skipped. Returns how many were written.
pub fn generate(gallery: &Gallery, resolution: u32) -> Result<usize> {
    let dir = gallery.root.join("thumbs");
    let io_err = |source: std::io::Error| GalleryError::Io {
        path: dir.clone(),
        source,
    };
    if dir.is_dir() {
        fs::remove_dir_all(&dir).map_err(io_err)?;
    }
    fs::create_dir_all(&dir).map_err(io_err)?;

    let start_time = Instant::now();
    let total = gallery.len();
    let mut written = 0;
    for (i, id) in gallery.items.iter().enumerate() {
        let img = match image::open(gallery.path(id)) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Skipping thumbnail for {}: {}", id, e);
                continue;
            }
        };
        let out = gallery.thumbnail_path(id);
        img.thumbnail(resolution, resolution)
            .save(&out)
            .map_err(|source| GalleryError::Thumbnail {
                path: out.clone(),
                source,
            })?;
        written += 1;
        if (i + 1) % 50 == 0 {
            log::info!("Creating thumbnails: {}/{}", i + 1, total);
        }
    }

    log::info!(
        "Thumbnails generated: {}/{} in {:.2}s",
        written,
        total,
        start_time.elapsed().as_secs_f64()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn writes_bounded_pngs_and_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(64, 32, Rgba([10, 20, 30, 255]))
            .save(dir.path().join("wide.png"))
            .unwrap();
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let gallery = Gallery::open(dir.path(), None, false, None).unwrap();
        assert_eq!(generate(&gallery, 16).unwrap(), 1);

        let thumb = image::open(dir.path().join("thumbs/wide.png.png")).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (16, 8));
        assert!(!dir.path().join("thumbs/broken.png.png").exists());
    }
}
