use std::sync::Arc;
use std::time::Instant;

use crate::config::Rgba;
use crate::files;
use crate::keymap::Context;
use crate::loader::DecodedImage;
use crate::ui::render::{text_width, Frame, BG_COLOR, GLYPH_ADVANCE, GLYPH_HEIGHT};
use crate::ui::state::{ItemStatus, Viewer};
use crate::ui::strip::{Rect, StripLayout};

const WHITE: Rgba = (255, 255, 255, 255);
const DIM: Rgba = (170, 170, 170, 255);
const ERROR: Rgba = (255, 80, 80, 255);
const SHADE: Rgba = (0, 0, 0, 178);
const SELECT: Rgba = (90, 160, 255, 255);

/// Paint the whole window. `thumbnail` looks up a decoded thumbnail by
/// 1-based item number.
pub fn draw(
    viewer: &Viewer,
    frame: &mut Frame,
    now: Instant,
    thumbnail: &dyn Fn(usize) -> Option<Arc<DecodedImage>>,
) {
    frame.clear(BG_COLOR);
    let scale = viewer.config.text_scale();

    match (&viewer.image, viewer.layout) {
        (Some(img), Some(layout)) => {
            let x0 = layout.left as f64 - viewer.viewport.scroll_x;
            let y0 = layout.top as f64 - viewer.viewport.scroll_y;
            frame.blit_scaled(
                &img.rgba_bytes,
                img.width,
                img.height,
                x0,
                y0,
                layout.scale,
                viewer.state.brightness,
            );
        }
        _ => {
            let (text, color) = match &viewer.load_error {
                Some(e) => (format!("Could not load: {}", e), ERROR),
                None => ("Loading...".to_string(), WHITE),
            };
            let x = (frame.width as i32 - text_width(&text, scale) as i32) / 2;
            frame.draw_text(&text, x.max(8), frame.height as i32 / 2, scale, color);
        }
    }

    if let Some(strip) = viewer.strip() {
        draw_strip(viewer, frame, &strip, scale, thumbnail);
    }
    if viewer.info_visible(now) {
        draw_info(viewer, frame, scale);
    }
    if viewer.active_context() == Context::Help {
        draw_help(viewer, frame, scale);
    }
}

fn draw_info(viewer: &Viewer, frame: &mut Frame, scale: u32) {
    let cfg = &viewer.config;
    let (bg, fg) = cfg.progress_colors();
    let radius = cfg.progress_radius;
    let margin = 8;
    let line_h = (GLYPH_HEIGHT * scale + 4) as i32;
    let box_h = (2 * radius + 2 * margin).max(2 * line_h as u32 + margin);

    let n = viewer.state.current_index;
    let len = viewer.len();
    let source = files::source(viewer.current_name());
    let status = match viewer.status() {
        ItemStatus::Loading => "loading".to_string(),
        ItemStatus::Loaded(size) => format!("{}x{}", size.width, size.height),
        ItemStatus::Failed(e) => format!("error: {}", e),
    };

    frame.fill_rect(0, 0, frame.width, box_h, SHADE);

    let cx = (margin + radius) as i32;
    let cy = (box_h / 2) as i32;
    let fraction = if len == 0 { 0.0 } else { n as f64 / len as f64 };
    frame.draw_ring(cx, cy, radius, cfg.progress_width, fraction, bg, fg);

    // counter inside the ring, shrunk if it does not fit
    let counter = n.to_string();
    let mut cs = scale;
    while cs > 1 && text_width(&counter, cs) > 2 * radius.saturating_sub(cfg.progress_width) {
        cs -= 1;
    }
    let tx = cx - text_width(&counter, cs) as i32 / 2;
    let ty = cy - (GLYPH_HEIGHT * cs) as i32 / 2;
    frame.draw_text(&counter, tx, ty, cs, WHITE);

    let x = cx + radius as i32 + 2 * margin as i32;
    let top = cy - line_h;
    let after = frame.draw_text(&format!("{}/{}  ", n, len), x, top, scale, WHITE);
    frame.draw_text(&source, after, top, scale, SELECT);
    let color = if matches!(viewer.status(), ItemStatus::Failed(_)) { ERROR } else { DIM };
    let zoom = match viewer.layout {
        Some(l) => format!("  zoom {:.0}%", l.scale * 100.0),
        None => String::new(),
    };
    frame.draw_text(&format!("{}{}", status, zoom), x, top + line_h, scale, color);
}

fn draw_strip(
    viewer: &Viewer,
    frame: &mut Frame,
    strip: &StripLayout,
    scale: u32,
    thumbnail: &dyn Fn(usize) -> Option<Arc<DecodedImage>>,
) {
    let area = strip.area;
    frame.fill_rect(area.x, area.y, area.w, area.h, SHADE);

    if let Some(m) = strip.marker {
        frame.draw_text("...", m.x + 6, m.y + m.h as i32 / 2, scale, DIM);
    }

    for cell in &strip.cells {
        let t = cell.thumb;
        match thumbnail(cell.n) {
            Some(img) => draw_thumbnail(frame, &img, t),
            None => frame.fill_rect(t.x, t.y, t.w, t.h, (60, 60, 60, 255)),
        }
        let label = cell.n.to_string();
        let lx = t.x + (t.w as i32 - text_width(&label, scale) as i32) / 2;
        let color = if cell.current { WHITE } else { DIM };
        frame.draw_text(&label, lx, t.y + t.h as i32 + 4, scale, color);

        if cell.current {
            frame.stroke_rect(t.x, t.y, t.w, t.h, 2, WHITE);
        }
        if cell.n == viewer.list_cursor {
            let r = cell.rect;
            frame.stroke_rect(r.x - 3, r.y - 3, r.w + 6, r.h + 6, 2, SELECT);
        }
    }
}

fn draw_thumbnail(frame: &mut Frame, img: &DecodedImage, cell: Rect) {
    if img.width == 0 || img.height == 0 {
        return;
    }
    let s = (cell.w as f64 / img.width as f64).min(cell.h as f64 / img.height as f64);
    let x0 = cell.x as f64 + (cell.w as f64 - img.width as f64 * s) / 2.0;
    let y0 = cell.y as f64 + (cell.h as f64 - img.height as f64 * s) / 2.0;
    frame.blit_scaled(&img.rgba_bytes, img.width, img.height, x0, y0, s, 0.0);
}

fn draw_help(viewer: &Viewer, frame: &mut Frame, scale: u32) {
    frame.fill_rect(0, 0, frame.width, frame.height, (0, 0, 0, 200));
    let line_h = (GLYPH_HEIGHT * scale + 6) as i32;
    let key_col = 24 * (GLYPH_ADVANCE * scale) as i32;
    let mut y = 20;
    let mut context = None;
    for (ctx, keys, desc) in viewer.keymap.help_lines() {
        if context != Some(ctx) {
            if context.is_some() {
                y += line_h / 2;
            }
            frame.draw_text(ctx.name(), 20, y, scale, SELECT);
            y += line_h;
            context = Some(ctx);
        }
        frame.draw_text(&keys, 40, y, scale, WHITE);
        frame.draw_text(&desc, 40 + key_col, y, scale, DIM);
        y += line_h;
        if y > frame.height as i32 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::files::Gallery;
    use crate::keymap::{Action, Keymap};
    use crate::ui::render::rgb;
    use crate::zoom::Size;
    use std::path::PathBuf;

    fn viewer() -> Viewer {
        let gallery = Arc::new(Gallery {
            title: "t".into(),
            root: PathBuf::from("/g"),
            image_dir: PathBuf::from("/g"),
            items: vec!["a b.png".into(), "c.png".into()],
        });
        Viewer::new(gallery, Config::default(), Keymap::builtin().unwrap(), "zoom=fit", Size::new(80, 60))
    }

    #[test]
    fn draws_canvas_overlays_and_strip() {
        let mut v = viewer();
        let red = DecodedImage {
            rgba_bytes: [200, 0, 0, 255].repeat(40 * 30),
            width: 40,
            height: 30,
        };
        v.image_loaded(1, Arc::new(red));
        let mut buf = vec![0u32; 80 * 60];
        let later = Instant::now() + std::time::Duration::from_secs(3600);

        draw(&v, &mut Frame::new(&mut buf, 80, 60), later, &|_| None);
        assert_eq!(buf[30 * 80 + 40], rgb(200, 0, 0));

        // overlays paint over the canvas without panicking on a tiny window
        v.dispatch(Action::ToggleList);
        v.dispatch(Action::ToggleHelp);
        draw(&v, &mut Frame::new(&mut buf, 80, 60), Instant::now(), &|_| None);
        assert_ne!(buf[30 * 80 + 40], rgb(200, 0, 0));
    }
}
