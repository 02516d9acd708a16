use crate::config::Rgba;

pub const BG_COLOR: Rgba = (31, 31, 31, 255);

/// Horizontal advance of one glyph at scale 1 (5 columns plus spacing).
pub const GLYPH_ADVANCE: u32 = 6;
pub const GLYPH_HEIGHT: u32 = 7;

// 5x7 bitmap font covering ASCII 32..127. One byte per column, LSB = top row.
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x14, 0x08, 0x3E, 0x08, 0x14], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
    [0x00, 0x00, 0x00, 0x00, 0x00], // del
];

/// Pack RGB into softbuffer u32 format: 0x00RRGGBB.
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn mix(src: u8, dst: u8, a: u32) -> u8 {
    ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale
}

// ---------------------------------------------------------------------------
// Frame: a softbuffer pixel slice plus its dimensions
// ---------------------------------------------------------------------------

pub struct Frame<'a> {
    pub buf: &'a mut [u32],
    pub width: u32,
    pub height: u32,
}

impl<'a> Frame<'a> {
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        Self { buf, width, height }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.buf.fill(rgb(color.0, color.1, color.2));
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let off = y as usize * self.width as usize + x as usize;
        (off < self.buf.len()).then_some(off)
    }

    /// Alpha-blend one pixel; out of bounds is a no-op.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(off) = self.offset(x, y) else {
            return;
        };
        let a = color.3 as u32;
        if a == 255 {
            self.buf[off] = rgb(color.0, color.1, color.2);
        } else if a > 0 {
            let (dr, dg, db) = unpack_rgb(self.buf[off]);
            self.buf[off] = rgb(mix(color.0, dr, a), mix(color.1, dg, a), mix(color.2, db, a));
        }
    }

    pub fn fill_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, color: Rgba) {
        let x_end = (rx + rw as i32).min(self.width as i32);
        let y_end = (ry + rh as i32).min(self.height as i32);
        for y in ry.max(0)..y_end {
            for x in rx.max(0)..x_end {
                self.blend(x, y, color);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inside the bounds.
    pub fn stroke_rect(&mut self, rx: i32, ry: i32, rw: u32, rh: u32, thickness: u32, color: Rgba) {
        if rw == 0 || rh == 0 {
            return;
        }
        let t = thickness.min(rw / 2).min(rh / 2).max(1);
        self.fill_rect(rx, ry, rw, t, color);
        self.fill_rect(rx, ry + (rh - t) as i32, rw, t, color);
        self.fill_rect(rx, ry + t as i32, t, rh.saturating_sub(2 * t), color);
        self.fill_rect(rx + (rw - t) as i32, ry + t as i32, t, rh.saturating_sub(2 * t), color);
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: Rgba) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        let Some(glyph) = FONT_5X7.get(idx) else {
            // outside the table: draw the '?' glyph
            return self.draw_char('?', px, py, scale, color);
        };
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) == 0 {
                    continue;
                }
                let x = px + (col as u32 * scale) as i32;
                let y = py + (row * scale) as i32;
                self.fill_rect(x, y, scale, scale, color);
            }
        }
    }

    /// Draw a string. Returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: Rgba) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            if x >= self.width as i32 {
                break;
            }
            self.draw_char(ch, x, py, scale, color);
            x += (GLYPH_ADVANCE * scale) as i32;
        }
        x
    }

    /// Annulus centred on (cx, cy). The first `fraction` of it, clockwise
    /// from twelve o'clock, is drawn in `fg`, the rest in `bg`.
    pub fn draw_ring(&mut self, cx: i32, cy: i32, radius: u32, width: u32, fraction: f64, bg: Rgba, fg: Rgba) {
        let outer = radius as f64;
        let inner = (radius as f64 - width as f64).max(0.0);
        let fraction = fraction.clamp(0.0, 1.0);
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let (fx, fy) = (dx as f64 + 0.5, dy as f64 + 0.5);
                let d = (fx * fx + fy * fy).sqrt();
                if d > outer || d < inner {
                    continue;
                }
                let mut angle = fx.atan2(-fy);
                if angle < 0.0 {
                    angle += std::f64::consts::TAU;
                }
                let color = if angle / std::f64::consts::TAU < fraction { fg } else { bg };
                self.blend(cx + dx, cy + dy, color);
            }
        }
    }

    /// Nearest-neighbour blit of an RGBA8 image at `scale`, with its
    /// top-left corner at (x0, y0). `brightness` is added to every colour
    /// channel, in units of full intensity.
    pub fn blit_scaled(&mut self, src: &[u8], src_w: u32, src_h: u32, x0: f64, y0: f64, scale: f64, brightness: f64) {
        if scale <= 0.0 || src_w == 0 || src_h == 0 {
            return;
        }
        let draw_w = src_w as f64 * scale;
        let draw_h = src_h as f64 * scale;

        let dx_start = x0.max(0.0) as u32;
        let dy_start = y0.max(0.0) as u32;
        let dx_end = ((x0 + draw_w).ceil().max(0.0) as u32).min(self.width);
        let dy_end = ((y0 + draw_h).ceil().max(0.0) as u32).min(self.height);

        let inv_scale = 1.0 / scale;
        let shift = (brightness * 255.0).round().clamp(-255.0, 255.0) as i32;
        let adjust = |c: u8| (c as i32 + shift).clamp(0, 255) as u8;

        for dy in dy_start..dy_end {
            let sy = ((dy as f64 - y0) * inv_scale) as u32;
            if sy >= src_h {
                continue;
            }
            for dx in dx_start..dx_end {
                let sx = ((dx as f64 - x0) * inv_scale) as u32;
                if sx >= src_w {
                    continue;
                }
                let si = (sy as usize * src_w as usize + sx as usize) * 4;
                let Some(px) = src.get(si..si + 4) else {
                    continue;
                };
                let color = (adjust(px[0]), adjust(px[1]), adjust(px[2]), px[3]);
                self.blend(dx as i32, dy as i32, color);
            }
        }
    }
}
