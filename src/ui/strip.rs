use crate::zoom::Size;

/// Items shown before the current one in the thumbnail strip.
pub const LOOKBEHIND: usize = 6;

const GAP: u32 = 6;

/// Which items the strip lists. `start` is 0-based and the window runs to
/// the end of the gallery; the strip is truncated when it skips any items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripWindow {
    pub start: usize,
    pub truncated: bool,
}

/// `current` is the 1-based item number.
pub fn window(current: usize) -> StripWindow {
    StripWindow {
        start: current.saturating_sub(LOOKBEHIND),
        truncated: current > LOOKBEHIND,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px < self.x as f64 + self.w as f64
            && py < self.y as f64 + self.h as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripCell {
    /// 1-based item number.
    pub n: usize,
    pub rect: Rect,
    /// Where the thumbnail goes inside `rect`; the label sits below it.
    pub thumb: Rect,
    pub current: bool,
}

/// Screen placement of the strip along the bottom edge of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    pub area: Rect,
    /// The "more items before" marker, when truncated.
    pub marker: Option<Rect>,
    pub cells: Vec<StripCell>,
}

impl StripLayout {
    /// Lay out entries from the window around `anchor`, left to right, for
    /// as many as fit in the viewport. Both item numbers are 1-based.
    pub fn new(
        anchor: usize,
        current: usize,
        len: usize,
        viewport: Size,
        cell_width: u32,
        text_scale: u32,
    ) -> Self {
        let win = window(anchor);
        let label_h = 7 * text_scale + GAP;
        let thumb_h = cell_width * 3 / 4;
        let height = GAP + thumb_h + label_h;
        let y = viewport.height as i32 - height as i32;
        let area = Rect {
            x: 0,
            y,
            w: viewport.width,
            h: height,
        };

        let mut x = GAP as i32;
        let marker = win.truncated.then(|| {
            let w = 3 * 6 * text_scale + 2 * GAP;
            let r = Rect {
                x,
                y: y + GAP as i32,
                w,
                h: thumb_h,
            };
            x += (w + GAP) as i32;
            r
        });

        let mut cells = Vec::new();
        for idx in win.start..len {
            if x + cell_width as i32 > viewport.width as i32 && !cells.is_empty() {
                break;
            }
            let n = idx + 1;
            let rect = Rect {
                x,
                y: y + GAP as i32,
                w: cell_width,
                h: thumb_h + label_h - GAP,
            };
            cells.push(StripCell {
                n,
                rect,
                thumb: Rect { h: thumb_h, ..rect },
                current: n == current,
            });
            x += (cell_width + GAP) as i32;
        }

        Self { area, marker, cells }
    }

    /// The item under the pointer, unless it is the current one.
    pub fn hit(&self, px: f64, py: f64) -> Option<usize> {
        self.cells
            .iter()
            .find(|c| c.rect.contains(px, py))
            .filter(|c| !c.current)
            .map(|c| c.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_six_back() {
        assert_eq!(window(1), StripWindow { start: 0, truncated: false });
        assert_eq!(window(6), StripWindow { start: 0, truncated: false });
        assert_eq!(window(7), StripWindow { start: 1, truncated: true });
        assert_eq!(window(20), StripWindow { start: 14, truncated: true });
    }

    #[test]
    fn layout_fills_viewport_and_marks_current() {
        let s = StripLayout::new(10, 10, 100, Size::new(1000, 600), 100, 2);
        assert!(s.marker.is_some());
        assert_eq!(s.cells[0].n, 5);
        let last = s.cells.last().unwrap();
        assert!(last.rect.x + last.rect.w as i32 <= 1000);
        assert_eq!(s.cells.iter().filter(|c| c.current).count(), 1);
        assert!(s.cells.iter().find(|c| c.n == 10).unwrap().current);
        assert_eq!(s.area.y + s.area.h as i32, 600);
    }

    #[test]
    fn short_gallery_lists_everything() {
        let s = StripLayout::new(2, 2, 3, Size::new(2000, 600), 100, 2);
        assert!(s.marker.is_none());
        let ns: Vec<usize> = s.cells.iter().map(|c| c.n).collect();
        assert_eq!(ns, vec![1, 2, 3]);
    }

    #[test]
    fn anchor_moves_the_window() {
        let s = StripLayout::new(30, 10, 100, Size::new(1000, 600), 100, 2);
        assert_eq!(s.cells[0].n, 25);
        assert!(s.cells.iter().all(|c| !c.current));
    }

    #[test]
    fn hit_skips_current_entry() {
        let s = StripLayout::new(2, 2, 3, Size::new(2000, 600), 100, 2);
        let centre = |n: usize| {
            let r = s.cells[n - 1].rect;
            (r.x as f64 + 5.0, r.y as f64 + 5.0)
        };
        let (x, y) = centre(3);
        assert_eq!(s.hit(x, y), Some(3));
        let (x, y) = centre(2);
        assert_eq!(s.hit(x, y), None);
        assert_eq!(s.hit(1.0, 1.0), None);
    }
}
