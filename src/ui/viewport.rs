use crate::zoom::Size;

/// The visible window onto the document (the laid-out canvas).
#[derive(Debug, Clone)]
pub struct Viewport {
    pub size: Size,
    pub scroll_x: f64,
    pub scroll_y: f64,
    document: Size,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            scroll_x: 0.0,
            scroll_y: 0.0,
            document: size,
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.clamp();
    }

    pub fn set_document(&mut self, document: Size) {
        self.document = document;
        self.clamp();
    }

    pub fn max_scroll(&self) -> (f64, f64) {
        (
            self.document.width.saturating_sub(self.size.width) as f64,
            self.document.height.saturating_sub(self.size.height) as f64,
        )
    }

    /// Returns whether the offsets changed.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> bool {
        let (max_x, max_y) = self.max_scroll();
        let nx = x.clamp(0.0, max_x);
        let ny = y.clamp(0.0, max_y);
        let moved = nx != self.scroll_x || ny != self.scroll_y;
        self.scroll_x = nx;
        self.scroll_y = ny;
        moved
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> bool {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy)
    }

    pub fn at_top(&self) -> bool {
        self.scroll_y <= 0.0
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll_y >= self.max_scroll().1
    }

    /// Client (window) coordinates to document coordinates.
    pub fn to_page(&self, client: (f64, f64)) -> (f64, f64) {
        (client.0 + self.scroll_x, client.1 + self.scroll_y)
    }

    fn clamp(&mut self) {
        self.scroll_to(self.scroll_x, self.scroll_y);
    }
}

/// Grab-and-drag panning: the document point under the pointer at
/// mouse-down stays under the pointer while it moves.
#[derive(Debug, Clone, Default)]
pub struct DragScroll {
    anchor: Option<(f64, f64)>,
}

impl DragScroll {
    /// `page` is the pointer position in document coordinates.
    pub fn press(&mut self, page: (f64, f64)) {
        self.anchor = Some(page);
    }

    /// Scroll offsets that keep the anchor under `client`, while captured.
    pub fn drag(&self, client: (f64, f64)) -> Option<(f64, f64)> {
        self.anchor.map(|(ax, ay)| (ax - client.0, ay - client.1))
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolling_is_clamped_to_document() {
        let mut vp = Viewport::new(Size::new(800, 600));
        assert!(!vp.scroll_by(100.0, 100.0));
        vp.set_document(Size::new(1600, 900));
        assert!(vp.scroll_by(1000.0, 50.0));
        assert_eq!((vp.scroll_x, vp.scroll_y), (800.0, 50.0));
        assert!(!vp.at_bottom());
        vp.scroll_by(0.0, 1000.0);
        assert!(vp.at_bottom());
        vp.resize(Size::new(1600, 900));
        assert_eq!((vp.scroll_x, vp.scroll_y), (0.0, 0.0));
        assert!(vp.at_top());
    }

    #[test]
    fn drag_tracks_the_grabbed_point() {
        let mut vp = Viewport::new(Size::new(100, 100));
        vp.set_document(Size::new(1000, 1000));
        vp.scroll_to(200.0, 300.0);

        let mut drag = DragScroll::default();
        assert_eq!(drag.drag((10.0, 10.0)), None);
        drag.press(vp.to_page((50.0, 50.0)));
        let (x, y) = drag.drag((20.0, 70.0)).unwrap();
        vp.scroll_to(x, y);
        // the grabbed document point (250, 350) is now under (20, 70)
        assert_eq!(vp.to_page((20.0, 70.0)), (250.0, 350.0));

        drag.release();
        assert!(!drag.is_active());
        assert_eq!(drag.drag((0.0, 0.0)), None);

        // a fresh press re-anchors
        drag.press(vp.to_page((0.0, 0.0)));
        assert_eq!(drag.drag((0.0, 0.0)), Some((vp.scroll_x, vp.scroll_y)));
    }
}
