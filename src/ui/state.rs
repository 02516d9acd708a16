use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::files::Gallery;
use crate::keymap::{Action, BrightnessCmd, Context, KeyCombo, Keymap, Target, ZoomCmd};
use crate::loader::DecodedImage;
use crate::query::NavParams;
use crate::router::History;
use crate::ui::strip::StripLayout;
use crate::ui::viewport::{DragScroll, Viewport};
use crate::zoom::{self, Layout, Size, Zoom};

/// Pixels scrolled per mouse wheel line.
pub const WHEEL_LINE: f64 = 40.0;

// ---------------------------------------------------------------------------
// Viewer state: what a page load is built from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    /// 1-based, within `[1, len]`.
    pub current_index: usize,
    pub zoom: Zoom,
    pub brightness: f64,
}

impl ViewerState {
    pub fn from_params(params: &NavParams, len: usize) -> Self {
        Self {
            current_index: params.n.clamp(1, len.max(1)),
            zoom: params.zoom,
            brightness: params.brightness,
        }
    }

    pub fn to_params(&self) -> NavParams {
        NavParams {
            n: self.current_index,
            zoom: self.zoom,
            brightness: self.brightness,
        }
    }
}

/// Load status of the current item, as shown in the info overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Loading,
    Loaded(Size),
    Failed(String),
}

// ---------------------------------------------------------------------------
// Viewer: the controller every window event goes through
// ---------------------------------------------------------------------------

pub struct Viewer {
    pub gallery: Arc<Gallery>,
    pub config: Config,
    pub keymap: Keymap,
    pub state: ViewerState,
    pub history: History,
    pub viewport: Viewport,
    pub drag: DragScroll,
    /// Active modes, innermost last. `Viewer` is always at the bottom.
    modes: Vec<Context>,
    pub image: Option<Arc<DecodedImage>>,
    pub layout: Option<Layout>,
    pub load_error: Option<String>,
    /// Selection cursor of the thumbnail strip, 1-based.
    pub list_cursor: usize,
    pub info_until: Option<Instant>,
    pub slideshow_next: Option<Instant>,
    pub mouse_pos: (f64, f64),
    pub quit: bool,
}

impl Viewer {
    pub fn new(gallery: Arc<Gallery>, config: Config, keymap: Keymap, query: &str, viewport: Size) -> Self {
        let state = ViewerState::from_params(&NavParams::parse(query), gallery.len());
        let history = History::new(state.to_params().to_query());
        let autoplay = config.autoplay;
        let mut viewer = Self {
            gallery,
            config,
            keymap,
            list_cursor: state.current_index,
            state,
            history,
            viewport: Viewport::new(viewport),
            drag: DragScroll::default(),
            modes: vec![Context::Viewer],
            image: None,
            layout: None,
            load_error: None,
            info_until: None,
            slideshow_next: None,
            mouse_pos: (0.0, 0.0),
            quit: false,
        };
        if autoplay {
            viewer.start_slideshow();
        }
        viewer.pop_info();
        viewer
    }

    pub fn len(&self) -> usize {
        self.gallery.len()
    }

    pub fn current_name(&self) -> &str {
        self.gallery.name(self.state.current_index)
    }

    pub fn title(&self) -> String {
        self.config.format_title(
            &self.gallery.title,
            self.state.current_index,
            self.len(),
            self.current_name(),
        )
    }

    pub fn active_context(&self) -> Context {
        self.modes.last().copied().unwrap_or(Context::Viewer)
    }

    pub fn in_mode(&self, context: Context) -> bool {
        self.modes.contains(&context)
    }

    pub fn status(&self) -> ItemStatus {
        match (&self.image, &self.load_error) {
            (Some(img), _) => ItemStatus::Loaded(Size::new(img.width, img.height)),
            (None, Some(e)) => ItemStatus::Failed(e.clone()),
            (None, None) => ItemStatus::Loading,
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Clamp `target` into `[1, len]` and move there. Going to the current
    /// item is a no-op. Returns whether a transition happened.
    pub fn go(&mut self, target: i64) -> bool {
        let n = target.clamp(1, self.len().max(1) as i64) as usize;
        if n == self.state.current_index {
            return false;
        }
        self.commit(n);
        true
    }

    /// Direct navigation from the thumbnail strip.
    pub fn jump(&mut self, n: usize) -> bool {
        if n == 0 || n > self.len() || n == self.state.current_index {
            return false;
        }
        self.commit(n);
        true
    }

    pub fn next(&mut self) -> bool {
        if self.state.current_index < self.len() {
            self.go(self.state.current_index as i64 + 1)
        } else if self.config.wrap {
            self.go(1)
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.state.current_index > 1 {
            self.go(self.state.current_index as i64 - 1)
        } else if self.config.wrap {
            self.go(self.len() as i64)
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        match self.history.back().map(str::to_string) {
            Some(query) => {
                self.reload(&query);
                true
            }
            None => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.history.forward().map(str::to_string) {
            Some(query) => {
                self.reload(&query);
                true
            }
            None => false,
        }
    }

    fn resolve(&self, target: Target) -> i64 {
        let n = self.state.current_index as i64;
        match target {
            Target::Absolute(k) => k,
            Target::Last => self.len() as i64,
            Target::Relative(k) => n + k,
        }
    }

    fn commit(&mut self, n: usize) {
        let params = NavParams {
            n,
            ..self.state.to_params()
        };
        let query = params.to_query();
        log::debug!("Navigating to {} ({})", n, query);
        self.history.push(query.clone());
        self.reload(&query);
    }

    /// Rebuild the per-page state from a query, as a fresh page load would.
    fn reload(&mut self, query: &str) {
        self.state = ViewerState::from_params(&NavParams::parse(query), self.len());
        self.image = None;
        self.layout = None;
        self.load_error = None;
        self.drag.release();
        let size = self.viewport.size;
        self.viewport.set_document(size);
        self.viewport.scroll_to(0.0, 0.0);
        self.list_cursor = self.state.current_index;
        self.modes.retain(|m| *m != Context::ItemList);
        if self.slideshow_next.is_some() {
            self.schedule_slideshow();
        }
        self.pop_info();
    }

    /// Record zoom/brightness changes in the current history entry.
    fn update_location(&mut self) {
        self.history.replace(self.state.to_params().to_query());
    }

    // -----------------------------------------------------------------------
    // Image and layout
    // -----------------------------------------------------------------------

    /// A decoded image arrived for the 1-based item `n`. Stale results for
    /// items the viewer has already left are ignored.
    pub fn image_loaded(&mut self, n: usize, image: Arc<DecodedImage>) -> bool {
        if n != self.state.current_index {
            log::debug!("Ignoring stale image {} (showing {})", n, self.state.current_index);
            return false;
        }
        self.image = Some(image);
        self.load_error = None;
        self.relayout();
        self.pop_info();
        true
    }

    pub fn image_failed(&mut self, n: usize, error: String) -> bool {
        if n != self.state.current_index {
            return false;
        }
        self.load_error = Some(error);
        self.pop_info();
        true
    }

    fn relayout(&mut self) {
        let Some(img) = &self.image else {
            return;
        };
        let image = Size::new(img.width, img.height);
        let layout = zoom::layout(self.viewport.size, image, &self.state.zoom);
        self.viewport.set_document(layout.document(self.viewport.size));
        self.layout = Some(layout);
    }

    pub fn resize(&mut self, size: Size) {
        self.viewport.resize(size);
        self.relayout();
    }

    fn rendered_scale(&self) -> f64 {
        self.layout.map(|l| l.scale).unwrap_or(self.state.zoom.factor)
    }

    pub fn set_zoom(&mut self, cmd: ZoomCmd) {
        let current = self.rendered_scale();
        let step = self.config.zoom_step;
        match cmd {
            ZoomCmd::In => self.state.zoom.zoom_in(current, step),
            ZoomCmd::Out => self.state.zoom.zoom_out(current, step),
            ZoomCmd::Exact(f) => self.state.zoom = Zoom::manual(f),
            ZoomCmd::Fit => self.state.zoom = Zoom::fit(),
            ZoomCmd::Fill => self.state.zoom = Zoom::fill(),
        }
        log::debug!("Zoom {}", self.state.zoom.to_param());
        self.relayout();
        self.update_location();
        self.pop_info();
    }

    pub fn set_brightness(&mut self, cmd: BrightnessCmd) {
        let step = self.config.brightness_step;
        match cmd {
            BrightnessCmd::Up => self.state.brightness += step,
            BrightnessCmd::Down => self.state.brightness -= step,
            BrightnessCmd::Reset => self.state.brightness = 0.0,
        }
        self.update_location();
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    /// Left/Right: navigate when the canvas fits horizontally, else pan by
    /// a quarter of the viewport width.
    pub fn horizontal(&mut self, forward: bool) -> bool {
        let width = self.layout.map(|l| l.width).unwrap_or(0);
        if width <= self.viewport.size.width {
            if forward { self.next() } else { self.prev() }
        } else {
            let dx = self.viewport.size.width as f64 / 4.0;
            self.viewport.scroll_by(if forward { dx } else { -dx }, 0.0)
        }
    }

    pub fn scroll_vertical(&mut self, dy: f64) -> bool {
        let moved = self.viewport.scroll_by(0.0, dy);
        if moved && self.viewport.at_top() {
            self.pop_info();
        }
        moved
    }

    fn page(&self) -> f64 {
        self.viewport.size.height as f64 * 9.0 / 10.0
    }

    pub fn page_down(&mut self) -> bool {
        if self.scroll_vertical(self.page()) {
            return true;
        }
        self.config.autonext && self.next()
    }

    pub fn page_up(&mut self) -> bool {
        if self.scroll_vertical(-self.page()) {
            return true;
        }
        self.config.autonext && self.prev()
    }

    /// Space reads on: scroll a page, or advance once at the bottom.
    pub fn space(&mut self) -> bool {
        if self.viewport.at_bottom() {
            self.next()
        } else {
            self.scroll_vertical(self.page())
        }
    }

    pub fn shift_space(&mut self) -> bool {
        if self.viewport.at_top() {
            self.prev()
        } else {
            self.scroll_vertical(-self.page())
        }
    }

    // -----------------------------------------------------------------------
    // Modes, overlays and timers
    // -----------------------------------------------------------------------

    fn toggle_mode(&mut self, context: Context) {
        if self.active_context() == context {
            self.modes.pop();
        } else {
            self.modes.retain(|m| *m != context);
            self.modes.push(context);
        }
    }

    pub fn toggle_list(&mut self) {
        self.list_cursor = self.state.current_index;
        self.toggle_mode(Context::ItemList);
    }

    pub fn mode_drop(&mut self) -> bool {
        if self.modes.len() <= 1 {
            return false;
        }
        if self.modes.pop() == Some(Context::Slideshow) {
            self.slideshow_next = None;
        }
        true
    }

    fn start_slideshow(&mut self) {
        self.modes.retain(|m| *m != Context::Slideshow);
        self.modes.push(Context::Slideshow);
        self.schedule_slideshow();
        log::info!("Slideshow started ({} ms)", self.config.slideshow_delay);
    }

    fn stop_slideshow(&mut self) {
        self.modes.retain(|m| *m != Context::Slideshow);
        self.slideshow_next = None;
        log::info!("Slideshow stopped");
    }

    fn schedule_slideshow(&mut self) {
        self.slideshow_next = Some(Instant::now() + Duration::from_millis(self.config.slideshow_delay));
    }

    pub fn toggle_slideshow(&mut self) {
        if self.in_mode(Context::Slideshow) {
            self.stop_slideshow();
        } else {
            self.start_slideshow();
        }
    }

    fn move_cursor(&mut self, to: i64) {
        self.list_cursor = to.clamp(1, self.len().max(1) as i64) as usize;
    }

    pub fn pop_info(&mut self) {
        self.info_until = Some(Instant::now() + Duration::from_millis(self.config.pop_info_delay));
    }

    pub fn info_visible(&self, now: Instant) -> bool {
        self.info_until.is_some_and(|t| now < t)
    }

    /// Fire due timers. Returns whether a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.info_until.is_some_and(|t| now >= t) {
            self.info_until = None;
            changed = true;
        }
        if self.slideshow_next.is_some_and(|t| now >= t) {
            if self.next() {
                self.schedule_slideshow();
            } else {
                self.stop_slideshow();
            }
            changed = true;
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.info_until, self.slideshow_next) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The strip window follows the current item, and moves to the
    /// selection cursor when the cursor leaves it.
    pub fn strip(&self) -> Option<StripLayout> {
        if !self.in_mode(Context::ItemList) {
            return None;
        }
        let build = |anchor: usize| {
            StripLayout::new(
                anchor,
                self.state.current_index,
                self.len(),
                self.viewport.size,
                self.config.thumbnail_min_width.max(16),
                self.config.text_scale(),
            )
        };
        let strip = build(self.state.current_index);
        if strip.cells.iter().any(|c| c.n == self.list_cursor) {
            Some(strip)
        } else {
            Some(build(self.list_cursor))
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Run one action. Returns whether anything visible changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let vw = self.viewport.size.width as f64;
        let vh = self.viewport.size.height as f64;
        match action {
            Action::Next => self.next(),
            Action::Prev => self.prev(),
            Action::Go(target) => self.go(self.resolve(target)),
            Action::Zoom(cmd) => {
                self.set_zoom(cmd);
                true
            }
            Action::Brightness(cmd) => {
                self.set_brightness(cmd);
                true
            }
            Action::Left => self.horizontal(false),
            Action::Right => self.horizontal(true),
            Action::ScrollUp => self.scroll_vertical(-vh / 4.0),
            Action::ScrollDown => self.scroll_vertical(vh / 4.0),
            Action::ScrollLeft => self.viewport.scroll_by(-vw / 4.0, 0.0),
            Action::ScrollRight => self.viewport.scroll_by(vw / 4.0, 0.0),
            Action::PageUp => self.page_up(),
            Action::PageDown => self.page_down(),
            Action::Home => {
                let moved = self.viewport.scroll_to(0.0, 0.0);
                if moved {
                    self.pop_info();
                }
                moved
            }
            Action::End => {
                let (_, max_y) = self.viewport.max_scroll();
                let x = self.viewport.scroll_x;
                self.viewport.scroll_to(x, max_y)
            }
            Action::Space => self.space(),
            Action::ShiftSpace => self.shift_space(),
            Action::ToggleList => {
                self.toggle_list();
                true
            }
            Action::ToggleHelp => {
                self.toggle_mode(Context::Help);
                true
            }
            Action::ModeDrop => self.mode_drop(),
            Action::Info => {
                self.pop_info();
                true
            }
            Action::Back => self.back(),
            Action::Forward => self.forward(),
            Action::Slideshow => {
                self.toggle_slideshow();
                true
            }
            Action::ListLeft => {
                self.move_cursor(self.list_cursor as i64 - 1);
                true
            }
            Action::ListRight => {
                self.move_cursor(self.list_cursor as i64 + 1);
                true
            }
            Action::ListHome => {
                self.move_cursor(1);
                true
            }
            Action::ListEnd => {
                self.move_cursor(self.len() as i64);
                true
            }
            Action::ListSubmit => {
                let n = self.list_cursor;
                self.modes.retain(|m| *m != Context::ItemList);
                self.jump(n);
                true
            }
            Action::Quit => {
                self.quit = true;
                false
            }
            Action::Disabled => false,
        }
    }

    pub fn handle_key(&mut self, key: &KeyCombo) -> bool {
        if self.config.show_keys {
            log::info!("Key {} in {}", key, self.active_context().name());
        }
        match self.keymap.lookup(self.active_context(), key) {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    pub fn mouse_moved(&mut self, pos: (f64, f64)) -> bool {
        self.mouse_pos = pos;
        match self.drag.drag(pos) {
            Some((x, y)) => self.viewport.scroll_to(x, y),
            None => false,
        }
    }

    /// Primary button press at the last pointer position: a strip entry
    /// navigates, the canvas starts a drag.
    pub fn mouse_down(&mut self) -> bool {
        let (x, y) = self.mouse_pos;
        if let Some(strip) = self.strip() {
            if strip.area.contains(x, y) {
                return match strip.hit(x, y) {
                    Some(n) => self.jump(n),
                    None => false,
                };
            }
        }
        let Some(layout) = self.layout else {
            return false;
        };
        let (px, py) = self.viewport.to_page((x, y));
        let on_canvas = px >= layout.left as f64
            && py >= layout.top as f64
            && px < (layout.left + layout.width) as f64
            && py < (layout.top + layout.height) as f64;
        if on_canvas {
            self.drag.press((px, py));
        }
        false
    }

    pub fn mouse_up(&mut self) {
        self.drag.release();
    }

    pub fn wheel(&mut self, lines: f64) -> bool {
        self.scroll_vertical(-lines * WHEEL_LINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::ZoomMode;
    use std::path::PathBuf;

    fn gallery(len: usize) -> Arc<Gallery> {
        Arc::new(Gallery {
            title: "test".into(),
            root: PathBuf::from("/g"),
            image_dir: PathBuf::from("/g/imgs"),
            items: (1..=len).map(|i| format!("{:03}.jpg", i)).collect(),
        })
    }

    fn viewer(len: usize, query: &str) -> Viewer {
        Viewer::new(
            gallery(len),
            Config::default(),
            Keymap::builtin().unwrap(),
            query,
            Size::new(800, 600),
        )
    }

    fn image(w: u32, h: u32) -> Arc<DecodedImage> {
        Arc::new(DecodedImage {
            rgba_bytes: vec![0; (w * h * 4) as usize],
            width: w,
            height: h,
        })
    }

    fn key(label: &str) -> KeyCombo {
        KeyCombo::parse(label).unwrap()
    }

    #[test]
    fn query_is_clamped_on_load() {
        let v = viewer(10, "?n=15");
        assert_eq!(v.state.current_index, 10);
        assert_eq!(v.state.zoom, Zoom::manual(1.0));
        assert_eq!(v.state.brightness, 0.0);
        assert_eq!(v.history.transitions(), 0);

        let v = viewer(10, "n=99999999999999999999");
        assert_eq!(v.state.current_index, 10);
    }

    #[test]
    fn home_returns_to_the_top_left_corner() {
        let mut v = viewer(2, "zoom=2");
        v.image_loaded(1, image(800, 600));
        assert!(v.viewport.scroll_to(300.0, 200.0));
        assert!(v.dispatch(Action::Home));
        assert_eq!((v.viewport.scroll_x, v.viewport.scroll_y), (0.0, 0.0));
        assert!(!v.dispatch(Action::Home));
    }

    #[test]
    fn go_clamps_and_skips_same_index() {
        let mut v = viewer(10, "n=3&zoom=fit&brightness=0.5");
        assert!(!v.go(3));
        assert_eq!(v.history.transitions(), 0);

        assert!(v.go(99));
        assert_eq!(v.state.current_index, 10);
        assert!(!v.go(12));
        assert!(v.go(-4));
        assert_eq!(v.state.current_index, 1);
        assert_eq!(v.history.transitions(), 2);
        // zoom and brightness survive the transition
        assert_eq!(v.state.zoom.mode, ZoomMode::Fit);
        assert_eq!(v.state.brightness, 0.5);
        assert_eq!(v.history.current(), "n=1&zoom=fit&brightness=0.5");
    }

    #[test]
    fn jump_keys_saturate() {
        let mut v = viewer(10, "n=8");
        assert!(v.handle_key(&key("3")));
        assert_eq!(v.state.current_index, 10);
        assert!(!v.handle_key(&key("1")));
        assert!(v.handle_key(&key("9")));
        assert_eq!(v.state.current_index, 5);
        assert!(v.handle_key(&key("7")));
        assert_eq!(v.state.current_index, 1);
        assert!(!v.handle_key(&key("k")));
    }

    #[test]
    fn navigation_clears_the_image_and_ignores_stale_loads() {
        let mut v = viewer(5, "n=2");
        assert!(v.image_loaded(2, image(10, 10)));
        assert!(v.next());
        assert!(v.image.is_none());
        assert_eq!(v.status(), ItemStatus::Loading);
        assert!(!v.image_loaded(2, image(10, 10)));
        assert!(v.image.is_none());
        assert!(v.image_failed(3, "bad data".into()));
        assert_eq!(v.status(), ItemStatus::Failed("bad data".into()));
    }

    #[test]
    fn wrap_only_with_loop() {
        let mut v = viewer(3, "n=3");
        assert!(!v.next());
        v.config.wrap = true;
        assert!(v.next());
        assert_eq!(v.state.current_index, 1);
        assert!(v.prev());
        assert_eq!(v.state.current_index, 3);
    }

    #[test]
    fn directional_keys_navigate_when_canvas_fits() {
        let mut v = viewer(5, "n=2");
        // nothing loaded yet: width counts as zero
        assert!(v.handle_key(&key("Right")));
        assert_eq!(v.state.current_index, 3);

        v.image_loaded(3, image(800, 100));
        assert!(v.handle_key(&key("Left")));
        assert_eq!(v.state.current_index, 2);
    }

    #[test]
    fn directional_keys_pan_a_wide_canvas() {
        let mut v = viewer(5, "n=2&zoom=2");
        v.image_loaded(2, image(1000, 100));
        assert_eq!(v.layout.unwrap().width, 2000);

        assert!(v.handle_key(&key("Right")));
        assert_eq!(v.state.current_index, 2);
        assert_eq!(v.viewport.scroll_x, 200.0);
        assert!(v.handle_key(&key("Left")));
        assert_eq!(v.viewport.scroll_x, 0.0);
        // at the left edge the pan is a no-op, never a navigation
        assert!(!v.handle_key(&key("Left")));
        assert_eq!(v.state.current_index, 2);

        // fit shrinks it back under the viewport width: keys navigate again
        v.set_zoom(ZoomCmd::Fit);
        assert!(v.handle_key(&key("Right")));
        assert_eq!(v.state.current_index, 3);
    }

    #[test]
    fn zoom_steps_from_rendered_scale() {
        let mut v = viewer(2, "zoom=fit");
        v.image_loaded(1, image(4000, 3000));
        assert_eq!(v.layout.unwrap().scale, 0.2);
        v.dispatch(Action::Zoom(ZoomCmd::In));
        assert_eq!(v.state.zoom.mode, ZoomMode::Manual);
        assert!((v.state.zoom.factor - 0.325).abs() < 1e-9);
        v.dispatch(Action::Zoom(ZoomCmd::Exact(1.0)));
        v.dispatch(Action::Zoom(ZoomCmd::In));
        assert_eq!(v.state.zoom.factor, 1.125);
        v.dispatch(Action::Zoom(ZoomCmd::Out));
        v.dispatch(Action::Zoom(ZoomCmd::Out));
        assert_eq!(v.state.zoom.factor, 0.875);
        // zoom lands in the location without a transition
        assert_eq!(v.history.transitions(), 0);
        assert_eq!(v.history.current(), "n=1&zoom=0.875&brightness=0");
    }

    #[test]
    fn plus_key_steps_additively() {
        let mut v = viewer(2, "");
        let mut seen = Vec::new();
        for _ in 0..3 {
            v.handle_key(&key("+"));
            seen.push(v.state.zoom.factor);
        }
        assert_eq!(seen, vec![1.125, 1.25, 1.375]);
        v.handle_key(&key("Minus"));
        assert_eq!(v.state.zoom.factor, 1.25);
    }

    #[test]
    fn brightness_steps_and_resets() {
        let mut v = viewer(2, "");
        v.handle_key(&key("b"));
        v.handle_key(&key("b"));
        assert!((v.state.brightness - 0.2).abs() < 1e-9);
        v.handle_key(&key("B"));
        assert!((v.state.brightness - 0.1).abs() < 1e-9);
        v.handle_key(&key("0"));
        assert_eq!(v.state.brightness, 0.0);
    }

    #[test]
    fn space_scrolls_then_advances() {
        let mut v = viewer(3, "n=1");
        v.image_loaded(1, image(800, 1200));
        assert!(v.dispatch(Action::Space));
        assert_eq!(v.viewport.scroll_y, 540.0);
        assert!(v.dispatch(Action::Space));
        assert_eq!(v.viewport.scroll_y, 600.0);
        assert_eq!(v.state.current_index, 1);
        assert!(v.dispatch(Action::Space));
        assert_eq!(v.state.current_index, 2);
        assert_eq!(v.viewport.scroll_y, 0.0);
    }

    #[test]
    fn page_down_advances_only_with_autonext() {
        let mut v = viewer(3, "n=1");
        v.image_loaded(1, image(100, 100));
        assert!(!v.dispatch(Action::PageDown));
        v.config.autonext = true;
        assert!(v.dispatch(Action::PageDown));
        assert_eq!(v.state.current_index, 2);
    }

    #[test]
    fn back_and_forward_restore_locations() {
        let mut v = viewer(10, "n=1");
        v.go(4);
        v.set_zoom(ZoomCmd::Fill);
        v.go(7);
        assert!(v.back());
        assert_eq!(v.state.current_index, 4);
        assert_eq!(v.state.zoom.mode, ZoomMode::Fill);
        assert!(v.back());
        assert_eq!(v.state.current_index, 1);
        assert_eq!(v.state.zoom, Zoom::manual(1.0));
        assert!(!v.back());
        assert!(v.forward());
        assert_eq!(v.state.current_index, 4);
    }

    #[test]
    fn modes_route_keys() {
        let mut v = viewer(20, "n=10");
        assert_eq!(v.active_context(), Context::Viewer);
        v.handle_key(&key("l"));
        assert_eq!(v.active_context(), Context::ItemList);
        assert!(v.strip().is_some());

        // list keys move the cursor, Enter jumps there and closes the list
        v.dispatch(Action::ListRight);
        v.dispatch(Action::ListRight);
        assert_eq!(v.list_cursor, 12);
        assert!(v.handle_key(&key("Enter")));
        assert_eq!(v.state.current_index, 12);
        assert_eq!(v.active_context(), Context::Viewer);
        assert!(v.strip().is_none());

        v.handle_key(&key("h"));
        assert_eq!(v.active_context(), Context::Help);
        assert!(v.handle_key(&key("Escape")));
        assert_eq!(v.active_context(), Context::Viewer);
        assert!(!v.dispatch(Action::ModeDrop));
    }

    #[test]
    fn strip_click_navigates_directly() {
        let mut v = viewer(20, "n=10");
        v.toggle_list();
        let strip = v.strip().unwrap();
        let cell = strip.cells.iter().find(|c| c.n == 11).unwrap();
        v.mouse_moved((cell.rect.x as f64 + 2.0, cell.rect.y as f64 + 2.0));
        assert!(v.mouse_down());
        assert_eq!(v.state.current_index, 11);
        assert!(!v.drag.is_active());
    }

    #[test]
    fn dragging_the_canvas_scrolls() {
        let mut v = viewer(2, "zoom=2");
        v.image_loaded(1, image(800, 600));
        v.mouse_moved((400.0, 300.0));
        v.mouse_down();
        assert!(v.drag.is_active());
        assert!(v.mouse_moved((300.0, 250.0)));
        assert_eq!((v.viewport.scroll_x, v.viewport.scroll_y), (100.0, 50.0));
        v.mouse_up();
        assert!(!v.mouse_moved((0.0, 0.0)));
    }

    #[test]
    fn slideshow_advances_and_stops_at_the_end() {
        let mut v = viewer(2, "n=1");
        v.dispatch(Action::Slideshow);
        assert_eq!(v.active_context(), Context::Slideshow);
        let due = v.slideshow_next.unwrap();
        assert!(v.tick(due));
        assert_eq!(v.state.current_index, 2);
        let due = v.slideshow_next.unwrap();
        v.tick(due);
        assert!(v.slideshow_next.is_none());
        assert!(!v.in_mode(Context::Slideshow));
    }

    #[test]
    fn quit_and_disabled_keys() {
        let mut v = viewer(2, "");
        v.handle_key(&key("h"));
        // 'l' is explicitly disabled in help: it does not open the list
        assert!(!v.handle_key(&key("l")));
        assert_eq!(v.active_context(), Context::Help);
        v.handle_key(&key("C-q"));
        assert!(v.quit);
    }
}
