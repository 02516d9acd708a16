use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};
use softbuffer::Surface;

use crate::loader::{SharedState, UserEvent};
use crate::ui::render::Frame;
use crate::ui::state::Viewer;
use crate::zoom::Size;

pub mod input;
pub mod render;
pub mod scene;
pub mod state;
pub mod strip;
pub mod viewport;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub viewer: Viewer,
    pub shared: SharedState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
    modifiers: ModifiersState,
    /// History transition count the loader was last pointed at.
    synced: Option<u64>,
    title: String,
}

impl App {
    pub fn new(viewer: Viewer, shared: SharedState) -> Self {
        Self {
            viewer,
            shared,
            window: None,
            context: None,
            surface: None,
            modifiers: ModifiersState::empty(),
            synced: None,
            title: String::new(),
        }
    }

    fn request_redraw(&self) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    /// Point the loader at the current item after a transition and pick up
    /// anything it already has. Also queues thumbnails for a visible strip.
    fn sync(&mut self) {
        let transitions = self.viewer.history.transitions();
        let moved = self.synced != Some(transitions);
        let strip = self.viewer.strip();
        if !moved && strip.is_none() {
            return;
        }
        self.synced = Some(transitions);

        let n = self.viewer.state.current_index;
        let (lock, cvar) = &*self.shared;
        let Ok(mut cache) = lock.lock() else {
            log::error!("Loader state poisoned");
            return;
        };
        if moved {
            cache.set_current_idx(n - 1);
            if let Some(img) = cache.get(n - 1) {
                self.viewer.image_loaded(n, img);
            } else if let Some(err) = cache.errors.get(&(n - 1)) {
                self.viewer.image_failed(n, err.clone());
            }
        }
        if let Some(strip) = strip {
            cache.want_thumbnails(strip.cells.iter().map(|c| c.n - 1));
        }
        cvar.notify_all();
        drop(cache);

        let title = self.viewer.title();
        if title != self.title {
            if let Some(ref window) = self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    /// Common tail of every input event.
    fn after_input(&mut self, event_loop: &ActiveEventLoop, changed: bool) {
        if self.viewer.quit {
            event_loop.exit();
            return;
        }
        self.sync();
        if changed {
            self.request_redraw();
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return;
        };
        let size = window.inner_size();
        let fb_w = size.width.max(1);
        let fb_h = size.height.max(1);
        let mut buffer = match surface.buffer_mut() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("No frame buffer: {}", e);
                return;
            }
        };

        let shared = &self.shared;
        let thumbnail = |n: usize| {
            let (lock, _) = &**shared;
            lock.lock().ok().and_then(|cache| cache.get_thumbnail(n - 1))
        };
        let mut frame = Frame::new(&mut buffer, fb_w, fb_h);
        scene::draw(&self.viewer, &mut frame, Instant::now(), &thumbnail);
        if let Err(e) = buffer.present() {
            log::warn!("Present failed: {}", e);
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.viewer.title())
            .with_inner_size(LogicalSize::new(1280u32, 720u32));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let context = match softbuffer::Context::new(Arc::clone(&window)) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Could not create drawing context: {}", e);
                event_loop.exit();
                return;
            }
        };
        let surface = match Surface::new(&context, Arc::clone(&window)) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Could not create drawing surface: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.viewer.resize(Size::new(size.width.max(1), size.height.max(1)));
        window.request_redraw();
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        self.sync();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::ImageReady(idx) => {
                let n = idx + 1;
                if n != self.viewer.state.current_index {
                    log::debug!("Image {} ready in the background", n);
                    return;
                }
                let (lock, _) = &*self.shared;
                let Ok(cache) = lock.lock() else {
                    return;
                };
                let img = cache.get(idx);
                let err = cache.errors.get(&idx).cloned();
                drop(cache);
                let changed = match (img, err) {
                    (Some(img), _) => self.viewer.image_loaded(n, img),
                    (None, Some(err)) => self.viewer.image_failed(n, err),
                    (None, None) => false,
                };
                if changed {
                    self.request_redraw();
                }
            }
            UserEvent::ThumbnailReady(_) => {
                if self.viewer.strip().is_some() {
                    self.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let w = width.max(1);
                let h = height.max(1);
                if let (Some(surface), Some(nw), Some(nh)) =
                    (self.surface.as_mut(), NonZeroU32::new(w), NonZeroU32::new(h))
                {
                    if let Err(e) = surface.resize(nw, nh) {
                        log::warn!("Resize failed: {}", e);
                    }
                }
                self.viewer.resize(Size::new(w, h));
                self.after_input(event_loop, true);
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let changed = match input::key_combo(&event, self.modifiers) {
                    Some(key) => self.viewer.handle_key(&key),
                    None => false,
                };
                self.after_input(event_loop, changed);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button != MouseButton::Left {
                    return;
                }
                let changed = if state == ElementState::Pressed {
                    self.viewer.mouse_down()
                } else {
                    self.viewer.mouse_up();
                    false
                };
                self.after_input(event_loop, changed);
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                if self.viewer.mouse_moved((x, y)) {
                    self.request_redraw();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        y / state::WHEEL_LINE
                    }
                };
                let changed = self.viewer.wheel(lines);
                self.after_input(event_loop, changed);
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.viewer.tick(now) {
            self.sync();
            self.request_redraw();
        }
        match self.viewer.next_deadline() {
            Some(when) => event_loop.set_control_flow(ControlFlow::WaitUntil(when)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
