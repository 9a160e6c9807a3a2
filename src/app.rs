use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

use crate::config::GalleryConfig;
use crate::ecs::components::TileId;
use crate::gallery::{FrameSnapshot, Gallery, GalleryEvent, Presenter, TileSnapshot};
use crate::orchestrator::Phase;
use crate::render::camera;
use crate::render::GpuState;
use crate::state::Subscription;
use crate::tile::assets::CyclicAssets;
use crate::topbar::TopBar;

/// Longest frame step fed to the animation (seconds). Covers stalls and
/// window drags without teleporting tiles.
const MAX_FRAME_DT: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64, phase: Phase) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {} | {:?}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
                phase,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Hover tracking
// ---------------------------------------------------------------------------

/// Turns the tile under the cursor each frame into enter/leave events.
#[derive(Debug, Default)]
struct HoverTracker {
    current: Option<TileId>,
}

impl HoverTracker {
    fn update(&mut self, under_cursor: Option<TileId>) -> impl Iterator<Item = GalleryEvent> {
        let previous = std::mem::replace(&mut self.current, under_cursor);
        let changed = previous != under_cursor;
        let leave = previous.filter(|_| changed).map(GalleryEvent::PointerLeave);
        let enter = under_cursor.filter(|_| changed).map(GalleryEvent::PointerEnter);
        leave.into_iter().chain(enter)
    }

    fn current(&self) -> Option<TileId> {
        self.current
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,

    gallery: Gallery,
    topbar: TopBar,
    hover: HoverTracker,
    // Drives the window title
    title_watch: Subscription,

    // Reused every frame
    snapshots: Vec<TileSnapshot>,

    // Cursor in physical pixels, None when outside the window
    cursor: Option<Vec2>,

    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,
}

impl App {
    fn new(mut gallery: Gallery) -> Self {
        let title_watch = gallery.interaction_mut().subscribe();
        // Ring plus both flat rows
        let capacity = gallery.config().count * 3;
        Self {
            window: None,
            gpu: None,
            gallery,
            topbar: TopBar::new(),
            hover: HoverTracker::default(),
            title_watch,
            snapshots: Vec::with_capacity(capacity),
            cursor: None,
            last_frame_time: None,
            frame_stats: FrameStats::new(),
        }
    }

    fn reset(&mut self) {
        log::info!("Reset requested");
        self.topbar.trigger_reset(self.gallery.interaction_mut());
    }

    fn click(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        if TopBar::hits_logo(cursor.x, cursor.y) {
            self.reset();
        } else if let Some(id) = self.hover.current() {
            self.gallery.handle(GalleryEvent::Activate(id));
        }
    }

    /// Hit-test last frame's tiles and route hover changes to the gallery.
    fn update_hover(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let under_cursor = self
            .cursor
            .and_then(|c| camera::pick(&self.snapshots, &gpu.camera, c, gpu.screen_size()));
        for event in self.hover.update(under_cursor) {
            self.gallery.handle(event);
        }
    }

    /// Pointer cursor wherever a click does something.
    fn cursor_icon(&self) -> CursorIcon {
        let over_logo = self.cursor.is_some_and(|c| TopBar::hits_logo(c.x, c.y));
        let over_tile = self.hover.current().is_some() && !self.gallery.interaction().get();
        if over_logo || over_tile {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        }
    }

    fn update_window(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if let Some(expanded) = self.title_watch.changes.try_iter().last() {
            window.set_title(if expanded { "Carousel (gallery)" } else { "Carousel" });
        }
        window.set_cursor(self.cursor_icon());
    }

    fn frame(&mut self, dt: f32) {
        self.update_hover();
        self.gallery.tick(dt);
        self.topbar.cover.advance(dt);

        self.update_window();

        self.gallery.snapshot(&mut self.snapshots);
        let cover = &self.topbar.cover;
        if let Some(gpu) = &mut self.gpu {
            gpu.present(&FrameSnapshot {
                tiles: &self.snapshots,
                cover: cover.is_active().then(|| cover.scale()),
            });
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Carousel")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        match GpuState::new(window.clone()) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                log::error!("Failed to initialize GPU: {e}");
                event_loop.exit();
                return;
            }
        }
        log::info!("wgpu + tile pipeline initialized");

        // Continuous animation loop
        event_loop.set_control_flow(ControlFlow::Poll);
        self.window = Some(window);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let id = self.title_watch.id;
        self.gallery.interaction_mut().unsubscribe(id);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
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
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.click(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => self.reset(),
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = match self.last_frame_time {
                    Some(last) => {
                        let dt = now.duration_since(last).as_secs_f64();
                        self.frame_stats.record_frame(dt, self.gallery.phase());
                        dt.min(MAX_FRAME_DT)
                    }
                    None => 0.0,
                };
                self.last_frame_time = Some(now);
                self.frame(dt as f32);
            }
            _ => {}
        }
    }
}

/// Entry point: build the gallery, create the event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = GalleryConfig::load();
    let gallery = Gallery::new(config, Box::new(CyclicAssets::default()))?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(gallery);
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_emits_enter_then_leave() {
        let mut hover = HoverTracker::default();
        let events: Vec<_> = hover.update(Some(TileId::Ring(2))).collect();
        assert_eq!(events, [GalleryEvent::PointerEnter(TileId::Ring(2))]);

        assert_eq!(hover.update(Some(TileId::Ring(2))).count(), 0);

        let events: Vec<_> = hover.update(None).collect();
        assert_eq!(events, [GalleryEvent::PointerLeave(TileId::Ring(2))]);
        assert_eq!(hover.current(), None);
    }

    #[test]
    fn moving_between_tiles_leaves_before_entering() {
        let mut hover = HoverTracker::default();
        hover.update(Some(TileId::Ring(0))).for_each(drop);
        let events: Vec<_> = hover.update(Some(TileId::Ring(1))).collect();
        assert_eq!(
            events,
            [
                GalleryEvent::PointerLeave(TileId::Ring(0)),
                GalleryEvent::PointerEnter(TileId::Ring(1)),
            ]
        );
    }

    fn app() -> App {
        let gallery = Gallery::new(GalleryConfig::default(), Box::new(CyclicAssets::default())).unwrap();
        App::new(gallery)
    }

    #[test]
    fn pointer_cursor_only_where_clicks_act() {
        let mut app = app();
        assert_eq!(app.cursor_icon(), CursorIcon::Default);

        app.cursor = Some(Vec2::new(20.0, 20.0));
        assert_eq!(app.cursor_icon(), CursorIcon::Pointer);

        app.cursor = Some(Vec2::new(600.0, 300.0));
        app.hover.update(Some(TileId::Ring(1))).for_each(drop);
        assert_eq!(app.cursor_icon(), CursorIcon::Pointer);

        app.gallery.handle(GalleryEvent::Activate(TileId::Ring(1)));
        assert_eq!(app.cursor_icon(), CursorIcon::Default);
    }

    #[test]
    fn title_watch_sees_flips_until_unsubscribed() {
        let mut app = app();
        app.gallery.handle(GalleryEvent::Activate(TileId::Ring(0)));
        assert_eq!(app.title_watch.changes.try_iter().last(), Some(true));

        let id = app.title_watch.id;
        assert!(app.gallery.interaction_mut().unsubscribe(id));
        app.reset();
        assert!(app.title_watch.changes.try_recv().is_err());
        assert!(app.topbar.cover.is_active());
    }
}
