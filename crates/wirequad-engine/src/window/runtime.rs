use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize, Size};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{InputEvent, InputState, Key, KeyState};
use crate::time::{FrameClock, FrameTime};

/// Initial window size policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowSize {
    /// Fixed size in logical pixels.
    Logical(LogicalSize<f64>),
    /// Square window with a side of half the primary monitor's height.
    HalfMonitorHeight,
}

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: WindowSize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "wgpu + winit".to_string(),
            initial_size: WindowSize::HalfMonitorHeight,
        }
    }
}

/// Used when the platform reports no primary monitor.
fn fallback_size() -> LogicalSize<f64> {
    LogicalSize::new(600.0, 600.0)
}

fn half_monitor_square(monitor_height: u32) -> PhysicalSize<u32> {
    let side = (monitor_height / 2).max(1);
    PhysicalSize::new(side, side)
}

fn resolve_window_size(policy: WindowSize, monitor_height: Option<u32>) -> Size {
    match (policy, monitor_height) {
        (WindowSize::Logical(size), _) => size.into(),
        (WindowSize::HalfMonitorHeight, Some(h)) => half_monitor_square(h).into(),
        (WindowSize::HalfMonitorHeight, None) => fallback_size().into(),
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until the window closes or the app exits.
    ///
    /// Returns the startup error if the window or GPU context could not be created.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    startup_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            startup_error: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let monitor_height = event_loop.primary_monitor().map(|m| m.size().height);
        let size = resolve_window_size(self.config.initial_size, monitor_height);

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            let ft: FrameTime = fields.clock.tick();

            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                input: fields.input_state,
                time: ft,
            };

            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(mut entry) => {
                // The clock was started before GPU init; the first frame should not see that wait.
                entry.with_clock_mut(|clock| clock.reset());
                entry.with_window(|w| {
                    log::info!("window opened: {}x{}", w.inner_size().width, w.inner_size().height);
                    w.request_redraw();
                });
                self.entry = Some(entry);
            }
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.startup_error = Some(e);
                self.request_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one frame per loop iteration.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        if let Some(ev) = translate_input_event(&event) {
            entry.with_input_state_mut(|input| input.apply_event(&ev));
        }

        if app.on_window_event(window_id, &event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.entry = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }
}

fn translate_input_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(KeyCode::ArrowLeft) => Key::ArrowLeft,
        PhysicalKey::Code(KeyCode::ArrowRight) => Key::ArrowRight,
        PhysicalKey::Code(other) => Key::Unknown(other as u32),
        // NativeKeyCode has no stable numeric form.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn half_monitor_height_is_square() {
        assert_eq!(half_monitor_square(1080), PhysicalSize::new(540, 540));
        assert_eq!(half_monitor_square(1441), PhysicalSize::new(720, 720));
    }

    #[test]
    fn tiny_monitor_still_gets_a_window() {
        assert_eq!(half_monitor_square(1), PhysicalSize::new(1, 1));
    }

    #[test]
    fn missing_monitor_uses_fallback() {
        let size = resolve_window_size(WindowSize::HalfMonitorHeight, None);
        assert_eq!(size, Size::Logical(fallback_size()));
    }

    #[test]
    fn explicit_logical_size_ignores_monitor() {
        let wanted = LogicalSize::new(800.0, 600.0);
        let size = resolve_window_size(WindowSize::Logical(wanted), Some(2160));
        assert_eq!(size, Size::Logical(wanted));
    }

    #[test]
    fn monitor_height_drives_physical_size() {
        let size = resolve_window_size(WindowSize::HalfMonitorHeight, Some(2160));
        assert_eq!(size, Size::Physical(PhysicalSize::new(1080, 1080)));
    }

    #[test]
    fn focus_changes_are_forwarded() {
        assert_eq!(
            translate_input_event(&WindowEvent::Focused(false)),
            Some(InputEvent::Focused(false))
        );
        assert_eq!(
            translate_input_event(&WindowEvent::Focused(true)),
            Some(InputEvent::Focused(true))
        );
    }

    #[test]
    fn unrelated_window_events_are_ignored() {
        assert_eq!(translate_input_event(&WindowEvent::CloseRequested), None);
    }

    #[test]
    fn arrow_keys_are_mapped() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::ArrowLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowRight)), Key::ArrowRight);
    }

    #[test]
    fn other_keys_are_unknown() {
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::KeyA)), Key::Unknown(_)));
        assert_eq!(
            map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            Key::Unknown(0)
        );
    }
}
