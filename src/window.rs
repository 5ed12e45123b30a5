//! Windowed backdrop: winit event loop driving a [`BackdropRunner`] on a [`GpuHost`].
//!
//! Controls: move the pointer to tilt the cloud, click or touch to flash,
//! `M` toggles the effect mode, the up/down arrows change intensity.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::backdrop::{Backdrop, BackdropRunner};
use crate::config::{EffectMode, EffectSettings, StudioConfig};
use crate::error::{HostError, RunError};
use crate::gpu::GpuHost;
use crate::input::PointerState;
use crate::time::FrameClock;

const INTENSITY_STEP: f32 = 0.1;

/// Open a window and run the backdrop until it is closed.
pub fn run(config: StudioConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = BackdropApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct BackdropApp {
    config: StudioConfig,
    settings: EffectSettings,
    window: Option<Arc<Window>>,
    runner: Option<BackdropRunner<GpuHost>>,
    pointer: PointerState,
    clock: FrameClock,
    error: Option<RunError>,
}

impl BackdropApp {
    fn new(config: StudioConfig) -> Self {
        Self {
            settings: config.effects,
            config,
            window: None,
            runner: None,
            pointer: PointerState::default(),
            clock: FrameClock::default(),
            error: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title("studiofx")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();

        // A missing GPU is not fatal: the backdrop keeps ticking without presenting
        let host = match pollster::block_on(GpuHost::new(
            window.clone(),
            self.config.field.particle_count,
            self.config.matrix.max_bolts,
        )) {
            Ok(host) => Some(host),
            Err(err) => {
                tracing::warn!(error = %err, "render host unavailable");
                None
            }
        };

        let mut runner = BackdropRunner::mount(Backdrop::new(&self.config), host);
        runner.resize(size.width, size.height);
        self.pointer.set_window_size(size.width, size.height);

        window.request_redraw();
        self.window = Some(window);
        self.runner = Some(runner);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(runner) = self.runner.take() {
            runner.unmount();
        }
        self.window = None;
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyM) => {
                self.settings.mode = match self.settings.mode {
                    EffectMode::Paparazzi => EffectMode::Matrix,
                    EffectMode::Matrix => EffectMode::Paparazzi,
                };
                tracing::info!(mode = self.settings.mode.label(), "effect mode");
            }
            PhysicalKey::Code(KeyCode::ArrowUp) => {
                self.settings.intensity += INTENSITY_STEP;
                tracing::info!(intensity = self.settings.intensity, "effect intensity");
            }
            PhysicalKey::Code(KeyCode::ArrowDown) => {
                self.settings.intensity = (self.settings.intensity - INTENSITY_STEP).max(0.0);
                tracing::info!(intensity = self.settings.intensity, "effect intensity");
            }
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(runner) = &mut self.runner else {
            return;
        };
        // Minimized: nothing to present into. Resized restarts the redraws.
        if let Some(window) = &self.window {
            if !is_drawable(window.inner_size()) {
                return;
            }
        }

        let sample = self.pointer.take_sample();
        match runner.tick(&self.settings, &sample) {
            Ok(stats) => {
                if let Some(fps) = self.clock.tick() {
                    tracing::debug!(
                        fps,
                        frame_ms = self.clock.delta() * 1000.0,
                        tick = stats.tick,
                        live = stats.live_effects,
                        "frame rate"
                    );
                }
            }
            Err(HostError::SurfaceLost) => {
                if let Some((width, height)) = runner.host().map(GpuHost::size) {
                    runner.resize(width, height);
                }
            }
            Err(HostError::OutOfMemory) => {
                tracing::error!("GPU out of memory, closing backdrop");
                self.error = Some(RunError::Host(HostError::OutOfMemory));
                self.unmount();
                event_loop.exit();
                return;
            }
            Err(err) => tracing::warn!(error = %err, "frame dropped"),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// A zero-sized surface (minimized window) cannot be configured or presented.
fn is_drawable(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

impl ApplicationHandler for BackdropApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.mount(event_loop) {
            tracing::error!(error = %err, "failed to open backdrop window");
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(runner) = &mut self.runner {
                    runner.resize(size.width, size.height);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimized_window_is_not_drawable() {
        assert!(is_drawable(PhysicalSize::new(1280, 720)));
        assert!(!is_drawable(PhysicalSize::new(0, 0)));
        assert!(!is_drawable(PhysicalSize::new(1280, 0)));
        assert!(!is_drawable(PhysicalSize::new(0, 720)));
    }
}
