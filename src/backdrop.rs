//! The animated backdrop: one state object, advanced once per frame.
//!
//! [`Backdrop::step`] is the whole render-loop body. It takes the effect
//! settings and a pointer sample as parameters, so it runs the same in a
//! window, in a headless loop, or in a test with a seeded RNG:
//!
//! ```ignore
//! let mut backdrop = Backdrop::new(&config);
//! loop {
//!     let sample = pointer.take_sample();
//!     backdrop.step(&settings, &sample);
//!     host.present(&backdrop.frame())?;
//! }
//! ```
//!
//! [`BackdropRunner`] pairs a backdrop with an optional host and owns the
//! host's lifetime: it is detached exactly once, on unmount or drop.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::config::{EffectMode, EffectSettings, FieldConfig, MatrixTuning, PaparazziTuning, StudioConfig};
use crate::effects::EffectState;
use crate::error::HostError;
use crate::field::ParticleField;
use crate::host::{FrameView, RenderHost};
use crate::input::{flash_origin, rotation_target, PointerSample};

/// Summary of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Ticks completed, including this one.
    pub tick: u64,
    pub mode: EffectMode,
    /// Live flashes or bolts after the tick.
    pub live_effects: usize,
    /// Whether the mode changed on this tick.
    pub mode_switched: bool,
}

/// Particle field, camera and effect state, advanced by [`Backdrop::step`].
#[derive(Debug, Clone)]
pub struct Backdrop<R: Rng = StdRng> {
    field_config: FieldConfig,
    paparazzi: PaparazziTuning,
    matrix: MatrixTuning,
    field: ParticleField,
    camera: Camera,
    effect: EffectState,
    rng: R,
    ticks: u64,
}

impl Backdrop<StdRng> {
    /// Create a backdrop seeded from system entropy.
    pub fn new(config: &StudioConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a reproducible backdrop.
    pub fn seeded(config: &StudioConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Backdrop<R> {
    pub fn with_rng(config: &StudioConfig, mut rng: R) -> Self {
        let field = ParticleField::new(&config.field, &mut rng);
        let effect = EffectState::for_mode(config.effects.mode, config.matrix.max_bolts);

        Self {
            field_config: config.field.clone(),
            paparazzi: config.paparazzi.clone(),
            matrix: config.matrix.clone(),
            field,
            camera: Camera::default(),
            effect,
            rng,
            ticks: 0,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn effect(&self) -> &EffectState {
        &self.effect
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start a flash under the pointer, as a click would.
    ///
    /// Ignored unless paparazzi mode is active. Returns whether a flash started.
    pub fn trigger_flash(&mut self, ndc: glam::Vec2, settings: &EffectSettings) -> bool {
        let EffectState::Paparazzi(state) = &mut self.effect else {
            return false;
        };
        match flash_origin(&self.camera, ndc) {
            Some(position) => {
                state.trigger(position, self.paparazzi.click_gain * settings.intensity);
                true
            }
            None => false,
        }
    }

    /// The surface changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Advance the animation by one tick.
    pub fn step(&mut self, settings: &EffectSettings, input: &PointerSample) -> FrameStats {
        let target = rotation_target(input.ndc, self.field_config.rotation_sensitivity);
        self.field.ease_rotation(target, self.field_config.rotation_blend);

        self.field
            .fade_to_baseline(self.field_config.base_brightness, self.field_config.color_blend);

        let mode_switched = self.effect.ensure_mode(settings.mode, self.matrix.max_bolts);

        match &mut self.effect {
            EffectState::Paparazzi(state) => {
                let triggers: Vec<Vec3> = input
                    .presses
                    .iter()
                    .filter_map(|&ndc| flash_origin(&self.camera, ndc))
                    .collect();
                state.step(
                    &mut self.field,
                    &self.paparazzi,
                    settings.intensity,
                    &triggers,
                    &mut self.rng,
                );
            }
            EffectState::Matrix(state) => {
                state.step(&mut self.field, &self.matrix, settings.intensity, &mut self.rng);
            }
        }

        self.ticks += 1;
        FrameStats {
            tick: self.ticks,
            mode: self.effect.mode(),
            live_effects: self.effect.live_count(),
            mode_switched,
        }
    }

    /// Borrow the current buffers for presentation.
    pub fn frame(&self) -> FrameView<'_> {
        let segments = self.effect.segments();
        FrameView {
            particles: self.field.particles(),
            model: self.field.model_matrix(),
            view_proj: self.camera.view_proj(),
            segments: segments.unwrap_or(&[]),
            segments_visible: segments.is_some(),
        }
    }
}

/// A backdrop mounted on an optional host.
///
/// Without a host the backdrop still animates but nothing is presented.
/// The host is detached exactly once: by [`BackdropRunner::unmount`] or on drop.
pub struct BackdropRunner<H: RenderHost, R: Rng = StdRng> {
    backdrop: Backdrop<R>,
    host: Option<H>,
}

impl<H: RenderHost, R: Rng> BackdropRunner<H, R> {
    pub fn mount(backdrop: Backdrop<R>, host: Option<H>) -> Self {
        if host.is_none() {
            tracing::debug!("no render host available, backdrop will not present");
        }
        Self { backdrop, host }
    }

    pub fn backdrop(&self) -> &Backdrop<R> {
        &self.backdrop
    }

    pub fn backdrop_mut(&mut self) -> &mut Backdrop<R> {
        &mut self.backdrop
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn is_presenting(&self) -> bool {
        self.host.is_some()
    }

    /// Step the backdrop and present the frame.
    ///
    /// The step always happens; a presentation error is returned for the caller
    /// to decide whether to reconfigure, skip the frame, or stop.
    pub fn tick(&mut self, settings: &EffectSettings, input: &PointerSample) -> Result<FrameStats, HostError> {
        let stats = self.backdrop.step(settings, input);
        if let Some(host) = &mut self.host {
            host.present(&self.backdrop.frame())?;
        }
        Ok(stats)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backdrop.resize(width, height);
        if let Some(host) = &mut self.host {
            host.resize(width, height);
        }
    }

    /// Detach the host and drop the backdrop.
    pub fn unmount(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(mut host) = self.host.take() {
            host.detach();
            tracing::debug!(ticks = self.backdrop.ticks(), "backdrop unmounted");
        }
    }
}

impl<H: RenderHost, R: Rng> Drop for BackdropRunner<H, R> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn small_config(mode: EffectMode) -> StudioConfig {
        let mut config = StudioConfig::default();
        config.field.particle_count = 300;
        config.effects.mode = mode;
        config
    }

    #[test]
    fn test_step_keeps_particle_count() {
        let config = small_config(EffectMode::Matrix);
        let mut backdrop = Backdrop::seeded(&config, 11);
        let settings = config.effects;

        for _ in 0..200 {
            let stats = backdrop.step(&settings, &PointerSample::default());
            assert!(stats.live_effects <= config.matrix.max_bolts);
        }
        assert_eq!(backdrop.field().len(), 300);
        assert_eq!(backdrop.ticks(), 200);
        assert_eq!(backdrop.frame().segments.len(), config.matrix.max_bolts);
    }

    #[test]
    fn test_presses_flash_only_in_paparazzi() {
        let mut config = small_config(EffectMode::Paparazzi);
        config.paparazzi.ambient_chance = 0.0;
        let mut backdrop = Backdrop::seeded(&config, 12);

        let press = PointerSample {
            ndc: Vec2::ZERO,
            presses: vec![Vec2::ZERO, Vec2::new(0.5, 0.5)],
        };
        let stats = backdrop.step(&config.effects, &press);
        assert_eq!(stats.live_effects, 2);

        let matrix = EffectSettings {
            mode: EffectMode::Matrix,
            intensity: 1.0,
        };
        let stats = backdrop.step(&matrix, &press);
        assert!(stats.mode_switched);
        assert_eq!(stats.mode, EffectMode::Matrix);
        assert!(!backdrop.trigger_flash(Vec2::ZERO, &matrix));
    }

    #[test]
    fn test_frame_visibility_follows_mode() {
        let config = small_config(EffectMode::Paparazzi);
        let mut backdrop = Backdrop::seeded(&config, 13);

        let frame = backdrop.frame();
        assert!(!frame.segments_visible);
        assert!(frame.segments.is_empty());
        assert_eq!(frame.particles.len(), 300);

        let matrix = EffectSettings {
            mode: EffectMode::Matrix,
            intensity: 1.0,
        };
        backdrop.step(&matrix, &PointerSample::default());
        assert!(backdrop.frame().segments_visible);
    }

    #[test]
    fn test_pointer_drives_rotation() {
        let config = small_config(EffectMode::Paparazzi);
        let mut backdrop = Backdrop::seeded(&config, 14);
        let sample = PointerSample::at(Vec2::new(1.0, 1.0));

        backdrop.step(&config.effects, &sample);
        let rotation = backdrop.field().rotation();
        assert!((rotation.x - 0.15 * 0.04).abs() < 1e-6);
        assert!((rotation.y + 0.15 * 0.04).abs() < 1e-6);
    }
}
