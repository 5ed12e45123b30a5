//! Paparazzi mode: camera-flash pulses that light up the cloud.
//!
//! A flash brightens every particle within `radius` of its center with a
//! quadratic falloff, then loses 30% of its intensity per tick until it drops
//! below the cutoff. When nothing is flashing, an ambient flash may fire at a
//! random point in the cloud.

use glam::Vec3;
use rand::Rng;

use crate::config::PaparazziTuning;
use crate::field::ParticleField;

/// A decaying radial pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub position: Vec3,
    pub intensity: f32,
}

/// Live flashes of the paparazzi effect.
#[derive(Debug, Clone, Default)]
pub struct PaparazziState {
    flashes: Vec<Flash>,
}

impl PaparazziState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Start a flash at a world position.
    pub fn trigger(&mut self, position: Vec3, intensity: f32) {
        self.flashes.push(Flash { position, intensity });
    }

    /// Advance one tick.
    ///
    /// `triggers` are world positions of pointer presses since the last tick.
    /// `intensity` is the configured effect intensity.
    pub fn step(
        &mut self,
        field: &mut ParticleField,
        tuning: &PaparazziTuning,
        intensity: f32,
        triggers: &[Vec3],
        rng: &mut impl Rng,
    ) {
        for &position in triggers {
            self.trigger(position, tuning.click_gain * intensity);
        }

        if self.flashes.is_empty() && rng.gen::<f32>() < tuning.ambient_chance {
            let half = tuning.ambient_extent * 0.5;
            let position = Vec3::new(
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
                rng.gen_range(-half..half),
            );
            tracing::trace!(?position, "ambient flash");
            self.trigger(position, tuning.ambient_gain * intensity);
        }

        for flash in &self.flashes {
            illuminate(field, flash, tuning.radius);
        }

        for flash in &mut self.flashes {
            flash.intensity *= tuning.decay;
        }
        self.flashes.retain(|flash| flash.intensity > tuning.cutoff);
    }
}

/// Brightness a flash contributes at `distance` from its center.
#[inline]
pub fn falloff(intensity: f32, distance: f32, radius: f32) -> f32 {
    if distance >= radius {
        return 0.0;
    }
    let t = 1.0 - distance / radius;
    intensity * t * t
}

fn illuminate(field: &mut ParticleField, flash: &Flash, radius: f32) {
    for index in 0..field.len() {
        let distance = field.particle(index).position.distance(flash.position);
        if distance < radius {
            field.apply_highlight(index, falloff(flash.intensity, distance, radius));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Particle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_field() -> ParticleField {
        // Particles at x = 0, 1, ..., 7 on the X axis
        ParticleField::from_particles(
            (0..8)
                .map(|i| Particle {
                    position: Vec3::new(i as f32, 0.0, 0.0),
                    color: Vec3::splat(0.05),
                    size: 0.05,
                })
                .collect(),
        )
    }

    fn quiet() -> PaparazziTuning {
        PaparazziTuning {
            ambient_chance: 0.0,
            ..PaparazziTuning::default()
        }
    }

    #[test]
    fn test_falloff_curve() {
        assert_eq!(falloff(2.0, 0.0, 5.0), 2.0);
        assert!((falloff(2.0, 2.5, 5.0) - 0.5).abs() < 1e-6);
        assert_eq!(falloff(2.0, 5.0, 5.0), 0.0);
        assert_eq!(falloff(2.0, 9.0, 5.0), 0.0);
    }

    #[test]
    fn test_flash_highlights_within_radius() {
        let mut field = line_field();
        let mut state = PaparazziState::new();
        let mut rng = StdRng::seed_from_u64(1);

        state.step(&mut field, &quiet(), 1.0, &[Vec3::ZERO], &mut rng);

        // Center gets the full pointer gain
        assert_eq!(field.particle(0).color, Vec3::splat(2.0));
        // Distance 1 of 5: 2.0 * 0.8^2
        assert!((field.particle(1).color.x - 1.28).abs() < 1e-5);
        // Outside the radius nothing changes
        assert_eq!(field.particle(5).color, Vec3::splat(0.05));
        assert_eq!(field.particle(7).color, Vec3::splat(0.05));
    }

    #[test]
    fn test_flash_decays_geometrically_and_expires() {
        let mut field = line_field();
        let mut state = PaparazziState::new();
        let mut rng = StdRng::seed_from_u64(2);
        let tuning = quiet();

        state.trigger(Vec3::ZERO, 2.0);
        let mut ticks = 0;
        let mut expected = 2.0_f32;
        while !state.flashes().is_empty() {
            let before = state.flashes()[0].intensity;
            state.step(&mut field, &tuning, 1.0, &[], &mut rng);
            ticks += 1;
            expected *= 0.7;

            if let Some(flash) = state.flashes().first() {
                assert!(flash.intensity <= before);
                assert!((flash.intensity - expected).abs() < 1e-5);
                assert!(flash.intensity > 0.01);
            }
            assert!(ticks < 100, "flash never expired");
        }

        // First k with 2.0 * 0.7^k <= 0.01
        let first_k = (1..).find(|&k| 2.0 * 0.7_f32.powi(k) <= 0.01).unwrap();
        assert_eq!(ticks, first_k);
    }

    #[test]
    fn test_ambient_flash_only_when_idle() {
        let mut field = line_field();
        let mut state = PaparazziState::new();
        let mut rng = StdRng::seed_from_u64(3);
        let always = PaparazziTuning {
            ambient_chance: 1.0,
            ..PaparazziTuning::default()
        };

        state.step(&mut field, &always, 1.0, &[], &mut rng);
        assert_eq!(state.flashes().len(), 1);
        let flash = state.flashes()[0];
        assert!((flash.intensity - 1.8 * 0.7).abs() < 1e-5);
        assert!(flash.position.abs().max_element() <= 5.0);

        // A live flash suppresses the ambient trigger
        state.step(&mut field, &always, 1.0, &[], &mut rng);
        assert_eq!(state.flashes().len(), 1);
    }

    #[test]
    fn test_intensity_setting_scales_flashes() {
        let mut field = line_field();
        let mut state = PaparazziState::new();
        let mut rng = StdRng::seed_from_u64(4);

        state.step(&mut field, &quiet(), 0.5, &[Vec3::ZERO], &mut rng);
        assert_eq!(field.particle(0).color, Vec3::splat(1.0));
        assert!((state.flashes()[0].intensity - 0.7).abs() < 1e-6);
    }
}
