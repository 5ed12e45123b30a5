//! The particle cloud behind the dashboard.
//!
//! A [`ParticleField`] is created once with a fixed number of particles and
//! lives as long as the backdrop. Positions never change; only colors are
//! animated, plus a whole-cloud rotation that follows the pointer.

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use crate::config::FieldConfig;

/// A single point in the cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// RGB, 0.0 and up. Flashes may push channels above 1.0.
    pub color: Vec3,
    /// Point size in world units.
    pub size: f32,
}

/// Fixed-size particle cloud.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    /// Current (pitch, yaw) of the cloud in radians.
    rotation: Vec2,
}

impl ParticleField {
    /// Scatter `config.particle_count` particles uniformly in a cube of edge
    /// `config.spread`, every color at the baseline brightness.
    pub fn new(config: &FieldConfig, rng: &mut impl Rng) -> Self {
        let half = config.spread * 0.5;
        let baseline = Vec3::splat(config.base_brightness);

        let particles = (0..config.particle_count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                ),
                color: baseline,
                size: rng.gen_range(config.min_size..config.max_size),
            })
            .collect();

        Self {
            particles,
            rotation: Vec2::ZERO,
        }
    }

    /// Build a field from explicit particles. Mostly useful in tests.
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            rotation: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn particle(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Current (pitch, yaw) in radians.
    #[inline]
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    /// Model matrix for the cloud: pitch about X, then yaw about Y.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x) * Mat4::from_rotation_y(self.rotation.y)
    }

    /// Move the rotation a fraction `factor` of the way toward `target`.
    pub fn ease_rotation(&mut self, target: Vec2, factor: f32) {
        self.rotation += (target - self.rotation) * factor;
    }

    /// Move every color channel a fraction `factor` of the way toward `baseline`.
    ///
    /// With `factor` in (0, 1] this never overshoots the baseline.
    pub fn fade_to_baseline(&mut self, baseline: f32, factor: f32) {
        let target = Vec3::splat(baseline);
        for particle in &mut self.particles {
            particle.color += (target - particle.color) * factor;
        }
    }

    /// Raise every channel of a particle to at least `brightness`. Never darkens.
    #[inline]
    pub fn apply_highlight(&mut self, index: usize, brightness: f32) {
        let color = &mut self.particles[index].color;
        *color = color.max(Vec3::splat(brightness));
    }

    #[inline]
    pub fn set_color(&mut self, index: usize, color: Vec3) {
        self.particles[index].color = color;
    }
}
