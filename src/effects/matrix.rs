//! Matrix mode: short-lived green bolts between nearby particles.
//!
//! Bolts are capacity-bounded. The segment buffer always holds exactly
//! `max_bolts` entries so the renderer can upload it without resizing; slots
//! without a live bolt hold a zero-length segment at the origin.

use glam::Vec3;
use rand::Rng;

use crate::config::MatrixTuning;
use crate::field::ParticleField;

/// A decaying link between two particles, by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bolt {
    pub from: usize,
    pub to: usize,
    pub intensity: f32,
}

/// A line segment in the cloud's local space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    /// Zero-length segment used for unused slots.
    pub const DEGENERATE: Segment = Segment {
        start: Vec3::ZERO,
        end: Vec3::ZERO,
    };

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// Live bolts of the matrix effect.
#[derive(Debug, Clone)]
pub struct MatrixState {
    bolts: Vec<Bolt>,
    segments: Vec<Segment>,
}

impl MatrixState {
    pub fn new(capacity: usize) -> Self {
        Self {
            bolts: Vec::with_capacity(capacity),
            segments: vec![Segment::DEGENERATE; capacity],
        }
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    /// Fixed-size segment buffer, one slot per possible bolt.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn capacity(&self) -> usize {
        self.segments.len()
    }

    /// Add a bolt if there is room. Returns `false` when at capacity.
    pub fn spawn(&mut self, from: usize, to: usize, intensity: f32) -> bool {
        if self.bolts.len() >= self.capacity() {
            return false;
        }
        self.bolts.push(Bolt { from, to, intensity });
        true
    }

    /// Advance one tick.
    pub fn step(
        &mut self,
        field: &mut ParticleField,
        tuning: &MatrixTuning,
        intensity: f32,
        rng: &mut impl Rng,
    ) {
        if self.bolts.len() < self.capacity()
            && !field.is_empty()
            && rng.gen::<f32>() < tuning.spawn_chance
        {
            let count = field.len();
            let from = rng.gen_range(0..count);
            let candidates: Vec<usize> = (0..tuning.candidate_samples)
                .map(|_| rng.gen_range(0..count))
                .collect();

            if let Some((to, distance)) = nearest_neighbor(
                field,
                from,
                candidates,
                tuning.min_distance,
                tuning.max_distance,
            ) {
                tracing::trace!(from, to, distance, "bolt spawned");
                self.spawn(from, to, tuning.gain * intensity);
            }
        }

        for (slot, segment) in self.segments.iter_mut().enumerate() {
            match self.bolts.get_mut(slot) {
                Some(bolt) => {
                    *segment = Segment {
                        start: field.particle(bolt.from).position,
                        end: field.particle(bolt.to).position,
                    };
                    let green = Vec3::new(0.0, bolt.intensity, 0.0);
                    field.set_color(bolt.from, green);
                    field.set_color(bolt.to, green);
                    bolt.intensity *= tuning.decay;
                }
                None => *segment = Segment::DEGENERATE,
            }
        }

        self.bolts.retain(|bolt| bolt.intensity > tuning.cutoff);
    }
}

/// Nearest candidate to `source` whose distance lies strictly inside
/// `(min_distance, max_distance)`.
///
/// Brute force over the given candidate indices; ties keep the first one seen.
pub fn nearest_neighbor(
    field: &ParticleField,
    source: usize,
    candidates: impl IntoIterator<Item = usize>,
    min_distance: f32,
    max_distance: f32,
) -> Option<(usize, f32)> {
    let origin = field.particle(source).position;
    let mut best: Option<(usize, f32)> = None;
    let mut best_distance = max_distance;

    for index in candidates {
        let distance = origin.distance(field.particle(index).position);
        if distance > min_distance && distance < best_distance {
            best_distance = distance;
            best = Some((index, distance));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Particle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field_from(positions: &[Vec3]) -> ParticleField {
        ParticleField::from_particles(
            positions
                .iter()
                .map(|&position| Particle {
                    position,
                    color: Vec3::splat(0.05),
                    size: 0.05,
                })
                .collect(),
        )
    }

    fn dense_field(count: usize) -> ParticleField {
        // Tight cluster so every spawn attempt finds a neighbor
        let positions: Vec<Vec3> = (0..count)
            .map(|i| {
                let t = i as f32;
                Vec3::new((t * 0.37).sin(), (t * 0.73).cos(), (t * 0.11).sin()) * 0.6
            })
            .collect();
        field_from(&positions)
    }

    fn eager() -> MatrixTuning {
        MatrixTuning {
            spawn_chance: 1.0,
            ..MatrixTuning::default()
        }
    }

    #[test]
    fn test_nearest_neighbor_window() {
        let field = field_from(&[
            Vec3::ZERO,
            Vec3::new(0.05, 0.0, 0.0), // too close
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(0.7, 0.0, 0.0), // nearest valid
            Vec3::new(3.0, 0.0, 0.0), // too far
        ]);

        let found = nearest_neighbor(&field, 0, [1, 2, 3, 4], 0.1, 2.0);
        assert_eq!(found.map(|(i, _)| i), Some(3));

        // Sampling the source itself never qualifies
        assert_eq!(nearest_neighbor(&field, 0, [0, 1, 4], 0.1, 2.0), None);
    }

    #[test]
    fn test_bolt_paints_particles_and_segment() {
        let mut field = field_from(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]);
        let mut state = MatrixState::new(3);
        let mut rng = StdRng::seed_from_u64(5);
        let tuning = MatrixTuning {
            spawn_chance: 0.0,
            ..MatrixTuning::default()
        };

        assert!(state.spawn(0, 1, 2.5));
        state.step(&mut field, &tuning, 1.0, &mut rng);

        assert_eq!(field.particle(0).color, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(field.particle(1).color, Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(state.segments()[0].end, Vec3::new(1.0, 0.0, 0.0));
        assert!(state.segments()[1].is_degenerate());
        assert!(state.segments()[2].is_degenerate());
        assert!((state.bolts()[0].intensity - 2.5 * 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_bolt_decays_and_expires() {
        let mut field = field_from(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]);
        let mut state = MatrixState::new(15);
        let mut rng = StdRng::seed_from_u64(6);
        let tuning = MatrixTuning {
            spawn_chance: 0.0,
            ..MatrixTuning::default()
        };

        state.spawn(0, 1, 2.5);
        let mut expected = 2.5_f32;
        let mut ticks = 0;
        while !state.bolts().is_empty() {
            state.step(&mut field, &tuning, 1.0, &mut rng);
            expected *= 0.85;
            ticks += 1;
            if let Some(bolt) = state.bolts().first() {
                assert!((bolt.intensity - expected).abs() < 1e-5);
            }
            assert!(ticks < 100, "bolt never expired");
        }

        let first_k = (1..).find(|&k| 2.5 * 0.85_f32.powi(k) <= 0.05).unwrap();
        assert_eq!(ticks, first_k);

        // One more tick clears the slot the expired bolt occupied
        state.step(&mut field, &tuning, 1.0, &mut rng);
        assert!(state.segments().iter().all(Segment::is_degenerate));
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut field = dense_field(200);
        let mut state = MatrixState::new(15);
        let mut rng = StdRng::seed_from_u64(7);
        let tuning = eager();

        let mut peak = 0;
        for _ in 0..500 {
            state.step(&mut field, &tuning, 1.0, &mut rng);
            peak = peak.max(state.bolts().len());
            assert!(state.bolts().len() <= 15);
            assert_eq!(state.segments().len(), 15);
        }
        assert_eq!(field.len(), 200);
        assert_eq!(peak, 15, "dense field should saturate the bolt capacity");

        while state.bolts().len() < 15 {
            state.spawn(0, 1, 1.0);
        }
        assert!(!state.spawn(0, 1, 1.0));
        assert_eq!(state.bolts().len(), 15);
    }

    #[test]
    fn test_no_bolt_without_viable_neighbor() {
        // Particles far apart: no pair inside (0.1, 2.0)
        let positions: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32 * 5.0, 0.0, 0.0)).collect();
        let mut field = field_from(&positions);
        let mut state = MatrixState::new(15);
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..50 {
            state.step(&mut field, &eager(), 1.0, &mut rng);
        }
        assert!(state.bolts().is_empty());
        assert!(state.segments().iter().all(Segment::is_degenerate));
    }
}
