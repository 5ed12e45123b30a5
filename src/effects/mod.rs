//! Visual effects layered on top of the particle field.
//!
//! Exactly one effect is active at a time. [`EffectState`] carries the
//! active effect's transient entities, so switching modes drops the other
//! mode's flashes or bolts instead of leaving them frozen in the background.

pub mod matrix;
pub mod paparazzi;

pub use matrix::{nearest_neighbor, Bolt, MatrixState, Segment};
pub use paparazzi::{Flash, PaparazziState};

use crate::config::EffectMode;

/// State of the active effect.
#[derive(Debug, Clone)]
pub enum EffectState {
    Paparazzi(PaparazziState),
    Matrix(MatrixState),
}

impl EffectState {
    /// Fresh state for `mode`. `bolt_capacity` sizes the matrix segment buffer.
    pub fn for_mode(mode: EffectMode, bolt_capacity: usize) -> Self {
        match mode {
            EffectMode::Paparazzi => EffectState::Paparazzi(PaparazziState::new()),
            EffectMode::Matrix => EffectState::Matrix(MatrixState::new(bolt_capacity)),
        }
    }

    pub fn mode(&self) -> EffectMode {
        match self {
            EffectState::Paparazzi(_) => EffectMode::Paparazzi,
            EffectState::Matrix(_) => EffectMode::Matrix,
        }
    }

    /// Switch to `mode` if it is not already active. Returns `true` on a switch.
    pub fn ensure_mode(&mut self, mode: EffectMode, bolt_capacity: usize) -> bool {
        if self.mode() == mode {
            return false;
        }
        tracing::debug!(from = self.mode().label(), to = mode.label(), "effect mode switched");
        *self = Self::for_mode(mode, bolt_capacity);
        true
    }

    /// Number of live flashes or bolts.
    pub fn live_count(&self) -> usize {
        match self {
            EffectState::Paparazzi(state) => state.flashes().len(),
            EffectState::Matrix(state) => state.bolts().len(),
        }
    }

    /// Segment buffer to draw, if the active mode draws segments.
    pub fn segments(&self) -> Option<&[Segment]> {
        match self {
            EffectState::Paparazzi(_) => None,
            EffectState::Matrix(state) => Some(state.segments()),
        }
    }
}
