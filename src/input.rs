//! Pointer input for the backdrop.
//!
//! Event handlers never touch the simulation directly. They write into a
//! [`PointerState`], and once per tick the loop takes a [`PointerSample`]
//! and passes it to [`crate::Backdrop::step`]:
//!
//! ```ignore
//! // window event handler
//! pointer.handle_event(&event);
//!
//! // redraw
//! let sample = pointer.take_sample();
//! backdrop.step(&settings, &sample);
//! ```
//!
//! Moves coalesce: only the last position before a tick is seen. Presses are
//! queued so every click or touch-start produces its own flash.

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

use crate::camera::Camera;

/// Live pointer state, fed by window events.
#[derive(Debug, Clone)]
pub struct PointerState {
    ndc: Vec2,
    presses: Vec<Vec2>,
    window_size: (u32, u32),
}

impl PointerState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ndc: Vec2::ZERO,
            presses: Vec::new(),
            window_size: (width, height),
        }
    }

    /// Latest pointer position in normalized device coordinates.
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Number of presses waiting for the next tick.
    pub fn pending_presses(&self) -> usize {
        self.presses.len()
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Move the pointer to a screen position in pixels.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let (w, h) = self.window_size;
        self.ndc = screen_to_ndc(x, y, w, h);
    }

    /// Register a press (mouse down or touch start) at a screen position.
    pub fn press_at(&mut self, x: f64, y: f64) {
        self.move_to(x, y);
        self.presses.push(self.ndc);
    }

    /// Snapshot the state for one tick and clear the queued presses.
    pub fn take_sample(&mut self) -> PointerSample {
        PointerSample {
            ndc: self.ndc,
            presses: std::mem::take(&mut self.presses),
        }
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(position.x, position.y);
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.presses.push(self.ndc);
            }

            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => self.press_at(touch.location.x, touch.location.y),
                TouchPhase::Moved => self.move_to(touch.location.x, touch.location.y),
                TouchPhase::Ended | TouchPhase::Cancelled => {}
            },

            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }

            _ => {}
        }
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Pointer input as seen by a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerSample {
    /// Pointer position in NDC. X increases to the right, Y increases upward.
    pub ndc: Vec2,
    /// Press positions in NDC, oldest first.
    pub presses: Vec<Vec2>,
}

impl PointerSample {
    /// A sample with the pointer resting at `ndc` and no presses.
    pub fn at(ndc: Vec2) -> Self {
        Self {
            ndc,
            presses: Vec::new(),
        }
    }
}

/// Convert a screen position in pixels to normalized device coordinates.
///
/// Origin is at center of window, Y flipped so up is positive. A zero-sized
/// window maps everything to the origin.
pub fn screen_to_ndc(x: f64, y: f64, width: u32, height: u32) -> Vec2 {
    if width == 0 || height == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (x as f32 / width as f32) * 2.0 - 1.0,
        1.0 - (y as f32 / height as f32) * 2.0,
    )
}

/// Rotation target for the cloud as (pitch, yaw) in radians.
///
/// Moving the pointer up tilts the cloud toward the viewer, moving it right turns it left.
pub fn rotation_target(ndc: Vec2, sensitivity: f32) -> Vec2 {
    Vec2::new(ndc.y * sensitivity, -ndc.x * sensitivity)
}

/// World position on the field's depth plane under the pointer.
pub fn flash_origin(camera: &Camera, ndc: Vec2) -> Option<Vec3> {
    camera.ray_to_plane_z(ndc, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_to_ndc() {
        let center = screen_to_ndc(400.0, 300.0, 800, 600);
        assert!(center.length() < 1e-6);

        let top_left = screen_to_ndc(0.0, 0.0, 800, 600);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = screen_to_ndc(800.0, 600.0, 800, 600);
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));

        assert_eq!(screen_to_ndc(10.0, 10.0, 0, 600), Vec2::ZERO);
    }

    #[test]
    fn test_moves_coalesce_to_latest() {
        let mut pointer = PointerState::new(800, 600);
        pointer.move_to(0.0, 0.0);
        pointer.move_to(200.0, 150.0);
        pointer.move_to(800.0, 300.0);

        let sample = pointer.take_sample();
        assert_eq!(sample.ndc, Vec2::new(1.0, 0.0));
        assert!(sample.presses.is_empty());
    }

    #[test]
    fn test_presses_are_consumed_by_sample() {
        let mut pointer = PointerState::new(800, 600);
        pointer.press_at(400.0, 300.0);
        pointer.press_at(0.0, 0.0);
        assert_eq!(pointer.pending_presses(), 2);

        let sample = pointer.take_sample();
        assert_eq!(sample.presses.len(), 2);
        assert_eq!(sample.presses[1], Vec2::new(-1.0, 1.0));

        // Position survives, presses do not
        let next = pointer.take_sample();
        assert_eq!(next.ndc, Vec2::new(-1.0, 1.0));
        assert!(next.presses.is_empty());
    }

    #[test]
    fn test_rotation_target() {
        let target = rotation_target(Vec2::new(1.0, -0.5), 0.15);
        assert!((target.x - -0.075).abs() < 1e-6);
        assert!((target.y - -0.15).abs() < 1e-6);
    }

    #[test]
    fn test_flash_origin_on_field_plane() {
        let camera = Camera::new(1.0);
        let origin = flash_origin(&camera, Vec2::new(0.25, -0.25)).unwrap();
        assert!(origin.z.abs() < 1e-3);
        assert!(origin.x > 0.0 && origin.y < 0.0);
    }
}
