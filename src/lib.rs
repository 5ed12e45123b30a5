//! # studiofx
//!
//! The interactive pieces of a creator-studio dashboard: an animated particle
//! backdrop and the creative assistant's command pipeline.
//!
//! ## Backdrop
//!
//! A cloud of a few thousand points drifts in front of a perspective camera.
//! It tilts toward the pointer, and one of two effects lights it up:
//!
//! - **Paparazzi**: radial flashes at clicks, plus the occasional ambient
//!   flash, brightening every particle nearby.
//! - **Matrix**: short-lived green bolts between random nearby particle pairs.
//!
//! ```ignore
//! use studiofx::prelude::*;
//!
//! let config = StudioConfig::default();
//! let mut backdrop = Backdrop::seeded(&config, 42);
//! let stats = backdrop.step(&config.effects, &PointerSample::at(Vec2::ZERO));
//! assert_eq!(stats.tick, 1);
//! ```
//!
//! [`Backdrop`] is pure state and never touches the GPU. Presentation goes
//! through the [`RenderHost`] trait; [`BackdropRunner`] pairs the two and
//! releases the host exactly once. [`window::run`] opens a winit window with
//! the wgpu [`GpuHost`](gpu::GpuHost).
//!
//! ## Assistant
//!
//! ```ignore
//! use studiofx::prelude::*;
//!
//! let mut chat = ChatSession::mock(&AssistantConfig::default());
//! chat.set_tool(Tool::PromptEnhancer);
//! let reply = chat.send("neon city at night").await;
//! ```
//!
//! | Tool | Resolves to |
//! |------|-------------|
//! | Chat | image, video or plain reply, by keyword |
//! | Prompt Enhancer | [`Action::EnhancePrompt`] |
//! | Image Editor | [`Action::EditImage`] of the latest image |
//! | Video Generation | [`Action::GenerateVideo`] |
//! | Photo to Video | [`Action::GenerateVideoFromImages`] |
//!
//! Image generation tries the primary service once and the fallback once.

pub mod assistant;
pub mod backdrop;
pub mod camera;
pub mod config;
pub mod effects;
pub mod error;
pub mod field;
pub mod gpu;
pub mod host;
pub mod input;
pub mod time;
pub mod window;

pub use assistant::{Action, ChatMessage, ChatSession, Tool};
pub use backdrop::{Backdrop, BackdropRunner, FrameStats};
pub use camera::Camera;
pub use config::{EffectMode, EffectSettings, StudioConfig};
pub use error::{ConfigError, GenerationError, HostError, RunError};
pub use field::{Particle, ParticleField};
pub use glam::{Vec2, Vec3};
pub use host::{FrameView, RenderHost};
pub use input::{PointerSample, PointerState};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use studiofx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assistant::{
        Action, AssetGenerator, Author, ChatMessage, ChatSession, CommandRouter, FallbackChain,
        MessageBody, Tool,
    };
    pub use crate::backdrop::{Backdrop, BackdropRunner, FrameStats};
    pub use crate::config::{AssistantConfig, EffectMode, EffectSettings, StudioConfig};
    pub use crate::effects::EffectState;
    pub use crate::host::{FrameView, RenderHost};
    pub use crate::input::{PointerSample, PointerState};
    pub use crate::{Vec2, Vec3};
}
