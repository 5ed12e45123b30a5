//! Creative assistant command pipeline.
//!
//! Text from the user goes through a [`CommandRouter`], which picks one
//! [`Action`]. Asset actions are served by [`AssetGenerator`]s: image
//! generation through a [`FallbackChain`], everything else straight from the
//! primary. [`ChatSession`] ties it together and keeps the message log.

pub mod fallback;
pub mod generator;
pub mod router;
pub mod session;

pub use fallback::{AssetSource, FallbackChain, ImageAsset};
pub use generator::{AssetGenerator, MockFallbackGenerator, MockPrimaryGenerator};
pub use router::{classify, Action, ActionKind, CommandRouter, MockRouter, RouteContext, Tool};
pub use session::{Author, ChatMessage, ChatSession, MessageBody};
