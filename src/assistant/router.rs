//! Command routing: free text plus the selected tool in, exactly one action out.
//!
//! The decision is a pure function, [`classify`]. [`MockRouter`] wraps it in
//! the same fixed delay the dashboard's mock service used.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// The assistant's active tool selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Chat,
    PromptEnhancer,
    ImageEditor,
    VideoGeneration,
    PhotoToVideo,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Chat,
        Tool::PromptEnhancer,
        Tool::ImageEditor,
        Tool::VideoGeneration,
        Tool::PhotoToVideo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Chat => "Chat",
            Tool::PromptEnhancer => "Prompt Enhancer",
            Tool::ImageEditor => "Image Editor",
            Tool::VideoGeneration => "Video Generation",
            Tool::PhotoToVideo => "Photo to Video",
        }
    }

    /// Look a tool up by its label, ignoring case.
    pub fn from_label(label: &str) -> Option<Tool> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the router knows about the conversation so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteContext {
    /// URL of the most recent image the assistant produced.
    pub last_image_url: Option<String>,
}

/// The single action a message resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Plain reply text.
    Chat(String),
    /// The input rewritten as a richer generation prompt.
    EnhancePrompt(String),
    GenerateImage(String),
    EditImage { prompt: String, image_url: String },
    GenerateVideo(String),
    /// Animate the `count` most recent generated images.
    GenerateVideoFromImages { count: usize },
    /// Input could not be acted on; the message is shown to the user as-is.
    Error(String),
}

/// [`Action`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Chat,
    EnhancePrompt,
    GenerateImage,
    EditImage,
    GenerateVideo,
    GenerateVideoFromImages,
    Error,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Chat(_) => ActionKind::Chat,
            Action::EnhancePrompt(_) => ActionKind::EnhancePrompt,
            Action::GenerateImage(_) => ActionKind::GenerateImage,
            Action::EditImage { .. } => ActionKind::EditImage,
            Action::GenerateVideo(_) => ActionKind::GenerateVideo,
            Action::GenerateVideoFromImages { .. } => ActionKind::GenerateVideoFromImages,
            Action::Error(_) => ActionKind::Error,
        }
    }
}

pub const EDIT_WITHOUT_IMAGE: &str = "Please generate an image before trying to edit it.";
pub const MISSING_IMAGE_COUNT: &str =
    "Please specify the number of recent images to use (e.g., 'create a video from the last 3 images').";

/// Wrap a prompt in the cinematic quality template.
pub fn enhance_prompt(prompt: &str) -> String {
    format!(
        "cinematic, high detail, 8k, photorealistic, professional color grading, sharp focus, of a {prompt}"
    )
}

/// First run of ASCII digits in `text`, parsed.
///
/// Runs too long for `usize` count as absent.
pub fn first_integer(text: &str) -> Option<usize> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Decide the action for `text` under `tool`.
///
/// Deterministic: the same inputs always give the same action.
pub fn classify(text: &str, tool: Tool, ctx: &RouteContext) -> Action {
    match tool {
        Tool::PromptEnhancer => Action::EnhancePrompt(enhance_prompt(text)),

        Tool::ImageEditor => match &ctx.last_image_url {
            Some(url) => Action::EditImage {
                prompt: text.to_string(),
                image_url: url.clone(),
            },
            None => Action::Error(EDIT_WITHOUT_IMAGE.to_string()),
        },

        Tool::VideoGeneration => Action::GenerateVideo(text.to_string()),

        Tool::PhotoToVideo => match first_integer(text) {
            Some(count) if count > 0 => Action::GenerateVideoFromImages { count },
            _ => Action::Error(MISSING_IMAGE_COUNT.to_string()),
        },

        Tool::Chat => {
            let lower = text.to_lowercase();
            if ["image", "logo", "photo"].iter().any(|cue| lower.contains(cue)) {
                Action::GenerateImage(text.to_string())
            } else if lower.contains("video") {
                Action::GenerateVideo(text.to_string())
            } else {
                Action::Chat(format!(
                    "This is a mock AI response to your message: \"{text}\". In a real app, I would provide a helpful answer."
                ))
            }
        }
    }
}

/// Asynchronous command classification. Always resolves to an action.
#[async_trait]
pub trait CommandRouter: Send + Sync {
    async fn route(&self, text: &str, tool: Tool, ctx: &RouteContext) -> Action;
}

/// [`classify`] behind a fixed artificial delay.
#[derive(Debug, Clone, Default)]
pub struct MockRouter {
    delay: Duration,
}

impl MockRouter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CommandRouter for MockRouter {
    async fn route(&self, text: &str, tool: Tool, ctx: &RouteContext) -> Action {
        tracing::debug!(tool = tool.label(), text, "routing command");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let action = classify(text, tool, ctx);
        tracing::debug!(kind = ?action.kind(), "routed");
        action
    }
}
