//! The assistant conversation.
//!
//! A [`ChatSession`] owns the ordered message log and the collaborators. Each
//! [`send`](ChatSession::send) appends the user's message, routes it and, for
//! asset requests, appends a pending reply that is rewritten in place once the
//! asset resolves. The log is otherwise append-only.

use std::fmt;

use crate::config::AssistantConfig;
use crate::error::GenerationError;

use super::fallback::FallbackChain;
use super::generator::{AssetGenerator, MockFallbackGenerator, MockPrimaryGenerator};
use super::router::{Action, CommandRouter, MockRouter, RouteContext, Tool};

pub const GENERATING_IMAGE: &str = "Generating image...";
pub const TRYING_FALLBACK: &str = "Primary service failed. Trying fallback...";
pub const ALL_SERVICES_FAILED: &str = "All image generation services failed.";
pub const EDITING_IMAGE: &str = "Editing image...";
pub const GENERATING_VIDEO: &str = "Generating video, this may take a moment...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

/// Renderable payload of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    EnhancedPrompt(String),
    /// Placeholder while an asset request is outstanding.
    Pending(String),
    /// Progress note that replaces a pending placeholder.
    Notice(String),
    Image { url: String, alt: String },
    Video { url: String },
    Error(String),
    Welcome { creator_name: String },
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageBody::Text(text) => f.write_str(text),
            MessageBody::EnhancedPrompt(prompt) => {
                write!(f, "Here's an enhanced prompt:\n{prompt}")
            }
            MessageBody::Pending(text) => write!(f, "... {text}"),
            MessageBody::Notice(text) => f.write_str(text),
            MessageBody::Image { url, alt } => write!(f, "[image: {alt}] {url}"),
            MessageBody::Video { url } => write!(f, "[video] {url}"),
            MessageBody::Error(text) => write!(f, "error: {text}"),
            MessageBody::Welcome { creator_name } => {
                writeln!(f, "Welcome to your AI Assistant, {creator_name}!")?;
                writeln!(
                    f,
                    "I'm here to help you supercharge your creative process. Here's what I can do:"
                )?;
                writeln!(f, "  - Generate Images: Create logos, thumbnails, and more from a text prompt.")?;
                writeln!(f, "  - Edit Images: Make changes to images I've just created.")?;
                writeln!(f, "  - Generate Videos: Create short video clips from a description.")?;
                writeln!(f, "  - Animate Photos: Turn a series of generated images into a video.")?;
                write!(
                    f,
                    "Try asking me to \"create a logo for a synthwave gaming channel\"!"
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub author: Author,
    pub body: MessageBody,
    /// Set on messages that carry a generated image.
    pub image_url: Option<String>,
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.author {
            Author::User => "you",
            Author::Assistant => "assistant",
        };
        write!(f, "{who}> {}", self.body)
    }
}

/// Called with every message as it is appended or rewritten.
pub type TranscriptListener = Box<dyn Fn(&ChatMessage) + Send + Sync>;

/// Conversation state plus the services that answer it.
pub struct ChatSession<R = MockRouter, P = MockPrimaryGenerator, F = MockFallbackGenerator> {
    router: R,
    generators: FallbackChain<P, F>,
    messages: Vec<ChatMessage>,
    active_tool: Tool,
    next_id: u64,
    listener: Option<TranscriptListener>,
}

impl ChatSession {
    /// Session backed by the mock router and generators.
    pub fn mock(config: &AssistantConfig) -> Self {
        Self::new(
            MockRouter::new(config.router_delay()),
            FallbackChain::new(
                MockPrimaryGenerator::new(config.clone()),
                MockFallbackGenerator::new(config),
            ),
        )
    }
}

impl<R, P, F> ChatSession<R, P, F>
where
    R: CommandRouter,
    P: AssetGenerator,
    F: AssetGenerator,
{
    pub fn new(router: R, generators: FallbackChain<P, F>) -> Self {
        Self {
            router,
            generators,
            messages: Vec::new(),
            active_tool: Tool::default(),
            next_id: 1,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: impl Fn(&ChatMessage) + Send + Sync + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        tracing::debug!(tool = tool.label(), "tool selected");
        self.active_tool = tool;
    }

    /// Greet a creator who just finished onboarding.
    pub fn welcome(&mut self, creator_name: &str) -> &ChatMessage {
        self.push(
            Author::Assistant,
            MessageBody::Welcome {
                creator_name: creator_name.to_string(),
            },
            None,
        )
    }

    /// URL of the most recent message carrying an image.
    pub fn last_image_url(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find_map(|msg| msg.image_url.as_deref())
    }

    /// Up to `count` most recent image URLs, oldest first.
    pub fn recent_image_urls(&self, count: usize) -> Vec<String> {
        let mut urls: Vec<String> = self
            .messages
            .iter()
            .rev()
            .filter_map(|msg| msg.image_url.clone())
            .take(count)
            .collect();
        urls.reverse();
        urls
    }

    /// Handle one user message. Returns the final state of the last message
    /// in the log, or `None` when `text` is blank and nothing happened.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let ctx = RouteContext {
            last_image_url: self.last_image_url().map(str::to_owned),
        };
        self.push(Author::User, MessageBody::Text(text.to_string()), None);

        let action = self.router.route(text, self.active_tool, &ctx).await;
        match action {
            Action::Chat(reply) => {
                self.reply(MessageBody::Text(reply));
            }
            Action::EnhancePrompt(prompt) => {
                self.reply(MessageBody::EnhancedPrompt(prompt));
            }
            Action::GenerateImage(prompt) => self.generate_image(prompt).await,
            Action::EditImage { prompt, image_url } => {
                self.reply(MessageBody::Pending(EDITING_IMAGE.to_string()));
                let edited = self.generators.primary().edit_image(&image_url, &prompt).await;
                match edited {
                    Ok(url) => self.show_image(url, prompt),
                    Err(err) => self.fail(err.to_string()),
                }
            }
            Action::GenerateVideo(prompt) => {
                self.reply(MessageBody::Pending(GENERATING_VIDEO.to_string()));
                let video = self.generators.primary().generate_video(&prompt).await;
                match video {
                    Ok(url) => self.update_last(MessageBody::Video { url }, None),
                    Err(err) => self.fail(err.to_string()),
                }
            }
            Action::GenerateVideoFromImages { count } => {
                self.generate_video_from_images(count).await
            }
            Action::Error(message) => {
                self.reply(MessageBody::Error(message));
            }
        }

        self.messages.last()
    }

    async fn generate_image(&mut self, prompt: String) {
        let pending = self
            .reply(MessageBody::Pending(GENERATING_IMAGE.to_string()))
            .clone();

        let outcome = {
            let listener = &self.listener;
            let notice = ChatMessage {
                body: MessageBody::Notice(TRYING_FALLBACK.to_string()),
                ..pending
            };
            let on_fallback: &(dyn Fn(&GenerationError) + Send + Sync) = &move |_| {
                if let Some(listener) = listener {
                    listener(&notice);
                }
            };
            self.generators
                .generate_image_observed(&prompt, Some(on_fallback))
                .await
        };

        match outcome {
            Ok(asset) => self.show_image(asset.url, prompt),
            Err(err) => {
                tracing::error!(error = %err, "image request exhausted");
                self.fail(ALL_SERVICES_FAILED.to_string());
            }
        }
    }

    async fn generate_video_from_images(&mut self, count: usize) {
        let urls = self.recent_image_urls(count);
        if urls.len() < count {
            self.reply(MessageBody::Error(format!(
                "Could not find {count} recent images to use. Please generate more first."
            )));
            return;
        }

        self.reply(MessageBody::Pending(format!(
            "Animating {count} images into a video..."
        )));
        let video = self.generators.primary().generate_video_from_images(&urls).await;
        match video {
            Ok(url) => self.update_last(MessageBody::Video { url }, None),
            Err(err) => self.fail(err.to_string()),
        }
    }

    fn reply(&mut self, body: MessageBody) -> &ChatMessage {
        self.push(Author::Assistant, body, None)
    }

    fn show_image(&mut self, url: String, alt: String) {
        self.update_last(
            MessageBody::Image {
                url: url.clone(),
                alt,
            },
            Some(url),
        );
    }

    fn fail(&mut self, message: String) {
        self.update_last(MessageBody::Error(message), None);
    }

    fn push(&mut self, author: Author, body: MessageBody, image_url: Option<String>) -> &ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            author,
            body,
            image_url,
        };
        self.next_id += 1;
        self.notify(&message);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Rewrite the newest message. An existing image URL is kept unless a
    /// new one is given.
    fn update_last(&mut self, body: MessageBody, image_url: Option<String>) {
        let Some(last) = self.messages.last_mut() else {
            return;
        };
        last.body = body;
        if image_url.is_some() {
            last.image_url = image_url;
        }
        if let Some(listener) = &self.listener {
            if let Some(last) = self.messages.last() {
                listener(last);
            }
        }
    }

    fn notify(&self, message: &ChatMessage) {
        if let Some(listener) = &self.listener {
            listener(message);
        }
    }
}

impl<R: fmt::Debug, P: fmt::Debug, F: fmt::Debug> fmt::Debug for ChatSession<R, P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("router", &self.router)
            .field("generators", &self.generators)
            .field("messages", &self.messages.len())
            .field("active_tool", &self.active_tool)
            .finish_non_exhaustive()
    }
}
