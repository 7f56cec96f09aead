//! The ask state machine: model resolution, retry rotation across free
//! models, and commit-on-success conversation persistence.

use chrono::Utc;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::chat::send_completion;
use crate::api::{ApiError, ChatRequest};
use crate::core::availability::{AvailabilityTracker, FailureKind};
use crate::core::catalog::{CatalogError, ModelCatalog};
use crate::core::constants::{MAX_ATTEMPTS, RETRY_PAUSE};
use crate::core::conversation::{Conversation, ConversationStore, Message, StoreError};

/// Statuses that signal a model-specific problem worth rotating away from,
/// rather than a request-specific one.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 402 | 404 | 429)
}

/// Terminal failure of one ask.
#[derive(Debug)]
pub enum AskError {
    /// The prompt was blank. Nothing was sent or stored.
    EmptyPrompt,

    /// No API key was supplied. Nothing was sent or stored.
    MissingCredential,

    /// The catalog has no selectable free model, before any completion
    /// request was attempted.
    NoModelAvailable,

    /// Transport-level failure. Never retried by model rotation.
    Network(reqwest::Error),

    /// Non-retryable HTTP failure, preserved verbatim for display.
    Http { status: u16, body: String },

    /// A 2xx response without a usable answer.
    MalformedResponse(String),

    /// Every attempt was consumed without an answer. The stored
    /// conversation is exactly as it was before the call.
    RetryExhausted,

    /// The cancellation token fired between attempts.
    Cancelled,

    /// The conversation slot could not be read or written.
    Store(StoreError),
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AskError::EmptyPrompt => write!(f, "The prompt is empty"),
            AskError::MissingCredential => write!(f, "No API key is configured"),
            AskError::NoModelAvailable => {
                write!(f, "No free model is currently available")
            }
            AskError::Network(source) => write!(f, "Network error: {source}"),
            AskError::Http { status, body } => write!(f, "HTTP error {status}: {body}"),
            AskError::MalformedResponse(detail) => {
                write!(f, "Unexpected API response: {detail}")
            }
            AskError::RetryExhausted => {
                write!(f, "All free models are currently unavailable. Please try again later.")
            }
            AskError::Cancelled => write!(f, "The request was cancelled"),
            AskError::Store(source) => write!(f, "{source}"),
        }
    }
}

impl StdError for AskError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AskError::Network(source) => Some(source),
            AskError::Store(source) => Some(source),
            _ => None,
        }
    }
}

impl From<ApiError> for AskError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(source) => AskError::Network(source),
            ApiError::Http { status, body } => AskError::Http { status, body },
            ApiError::MalformedResponse(detail) => AskError::MalformedResponse(detail),
        }
    }
}

impl From<StoreError> for AskError {
    fn from(err: StoreError) -> Self {
        AskError::Store(err)
    }
}

/// Successful result of one ask.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    /// The assistant's answer text.
    pub answer: String,

    /// The model that produced the answer, now pinned to the conversation.
    pub model: String,

    /// The full updated message sequence, for full-history rendering.
    pub messages: Vec<Message>,
}

/// Performs one ask end to end: resolve the conversation and model, send,
/// rotate across retryable failures, and commit the updated conversation
/// only on success.
pub struct RequestEngine {
    client: reqwest::Client,
    base_url: String,
    catalog: ModelCatalog,
    tracker: Arc<AvailabilityTracker>,
    store: ConversationStore,
    /// One ask at a time per slot: load/mutate/save is a read-modify-write
    /// on the persisted file.
    slot: tokio::sync::Mutex<()>,
    preferred_model: Option<String>,
    retry_pause: Duration,
    cancel: CancellationToken,
}

impl RequestEngine {
    pub fn new(
        base_url: impl Into<String>,
        store: ConversationStore,
        tracker: Arc<AvailabilityTracker>,
    ) -> Self {
        let client = reqwest::Client::new();
        let base_url = base_url.into();
        Self {
            catalog: ModelCatalog::new(client.clone(), base_url.clone()),
            client,
            base_url,
            tracker,
            store,
            slot: tokio::sync::Mutex::new(()),
            preferred_model: None,
            retry_pause: RETRY_PAUSE,
            cancel: CancellationToken::new(),
        }
    }

    /// Start new conversations on this model instead of a random free one.
    pub fn with_preferred_model(mut self, model: Option<String>) -> Self {
        self.preferred_model = model;
        self
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Token checked between attempts; cancelling it makes an in-flight ask
    /// finish with [`AskError::Cancelled`] instead of resending.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn ask(
        &self,
        prompt: &str,
        api_key: &str,
        new_conversation: bool,
    ) -> Result<AskOutcome, AskError> {
        if prompt.trim().is_empty() {
            return Err(AskError::EmptyPrompt);
        }
        if api_key.trim().is_empty() {
            return Err(AskError::MissingCredential);
        }

        let _slot = self.slot.lock().await;

        if new_conversation {
            self.store.reset()?;
        }
        let mut conversation = self.store.load_or_default()?;

        let mut model = match conversation
            .model
            .clone()
            .or_else(|| self.preferred_model.clone())
        {
            Some(model) => model,
            None => self.select_model(api_key).await?,
        };

        // Working copy only; the store is untouched until success.
        conversation.messages.push(Message::user(prompt));

        for attempt in 1..=MAX_ATTEMPTS {
            if self.cancel.is_cancelled() {
                return Err(AskError::Cancelled);
            }

            let request = ChatRequest {
                model: model.clone(),
                messages: conversation.api_messages(),
            };
            match send_completion(&self.client, &self.base_url, api_key, &request).await {
                Ok(answer) => {
                    return self.commit(conversation, model, answer);
                }
                Err(ApiError::Http { status, body: _ }) if is_retryable_status(status) => {
                    tracing::warn!(
                        model = model.as_str(),
                        status,
                        attempt,
                        "model rejected the request, rotating"
                    );
                    self.tracker
                        .mark_unavailable(&model, FailureKind::from_status(status));
                    if attempt == MAX_ATTEMPTS {
                        break;
                    }
                    model = match self
                        .catalog
                        .select_random_free_model(api_key, &self.tracker)
                        .await
                    {
                        Ok(next) => next,
                        // Rotation ran the catalog dry mid-retry; stop
                        // immediately rather than retrying selection.
                        Err(CatalogError::NoEligibleModel) => return Err(AskError::RetryExhausted),
                        Err(CatalogError::Api(err)) => return Err(err.into()),
                    };
                    tokio::time::sleep(self.retry_pause).await;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AskError::RetryExhausted)
    }

    fn commit(
        &self,
        mut conversation: Conversation,
        model: String,
        answer: String,
    ) -> Result<AskOutcome, AskError> {
        conversation.messages.push(Message::assistant(&answer));
        // A successful reselection repins the conversation.
        conversation.model = Some(model.clone());
        conversation.saved_at = Some(Utc::now());
        self.store.save(&conversation)?;
        tracing::debug!(
            model = model.as_str(),
            turns = conversation.messages.len(),
            "conversation committed"
        );
        Ok(AskOutcome {
            answer,
            model,
            messages: conversation.messages,
        })
    }

    async fn select_model(&self, api_key: &str) -> Result<String, AskError> {
        match self
            .catalog
            .select_random_free_model(api_key, &self.tracker)
            .await
        {
            Ok(model) => Ok(model),
            Err(CatalogError::NoEligibleModel) => Err(AskError::NoModelAvailable),
            Err(CatalogError::Api(err)) => Err(err.into()),
        }
    }
}
