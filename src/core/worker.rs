//! Background dispatch of asks onto the runtime.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::core::engine::{AskError, AskOutcome, RequestEngine};

/// Parameters for one dispatched ask.
pub struct AskParams {
    pub prompt: String,
    pub api_key: String,
    pub new_conversation: bool,
}

/// Terminal outcome of a dispatched ask, delivered on the service channel.
#[derive(Debug)]
pub enum AskEvent {
    Completed(AskOutcome),
    Failed(AskError),
}

/// Runs asks on spawned tasks so no caller thread ever blocks on a
/// multi-second HTTP round trip; callers await the channel instead.
#[derive(Clone)]
pub struct AskService {
    tx: mpsc::UnboundedSender<AskEvent>,
}

impl AskService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_ask(&self, engine: Arc<RequestEngine>, params: AskParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let AskParams {
                prompt,
                api_key,
                new_conversation,
            } = params;

            let event = match engine.ask(&prompt, &api_key, new_conversation).await {
                Ok(outcome) => AskEvent::Completed(outcome),
                Err(err) => AskEvent::Failed(err),
            };
            let _ = tx.send(event);
        });
    }
}
