//! One-shot "ask" command

use std::error::Error;
use std::sync::Arc;

use crate::auth;
use crate::core::availability::AvailabilityTracker;
use crate::core::config::Config;
use crate::core::conversation::ConversationStore;
use crate::core::engine::{AskError, RequestEngine};
use crate::core::worker::{AskEvent, AskParams, AskService};
use crate::render::markdown::render_markdown;
use crate::render::transcript::transcript_markdown;

pub async fn run_ask(prompt: Vec<String>, new_conversation: bool) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: gratis ask <prompt>");
        std::process::exit(2);
    }

    let config = Config::load()?;
    let Some(api_key) = auth::resolve_api_key()? else {
        print_credential_help();
        std::process::exit(2);
    };

    let engine = Arc::new(
        RequestEngine::new(
            config.base_url(),
            ConversationStore::default_location(),
            Arc::new(AvailabilityTracker::new()),
        )
        .with_preferred_model(config.model.clone()),
    );

    let (service, mut rx) = AskService::new();
    service.spawn_ask(
        engine,
        AskParams {
            prompt,
            api_key,
            new_conversation,
        },
    );

    match rx.recv().await {
        Some(AskEvent::Completed(outcome)) => {
            let text = if config.full_history() {
                transcript_markdown(&outcome.messages)
            } else {
                outcome.answer
            };
            if config.markdown() {
                println!("{}", render_markdown(&text));
            } else {
                println!("{text}");
            }
            Ok(())
        }
        Some(AskEvent::Failed(err)) => {
            eprintln!("❌ {err}");
            std::process::exit(exit_code(&err));
        }
        None => Err("ask worker exited without a result".into()),
    }
}

fn print_credential_help() {
    eprintln!("❌ No API key configured and {} not set", auth::API_KEY_ENV);
    eprintln!();
    eprintln!("💡 Quick fixes:");
    eprintln!("  • gratis auth                       # Store a key in the keyring");
    eprintln!("  • export OPENROUTER_API_KEY=sk-...  # Use an environment variable");
}

fn exit_code(err: &AskError) -> i32 {
    match err {
        AskError::EmptyPrompt | AskError::MissingCredential => 2,
        _ => 1,
    }
}
