//! Stored-conversation commands

use std::error::Error;

use crate::core::config::Config;
use crate::core::conversation::ConversationStore;
use crate::render::markdown::render_markdown;
use crate::render::transcript::transcript_markdown;

pub fn run_history() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = ConversationStore::default_location();
    let conversation = store.load_or_default()?;

    if conversation.is_empty() {
        println!("No stored conversation.");
        return Ok(());
    }

    let text = transcript_markdown(&conversation.messages);
    if config.markdown() {
        println!("{}", render_markdown(&text));
    } else {
        println!("{text}");
    }
    Ok(())
}

pub fn run_reset() -> Result<(), Box<dyn Error>> {
    let store = ConversationStore::default_location();
    store.reset()?;
    println!("Conversation cleared.");
    Ok(())
}
