//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and executes the appropriate
//! commands.

pub mod ask;
pub mod history;
pub mod model_list;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::auth;
use crate::cli::ask::run_ask;
use crate::cli::history::{run_history, run_reset};
use crate::cli::model_list::list_models;
use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "gratis", version)]
#[command(about = "Chat with free OpenRouter models from the command line")]
#[command(
    long_about = "Gratis sends prompts to OpenRouter, picking a free model for you \
and quietly rotating to another one when a model is rate-limited, paywalled, or gone. \
Conversations persist between invocations: `ask` starts fresh, `ask -c` continues \
where you left off.\n\n\
Authentication:\n\
  Use 'gratis auth' to store an API key securely in your system keyring, or set \
the OPENROUTER_API_KEY environment variable.\n\n\
Configuration (gratis set <key> <value>):\n\
  base-url          API root (default: https://openrouter.ai/api/v1)\n\
  model             Always start conversations on this model\n\
  full-history      Print the whole conversation after each answer (default: on)\n\
  markdown          Format answers for the terminal (default: on)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt; a free model is picked automatically
    Ask {
        /// Continue the stored conversation instead of starting a new one
        #[arg(short = 'c', long = "continue")]
        continue_conversation: bool,

        /// The prompt to send
        #[arg(trailing_var_arg = true, required = true)]
        prompt: Vec<String>,
    },
    /// Print the stored conversation
    History,
    /// Delete the stored conversation
    Reset,
    /// List available models, cheapest first
    Models {
        /// Include paid, deprecated, and provider-less models
        #[arg(long)]
        all: bool,
    },
    /// Store an OpenRouter API key in the system keyring
    Auth,
    /// Remove the stored API key
    Deauth,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Unset a configuration value
    Unset { key: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Commands::Ask {
            continue_conversation,
            prompt,
        } => run_ask(prompt, !continue_conversation).await,
        Commands::History => run_history(),
        Commands::Reset => run_reset(),
        Commands::Models { all } => list_models(all).await,
        Commands::Auth => auth::run_auth(),
        Commands::Deauth => auth::run_deauth(),
        Commands::Set { key, value } => set_config(&key, &value),
        Commands::Unset { key } => unset_config(&key),
    }
}

fn set_config(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("Set {key}.");
    Ok(())
}

fn unset_config(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    config.unset(key)?;
    config.save()?;
    println!("Unset {key}.");
    Ok(())
}
