//! API key storage and lookup.
//!
//! The key lives in the OS keyring when the user has run `gratis auth`;
//! the `OPENROUTER_API_KEY` environment variable is the fallback.

use keyring::Entry;
use std::error::Error;
use std::io::{self, Write};

const KEYRING_SERVICE: &str = "gratis";
const KEYRING_USER: &str = "openrouter";

/// Environment variable consulted when no key is stored in the keyring.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Resolve the API key: keyring first, environment fallback. `Ok(None)`
/// means no credential is configured anywhere.
pub fn resolve_api_key() -> Result<Option<String>, Box<dyn Error>> {
    if let Some(token) = stored_api_key()? {
        return Ok(Some(token));
    }
    match std::env::var(API_KEY_ENV) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        _ => Ok(None),
    }
}

pub fn stored_api_key() -> Result<Option<String>, Box<dyn Error>> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(Box::new(err)),
    }
}

pub fn store_api_key(token: &str) -> Result<(), Box<dyn Error>> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(token)?;
    Ok(())
}

pub fn remove_api_key() -> Result<(), Box<dyn Error>> {
    let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(Box::new(err)),
    }
}

/// Interactive `auth` flow: prompt on stdin, store into the keyring.
pub fn run_auth() -> Result<(), Box<dyn Error>> {
    println!("🔐 Gratis Authentication Setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    print!("Enter your OpenRouter API key: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let token = input.trim();
    if token.is_empty() {
        return Err("No API key entered.".into());
    }

    store_api_key(token)?;
    println!("✅ API key stored in the system keyring.");
    Ok(())
}

/// Interactive `deauth` flow: remove the stored key.
pub fn run_deauth() -> Result<(), Box<dyn Error>> {
    remove_api_key()?;
    println!("✅ Stored API key removed.");
    println!(
        "Note: {API_KEY_ENV} still takes effect if it is set in your environment."
    );
    Ok(())
}
