//! Model listing functionality

use std::cmp::Ordering;
use std::error::Error;

use chrono::DateTime;

use crate::api::models::fetch_models;
use crate::api::ModelInfo;
use crate::auth;
use crate::core::catalog::is_free_candidate;
use crate::core::config::Config;

pub async fn list_models(all: bool) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let Some(api_key) = auth::resolve_api_key()? else {
        eprintln!("❌ No API key configured and {} not set", auth::API_KEY_ENV);
        eprintln!("Run 'gratis auth' or export {}.", auth::API_KEY_ENV);
        std::process::exit(2);
    };

    let client = reqwest::Client::new();
    let listing = fetch_models(&client, config.base_url(), &api_key).await?;
    let mut models = listing.data;

    // Cheapest first; ties break on id for a stable listing.
    models.sort_by(|a, b| {
        a.pricing
            .prompt_price()
            .partial_cmp(&b.pricing.prompt_price())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    println!("🤖 Available models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if let Some(default_model) = &config.model {
        println!("🎯 Configured model: {default_model} (from config)");
        println!();
    }

    let mut shown = 0;
    for model in &models {
        if !all && !is_free_candidate(model) {
            continue;
        }
        println!("  {}", describe_model(model));
        shown += 1;
    }

    println!();
    if all {
        println!("Total: {shown} models");
    } else {
        println!("Total: {shown} free models (use --all to include the rest)");
    }
    Ok(())
}

fn describe_model(model: &ModelInfo) -> String {
    let price = model.pricing.prompt_price();
    let price_label = if price == 0.0 {
        "FREE".to_string()
    } else {
        format!("{price}$")
    };

    let mut line = format!("{} ({price_label})", model.id);
    if let Some(context_length) = model.context_length {
        line.push_str(&format!(" — {context_length} ctx"));
    }
    if let Some(created) = model.created {
        if let Some(date) = DateTime::from_timestamp(created, 0) {
            line.push_str(&format!(" — added {}", date.format("%Y-%m-%d")));
        }
    }
    if model.deprecated {
        line.push_str(" [deprecated]");
    }
    line
}
