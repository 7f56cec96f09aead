//! Free-model selection against the provider's catalog.

use rand::seq::SliceRandom;
use std::error::Error as StdError;
use std::fmt;

use crate::api::models::fetch_models;
use crate::api::{ApiError, ModelInfo};
use crate::core::availability::AvailabilityTracker;

#[derive(Debug)]
pub enum CatalogError {
    /// The model listing could not be fetched or decoded.
    Api(ApiError),

    /// The filter left no candidate: every free model is either ineligible
    /// or cooling down. Reportable, not retryable.
    NoEligibleModel,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Api(source) => write!(f, "{source}"),
            CatalogError::NoEligibleModel => {
                write!(f, "No free model is currently available")
            }
        }
    }
}

impl StdError for CatalogError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CatalogError::Api(source) => Some(source),
            CatalogError::NoEligibleModel => None,
        }
    }
}

/// Whether a descriptor is selectable at all: zero prompt and completion
/// price, not deprecated, a live provider, and a known context length.
pub fn is_free_candidate(model: &ModelInfo) -> bool {
    model.pricing.is_free()
        && !model.deprecated
        && model.has_provider()
        && model.context_length.is_some()
}

/// Filter a catalog down to the ids eligible for selection right now.
pub fn free_candidates(models: &[ModelInfo], tracker: &AvailabilityTracker) -> Vec<String> {
    models
        .iter()
        .filter(|model| is_free_candidate(model) && !tracker.is_excluded(&model.id))
        .map(|model| model.id.clone())
        .collect()
}

/// Produces one eligible free model identifier per call. The fetch is
/// per-call and side-effect-free so the candidate set never goes stale
/// against the tracker's evolving exclusions.
pub struct ModelCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl ModelCatalog {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// One network read of the provider's model listing.
    pub async fn fetch(&self, api_key: &str) -> Result<Vec<ModelInfo>, CatalogError> {
        fetch_models(&self.client, &self.base_url, api_key)
            .await
            .map(|listing| listing.data)
            .map_err(CatalogError::Api)
    }

    /// Pick one eligible free model uniformly at random. Uniformity spreads
    /// load across providers.
    pub async fn select_random_free_model(
        &self,
        api_key: &str,
        tracker: &AvailabilityTracker,
    ) -> Result<String, CatalogError> {
        tracker.prune();
        let models = self.fetch(api_key).await?;
        let candidates = free_candidates(&models, tracker);
        let chosen = candidates
            .choose(&mut rand::thread_rng())
            .ok_or(CatalogError::NoEligibleModel)?;
        tracing::debug!(
            model = chosen.as_str(),
            candidates = candidates.len(),
            "selected free model"
        );
        Ok(chosen.clone())
    }
}
