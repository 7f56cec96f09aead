use crate::api::{ApiError, ModelsResponse};
use crate::utils::url::endpoint_url;

/// Fetch the provider's model listing.
pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
) -> Result<ModelsResponse, ApiError> {
    let models_url = endpoint_url(base_url, "models");
    let response = client
        .get(models_url)
        .header("Authorization", format!("Bearer {api_key}"))
        .send()
        .await
        .map_err(ApiError::Network)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::Http { status, body });
    }

    response
        .json::<ModelsResponse>()
        .await
        .map_err(|err| ApiError::MalformedResponse(err.to_string()))
}
