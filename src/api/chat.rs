use crate::api::{ApiError, ChatRequest, ChatResponse};
use crate::utils::url::endpoint_url;

/// Send one non-streaming completion request and return the answer text.
pub async fn send_completion(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    request: &ChatRequest,
) -> Result<String, ApiError> {
    let completions_url = endpoint_url(base_url, "chat/completions");
    let response = client
        .post(completions_url)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .json(request)
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

    let parsed = response
        .json::<ChatResponse>()
        .await
        .map_err(|err| ApiError::MalformedResponse(err.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ApiError::MalformedResponse("response carried no answer".to_string()))
}
