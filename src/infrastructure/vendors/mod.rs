pub mod elevenlabs;
pub mod gemini;
pub mod resend;

use std::time::Duration;

use crate::errors::AppError;

const VENDOR_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(VENDOR_TIMEOUT)
        .build()
        .map_err(|e| AppError::InternalError(format!("HTTP client error: {}", e)))
}

/// Turns a non-success vendor response into a gateway error, logging the body.
pub(crate) async fn upstream_failure(vendor: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(vendor, %status, body = %truncate(&body, 512), "Vendor request rejected");
    AppError::Upstream(format!("{} request failed", vendor))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
