use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT},
    Client, Proxy, StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    constants::{CLIENT_MARKER, NO_ALLOCATION_SENTINEL, REQUEST_TIMEOUT},
    signer::SignedAttestation,
};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CheckRequest<'a> {
    signature: &'a str,
    public_key: &'a str,
    token: &'a str,
    auth_token: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    data: Option<f64>,
    error: Option<String>,
}

/// Classified API answer. HTTP-level rejections land here as well, so the
/// retry wrapper only ever sees transport failures as `Err`.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult {
    pub eligible: bool,
    pub amount: f64,
    pub error: Option<String>,
}

impl CheckResult {
    fn ineligible(error: String) -> Self {
        Self {
            eligible: false,
            amount: 0.0,
            error: Some(error),
        }
    }
}

/// Submits a signed attestation to the eligibility endpoint. A provided proxy
/// carries all traffic with no direct fallback. Network errors, timeouts and
/// client construction failures return `Err` and are retryable; any received
/// HTTP response is classified into a `CheckResult`.
pub async fn check_eligibility(
    attestation: &SignedAttestation,
    proxy: Option<&str>,
    config: &Config,
) -> eyre::Result<CheckResult> {
    let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
    if let Some(proxy_url) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }
    let client = builder.build()?;

    let body = CheckRequest {
        signature: &attestation.signature,
        public_key: &attestation.public_key,
        token: &config.signature_token,
        auth_token: "",
    };

    let response = client
        .post(&config.api_endpoint)
        .headers(get_headers(config)?)
        .json(&body)
        .send()
        .await
        .inspect_err(|e| tracing::debug!("Eligibility request failed: {e}"))?;

    let status = response.status();
    let text = response.text().await?;

    classify_response(status, &text)
}

/// Pure classification of a received response.
pub fn classify_response(status: StatusCode, body: &str) -> eyre::Result<CheckResult> {
    if status.is_success() {
        let parsed: ApiResponse = serde_json::from_str(body)
            .map_err(|e| eyre::eyre!("unreadable response body: {e}"))?;

        if parsed.success {
            return Ok(CheckResult {
                eligible: true,
                amount: parsed.data.unwrap_or(0.0),
                error: None,
            });
        }

        return Ok(CheckResult::ineligible(
            parsed.error.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    // Error statuses still carry a JSON body most of the time.
    let parsed: ApiResponse = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::BAD_REQUEST && parsed.error.as_deref() == Some(NO_ALLOCATION_SENTINEL)
    {
        return Ok(CheckResult::ineligible(NO_ALLOCATION_SENTINEL.to_string()));
    }

    Ok(CheckResult::ineligible(
        parsed
            .error
            .unwrap_or_else(|| format!("HTTP error {}", status.as_u16())),
    ))
}

fn get_headers(config: &Config) -> eyre::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
    headers.insert(
        HeaderName::from_static("x-client"),
        HeaderValue::from_static(CLIENT_MARKER),
    );

    Ok(headers)
}
