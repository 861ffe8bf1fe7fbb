use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    response::Response,
};
use tracing::info;

use crate::config::ProxyConfig;
use crate::error::ProxyError;

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Headers that describe one hop rather than the message.
const HOP_BY_HOP: [header::HeaderName; 6] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

pub struct ProxyState {
    pub config: ProxyConfig,
    client: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Result<Arc<Self>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .danger_accept_invalid_certs(config.insecure_tls)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Arc::new(Self { config, client }))
    }
}

/// Replace a leading `prefix` of `path` with `rewrite`. The prefix only
/// matches whole segments; the query string is kept.
pub fn rewrite_path(path: &str, prefix: &str, rewrite: &str) -> String {
    let rest = match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
        _ => return path.to_string(),
    };
    let rewritten = format!("{rewrite}{rest}");
    if rewritten.is_empty() || rewritten.starts_with('?') {
        format!("/{rewritten}")
    } else {
        rewritten
    }
}

fn strip_hop_headers(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Forward the request to the upstream and relay its answer.
pub async fn proxy_handler(
    State(state): State<Arc<ProxyState>>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = parts
        .uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| parts.uri.path());
    let upstream_path = rewrite_path(path, &state.config.prefix, &state.config.rewrite);
    info!("[Proxy] {} {} -> {}", parts.method, parts.uri.path(), upstream_path);

    let body = to_bytes(body, MAX_BODY_BYTES).await?;

    // The upstream Host is derived from the target URL.
    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    strip_hop_headers(&mut headers);

    let upstream = state
        .client
        .request(parts.method, format!("{}{}", state.config.target, upstream_path))
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    response_headers.remove(header::CONTENT_LENGTH);
    strip_hop_headers(&mut response_headers);
    let bytes = upstream.bytes().await?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}
