//! API client for the HRIS REST backend.
//!
//! Every request carries the session token verbatim in `Authorization`, or
//! the literal `null` before sign-in. The work-block endpoint is the only
//! one that expects the `Bearer ` scheme.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::InitialDataSource;
use crate::models::{
    GetInitialDataRequest, GetInitialDataResponse, Holiday, LeaveInfo, LeaveInfoRequest,
    LoginRequest, LoginResponse, WorkReportRequest, WorkReportResponse,
};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Authorization value sent while signed out.
const ANONYMOUS_AUTHORIZATION: &str = "null";

const SIGN_IN_PATH: &str = "/account/signin";
const INITIAL_DATA_PATH: &str = "/Home/GetInitialData";
const HOLIDAYS_PATH: &str = "/holiday/GetAll";
const LEAVE_INFO_PATH: &str = "/Leave/GetLeaveInfoByYear";
const WORK_BLOCKS_PATH: &str = "/WorkBlock/GetWorkBlocks";

/// API client for the HRIS backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorization(&self) -> &str {
        self.token.as_deref().unwrap_or(ANONYMOUS_AUTHORIZATION)
    }

    fn auth_headers(authorization: &str) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(authorization)
                .context("Session token is not a valid header value")?,
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send the request built by `build`, retrying on 429 with exponential
    /// backoff, and parse the JSON body.
    async fn send<T, F>(&self, url: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> Result<reqwest::RequestBuilder>,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()?
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.send(&url, || {
            Ok(self
                .client
                .get(&url)
                .query(query)
                .headers(Self::auth_headers(self.authorization())?))
        })
        .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        authorization: &str,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        self.send(&url, || {
            Ok(self
                .client
                .post(&url)
                .headers(Self::auth_headers(authorization)?)
                .json(body))
        })
        .await
    }

    // ===== Endpoints =====

    /// Exchange credentials for a session. Does not change this client's
    /// token; callers adopt it through `with_token`.
    pub async fn sign_in(&self, request: &LoginRequest) -> Result<LoginResponse> {
        self.post(SIGN_IN_PATH, request, self.authorization())
            .await
            .context("Sign-in failed")
    }

    pub async fn get_holidays(&self, year: i32) -> Result<Vec<Holiday>> {
        self.get(HOLIDAYS_PATH, &[("year", year.to_string())])
            .await
            .with_context(|| format!("Failed to fetch holidays for {}", year))
    }

    pub async fn get_leave_info_by_year(&self, year: i32, employee_id: &str) -> Result<LeaveInfo> {
        let request = LeaveInfoRequest {
            year,
            id: employee_id.to_string(),
        };
        self.post(LEAVE_INFO_PATH, &request, self.authorization())
            .await
            .with_context(|| format!("Failed to fetch leave info of {} for {}", employee_id, year))
    }

    pub async fn get_work_blocks(&self, request: &WorkReportRequest) -> Result<WorkReportResponse> {
        let authorization = bearer(self.authorization());
        self.post(WORK_BLOCKS_PATH, request, &authorization)
            .await
            .context("Failed to fetch work blocks")
    }
}

impl InitialDataSource for ApiClient {
    async fn get_initial_data(
        &self,
        request: &GetInitialDataRequest,
    ) -> Result<GetInitialDataResponse> {
        self.post(INITIAL_DATA_PATH, request, self.authorization())
            .await
            .context("Failed to fetch initial data")
    }
}

/// `Bearer <token>`, leaving an already prefixed token alone.
fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn auth_of(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("<missing>")
            .to_string()
    }

    /// Echoes the received Authorization header and body back as JSON.
    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        Json(json!({"authorization": auth_of(&headers), "body": body}))
    }

    #[test]
    fn test_bearer_normalization() {
        assert_eq!(bearer("abc"), "Bearer abc");
        assert_eq!(bearer("Bearer abc"), "Bearer abc");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url(SIGN_IN_PATH), "http://localhost:3000/api/account/signin");
    }

    #[tokio::test]
    async fn test_sign_in_sends_null_authorization() {
        async fn sign_in(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(body["rememberMe"], json!(true));
            Json(json!({
                "id": "U1",
                "username": body["username"],
                "fullName": "Tran Thi B",
                "employeeID": "E7",
                "token": format!("issued-for-{}", auth_of(&headers))
            }))
        }
        let base = spawn_backend(Router::new().route("/api/account/signin", post(sign_in))).await;

        let client = ApiClient::new(base).unwrap();
        let response = client
            .sign_in(&LoginRequest {
                username: "b".into(),
                password: "secret".into(),
                remember_me: true,
            })
            .await
            .unwrap();

        assert_eq!(response.employee_id, "E7");
        assert_eq!(response.username, "b");
        assert_eq!(response.token, "issued-for-null");
    }

    #[tokio::test]
    async fn test_initial_data_uses_raw_token() {
        async fn initial_data(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            Json(json!({
                "hashMatched": body["hashValue"] == json!("h1"),
                "hashValue": auth_of(&headers),
            }))
        }
        let base =
            spawn_backend(Router::new().route("/api/Home/GetInitialData", post(initial_data))).await;

        let client = ApiClient::new(base).unwrap().with_token("tok".into());
        let response = client
            .get_initial_data(&GetInitialDataRequest::new(Some("h1".into()), "en-US"))
            .await
            .unwrap();

        assert!(response.hash_matched);
        assert_eq!(response.hash_value, "tok");
        assert!(response.initial_compressed_data.is_none());
    }

    #[tokio::test]
    async fn test_work_blocks_use_bearer_scheme() {
        async fn work_blocks(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            Json(json!({
                "employeeIDs": body["employeeIDs"],
                "wBlocks": [{"id": auth_of(&headers), "assigneeID": "E1", "duration": 2.0}]
            }))
        }
        let base =
            spawn_backend(Router::new().route("/api/WorkBlock/GetWorkBlocks", post(work_blocks)))
                .await;

        let client = ApiClient::new(base).unwrap().with_token("tok".into());
        let response = client
            .get_work_blocks(&WorkReportRequest {
                from_date: "2024-05-01".into(),
                to_date: "2024-05-31".into(),
                employee_ids: vec!["E1".into()],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.employee_ids, vec!["E1"]);
        assert_eq!(response.w_blocks[0].id, "Bearer tok");
    }

    #[tokio::test]
    async fn test_holidays_and_leave_requests() {
        #[derive(serde::Deserialize)]
        struct YearQuery {
            year: i32,
        }
        async fn holidays(headers: HeaderMap, Query(q): Query<YearQuery>) -> Json<Value> {
            Json(json!([{
                "holidayID": "H1",
                "date": format!("{}-01-01", q.year),
                "description": auth_of(&headers)
            }]))
        }
        let router = Router::new()
            .route("/api/holiday/GetAll", get(holidays))
            .route("/api/Leave/GetLeaveInfoByYear", post(echo));
        let base = spawn_backend(router).await;
        let client = ApiClient::new(base).unwrap().with_token("tok".into());

        let list = client.get_holidays(2025).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].date, "2025-01-01");
        assert_eq!(list[0].description, "tok");

        // The echo body is not a LeaveInfo, but every field defaults.
        let info = client.get_leave_info_by_year(2025, "E1").await.unwrap();
        assert_eq!(info, LeaveInfo::default());
    }

    #[tokio::test]
    async fn test_leave_request_body_shape() {
        let router = Router::new().route("/api/Leave/GetLeaveInfoByYear", post(echo));
        let base = spawn_backend(router).await;
        let client = ApiClient::new(base).unwrap().with_token("tok".into());

        let echoed: Value = client
            .post(
                LEAVE_INFO_PATH,
                &LeaveInfoRequest { year: 2024, id: "E9".into() },
                client.authorization(),
            )
            .await
            .unwrap();
        assert_eq!(echoed["authorization"], json!("tok"));
        assert_eq!(echoed["body"], json!({"year": 2024, "id": "E9"}));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        async fn denied() -> Response {
            (StatusCode::UNAUTHORIZED, "expired").into_response()
        }
        let base = spawn_backend(Router::new().route("/api/holiday/GetAll", get(denied))).await;
        let client = ApiClient::new(base).unwrap();

        let err = client.get_holidays(2024).await.unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().expect("ApiError in chain");
        assert!(api_error.is_unauthorized());
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        async fn flaky(State(calls): State<Arc<AtomicUsize>>) -> Response {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                StatusCode::TOO_MANY_REQUESTS.into_response()
            } else {
                Json(json!([])).into_response()
            }
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/api/holiday/GetAll", get(flaky))
            .with_state(calls.clone());
        let base = spawn_backend(router).await;
        let client = ApiClient::new(base).unwrap();

        let list = client.get_holidays(2024).await.unwrap();
        assert!(list.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
