use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::core::error::CostError;
use crate::core::models::params::{ReportParameters, SubscriptionId};
use crate::core::query::builder::build_query;
use crate::core::query::normalizer::extract_rows;
use crate::core::query::ReportKind;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2021-10-01";

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const RETRY_AFTER_HEADERS: [&str; 2] = [
    "x-ms-ratelimit-microsoft.costmanagement-entity-retry-after",
    "retry-after",
];

/// An authenticated channel to the cost API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `path` (relative to the API endpoint) and return
    /// the raw body of a successful response.
    async fn send(&self, path: &str, payload: &Value) -> Result<String, CostError>;
}

/// Validate that an endpoint URL uses HTTPS.
///
/// Checked before any bearer token is attached to a request.
pub fn validate_endpoint(url: &str) -> Result<(), CostError> {
    if !url.starts_with("https://") {
        return Err(CostError::Config(format!(
            "endpoint must use HTTPS, got: {}",
            url
        )));
    }
    Ok(())
}

/// [`Transport`] over reqwest with a fixed bearer token.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, token: String, timeout: Duration) -> Result<Self, CostError> {
        validate_endpoint(endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("azcost/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    #[cfg(test)]
    fn unchecked(endpoint: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    RETRY_AFTER_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .next()
        .unwrap_or(DEFAULT_RETRY_AFTER)
        .min(MAX_RETRY_AFTER)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, payload: &Value) -> Result<String, CostError> {
        let url = format!("{}/{}", self.endpoint, path.trim_start_matches('/'));

        let mut attempt = 1;
        loop {
            tracing::debug!(%url, attempt, "sending cost query");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.token)
                .header("Accept", "application/json")
                .json(payload)
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                let wait = retry_after(response.headers());
                tracing::warn!(attempt, ?wait, "cost API throttled the request, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                let body = response.text().await.unwrap_or_default();
                return Err(CostError::HttpStatus {
                    status: status.as_u16(),
                    body: format!("unauthorized - run `az login` or refresh the token ({})", body),
                });
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CostError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.text().await?);
        }
    }
}

/// Issues built queries for one subscription through a [`Transport`].
pub struct CostQueryClient<T> {
    transport: T,
    api_version: String,
}

impl<T: Transport> CostQueryClient<T> {
    pub fn new(transport: T, api_version: impl Into<String>) -> Self {
        Self {
            transport,
            api_version: api_version.into(),
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resource path of `kind` for a subscription, relative to the endpoint.
    pub fn resource_path(&self, subscription: SubscriptionId, kind: ReportKind) -> String {
        format!(
            "subscriptions/{}/providers/Microsoft.CostManagement/{}?api-version={}",
            subscription,
            kind.endpoint(),
            self.api_version
        )
    }

    /// Build, send and unwrap one report kind's query. Returns the raw rows.
    pub async fn fetch_rows(
        &self,
        params: &ReportParameters,
        kind: ReportKind,
    ) -> Result<Vec<Vec<Value>>, CostError> {
        let payload = serde_json::to_value(build_query(params, kind))
            .map_err(|e| CostError::Config(format!("cannot encode {} query: {}", kind, e)))?;
        let path = self.resource_path(params.subscription_id(), kind);
        let body = self.transport.send(&path, &payload).await?;
        let rows = extract_rows(kind, &body)?;
        tracing::debug!(%kind, rows = rows.len(), "received cost rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::params::{OutputMode, ReportPeriod, Timeframe};
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUB: &str = "11111111-2222-3333-4444-555555555555";

    fn params() -> ReportParameters {
        ReportParameters::new(
            SUB.parse().unwrap(),
            ReportPeriod::named(Timeframe::MonthToDate).unwrap(),
            OutputMode::Console,
        )
    }

    struct RecordingTransport {
        calls: Mutex<Vec<(String, Value)>>,
        reply: Value,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, path: &str, payload: &Value) -> Result<String, CostError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), payload.clone()));
            Ok(self.reply.to_string())
        }
    }

    #[test]
    fn validate_endpoint_accepts_https() {
        assert!(validate_endpoint("https://management.azure.com").is_ok());
    }

    #[test]
    fn validate_endpoint_rejects_other_schemes() {
        for url in ["http://evil.com", "", "file:///etc/passwd", "management.azure.com"] {
            let err = validate_endpoint(url).unwrap_err();
            assert!(err.to_string().contains("must use HTTPS"), "{}", url);
        }
    }

    #[test]
    fn http_transport_refuses_plain_http() {
        let result = HttpTransport::new("http://localhost", "t".into(), Duration::from_secs(1));
        assert!(matches!(result, Err(CostError::Config(_))));
    }

    #[test]
    fn resource_path_embeds_subscription_and_endpoint() {
        let transport = RecordingTransport {
            calls: Mutex::new(Vec::new()),
            reply: json!({}),
        };
        let client = CostQueryClient::new(transport, DEFAULT_API_VERSION);
        let sub: SubscriptionId = SUB.parse().unwrap();
        assert_eq!(
            client.resource_path(sub, ReportKind::Forecast),
            format!(
                "subscriptions/{}/providers/Microsoft.CostManagement/forecast?api-version=2021-10-01",
                SUB
            )
        );
        assert!(client
            .resource_path(sub, ReportKind::ByLocation)
            .ends_with("/query?api-version=2021-10-01"));
    }

    #[tokio::test]
    async fn fetch_rows_sends_built_payload() {
        let transport = RecordingTransport {
            calls: Mutex::new(Vec::new()),
            reply: json!({ "properties": { "rows": [[1, 1, "Storage", "USD"]] } }),
        };
        let client = CostQueryClient::new(transport, DEFAULT_API_VERSION);
        let rows = client.fetch_rows(&params(), ReportKind::ByService).await.unwrap();
        assert_eq!(rows.len(), 1);

        let calls = client.transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (path, payload) = &calls[0];
        assert!(path.contains(SUB));
        assert!(!payload.to_string().contains(SUB));
        assert_eq!(payload["dataSet"]["grouping"][0]["name"], "ServiceName");
    }

    #[test]
    fn retry_after_reads_cost_management_header() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-ms-ratelimit-microsoft.costmanagement-entity-retry-after",
            "7".parse().unwrap(),
        );
        assert_eq!(retry_after(&headers), Duration::from_secs(7));
    }

    #[test]
    fn retry_after_defaults_and_caps() {
        let headers = reqwest::header::HeaderMap::new();
        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("retry-after", "3600".parse().unwrap());
        assert_eq!(retry_after(&headers), MAX_RETRY_AFTER);
    }

    #[tokio::test]
    async fn http_transport_posts_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/subscriptions/{}/providers/Microsoft.CostManagement/query",
                SUB
            )))
            .and(query_param("api-version", "2021-10-01"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_partial_json(json!({ "type": "ActualCost" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "rows": [[2.5, 2.5, 20240110, "USD"]] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::unchecked(&server.uri(), "secret-token");
        let client = CostQueryClient::new(transport, DEFAULT_API_VERSION);
        let rows = client.fetch_rows(&params(), ReportKind::DailyCost).await.unwrap();
        assert_eq!(rows, vec![vec![json!(2.5), json!(2.5), json!(20240110), json!("USD")]]);
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_normalization_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let transport = HttpTransport::unchecked(&server.uri(), "t");
        let client = CostQueryClient::new(transport, DEFAULT_API_VERSION);
        let err = client
            .fetch_rows(&params(), ReportKind::Forecast)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                CostError::Normalization {
                    kind: ReportKind::Forecast,
                    row: 0,
                    ..
                }
            ),
            "{}",
            err
        );
    }

    #[tokio::test]
    async fn http_transport_surfaces_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad timeframe"))
            .mount(&server)
            .await;

        let transport = HttpTransport::unchecked(&server.uri(), "t");
        let err = transport.send("anything", &json!({})).await.unwrap_err();
        match err {
            CostError::HttpStatus { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad timeframe");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn http_transport_retries_throttled_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-ms-ratelimit-microsoft.costmanagement-entity-retry-after", "0"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "properties": { "rows": [] } })),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::unchecked(&server.uri(), "t");
        let body = transport.send("q", &json!({})).await.unwrap();
        assert_eq!(extract_rows(ReportKind::DailyCost, &body).unwrap(), Vec::<Vec<Value>>::new());
    }

    #[tokio::test]
    async fn http_transport_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .expect(u64::from(MAX_ATTEMPTS))
            .mount(&server)
            .await;

        let transport = HttpTransport::unchecked(&server.uri(), "t");
        let err = transport.send("q", &json!({})).await.unwrap_err();
        assert!(matches!(err, CostError::HttpStatus { status: 429, .. }));
    }
}
