//! Pager over the `List Containers` operation.

use std::sync::Arc;
use std::time::Instant;

use azcount_core::{ContainerPager, FetchScope, ListOptions, Page};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use url::Url;

use crate::client::{Authorization, AzureBlobClientInner};
use crate::response::{EnumerationResults, ErrorResponse};
use crate::{Error, Result};

/// Tracing target for pager operations.
pub const TRACING_TARGET: &str = "azcount_azblob::pager";

const HEADER_MS_DATE: &str = "x-ms-date";
const HEADER_MS_VERSION: &str = "x-ms-version";
const HEADER_MS_ERROR_CODE: &str = "x-ms-error-code";

/// Cursor over the pages of one container listing.
///
/// The continuation marker returned by the service is kept here and sent
/// with the following request. Once a page arrives without a marker, the
/// pager is exhausted.
#[derive(Debug)]
pub struct AzureBlobPager {
    client: Arc<AzureBlobClientInner>,
    options: ListOptions,
    marker: Option<String>,
    exhausted: bool,
    pages: u64,
}

impl AzureBlobPager {
    pub(crate) fn new(client: Arc<AzureBlobClientInner>, options: ListOptions) -> Self {
        Self {
            client,
            options,
            marker: None,
            exhausted: false,
            pages: 0,
        }
    }

    /// Options this pager was created with.
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    /// Decoded query parameters for the next request.
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("comp", "list".to_owned()),
            ("maxresults", self.options.page_size.to_string()),
        ];

        let includes = self.options.includes();
        if !includes.is_empty() {
            params.push(("include", includes.join(",")));
        }
        if let Some(prefix) = &self.options.prefix {
            params.push(("prefix", prefix.clone()));
        }
        if let Some(marker) = &self.marker {
            params.push(("marker", marker.clone()));
        }

        params
    }

    fn build_request(&self, scope: &FetchScope) -> reqwest::RequestBuilder {
        let client = &self.client;
        let params = self.query_params();
        let date = http_date(jiff::Timestamp::now());
        let api_version = client.config.api_version.as_str();

        let mut url: Url = client.service_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &params {
                query.append_pair(name, value);
            }
            if let Authorization::Sas(pairs) = &client.authorization {
                for (name, value) in pairs {
                    query.append_pair(name, value);
                }
            }
        }

        let mut request = client
            .http
            .get(url)
            .header(HEADER_MS_DATE, &date)
            .header(HEADER_MS_VERSION, api_version)
            .timeout(scope.remaining());

        match &client.authorization {
            Authorization::SharedKey(signer) => {
                let query: Vec<(&str, &str)> =
                    params.iter().map(|(k, v)| (*k, v.as_str())).collect();
                let header = signer.authorization(
                    client.service_url.path(),
                    &[
                        (HEADER_MS_DATE, date.as_str()),
                        (HEADER_MS_VERSION, api_version),
                    ],
                    &query,
                );
                request = request.header(AUTHORIZATION, header);
            }
            Authorization::Bearer(token) => {
                request = request.bearer_auth(token);
            }
            Authorization::Sas(_) | Authorization::Anonymous => {}
        }

        request
    }
}

#[async_trait::async_trait]
impl ContainerPager for AzureBlobPager {
    fn has_more(&self) -> bool {
        !self.exhausted
    }

    async fn next_page(&mut self, scope: &FetchScope) -> Result<Page> {
        if self.exhausted {
            return Err(Error::invalid_input().with_message("container listing is exhausted"));
        }

        let started_at = Instant::now();
        let page_number = self.pages + 1;

        tracing::debug!(
            target: TRACING_TARGET,
            page = page_number,
            page_size = %self.options.page_size,
            has_marker = self.marker.is_some(),
            "Requesting container page"
        );

        let response = self
            .build_request(scope)
            .send()
            .await
            .map_err(|e| send_error(e, scope))?;

        let status = response.status();
        if !status.is_success() {
            let error_code = error_code(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_code, &body));
        }

        let body = response.text().await.map_err(|e| send_error(e, scope))?;
        let results = EnumerationResults::from_xml(&body)?;
        let (page, next_marker) = results.into_page();

        self.pages = page_number;
        self.exhausted = next_marker.is_none();
        self.marker = next_marker;

        tracing::debug!(
            target: TRACING_TARGET,
            page = page_number,
            items = page.len(),
            exhausted = self.exhausted,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Received container page"
        );

        Ok(page)
    }
}

/// Formats a timestamp as an RFC 1123 date in GMT.
fn http_date(timestamp: jiff::Timestamp) -> String {
    timestamp.strftime("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn error_code(headers: &HeaderMap) -> Option<String> {
    headers
        .get(HEADER_MS_ERROR_CODE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Maps a transport failure, attributing timeouts to the walk's deadline
/// once it has passed.
fn send_error(err: reqwest::Error, scope: &FetchScope) -> Error {
    if err.is_timeout() && scope.is_expired() {
        return Error::deadline_exceeded()
            .with_message("container listing did not finish before the deadline")
            .with_source(err);
    }

    crate::error::Error::from(err).into()
}

fn status_error(status: StatusCode, error_code: Option<String>, body: &str) -> Error {
    let details = ErrorResponse::from_xml(body).unwrap_or_default();
    let code = error_code.or(details.code);

    let mut message = format!("HTTP {}", status.as_u16());
    if let Some(code) = &code {
        message.push_str(&format!(" {code}"));
    }
    let text = details.message.as_deref().map(str::trim);
    if let Some(text) = text.filter(|m| !m.is_empty()) {
        message.push_str(&format!(": {text}"));
    }

    let error = match status {
        StatusCode::UNAUTHORIZED => Error::authentication(),
        StatusCode::FORBIDDEN if code.as_deref() == Some("AuthenticationFailed") => {
            Error::authentication()
        }
        StatusCode::FORBIDDEN => Error::authorization(),
        StatusCode::NOT_FOUND => Error::not_found(),
        _ => Error::external_error(),
    };

    error.with_message(message)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::Router;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use azcount_core::{ErrorKind, PagedCounter, PageSize};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::{AzureBlobClient, AzureBlobConfig, Credential};

    #[derive(Debug, Clone)]
    struct Recorded {
        query: HashMap<String, String>,
        headers: AxumHeaders,
    }

    #[derive(Clone)]
    struct FakeService {
        pages: Arc<Vec<usize>>,
        delay: Duration,
        fail_on: Option<(usize, AxumStatus, &'static str)>,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl FakeService {
        fn new(pages: Vec<usize>) -> Self {
            Self {
                pages: Arc::new(pages),
                delay: Duration::ZERO,
                fail_on: None,
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn list_containers(
        State(service): State<FakeService>,
        Query(query): Query<HashMap<String, String>>,
        headers: AxumHeaders,
    ) -> Response {
        let index: usize = query
            .get("marker")
            .and_then(|m| m.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);

        service.requests.lock().unwrap().push(Recorded {
            query: query.clone(),
            headers,
        });

        if !service.delay.is_zero() {
            tokio::time::sleep(service.delay).await;
        }

        if let Some((fail_index, status, code)) = service.fail_on
            && fail_index == index
        {
            let body = format!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>{code}</Code>\
                 <Message>Request rejected by test service.</Message></Error>"
            );
            return (status, [("x-ms-error-code", code)], body).into_response();
        }

        let count = service.pages.get(index).copied().unwrap_or(0);
        let containers: String = (0..count)
            .map(|i| format!("<Container><Name>c-{index}-{i}</Name><Properties /></Container>"))
            .collect();
        let next_marker = if index + 1 < service.pages.len() {
            format!("page-{}", index + 1)
        } else {
            String::new()
        };

        let body = format!(
            "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <EnumerationResults ServiceEndpoint=\"http://127.0.0.1/\">\
             <MaxResults>{}</MaxResults><Containers>{containers}</Containers>\
             <NextMarker>{next_marker}</NextMarker></EnumerationResults>",
            query.get("maxresults").cloned().unwrap_or_default()
        );

        (AxumStatus::OK, [("content-type", "application/xml")], body).into_response()
    }

    async fn serve(service: FakeService) -> SocketAddr {
        let app = Router::new()
            .route("/", get(list_containers))
            .with_state(service);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, credential: Credential) -> AzureBlobClient {
        let endpoint = Url::parse(&format!("http://{addr}/")).unwrap();
        let config = AzureBlobConfig::new("testaccount").with_endpoint(endpoint);
        AzureBlobClient::new(config, credential).unwrap()
    }

    fn counter(addr: SocketAddr) -> PagedCounter<AzureBlobClient> {
        let client = client(addr, Credential::Anonymous);
        PagedCounter::new(client, 100, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn counts_across_pages() {
        let service = FakeService::new(vec![100, 100, 37]);
        let addr = serve(service.clone()).await;

        let counter = counter(addr);
        assert_eq!(counter.count().await.unwrap(), 237);

        let requests = service.requests();
        assert_eq!(requests.len(), 3);
        for (i, request) in requests.iter().enumerate() {
            assert_eq!(request.query.get("comp").map(String::as_str), Some("list"));
            assert_eq!(
                request.query.get("maxresults").map(String::as_str),
                Some("100")
            );
            assert!(!request.query.contains_key("include"));
            assert!(request.headers.contains_key("x-ms-date"));
            assert!(request.headers.contains_key("x-ms-version"));
            let expected_marker = (i > 0).then(|| format!("page-{i}"));
            assert_eq!(request.query.get("marker").cloned(), expected_marker);
        }
    }

    #[tokio::test]
    async fn single_empty_page_counts_zero() {
        let service = FakeService::new(vec![0]);
        let addr = serve(service.clone()).await;

        let counter = counter(addr);
        assert_eq!(counter.count().await.unwrap(), 0);
        assert_eq!(service.requests().len(), 1);
    }

    #[tokio::test]
    async fn forbidden_second_page_is_returned() {
        let mut service = FakeService::new(vec![100, 100, 37]);
        service.fail_on = Some((1, AxumStatus::FORBIDDEN, "AuthorizationFailure"));
        let addr = serve(service.clone()).await;

        let counter = counter(addr);
        let err = counter.count().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authorization);
        let message = err.message.unwrap();
        assert!(message.contains("403"));
        assert!(message.contains("AuthorizationFailure"));
        assert_eq!(service.requests().len(), 2);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let mut service = FakeService::new(vec![1]);
        service.fail_on = Some((0, AxumStatus::NOT_FOUND, "ResourceNotFound"));
        let addr = serve(service).await;

        let counter = counter(addr);
        let err = counter.count().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn slow_service_exceeds_deadline() {
        let mut service = FakeService::new(vec![10, 10]);
        service.delay = Duration::from_millis(500);
        let addr = serve(service).await;

        let counter = PagedCounter::new(
            client(addr, Credential::Anonymous),
            100,
            Duration::from_millis(100),
        )
        .unwrap();
        let err = counter.count().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let mut service = FakeService::new(vec![10]);
        service.delay = Duration::from_secs(2);
        let addr = serve(service).await;

        let counter = PagedCounter::new(
            client(addr, Credential::Anonymous),
            100,
            Duration::from_secs(10),
        )
        .unwrap();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = counter.count_with_cancellation(token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // Bind and drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let counter = counter(addr);
        let err = counter.count().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
        assert!(err.is_transport_failure());
    }

    #[tokio::test]
    async fn silent_service_times_out_as_deadline_exceeded() {
        // Accept connections but never answer them.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let options = ListOptions::counting(PageSize::DEFAULT);
        let mut pager = client(addr, Credential::Anonymous).pager(options);
        let scope = FetchScope::new(Duration::from_millis(150), CancellationToken::new());

        let err = pager.next_page(&scope).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert!(scope.is_expired());
        assert_eq!(pager.pages, 0);
    }

    #[tokio::test]
    async fn shared_key_requests_are_signed() {
        let service = FakeService::new(vec![3]);
        let addr = serve(service.clone()).await;

        let credential = Credential::SharedKey {
            account: "testaccount".into(),
            key: "YXpjb3VudC10ZXN0LWtleS0wMTIzNDU2Nzg5YWJjZGVm".into(),
        };
        let counter =
            PagedCounter::new(client(addr, credential), 100, Duration::from_secs(5)).unwrap();
        assert_eq!(counter.count().await.unwrap(), 3);

        let requests = service.requests();
        let authorization = requests[0].headers["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("SharedKey testaccount:"));
    }

    #[tokio::test]
    async fn sas_and_bearer_credentials_are_attached() {
        let service = FakeService::new(vec![1]);
        let addr = serve(service.clone()).await;

        let sas = client(addr, Credential::Sas("sv=2022-11-02&sig=abc%2B".into()));
        PagedCounter::new(sas, 10, Duration::from_secs(5))
            .unwrap()
            .count()
            .await
            .unwrap();

        let bearer = client(addr, Credential::Bearer("token-123".into()));
        PagedCounter::new(bearer, 10, Duration::from_secs(5))
            .unwrap()
            .count()
            .await
            .unwrap();

        let requests = service.requests();
        assert_eq!(
            requests[0].query.get("sig").map(String::as_str),
            Some("abc+")
        );
        assert!(!requests[0].headers.contains_key("authorization"));
        assert_eq!(
            requests[1].headers["authorization"].to_str().unwrap(),
            "Bearer token-123"
        );
    }

    #[tokio::test]
    async fn include_and_prefix_are_sent_when_requested() {
        let service = FakeService::new(vec![2]);
        let addr = serve(service.clone()).await;

        let options = ListOptions::new(PageSize::new(5).unwrap())
            .with_deleted(true)
            .with_system(true)
            .with_prefix("logs-");
        let mut pager = client(addr, Credential::Anonymous).pager(options);
        let scope = FetchScope::new(Duration::from_secs(5), CancellationToken::new());

        let page = pager.next_page(&scope).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(!pager.has_more());

        let request = &service.requests()[0];
        let query = |name: &str| request.query.get(name).map(String::as_str);
        assert_eq!(query("include"), Some("deleted,system"));
        assert_eq!(query("prefix"), Some("logs-"));
        assert_eq!(query("maxresults"), Some("5"));
    }

    #[test]
    fn http_date_is_rfc1123() {
        let timestamp: jiff::Timestamp = "2026-10-19T12:00:00Z".parse().unwrap();
        assert_eq!(http_date(timestamp), "Mon, 19 Oct 2026 12:00:00 GMT");
    }

    #[test]
    fn status_mapping() {
        let err = status_error(StatusCode::UNAUTHORIZED, None, "");
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = status_error(
            StatusCode::FORBIDDEN,
            Some("AuthenticationFailed".into()),
            "",
        );
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = status_error(
            StatusCode::SERVICE_UNAVAILABLE,
            Some("ServerBusy".into()),
            "",
        );
        assert_eq!(err.kind(), ErrorKind::ExternalError);
        assert_eq!(err.message.as_deref(), Some("HTTP 503 ServerBusy"));
    }
}
