//! `wiremock` servers for tests that download from a real URL.

use std::net::TcpListener;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::SeqCst;
use tokio::runtime::Runtime;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// A mock server that verifies the number of requests it received when dropped.
pub(crate) struct MockDownload {
    server: MockServer,
    // Declared after `server` so the server shuts down before its runtime.
    _runtime: Runtime,
}

impl MockDownload {
    /// Answers every GET request with `200 OK` and the given body.
    pub(crate) fn serving(body: Vec<u8>, expected_requests: u64) -> Self {
        Self::responding(
            ResponseTemplate::new(200).set_body_bytes(body),
            expected_requests,
        )
    }

    /// Answers with `500 Internal Server Error` until the given request succeeds with the body.
    pub(crate) fn succeeding_after(successful_request: u32, body: Vec<u8>) -> Self {
        Self::start(
            SucceedAfter {
                requests: AtomicU32::new(0),
                successful_request,
                body,
            },
            u64::from(successful_request),
        )
    }

    pub(crate) fn responding(response: ResponseTemplate, expected_requests: u64) -> Self {
        Self::start(response, expected_requests)
    }

    fn start(responder: impl Respond + 'static, expected_requests: u64) -> Self {
        let runtime = Runtime::new().unwrap();

        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(responder)
                .expect(expected_requests)
                .mount(&server)
                .await;
            server
        });

        Self {
            server,
            _runtime: runtime,
        }
    }

    pub(crate) fn url(&self) -> String {
        format!("{}/yarn.tar.gz", self.server.uri())
    }
}

struct SucceedAfter {
    requests: AtomicU32,
    successful_request: u32,
    body: Vec<u8>,
}

impl Respond for SucceedAfter {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let request = self.requests.fetch_add(1, SeqCst) + 1;

        if request >= self.successful_request {
            ResponseTemplate::new(200).set_body_bytes(self.body.clone())
        } else {
            ResponseTemplate::new(500)
        }
    }
}

/// A URL nothing is listening on.
pub(crate) fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}
