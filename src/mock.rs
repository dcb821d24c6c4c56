//! A scripted apiserver behind a mocked kube [`Client`].

use std::time::Duration;

use http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use kube_client::{client::Body, Client};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower_test::mock::{self, SendResponse};

type ApiServerHandle = mock::Handle<Request<Body>, Response<Body>>;
pub type Responder = SendResponse<Response<Body>>;

pub struct ApiServerVerifier(ApiServerHandle);

/// A client whose every call lands on the returned verifier.
pub fn testcontext() -> (Client, ApiServerVerifier) {
    let (mock_service, handle) = mock::pair::<Request<Body>, Response<Body>>();
    let mock_client = Client::new(mock_service, "default");
    (mock_client, ApiServerVerifier(handle))
}

impl ApiServerVerifier {
    /// Waits for the next call and checks its method and path.
    pub async fn expect(&mut self, method: Method, path: &str) -> (Request<Body>, Responder) {
        let (request, send) = self.0.next_request().await.expect("service not called");
        assert_eq!(request.method(), method);
        assert_eq!(request.uri().path(), path);
        (request, send)
    }

    /// The next call, or `None` once the client is gone.
    pub async fn next(&mut self) -> Option<(Request<Body>, Responder)> {
        self.0.next_request().await
    }
}

pub fn respond<T: Serialize>(send: Responder, status: StatusCode, body: &T) {
    let body = serde_json::to_vec(body).unwrap();
    send.send_response(
        Response::builder()
            .status(status)
            .body(Body::from(body))
            .unwrap(),
    );
}

/// A `Status` body as the apiserver sends it with a failed call.
pub fn failure(code: u16, reason: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("{reason} for test"),
        "reason": reason,
        "code": code
    })
}

pub async fn body_json(request: Request<Body>) -> Value {
    let bytes = request.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn timeout_after_1s(handle: JoinHandle<()>) {
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("timeout on mock apiserver")
        .expect("scenario succeeded")
}
