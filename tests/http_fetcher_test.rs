//! End-to-end tests over real HTTP: the default [`HttpFetcher`] against a
//! wiremock server, the same way a deployed worker talks to its origin.

use bytes::Bytes;
use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vordr::{
    FetchRequest, Fetcher, HttpFetcher, MemoryStore, Vordr, VordrError, WorkerState,
};

async fn serve_app() -> MockServer {
    // A bare (non-pooled) server: dropping it closes the listener, which the
    // offline test relies on. `set_body_raw` carries the content-type because
    // wiremock's body setters stamp their own mime over `insert_header`.
    let server = MockServer::builder().start().await;

    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>shell</html>", "text/html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app.css"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("body{margin:0}", "text/css"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[1,2]}"#))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn http_fetcher_streams_status_headers_and_body() {
    let server = serve_app().await;
    let fetcher = HttpFetcher::new();

    let request = FetchRequest::get(&format!("{}/app.css", server.uri())).unwrap();
    let response = fetcher.fetch(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        response
            .headers
            .iter()
            .find(|(k, _)| k == "content-type")
            .map(|(_, v)| v.as_str()),
        Some("text/css")
    );
    assert_eq!(response.bytes().await.unwrap(), Bytes::from("body{margin:0}"));
}

#[tokio::test]
async fn http_fetcher_surfaces_connection_errors() {
    let server = MockServer::builder().start().await;
    let uri = server.uri();
    drop(server); // nothing is listening any more

    let fetcher = HttpFetcher::new();
    let request = FetchRequest::get(&format!("{uri}/app.css")).unwrap();
    assert!(matches!(
        fetcher.fetch(&request).await,
        Err(VordrError::Network(_))
    ));
}

#[tokio::test]
async fn worker_installs_and_serves_offline_over_real_http() {
    let server = serve_app().await;
    let uri = server.uri();

    let worker = Vordr::builder()
        .origin(&uri)
        .precache(["/index.html", "/app.css"])
        .store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();

    worker.on_install().await.unwrap();
    assert_eq!(worker.state().await, WorkerState::Active);

    // Warm the dynamic generation while the origin is reachable.
    let api = FetchRequest::get(&format!("{uri}/api/data")).unwrap();
    let outcome = worker.on_fetch(&api).await.unwrap();
    assert_eq!(
        outcome.into_response().unwrap().bytes().await.unwrap(),
        Bytes::from(r#"{"items":[1,2]}"#)
    );

    // Take the origin away entirely.
    drop(server);

    let css = FetchRequest::get(&format!("{uri}/app.css")).unwrap();
    let outcome = worker.on_fetch(&css).await.unwrap();
    assert_eq!(
        outcome.into_response().unwrap().bytes().await.unwrap(),
        Bytes::from("body{margin:0}")
    );

    let api = FetchRequest::get(&format!("{uri}/api/data")).unwrap();
    let outcome = worker.on_fetch(&api).await.unwrap();
    assert_eq!(
        outcome.into_response().unwrap().bytes().await.unwrap(),
        Bytes::from(r#"{"items":[1,2]}"#)
    );

    let navigation = FetchRequest::navigate(&format!("{uri}/api/report")).unwrap();
    let outcome = worker.on_fetch(&navigation).await.unwrap();
    assert_eq!(
        outcome.into_response().unwrap().bytes().await.unwrap(),
        Bytes::from("<html>shell</html>")
    );
}
