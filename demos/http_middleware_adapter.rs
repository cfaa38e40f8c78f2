//! Sketch of an HTTP request middleware built on top of the client.
//!
//! This is illustrative only; no web framework dependency is added to the
//! crate for it. A real adapter would sit in front of an Axum/Actix/etc.
//! router; here a minimal hand-rolled handler signature stands in for one.
use logcourier::{Client, ClientConfig, LogLevel};
use std::future::Future;
use std::time::Instant;

struct Request {
    method: &'static str,
    path: &'static str,
    trace_id_header: Option<String>,
}

struct Response {
    status: u16,
}

/// Wraps `handler`, installing a trace id for its duration and logging one
/// entry on entry and one on completion, per the adapter sketched in the
/// out-of-scope collaborator section.
async fn with_logging<F, Fut>(client: &Client, skip_paths: &[&str], request: Request, handler: F) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Response>,
{
    if skip_paths.contains(&request.path) {
        return handler().await;
    }

    let trace_id = request.trace_id_header.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let guard = client.trace_context().scoped(trace_id);

    let _ = client.log("http", LogLevel::Info, format!("{} {} started", request.method, request.path));
    let started = Instant::now();

    let response = handler().await;

    let level = if response.status >= 500 {
        LogLevel::Error
    } else if response.status >= 400 {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };
    let _ = client.log(
        "http",
        level,
        format!("{} {} completed with {} in {:?}", request.method, request.path, response.status, started.elapsed()),
    );

    drop(guard);
    response
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::new("https://logs.example.com", "api-key");
    let client = Client::new(config)?;

    let request = Request { method: "GET", path: "/orders/42", trace_id_header: None };
    let response = with_logging(&client, &["/healthz"], request, || async { Response { status: 200 } }).await;

    println!("responded with {}", response.status);
    client.close().await;
    Ok(())
}
