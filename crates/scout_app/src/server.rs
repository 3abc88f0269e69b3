use scout_core::Outcome;
use scout_engine::{CycleError, Orchestrator};
use scout_logging::{scout_error, scout_info, scout_warn};
use serde::Serialize;
use serde_json::json;
use tiny_http::{Header, Request, Response, Server};
use tokio::runtime::Runtime;

const SCRAPE_PATH: &str = "/scrape";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Scrape,
    MethodNotAllowed,
    NotFound,
}

/// Body returned by every trigger: the outcome plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerResponse<'a> {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: &'a Outcome,
}

impl<'a> From<&'a Outcome> for TriggerResponse<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        Self {
            message: outcome.message(),
            outcome,
        }
    }
}

pub fn route(method: &str, url: &str) -> Route {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        ("GET", SCRAPE_PATH) => Route::Scrape,
        (_, SCRAPE_PATH) => Route::MethodNotAllowed,
        _ => Route::NotFound,
    }
}

/// Maps a cycle result onto an HTTP status and JSON body.
pub fn respond_to_cycle(result: &Result<Outcome, CycleError>) -> (u16, serde_json::Value) {
    match result {
        Ok(outcome) => match serde_json::to_value(TriggerResponse::from(outcome)) {
            Ok(body) => (200, body),
            Err(err) => (500, json!({ "error": err.to_string() })),
        },
        Err(err) => (500, json!({ "error": err.to_string() })),
    }
}

/// Serves `GET /scrape` on `bind`, one request and one cycle at a time.
pub fn serve(bind: &str, orchestrator: &Orchestrator, runtime: &Runtime) -> anyhow::Result<()> {
    let server = Server::http(bind).map_err(|err| anyhow::anyhow!("failed to bind {bind}: {err}"))?;
    scout_info!("Listening on http://{}{}", bind, SCRAPE_PATH);

    for request in server.incoming_requests() {
        handle_request(request, orchestrator, runtime);
    }
    Ok(())
}

pub fn handle_request(request: Request, orchestrator: &Orchestrator, runtime: &Runtime) {
    let method = request.method().to_string();
    let url = request.url().to_string();

    let (status, body) = match route(&method, &url) {
        Route::Scrape => {
            scout_info!("Cycle triggered over HTTP");
            let result = runtime.block_on(orchestrator.run_cycle());
            if let Err(err) = &result {
                scout_error!("Cycle failed: {}", err);
            }
            respond_to_cycle(&result)
        }
        Route::MethodNotAllowed => (405, json!({ "error": "method_not_allowed" })),
        Route::NotFound => (404, json!({ "error": "not_found" })),
    };

    let mut response = Response::from_string(body.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    if let Err(err) = request.respond(response) {
        scout_warn!("Failed to answer {} {}: {}", method, url, err);
    }
}
