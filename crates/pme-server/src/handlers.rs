//! Endpoint handlers
//!
//! Verb checks live here rather than in route filters so a wrong verb on a
//! known path answers 405 instead of falling through to 404. The diagnostic
//! verb and key are checked by [`admit_diagnostic`] before the body filter
//! runs.

use crate::error::ApiError;
use crate::state::AppState;
use pme_core::{diagnose, BenchmarkQuery, BusinessInput, CalcTrace, DiagnosticReport, RawBusinessInput};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use warp::http::Method;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// `GET /api/benchmarks`
///
/// # Errors
///
/// Never fails; every outcome is a response.
pub async fn benchmarks(
    method: Method,
    query: BenchmarkQuery,
    state: Arc<AppState>,
) -> Result<Response, Infallible> {
    let response = match method {
        Method::OPTIONS => warp::reply::json(&json!({ "ok": true })).into_response(),
        Method::GET => {
            let lookup = query.lookup(state.benchmarks());
            tracing::info!(
                setor = ?query.setor,
                found = lookup.is_found(),
                "Benchmark lookup"
            );
            warp::reply::json(&lookup).into_response()
        }
        _ => ApiError::MethodNotAllowed { allowed: "GET" }.into_response(),
    };
    Ok(with_cors(response))
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET,OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

/// Verb and key checks for `POST /api/diagnostico`, run before any body
/// byte is read.
///
/// # Errors
///
/// Rejects with [`ApiError::MethodNotAllowed`] or [`ApiError::Unauthorized`].
pub async fn admit_diagnostic(
    method: Method,
    api_key: Option<String>,
    state: Arc<AppState>,
) -> Result<(), Rejection> {
    if method != Method::POST {
        tracing::debug!("Rejected diagnostic request: method {}", method);
        return Err(warp::reject::custom(ApiError::MethodNotAllowed { allowed: "POST" }));
    }
    state.authorize(api_key.as_deref()).map_err(|err| {
        tracing::warn!("Rejected diagnostic request: bad API key");
        warp::reject::custom(err)
    })
}

/// `POST /api/diagnostico`, once admitted and with a size-checked body
///
/// # Errors
///
/// Never fails; errors are rendered through [`ApiError`].
pub async fn diagnostic(body: Bytes) -> Result<Response, Infallible> {
    let response = match run_diagnostic(&body) {
        Ok(report) => warp::reply::json(&report).into_response(),
        Err(err) => {
            match &err {
                ApiError::Internal { source, .. } => {
                    tracing::error!("Diagnostic failed: {}", source);
                }
                other => tracing::debug!("Rejected diagnostic request: {}", other),
            }
            err.into_response()
        }
    };
    Ok(response)
}

fn run_diagnostic(body: &[u8]) -> Result<DiagnosticReport, ApiError> {
    let raw = RawBusinessInput::from_json(body)?;
    let mut trace = CalcTrace::new();
    let input = BusinessInput::normalize(&raw, &mut trace);

    let diagnostic = match diagnose(&input, &mut trace) {
        Ok(diagnostic) => diagnostic,
        Err(source) => {
            trace.record_with("erro_interno", json!({ "detalhe": source.to_string() }));
            return Err(ApiError::Internal { source, logs: trace });
        }
    };

    tracing::info!(
        setor = %diagnostic.sector(),
        receita = input.revenue,
        score = diagnostic.score,
        "Diagnostic computed"
    );
    Ok(DiagnosticReport::new(
        &diagnostic,
        raw.debug_enabled().then_some(&trace),
    ))
}
