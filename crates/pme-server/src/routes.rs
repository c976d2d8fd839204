//! warp filter tree

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;
use pme_core::BenchmarkQuery;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// All routes, with rejection recovery and request tracing.
///
/// The diagnostic body is bounded by its `Content-Length` and only read
/// after the verb and key checks pass.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let limit = state.max_body_bytes();

    let benchmarks = warp::path!("api" / "benchmarks")
        .and(warp::method())
        .and(warp::query::<BenchmarkQuery>())
        .and(with_state(state.clone()))
        .and_then(handlers::benchmarks);

    let diagnostic = warp::path!("api" / "diagnostico")
        .and(warp::method())
        .and(warp::header::optional::<String>("x-api-key"))
        .and(with_state(state))
        .and_then(handlers::admit_diagnostic)
        .untuple_one()
        .and(warp::body::content_length_limit(
            u64::try_from(limit).unwrap_or(u64::MAX),
        ))
        .and(warp::body::bytes())
        .and_then(handlers::diagnostic);

    benchmarks
        .or(diagnostic)
        .unify()
        .recover(move |rejection| handle_rejection(rejection, limit))
        .with(warp::trace::request())
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn handle_rejection(rejection: Rejection, limit: usize) -> Result<Response, Infallible> {
    if let Some(err) = rejection.find::<ApiError>() {
        return Ok(err.to_response());
    }
    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        tracing::debug!("Rejected request body over {} bytes", limit);
        return Ok(ApiError::PayloadTooLarge { limit }.into_response());
    }
    if rejection.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(ApiError::LengthRequired.into_response());
    }

    let (status, code) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found")
    } else if rejection.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid_query")
    } else if rejection.find::<warp::reject::InvalidHeader>().is_some() {
        (StatusCode::BAD_REQUEST, "invalid_header")
    } else {
        tracing::error!("Unhandled rejection: {:?}", rejection);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
    };
    let body = json!({ "error": code, "message": status.canonical_reason().unwrap_or_default() });
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}
