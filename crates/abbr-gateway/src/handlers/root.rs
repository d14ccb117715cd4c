//! The plain-text protocol: the request body carries the URL (POST) or the
//! short code (GET) and the reply is a single line of text.

use crate::state::AppState;
use abbr_core::ShortCode;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

pub async fn root_handler(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    let Ok(body) = std::str::from_utf8(&body) else {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Body reading error\n").into_response();
    };

    match method {
        Method::POST => shorten(&state, body).await,
        Method::GET => resolve(&state, body).await,
        _ => (StatusCode::BAD_REQUEST, "Only POST and GET requests\n").into_response(),
    }
}

async fn shorten(state: &AppState, url: &str) -> Response {
    match state.shortener().shorten(url).await {
        Ok(code) => format!("For url {url} link is {code}\n").into_response(),
        Err(err) => {
            warn!(url = %url, error = %err, "failed to shorten url");
            (StatusCode::BAD_REQUEST, "Error adding url in database\n").into_response()
        }
    }
}

async fn resolve(state: &AppState, body: &str) -> Response {
    let not_found = || (StatusCode::NOT_FOUND, "URL not found\n").into_response();

    let Ok(code) = ShortCode::new(body) else {
        return not_found();
    };

    match state.shortener().resolve(&code).await {
        Ok(Some(url)) => format!("For link {code} url is {url}\n").into_response(),
        Ok(None) => not_found(),
        Err(err) => {
            warn!(code = %code, error = %err, "failed to resolve short code");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Error reading url from database\n",
            )
                .into_response()
        }
    }
}
