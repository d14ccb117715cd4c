use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, LookupQuery, UrlResponse};
use crate::state::AppState;
use abbr_core::ShortCode;
use axum::extract::{Path, Query, State};
use axum::Json;

fn url_response(state: &AppState, short_code: ShortCode, original_url: String) -> UrlResponse {
    UrlResponse {
        short_url: short_code.to_url(state.base_url()),
        short_code,
        original_url,
    }
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUrlRequest>,
) -> Result<Json<UrlResponse>> {
    let short_code = state.shortener().shorten(&request.original_url).await?;
    Ok(Json(url_response(&state, short_code, request.original_url)))
}

pub async fn get_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlResponse>> {
    let short_code = ShortCode::new(short_code)?;
    let original_url = state
        .shortener()
        .resolve(&short_code)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(url_response(&state, short_code, original_url)))
}

pub async fn lookup_url_handler(
    Query(query): Query<LookupQuery>,
    State(state): State<AppState>,
) -> Result<Json<UrlResponse>> {
    let short_code = state
        .shortener()
        .reverse_lookup(&query.original_url)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(url_response(&state, short_code, query.original_url)))
}
