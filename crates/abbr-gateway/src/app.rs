use axum::routing::{any, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_url_handler, get_url_handler, health_handler, lookup_url_handler, root_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", any(root_handler))
            .route("/health", get(health_handler))
            .route("/v1/urls", post(create_url_handler).get(lookup_url_handler))
            .route("/v1/urls/{short_code}", get(get_url_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
