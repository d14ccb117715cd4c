use abbr_core::ShortCode;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateUrlRequest {
    pub original_url: String,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub original_url: String,
}

#[derive(Serialize)]
pub struct UrlResponse {
    pub short_code: ShortCode,
    pub short_url: String,
    pub original_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
