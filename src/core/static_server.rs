use actix_web::http::header;
use actix_web::{web, HttpResponse};
use mime_guess::from_path;
use rust_embed::RustEmbed;

use crate::core::errors::{ApiError, ApiResult};

#[derive(RustEmbed)]
#[folder = "static"]
struct Assets;

/// Serves an embedded asset under `/static/{path}`.
pub async fn serve_static(path: web::Path<String>) -> ApiResult<HttpResponse> {
    let file_path = path.trim_start_matches('/');

    let file = Assets::get(file_path).ok_or_else(|| ApiError::not_found("File"))?;
    let mime = from_path(file_path).first_or_octet_stream();

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, mime.as_ref()))
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(file.data.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_is_embedded() {
        assert!(Assets::get("styles/style.css").is_some());
        assert!(Assets::get("scripts/createPost.js").is_some());
        assert!(Assets::get("../Cargo.toml").is_none());
    }
}
