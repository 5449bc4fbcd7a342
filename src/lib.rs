use std::sync::Arc;

use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::Settings;
use crate::core::errors::{bad_payload, ApiError};
use crate::mail::Mailer;

pub mod auth;
pub mod categories;
pub mod comments;
pub mod config;
pub mod core;
pub mod entities;
pub mod mail;
pub mod migration;
pub mod models;
pub mod posts;
pub mod session;
pub mod templates;
pub mod users;
pub mod website;

pub const SESSION_COOKIE: &str = "blotter_session";

/// Shared by every worker; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: Arc<dyn Mailer>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(db: DatabaseConnection, mailer: Arc<dyn Mailer>, settings: Settings) -> Self {
        Self {
            db,
            mailer,
            settings,
        }
    }
}

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .cookie_content_security(CookieContentSecurity::Private)
        .build()
}

/// Registers the JSON API, the static assets and the website.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_payload(err)))
        .app_data(web::FormConfig::default().error_handler(|err, _| bad_payload(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_payload(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_payload(err)))
        .service(
            web::scope("/api/users")
                .route("", web::get().to(users::get_all))
                .route("", web::post().to(users::create_user))
                .route("/login", web::post().to(auth::login_user))
                .route("/logout", web::post().to(auth::logout_user))
                .route("/{id}", web::get().to(users::get_user))
                .route("/{id}/posts", web::get().to(users::get_user_posts)),
        )
        .service(
            web::scope("/api/posts")
                .route("", web::get().to(posts::get_all))
                .route("", web::post().to(posts::create_post))
                .route("/search", web::get().to(posts::search_posts))
                .route("/first", web::get().to(posts::get_first))
                .route("/sorted", web::get().to(posts::get_sorted))
                .route("/{id}", web::get().to(posts::get_post))
                .route("/{id}", web::put().to(posts::update_post))
                .route("/{id}", web::delete().to(posts::delete_post))
                .route("/{id}/user", web::get().to(posts::get_user))
                .route("/{id}/comments", web::get().to(posts::get_comments))
                .route("/{id}/comments", web::post().to(posts::add_new_comment))
                .route(
                    "/{id}/comments/{comment_id}",
                    web::post().to(posts::attach_comment),
                )
                .route(
                    "/{id}/comments/{comment_id}",
                    web::delete().to(posts::detach_comment),
                )
                .route("/{id}/categories", web::get().to(posts::get_categories))
                .route("/{id}/categories", web::post().to(posts::add_new_category))
                .route(
                    "/{id}/categories/{category_id}",
                    web::post().to(posts::attach_category),
                )
                .route(
                    "/{id}/categories/{category_id}",
                    web::delete().to(posts::detach_category),
                ),
        )
        .service(
            web::scope("/api/categories")
                .route("", web::get().to(categories::get_all))
                .route("", web::post().to(categories::create_category))
                .route("/{id}", web::get().to(categories::get_category))
                .route("/{id}/posts", web::get().to(categories::get_posts)),
        )
        .service(
            web::scope("/api/comments")
                .route("", web::get().to(comments::get_all))
                .route("", web::post().to(comments::create_comment))
                .route("/{id}", web::get().to(comments::get_comment))
                .route("/{id}/posts", web::get().to(comments::get_posts)),
        )
        .route(
            "/static/{path:.*}",
            web::get().to(crate::core::static_server::serve_static),
        )
        .configure(website::configure);
}

pub async fn not_found() -> actix_web::Result<HttpResponse> {
    Err(ApiError::NotFound("No route found".to_string()).into())
}
