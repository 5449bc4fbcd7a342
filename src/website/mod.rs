//! Server-rendered pages. Identity comes from the cookie session; every page
//! is filled from an embedded template.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::SiteUser;
use crate::categories;
use crate::core::errors::ApiResult;
use crate::entities::{category, comment, post};
use crate::models::forms::MessageQuery;
use crate::templates::{self, attr, banner, escape, Context};
use crate::users;
use crate::AppState;

pub mod auth;
pub mod password;
pub mod posts;
pub mod profile;

const COOKIES_ACCEPTED: &str = "cookies-accepted";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/login", web::get().to(auth::login_page))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::post().to(auth::logout))
        .route("/register", web::get().to(auth::register_page))
        .route("/register", web::post().to(auth::register))
        .route("/posts/create", web::get().to(posts::create_page))
        .route("/posts/create", web::post().to(posts::create))
        .route("/posts/{id}", web::get().to(posts::show))
        .route("/posts/{id}", web::post().to(posts::add_comment))
        .route("/posts/{id}/edit", web::get().to(posts::edit_page))
        .route("/posts/{id}/edit", web::post().to(posts::edit))
        .route("/posts/{id}/delete", web::post().to(posts::delete))
        .route("/users/{id}", web::get().to(user_page))
        .route("/categories", web::get().to(categories_page))
        .route("/categories/{id}", web::get().to(category_page))
        .route("/profile", web::get().to(profile::show))
        .route("/profile/edit", web::get().to(profile::edit_page))
        .route("/profile/edit", web::post().to(profile::edit))
        .route("/forgottenPassword", web::get().to(password::forgotten_page))
        .route("/forgottenPassword", web::post().to(password::forgotten))
        .route("/resetPassword", web::get().to(password::reset_page))
        .route("/resetPassword", web::post().to(password::reset));
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn redirect_with_message(path: &str, message: &str) -> HttpResponse {
    redirect(&format!("{}?message={}", path, urlencoding::encode(message)))
}

pub(crate) fn post_items(posts: &[post::Model]) -> String {
    if posts.is_empty() {
        return "<li>There aren't any posts yet!</li>".to_string();
    }
    posts
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="/posts/{}">{}</a> <span class="description">{}</span></li>"#,
                p.id,
                escape(&p.title),
                escape(&p.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn category_items(categories: &[category::Model]) -> String {
    if categories.is_empty() {
        return "<li>None</li>".to_string();
    }
    categories
        .iter()
        .map(|c| format!(r#"<li><a href="/categories/{}">{}</a></li>"#, c.id, escape(&c.name)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn comment_items(comments: &[comment::Model]) -> String {
    if comments.is_empty() {
        return "<li>No comments yet.</li>".to_string();
    }
    comments
        .iter()
        .map(|c| match &c.message {
            Some(message) => format!(
                "<li><strong>{}</strong>: {}</li>",
                escape(&c.name),
                escape(message)
            ),
            None => format!("<li><strong>{}</strong></li>", escape(&c.name)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cookie_notice() -> String {
    r#"<div id="cookie-notice" class="cookie-notice">This site uses cookies to keep you logged in.
<button id="accept-cookies" type="button">OK</button></div>
<script src="/static/scripts/cookies.js"></script>"#
        .to_string()
}

pub async fn index(
    state: web::Data<AppState>,
    _user: SiteUser,
    req: HttpRequest,
    query: web::Query<MessageQuery>,
) -> ApiResult<HttpResponse> {
    let posts = crate::posts::all(&state.db).await?;
    let notice = if req.cookie(COOKIES_ACCEPTED).is_none() {
        cookie_notice()
    } else {
        String::new()
    };

    let ctx = Context::new()
        .html("message", banner(query.message.as_deref(), "info"))
        .html("cookie_notice", notice)
        .html("posts", post_items(&posts));
    templates::render("index.html", "Home page", true, ctx)
}

pub async fn user_page(
    state: web::Data<AppState>,
    viewer: Option<SiteUser>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = users::find(&state.db, id.into_inner()).await?;
    let posts = users::posts_of(&state.db, user.id).await?;

    let full_name = [user.firstname.as_deref(), user.lastname.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let website = match &user.website {
        Some(site) => format!(
            r#"<p><a href="{}" rel="noopener noreferrer">{}</a></p>"#,
            attr(site),
            escape(site)
        ),
        None => String::new(),
    };

    let ctx = Context::new()
        .text("full_name", full_name)
        .html("website", website)
        .html("posts", post_items(&posts));
    templates::render("user.html", &user.username, viewer.is_some(), ctx)
}

pub async fn categories_page(
    state: web::Data<AppState>,
    viewer: Option<SiteUser>,
) -> ApiResult<HttpResponse> {
    let all = categories::all(&state.db).await?;
    let ctx = Context::new().html("categories", category_items(&all));
    templates::render("categories.html", "All Categories", viewer.is_some(), ctx)
}

pub async fn category_page(
    state: web::Data<AppState>,
    viewer: Option<SiteUser>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let category = categories::find(&state.db, id.into_inner()).await?;
    let posts = categories::posts_of(&state.db, category.id).await?;

    let ctx = Context::new().html("posts", post_items(&posts));
    templates::render("category.html", &category.name, viewer.is_some(), ctx)
}
