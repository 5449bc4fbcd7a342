#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::test::TestRequest;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use blotter::config::Settings;
use blotter::core::db;
use blotter::entities::{category, comment, post, post_category, post_comment, user};
use blotter::mail::{Email, Mailer};
use blotter::models::models::CreateUserData;
use blotter::posts::PostContent;
use blotter::{auth, categories, comments, posts, users, AppState, SESSION_COOKIE};

pub const PASSWORD: &str = "password123";

/// Keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub outbox: Arc<RecordingMailer>,
}

impl TestContext {
    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }
}

pub async fn setup() -> TestContext {
    let db = db::connect_in_memory()
        .await
        .expect("Failed to open test database");
    let outbox = Arc::new(RecordingMailer::default());
    let state = AppState::new(db, outbox.clone(), Settings::default());
    TestContext { state, outbox }
}

/// Builds the full application around `$state` the way `main` does.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .wrap(blotter::session_middleware(
                    actix_web::cookie::Key::generate(),
                    false,
                ))
                .configure(blotter::configure)
                .default_service(actix_web::web::route().to(blotter::not_found)),
        )
        .await
    };
}

// === Fixtures ===

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    users::create(
        db,
        CreateUserData {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            email: format!("{}@test.io", username),
            ..CreateUserData::default()
        },
    )
    .await
    .expect("Failed to create user")
}

pub async fn admin(db: &DatabaseConnection) -> user::Model {
    users::all(db)
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.username == "admin")
        .expect("admin is seeded by the migrations")
}

pub async fn create_post(
    db: &DatabaseConnection,
    user_id: Uuid,
    title: &str,
    body: &str,
) -> post::Model {
    posts::create(
        db,
        user_id,
        PostContent {
            title: title.to_string(),
            description: format!("About {}", title),
            body: body.to_string(),
        },
    )
    .await
    .expect("Failed to create post")
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> category::Model {
    categories::create(db, name)
        .await
        .expect("Failed to create category")
}

pub async fn create_comment(db: &DatabaseConnection, name: &str) -> comment::Model {
    comments::create(db, name, Some(format!("{} says hi", name)))
        .await
        .expect("Failed to create comment")
}

pub async fn token_for(db: &DatabaseConnection, user_id: Uuid) -> String {
    auth::issue_token(db, user_id)
        .await
        .expect("Failed to issue token")
        .value
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn post_count(db: &DatabaseConnection) -> u64 {
    post::Entity::find().count(db).await.unwrap()
}

pub async fn category_pivot_count(db: &DatabaseConnection) -> u64 {
    post_category::Entity::find().count(db).await.unwrap()
}

pub async fn comment_pivot_count(db: &DatabaseConnection) -> u64 {
    post_comment::Entity::find().count(db).await.unwrap()
}

// === Website helpers ===

pub fn login_request(username: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_form([("username", username), ("password", password)])
}

/// The session cookie set by `resp`, if the session changed.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// Keeps the newest session cookie across a sequence of requests.
pub fn next_cookie<B>(current: Cookie<'static>, resp: &ServiceResponse<B>) -> Cookie<'static> {
    session_cookie(resp).unwrap_or(current)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Pulls the hidden CSRF token out of a rendered form.
pub fn csrf_from(html: &str) -> String {
    let marker = r#"name="csrfToken" value=""#;
    let start = html.find(marker).expect("form has no csrf field") + marker.len();
    let end = html[start..].find('"').unwrap();
    html[start..start + end].to_string()
}

/// Pulls the reset token out of a password reset email.
pub fn reset_token_from(email: &Email) -> String {
    let marker = "token=";
    let start = email.html.find(marker).expect("email has no reset link") + marker.len();
    let end = email.html[start..].find('"').unwrap();
    email.html[start..start + end].to_string()
}
