use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::{authenticate, SiteUser};
use crate::core::errors::{validation_message, ApiError, ApiResult};
use crate::models::forms::{LoginForm, LoginQuery, MessageQuery, RegisterForm};
use crate::models::models::CreateUserData;
use crate::session::WebSession;
use crate::templates::{self, banner, Context};
use crate::users;
use crate::AppState;

use super::{redirect, redirect_with_message};

fn render_login(failed: bool, logged_in: bool) -> ApiResult<HttpResponse> {
    let error = if failed {
        banner(Some("There was a problem with your username or password."), "error")
    } else {
        String::new()
    };
    templates::render("login.html", "Log In", logged_in, Context::new().html("error", error))
}

pub async fn login_page(
    viewer: Option<SiteUser>,
    query: web::Query<LoginQuery>,
) -> ApiResult<HttpResponse> {
    render_login(query.error.unwrap_or(false), viewer.is_some())
}

pub async fn login(
    state: web::Data<AppState>,
    session: WebSession,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    match authenticate(&state.db, &form.username, &form.password).await? {
        Some(user) => {
            session.login(user.id)?;
            log::info!("{} logged in", user.username);
            Ok(redirect("/"))
        }
        None => {
            log::warn!("failed website login for {}", form.username);
            render_login(true, false)
        }
    }
}

pub async fn logout(session: WebSession) -> HttpResponse {
    session.logout();
    redirect("/login")
}

pub async fn register_page(
    viewer: Option<SiteUser>,
    query: web::Query<MessageQuery>,
) -> ApiResult<HttpResponse> {
    let ctx = Context::new().html("message", banner(query.message.as_deref(), "error"));
    templates::render("register.html", "Register", viewer.is_some(), ctx)
}

pub async fn register(
    state: web::Data<AppState>,
    session: WebSession,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    if form.password != form.confirm_password {
        return Ok(redirect_with_message("/register", "Passwords don't match"));
    }
    if let Err(errors) = form.validate() {
        return Ok(redirect_with_message("/register", &validation_message(&errors)));
    }

    let data = CreateUserData {
        username: form.username.trim().to_string(),
        password: form.password,
        email: form.email.trim().to_string(),
        ..CreateUserData::default()
    };

    match users::create(&state.db, data).await {
        Ok(user) => {
            session.login(user.id)?;
            log::info!("registered {}", user.username);
            Ok(redirect("/"))
        }
        Err(ApiError::BadRequest(msg)) | Err(ApiError::Conflict(msg)) => {
            Ok(redirect_with_message("/register", &msg))
        }
        Err(err) => Err(err),
    }
}
