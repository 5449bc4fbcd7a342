use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::SiteUser;
use crate::core::errors::{validation_message, ApiError, ApiResult};
use crate::models::forms::{non_empty, MessageQuery, ProfileForm};
use crate::session::WebSession;
use crate::templates::{self, attr, banner, Context};
use crate::users::{self, ProfileUpdate};
use crate::AppState;

use super::redirect_with_message;

fn or_blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

pub async fn show(user: SiteUser, query: web::Query<MessageQuery>) -> ApiResult<HttpResponse> {
    let user = user.0;
    let ctx = Context::new()
        .html("message", banner(query.message.as_deref(), "info"))
        .text("id", user.id.to_string())
        .text("username", &user.username)
        .text("email", &user.email)
        .text("firstname", or_blank(&user.firstname))
        .text("lastname", or_blank(&user.lastname))
        .text("age", or_blank(&user.age))
        .text("gender", or_blank(&user.gender))
        .text("address", or_blank(&user.address))
        .text("website", or_blank(&user.website));
    templates::render("profile.html", "Your Profile", true, ctx)
}

pub async fn edit_page(user: SiteUser, session: WebSession) -> ApiResult<HttpResponse> {
    let user = user.0;
    let token = session.issue_csrf_token()?;

    let ctx = Context::new()
        .text("csrf_token", token)
        .html("email", attr(&user.email))
        .html("firstname", attr(or_blank(&user.firstname)))
        .html("lastname", attr(or_blank(&user.lastname)))
        .html("age", attr(or_blank(&user.age)))
        .html("gender", attr(or_blank(&user.gender)))
        .html("address", attr(or_blank(&user.address)))
        .html("website", attr(or_blank(&user.website)));
    templates::render("profile_edit.html", "Edit Profile", true, ctx)
}

pub async fn edit(
    state: web::Data<AppState>,
    user: SiteUser,
    session: WebSession,
    form: web::Form<ProfileForm>,
) -> ApiResult<HttpResponse> {
    session.check_csrf_token(form.csrf_token.as_deref())?;
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Ok(redirect_with_message("/profile", &validation_message(&errors)));
    }

    let update = ProfileUpdate {
        email: form.email.trim().to_string(),
        firstname: non_empty(form.firstname),
        lastname: non_empty(form.lastname),
        age: non_empty(form.age),
        gender: non_empty(form.gender),
        address: non_empty(form.address),
        website: non_empty(form.website),
    };

    match users::update_profile(&state.db, user.0, update).await {
        Ok(user) => {
            log::info!("{} updated their profile", user.username);
            Ok(redirect_with_message("/profile", "Profile updated"))
        }
        Err(ApiError::BadRequest(msg)) | Err(ApiError::Conflict(msg)) => {
            Ok(redirect_with_message("/profile", &msg))
        }
        Err(err) => Err(err),
    }
}
