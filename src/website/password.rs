use actix_web::{web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::RESET_TOKEN_BYTES;
use crate::core::errors::{validation_message, ApiError, ApiResult};
use crate::core::helpers::{now, random_token};
use crate::entities::{reset_password_token, user};
use crate::mail::reset_password_email;
use crate::models::forms::{ForgottenPasswordForm, ResetPasswordForm, ResetQuery};
use crate::session::WebSession;
use crate::templates::{self, banner, Context};
use crate::users;
use crate::AppState;

use super::redirect;

pub async fn issue_reset_token<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    ttl: chrono::Duration,
) -> Result<reset_password_token::Model, DbErr> {
    let created_at = now();
    reset_password_token::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        token: ActiveValue::Set(random_token(RESET_TOKEN_BYTES)),
        user_id: ActiveValue::Set(user_id),
        created_at: ActiveValue::Set(created_at),
        expires_at: ActiveValue::Set(created_at + ttl),
    }
    .insert(db)
    .await
}

/// Looks up a reset token that has not yet expired.
pub async fn find_reset_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<reset_password_token::Model>, DbErr> {
    let found = reset_password_token::Entity::find()
        .filter(reset_password_token::Column::Token.eq(token))
        .one(db)
        .await?;
    Ok(found.filter(|t| !t.is_expired(now())))
}

/// Spends `token` and stores `password` for its user. The token row must be
/// deleted by this call, so a second consumption fails.
pub async fn consume_reset_token<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    token: &str,
    password: &str,
) -> ApiResult<user::Model> {
    let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());
    let txn = db.begin().await?;

    let row = find_reset_token(&txn, token).await?.ok_or_else(invalid)?;
    let res = reset_password_token::Entity::delete_many()
        .filter(reset_password_token::Column::Id.eq(row.id))
        .exec(&txn)
        .await?;
    if res.rows_affected != 1 {
        return Err(invalid());
    }

    users::set_password(&txn, row.user_id, password).await?;
    let user = users::find(&txn, row.user_id).await?;
    txn.commit().await?;
    Ok(user)
}

fn render_reset(error: Option<&str>) -> ApiResult<HttpResponse> {
    let ctx = Context::new().html("error", banner(error, "error"));
    templates::render("reset_password.html", "Reset Password", false, ctx)
}

pub async fn forgotten_page() -> ApiResult<HttpResponse> {
    templates::render(
        "forgotten_password.html",
        "Reset Your Password",
        false,
        Context::new(),
    )
}

pub async fn forgotten(
    state: web::Data<AppState>,
    form: web::Form<ForgottenPasswordForm>,
) -> ApiResult<HttpResponse> {
    let email = form.email.trim();

    match users::find_by_email(&state.db, email).await? {
        Some(user) => {
            let token =
                issue_reset_token(&state.db, user.id, state.settings.reset_token_ttl).await?;
            let message = reset_password_email(
                &state.settings.public_url,
                &user.email,
                &user.username,
                &token.token,
            );
            state.mailer.send(message).await?;
            log::info!("password reset requested for {}", user.username);
        }
        None => log::debug!("password reset requested for unknown address"),
    }

    templates::render(
        "forgotten_password_confirmed.html",
        "Password Reset Email Sent",
        false,
        Context::new(),
    )
}

pub async fn reset_page(
    state: web::Data<AppState>,
    session: WebSession,
    query: web::Query<ResetQuery>,
) -> ApiResult<HttpResponse> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return render_reset(Some("A reset token is required."));
    };

    if find_reset_token(&state.db, token).await?.is_none() {
        log::warn!("unknown or expired reset token presented");
        return Ok(redirect("/"));
    }

    session.set_reset_token(token)?;
    render_reset(None)
}

pub async fn reset(
    state: web::Data<AppState>,
    session: WebSession,
    form: web::Form<ResetPasswordForm>,
) -> ApiResult<HttpResponse> {
    if form.password != form.confirm_password {
        return render_reset(Some("Passwords don't match."));
    }
    if let Err(errors) = form.validate() {
        return render_reset(Some(&validation_message(&errors)));
    }

    let token = session
        .reset_token()?
        .ok_or_else(|| ApiError::BadRequest("No password reset in progress".to_string()))?;

    let user = consume_reset_token(&state.db, &token, &form.password).await?;
    session.clear_reset_token();
    log::info!("password reset for {}", user.username);

    Ok(redirect("/login"))
}
