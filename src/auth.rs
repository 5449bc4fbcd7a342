use std::future::Future;
use std::pin::Pin;

use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use crate::config::API_TOKEN_BYTES;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{now, random_token, verify_password};
use crate::entities::{token, user};
use crate::models::models::{Credentials, LoginResponse};
use crate::session::WebSession;
use crate::AppState;

/// Checks a username/password pair against the stored hash.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, DbErr> {
    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(found.filter(|u| verify_password(password, &u.password)))
}

pub async fn issue_token<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<token::Model, DbErr> {
    token::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        value: ActiveValue::Set(random_token(API_TOKEN_BYTES)),
        user_id: ActiveValue::Set(user_id),
        created_at: ActiveValue::Set(now()),
    }
    .insert(db)
    .await
}

/// Resolves a bearer token to its user. Expired tokens and tokens whose user is
/// gone resolve to nothing.
pub async fn user_for_token<C: ConnectionTrait>(
    db: &C,
    value: &str,
    ttl: chrono::Duration,
) -> Result<Option<user::Model>, DbErr> {
    let Some((token, owner)) = token::Entity::find()
        .filter(token::Column::Value.eq(value))
        .find_also_related(user::Entity)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if now() - token.created_at > ttl {
        log::debug!("token {} expired", token.id);
        return Ok(None);
    }

    Ok(owner)
}

pub async fn revoke_token<C: ConnectionTrait>(db: &C, value: &str) -> Result<(), DbErr> {
    token::Entity::delete_many()
        .filter(token::Column::Value.eq(value))
        .exec(db)
        .await?;
    Ok(())
}

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let auth_header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn app_state(req: &HttpRequest) -> Option<web::Data<AppState>> {
    req.app_data::<web::Data<AppState>>().cloned()
}

type GuardFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>>>>;

/// Caller authenticated by `Authorization: Bearer <token>`; rejects with 401.
#[derive(Debug, Clone)]
pub struct ApiUser {
    pub user: user::Model,
    pub token: String,
}

impl FromRequest for ApiUser {
    type Error = ApiError;
    type Future = GuardFuture<Self>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError::InternalError("application state missing".to_string()))?;
            let token = token.ok_or(ApiError::Unauthorized)?;
            let user = user_for_token(&state.db, &token, state.settings.token_ttl)
                .await?
                .ok_or(ApiError::Unauthorized)?;
            Ok(ApiUser { user, token })
        })
    }
}

/// Website visitor logged in through the session cookie; otherwise redirected
/// to the login page. Use `Option<SiteUser>` on pages open to everyone.
#[derive(Debug, Clone)]
pub struct SiteUser(pub user::Model);

impl FromRequest for SiteUser {
    type Error = ApiError;
    type Future = GuardFuture<Self>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = app_state(req);
        let session = WebSession::new(req.get_session());

        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError::InternalError("application state missing".to_string()))?;
            let user_id = session
                .user_id()
                .ok()
                .flatten()
                .ok_or(ApiError::LoginRequired)?;
            let user = user::Entity::find_by_id(user_id)
                .one(&state.db)
                .await?
                .ok_or(ApiError::LoginRequired)?;
            Ok(SiteUser(user))
        })
    }
}

// === HTTP Handlers ===

pub async fn login_user(
    state: web::Data<AppState>,
    creds: web::Json<Credentials>,
) -> ApiResult<HttpResponse> {
    let user = authenticate(&state.db, &creds.username, &creds.password)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = issue_token(&state.db, user.id).await?;
    log::info!("issued api token for {}", user.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: token.value,
        user_id: user.id,
    }))
}

pub async fn logout_user(
    state: web::Data<AppState>,
    caller: ApiUser,
) -> ApiResult<HttpResponse> {
    revoke_token(&state.db, &caller.token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}
