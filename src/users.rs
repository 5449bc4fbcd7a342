use actix_web::{web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::ApiUser;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::hash_password;
use crate::entities::{post, user};
use crate::models::models::{CreateUserData, PublicUser};
use crate::AppState;

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>, DbErr> {
    user::Entity::find().all(db).await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> ApiResult<user::Model> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

/// Validates and stores a new user with a hashed password.
///
/// Username and email uniqueness is checked up front for a readable message;
/// the unique indexes on `users` still reject a racing duplicate as a conflict.
pub async fn create<C: ConnectionTrait>(db: &C, data: CreateUserData) -> ApiResult<user::Model> {
    data.validate()?;

    let taken = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(data.username.as_str()))
                .add(user::Column::Email.eq(data.email.as_str())),
        )
        .one(db)
        .await?;
    if let Some(existing) = taken {
        let what = if existing.username == data.username {
            "Username"
        } else {
            "Email"
        };
        return Err(ApiError::Conflict(format!("{} already taken", what)));
    }

    let model = user::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        username: ActiveValue::Set(data.username),
        email: ActiveValue::Set(data.email),
        password: ActiveValue::Set(hash_password(&data.password)?),
        firstname: ActiveValue::Set(data.firstname),
        lastname: ActiveValue::Set(data.lastname),
        age: ActiveValue::Set(data.age),
        gender: ActiveValue::Set(data.gender),
        address: ActiveValue::Set(data.address),
        website: ActiveValue::Set(data.website),
    };

    Ok(model.insert(db).await?)
}

pub async fn posts_of<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<post::Model>, DbErr> {
    post::Entity::find()
        .filter(post::Column::UserId.eq(user_id))
        .all(db)
        .await
}

/// Editable profile fields; `None` clears the field.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
}

pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    update: ProfileUpdate,
) -> ApiResult<user::Model> {
    if update.email != user.email {
        if let Some(other) = find_by_email(db, &update.email).await? {
            if other.id != user.id {
                return Err(ApiError::Conflict("Email already taken".to_string()));
            }
        }
    }

    let mut model = user.into_active_model();
    model.email = ActiveValue::Set(update.email);
    model.firstname = ActiveValue::Set(update.firstname);
    model.lastname = ActiveValue::Set(update.lastname);
    model.age = ActiveValue::Set(update.age);
    model.gender = ActiveValue::Set(update.gender);
    model.address = ActiveValue::Set(update.address);
    model.website = ActiveValue::Set(update.website);

    Ok(model.update(db).await?)
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    password: &str,
) -> ApiResult<()> {
    let res = user::Entity::update_many()
        .col_expr(
            user::Column::Password,
            sea_orm::sea_query::Expr::value(hash_password(password)?),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("User"));
    }
    Ok(())
}

// === HTTP Handlers ===

pub async fn get_all(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let users: Vec<PublicUser> = all(&state.db).await?.iter().map(PublicUser::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

pub async fn create_user(
    state: web::Data<AppState>,
    caller: ApiUser,
    data: web::Json<CreateUserData>,
) -> ApiResult<HttpResponse> {
    let user = create(&state.db, data.into_inner()).await?;
    log::info!("{} created user {}", caller.user.username, user.username);
    Ok(HttpResponse::Created().json(PublicUser::from(&user)))
}

pub async fn get_user(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let user = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn get_user_posts(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts_of(&state.db, user.id).await?))
}
