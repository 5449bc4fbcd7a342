use actix_web::{web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::ApiUser;
use crate::core::errors::{ApiError, ApiResult};
use crate::entities::{comment, post, post_comment};
use crate::models::models::CreateCommentData;
use crate::AppState;

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<comment::Model>, DbErr> {
    comment::Entity::find().all(db).await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> ApiResult<comment::Model> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    message: Option<String>,
) -> Result<comment::Model, DbErr> {
    comment::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name.trim().to_string()),
        message: ActiveValue::Set(message.filter(|m| !m.trim().is_empty())),
    }
    .insert(db)
    .await
}

/// Reuses the first comment carrying `name`; `message` only applies to a new row.
pub async fn find_or_create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    message: Option<String>,
) -> Result<comment::Model, DbErr> {
    let name = name.trim();
    match comment::Entity::find()
        .filter(comment::Column::Name.eq(name))
        .one(db)
        .await?
    {
        Some(existing) => Ok(existing),
        None => create(db, name, message).await,
    }
}

pub async fn attach<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, DbErr> {
    let existing = post_comment::Entity::find()
        .filter(post_comment::Column::PostId.eq(post_id))
        .filter(post_comment::Column::CommentId.eq(comment_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    post_comment::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        post_id: ActiveValue::Set(post_id),
        comment_id: ActiveValue::Set(comment_id),
    }
    .insert(db)
    .await?;
    Ok(true)
}

pub async fn detach<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<bool, DbErr> {
    let res = post_comment::Entity::delete_many()
        .filter(post_comment::Column::PostId.eq(post_id))
        .filter(post_comment::Column::CommentId.eq(comment_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn for_post<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
) -> Result<Vec<comment::Model>, DbErr> {
    comment::Entity::find()
        .join(JoinType::InnerJoin, comment::Relation::PostComment.def())
        .filter(post_comment::Column::PostId.eq(post_id))
        .order_by_asc(comment::Column::Name)
        .all(db)
        .await
}

pub async fn posts_of<C: ConnectionTrait>(
    db: &C,
    comment_id: Uuid,
) -> Result<Vec<post::Model>, DbErr> {
    post::Entity::find()
        .join(JoinType::InnerJoin, post::Relation::PostComment.def())
        .filter(post_comment::Column::CommentId.eq(comment_id))
        .order_by_asc(post::Column::CreatedAt)
        .all(db)
        .await
}

// === HTTP Handlers ===

pub async fn get_all(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(all(&state.db).await?))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    _caller: ApiUser,
    data: web::Json<CreateCommentData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;
    let data = data.into_inner();
    let comment = create(&state.db, &data.name, data.message).await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_comment(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(find(&state.db, id.into_inner()).await?))
}

pub async fn get_posts(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let comment = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts_of(&state.db, comment.id).await?))
}
