use actix_web::{web, HttpResponse};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::ApiUser;
use crate::core::errors::{ApiError, ApiResult};
use crate::entities::{category, post, post_category};
use crate::models::models::CreateCategoryData;
use crate::AppState;

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find().all(db).await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> ApiResult<category::Model> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))
}

pub async fn create<C: ConnectionTrait>(db: &C, name: &str) -> Result<category::Model, DbErr> {
    category::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(name.trim().to_string()),
    }
    .insert(db)
    .await
}

/// Category names are not unique; the first row with the name wins.
pub async fn find_or_create<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<category::Model, DbErr> {
    let name = name.trim();
    match category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?
    {
        Some(existing) => Ok(existing),
        None => create(db, name).await,
    }
}

/// Links a category to a post. Returns `false` when the link already existed.
pub async fn attach<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    category_id: Uuid,
) -> Result<bool, DbErr> {
    let existing = post_category::Entity::find()
        .filter(post_category::Column::PostId.eq(post_id))
        .filter(post_category::Column::CategoryId.eq(category_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    post_category::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        post_id: ActiveValue::Set(post_id),
        category_id: ActiveValue::Set(category_id),
    }
    .insert(db)
    .await?;
    Ok(true)
}

/// Removes the pivot row only; the category itself stays.
pub async fn detach<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    category_id: Uuid,
) -> Result<bool, DbErr> {
    let res = post_category::Entity::delete_many()
        .filter(post_category::Column::PostId.eq(post_id))
        .filter(post_category::Column::CategoryId.eq(category_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

pub async fn for_post<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find()
        .join(JoinType::InnerJoin, category::Relation::PostCategory.def())
        .filter(post_category::Column::PostId.eq(post_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
}

pub async fn posts_of<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
) -> Result<Vec<post::Model>, DbErr> {
    post::Entity::find()
        .join(JoinType::InnerJoin, post::Relation::PostCategory.def())
        .filter(post_category::Column::CategoryId.eq(category_id))
        .order_by_asc(post::Column::CreatedAt)
        .all(db)
        .await
}

// === HTTP Handlers ===

pub async fn get_all(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(all(&state.db).await?))
}

pub async fn create_category(
    state: web::Data<AppState>,
    _caller: ApiUser,
    data: web::Json<CreateCategoryData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;
    let category = create(&state.db, &data.name).await?;
    Ok(HttpResponse::Created().json(category))
}

pub async fn get_category(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(find(&state.db, id.into_inner()).await?))
}

pub async fn get_posts(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let category = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts_of(&state.db, category.id).await?))
}
