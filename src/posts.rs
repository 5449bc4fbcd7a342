use std::collections::BTreeSet;
use std::sync::OnceLock;

use actix_web::{web, HttpResponse};
use ammonia::Builder;
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::ApiUser;
use crate::categories;
use crate::comments;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::{clean_names, now};
use crate::entities::{post, post_category, post_comment, user};
use crate::models::models::{
    CreateCategoryData, CreateCommentData, CreatePostData, PublicUser, SearchQuery,
};
use crate::AppState;

/// Title, description and body of a post as submitted by an author.
#[derive(Debug, Clone, Default)]
pub struct PostContent {
    pub title: String,
    pub description: String,
    pub body: String,
}

impl From<&CreatePostData> for PostContent {
    fn from(data: &CreatePostData) -> Self {
        Self {
            title: data.title.clone(),
            description: data.description.clone(),
            body: data.body.clone(),
        }
    }
}

pub async fn all<C: ConnectionTrait>(db: &C) -> Result<Vec<post::Model>, DbErr> {
    post::Entity::find().all(db).await
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> ApiResult<post::Model> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    content: PostContent,
) -> Result<post::Model, DbErr> {
    post::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        title: ActiveValue::Set(content.title.trim().to_string()),
        description: ActiveValue::Set(content.description.trim().to_string()),
        body: ActiveValue::Set(content.body),
        user_id: ActiveValue::Set(user_id),
        created_at: ActiveValue::Set(now()),
        updated_at: ActiveValue::Set(None),
    }
    .insert(db)
    .await
}

/// Replaces the content of `post` and records `owner` as its author.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    post: post::Model,
    owner: Uuid,
    content: PostContent,
) -> Result<post::Model, DbErr> {
    let mut model = post.into_active_model();
    model.title = ActiveValue::Set(content.title.trim().to_string());
    model.description = ActiveValue::Set(content.description.trim().to_string());
    model.body = ActiveValue::Set(content.body);
    model.user_id = ActiveValue::Set(owner);
    model.updated_at = ActiveValue::Set(Some(now()));
    model.update(db).await
}

pub fn ensure_owner(user: &user::Model, post: &post::Model) -> ApiResult<()> {
    if post.user_id != user.id {
        log::warn!("{} may not change post {}", user.username, post.id);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Deletes a post together with its pivot rows. Shared comments and
/// categories are left in place.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> ApiResult<()> {
    let txn = db.begin().await?;

    post_category::Entity::delete_many()
        .filter(post_category::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    post_comment::Entity::delete_many()
        .filter(post_comment::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    let res = post::Entity::delete_by_id(id).exec(&txn).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Post"));
    }

    txn.commit().await?;
    Ok(())
}

/// Posts whose title or body equals or contains `term`.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Posts whose title or body contains `term`. Wildcards in the term match
/// literally; case folding follows SQLite `LIKE` (ASCII only).
pub async fn search<C: ConnectionTrait>(db: &C, term: &str) -> Result<Vec<post::Model>, DbErr> {
    let pattern = like_pattern(term);
    post::Entity::find()
        .filter(
            Condition::any()
                .add(Expr::col(post::Column::Title).like(LikeExpr::new(&pattern).escape('\\')))
                .add(Expr::col(post::Column::Body).like(LikeExpr::new(&pattern).escape('\\'))),
        )
        .all(db)
        .await
}

pub async fn first<C: ConnectionTrait>(db: &C) -> Result<Option<post::Model>, DbErr> {
    post::Entity::find().one(db).await
}

pub async fn sorted<C: ConnectionTrait>(db: &C) -> Result<Vec<post::Model>, DbErr> {
    post::Entity::find()
        .order_by_asc(post::Column::Title)
        .all(db)
        .await
}

pub async fn owner<C: ConnectionTrait>(db: &C, post: &post::Model) -> ApiResult<user::Model> {
    post.find_related(user::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

/// Names to attach and detach so that `existing` becomes `submitted`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NameDiff {
    pub attach: Vec<String>,
    pub detach: Vec<String>,
}

pub fn name_diff(existing: &[String], submitted: &[String]) -> NameDiff {
    let existing: BTreeSet<&str> = existing.iter().map(String::as_str).collect();
    let submitted: BTreeSet<&str> = submitted.iter().map(String::as_str).collect();

    NameDiff {
        attach: submitted
            .difference(&existing)
            .map(|s| s.to_string())
            .collect(),
        detach: existing
            .difference(&submitted)
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Makes the post's categories exactly `names`, creating missing categories.
pub async fn sync_categories<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    let current = categories::for_post(db, post_id).await?;
    let current_names: Vec<String> = current.iter().map(|c| c.name.clone()).collect();
    let diff = name_diff(&current_names, names);

    for name in &diff.attach {
        let category = categories::find_or_create(db, name).await?;
        categories::attach(db, post_id, category.id).await?;
    }
    for category in current.iter().filter(|c| diff.detach.contains(&c.name)) {
        categories::detach(db, post_id, category.id).await?;
    }

    log::debug!(
        "post {}: +{} -{} categories",
        post_id,
        diff.attach.len(),
        diff.detach.len()
    );
    Ok(())
}

/// Makes the post's comments exactly `names`, creating missing comments.
pub async fn sync_comments<C: ConnectionTrait>(
    db: &C,
    post_id: Uuid,
    names: &[String],
) -> Result<(), DbErr> {
    let current = comments::for_post(db, post_id).await?;
    let current_names: Vec<String> = current.iter().map(|c| c.name.clone()).collect();
    let diff = name_diff(&current_names, names);

    for name in &diff.attach {
        let comment = comments::find_or_create(db, name, None).await?;
        comments::attach(db, post_id, comment.id).await?;
    }
    for comment in current.iter().filter(|c| diff.detach.contains(&c.name)) {
        comments::detach(db, post_id, comment.id).await?;
    }

    log::debug!(
        "post {}: +{} -{} comments",
        post_id,
        diff.attach.len(),
        diff.detach.len()
    );
    Ok(())
}

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"https?://[^\s<>]+").expect("Regex should compile"))
}

/// Turns a stored post body into safe HTML: text is escaped, bare URLs become
/// links and line breaks are kept.
pub fn render_body(body: &str) -> String {
    let mut html = String::with_capacity(body.len());
    let mut last = 0;

    for found in url_regex().find_iter(body) {
        html.push_str(&encode_text(&body[last..found.start()]));
        let url = found.as_str();
        html.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            encode_double_quoted_attribute(url),
            encode_text(url)
        ));
        last = found.end();
    }
    html.push_str(&encode_text(&body[last..]));

    let html = html.replace("\r\n", "\n").replace('\n', "<br>\n");

    Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(&html)
        .to_string()
}

// === HTTP Handlers ===

pub async fn get_all(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(all(&state.db).await?))
}

pub async fn create_post(
    state: web::Data<AppState>,
    caller: ApiUser,
    data: web::Json<CreatePostData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;
    let content = PostContent::from(&*data);

    let txn = state.db.begin().await?;
    let post = create(&txn, caller.user.id, content).await?;
    if let Some(names) = &data.categories {
        sync_categories(&txn, post.id, &clean_names(names.iter().map(String::as_str))).await?;
    }
    txn.commit().await?;

    log::info!("{} created post {}", caller.user.username, post.id);
    Ok(HttpResponse::Created().json(post))
}

pub async fn search_posts(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing search term".to_string()))?;

    Ok(HttpResponse::Ok().json(search(&state.db, term).await?))
}

pub async fn get_first(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let post = first(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn get_sorted(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(sorted(&state.db).await?))
}

pub async fn get_post(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(find(&state.db, id.into_inner()).await?))
}

pub async fn update_post(
    state: web::Data<AppState>,
    caller: ApiUser,
    id: web::Path<Uuid>,
    data: web::Json<CreatePostData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;
    let content = PostContent::from(&*data);

    let txn = state.db.begin().await?;
    let existing = find(&txn, id.into_inner()).await?;
    let post = update(&txn, existing, caller.user.id, content).await?;
    if let Some(names) = &data.categories {
        sync_categories(&txn, post.id, &clean_names(names.iter().map(String::as_str))).await?;
    }
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    caller: ApiUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = find(&state.db, id.into_inner()).await?;
    ensure_owner(&caller.user, &post)?;
    delete(&state.db, post.id).await?;
    log::info!("{} deleted post {}", caller.user.username, post.id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_user(state: web::Data<AppState>, id: web::Path<Uuid>) -> ApiResult<HttpResponse> {
    let post = find(&state.db, id.into_inner()).await?;
    let user = owner(&state.db, &post).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn get_comments(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments::for_post(&state.db, post.id).await?))
}

pub async fn add_new_comment(
    state: web::Data<AppState>,
    _caller: ApiUser,
    id: web::Path<Uuid>,
    data: web::Json<CreateCommentData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;
    let data = data.into_inner();

    let post = find(&state.db, id.into_inner()).await?;
    let comment = comments::find_or_create(&state.db, &data.name, data.message).await?;
    comments::attach(&state.db, post.id, comment.id).await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn attach_comment(
    state: web::Data<AppState>,
    _caller: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = find(&state.db, post_id).await?;
    let comment = comments::find(&state.db, comment_id).await?;

    let created = comments::attach(&state.db, post.id, comment.id).await?;
    Ok(attach_response(created).json(comment))
}

pub async fn detach_comment(
    state: web::Data<AppState>,
    _caller: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = find(&state.db, post_id).await?;
    comments::detach(&state.db, post.id, comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_categories(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = find(&state.db, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(categories::for_post(&state.db, post.id).await?))
}

pub async fn add_new_category(
    state: web::Data<AppState>,
    _caller: ApiUser,
    id: web::Path<Uuid>,
    data: web::Json<CreateCategoryData>,
) -> ApiResult<HttpResponse> {
    data.validate()?;

    let post = find(&state.db, id.into_inner()).await?;
    let category = categories::find_or_create(&state.db, &data.name).await?;
    categories::attach(&state.db, post.id, category.id).await?;

    Ok(HttpResponse::Created().json(category))
}

pub async fn attach_category(
    state: web::Data<AppState>,
    _caller: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (post_id, category_id) = path.into_inner();
    let post = find(&state.db, post_id).await?;
    let category = categories::find(&state.db, category_id).await?;

    let created = categories::attach(&state.db, post.id, category.id).await?;
    Ok(attach_response(created).json(category))
}

pub async fn detach_category(
    state: web::Data<AppState>,
    _caller: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (post_id, category_id) = path.into_inner();
    let post = find(&state.db, post_id).await?;
    categories::detach(&state.db, post.id, category_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn attach_response(created: bool) -> actix_web::HttpResponseBuilder {
    if created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    }
}
