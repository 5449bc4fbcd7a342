use actix_web::{web, HttpResponse};
use sea_orm::TransactionTrait;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SiteUser;
use crate::categories;
use crate::comments;
use crate::core::errors::{validation_message, ApiResult};
use crate::core::helpers::split_names;
use crate::models::forms::{non_empty, CommentForm, MessageQuery, PostForm};
use crate::posts::{self, PostContent};
use crate::session::WebSession;
use crate::templates::{self, attr, banner, Context};
use crate::AppState;

use super::{category_items, comment_items, redirect, redirect_with_message};

impl From<&PostForm> for PostContent {
    fn from(form: &PostForm) -> Self {
        Self {
            title: form.title.clone(),
            description: form.description.clone(),
            body: form.body.clone(),
        }
    }
}

struct FormValues {
    title: String,
    description: String,
    body: String,
    categories: String,
    comments: String,
}

fn render_form(
    title: &str,
    action: &str,
    submit: &str,
    csrf_token: &str,
    values: FormValues,
) -> ApiResult<HttpResponse> {
    let ctx = Context::new()
        .text("action", action)
        .text("submit", submit)
        .text("csrf_token", csrf_token)
        .html("post_title", attr(&values.title))
        .html("post_description", attr(&values.description))
        .text("post_body", values.body)
        .html("post_categories", attr(&values.categories))
        .html("post_comments", attr(&values.comments));
    templates::render("post_form.html", title, true, ctx)
}

pub async fn show(
    state: web::Data<AppState>,
    viewer: Option<SiteUser>,
    id: web::Path<Uuid>,
    query: web::Query<MessageQuery>,
) -> ApiResult<HttpResponse> {
    let post = posts::find(&state.db, id.into_inner()).await?;
    let owner = posts::owner(&state.db, &post).await?;
    let categories = categories::for_post(&state.db, post.id).await?;
    let comments = comments::for_post(&state.db, post.id).await?;

    let owner_controls = match &viewer {
        Some(SiteUser(user)) if user.id == post.user_id => format!(
            r#"<div class="owner-controls">
<a href="/posts/{id}/edit">Edit</a>
<form class="inline" method="post" action="/posts/{id}/delete"><button type="submit">Delete</button></form>
</div>"#,
            id = post.id
        ),
        _ => String::new(),
    };
    let comment_form = if viewer.is_some() {
        format!(
            r#"<h2>Add a comment</h2>
<form method="post" action="/posts/{}">
  <label for="name">Name</label>
  <input type="text" id="name" name="name" required>
  <label for="message">Message</label>
  <textarea id="message" name="message" rows="3"></textarea>
  <button type="submit">Comment</button>
</form>"#,
            post.id
        )
    } else {
        String::new()
    };

    let ctx = Context::new()
        .html("message", banner(query.message.as_deref(), "info"))
        .text("description", &post.description)
        .text("owner_id", owner.id.to_string())
        .text("owner", &owner.username)
        .text("created_at", post.created_at.format("%Y-%m-%d %H:%M").to_string())
        .html("body", posts::render_body(&post.body))
        .html("categories", category_items(&categories))
        .html("comments", comment_items(&comments))
        .html("owner_controls", owner_controls)
        .html("comment_form", comment_form);
    templates::render("post.html", &post.title, viewer.is_some(), ctx)
}

pub async fn add_comment(
    state: web::Data<AppState>,
    _user: SiteUser,
    id: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> ApiResult<HttpResponse> {
    let post = posts::find(&state.db, id.into_inner()).await?;
    let location = format!("/posts/{}", post.id);
    let form = form.into_inner();

    if let Err(errors) = form.validate() {
        return Ok(redirect_with_message(&location, &validation_message(&errors)));
    }

    let comment = comments::find_or_create(&state.db, &form.name, non_empty(form.message)).await?;
    comments::attach(&state.db, post.id, comment.id).await?;

    Ok(redirect_with_message(
        &location,
        "Comment added to the Post successfully!",
    ))
}

pub async fn create_page(_user: SiteUser, session: WebSession) -> ApiResult<HttpResponse> {
    let token = session.issue_csrf_token()?;
    render_form(
        "Add New Post",
        "/posts/create",
        "Publish",
        &token,
        FormValues {
            title: String::new(),
            description: String::new(),
            body: String::new(),
            categories: String::new(),
            comments: String::new(),
        },
    )
}

pub async fn create(
    state: web::Data<AppState>,
    user: SiteUser,
    session: WebSession,
    form: web::Form<PostForm>,
) -> ApiResult<HttpResponse> {
    session.check_csrf_token(form.csrf_token.as_deref())?;
    form.validate()?;
    let content = PostContent::from(&*form);

    let txn = state.db.begin().await?;
    let post = posts::create(&txn, user.0.id, content).await?;
    posts::sync_categories(&txn, post.id, &split_names(&form.categories)).await?;
    posts::sync_comments(&txn, post.id, &split_names(&form.comments)).await?;
    txn.commit().await?;

    log::info!("{} published post {}", user.0.username, post.id);
    Ok(redirect_with_message("/", "Blog Post posted successfully!"))
}

pub async fn edit_page(
    state: web::Data<AppState>,
    user: SiteUser,
    session: WebSession,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = posts::find(&state.db, id.into_inner()).await?;
    posts::ensure_owner(&user.0, &post)?;

    let categories = categories::for_post(&state.db, post.id).await?;
    let comments = comments::for_post(&state.db, post.id).await?;
    let token = session.issue_csrf_token()?;

    render_form(
        "Edit Post",
        &format!("/posts/{}/edit", post.id),
        "Update",
        &token,
        FormValues {
            title: post.title,
            description: post.description,
            body: post.body,
            categories: categories
                .into_iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", "),
            comments: comments
                .into_iter()
                .map(|c| c.name)
                .collect::<Vec<_>>()
                .join(", "),
        },
    )
}

/// Saves the new content and reconciles categories and comments by name in
/// a single transaction.
pub async fn edit(
    state: web::Data<AppState>,
    user: SiteUser,
    session: WebSession,
    id: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> ApiResult<HttpResponse> {
    session.check_csrf_token(form.csrf_token.as_deref())?;
    form.validate()?;
    let content = PostContent::from(&*form);

    let txn = state.db.begin().await?;
    let existing = posts::find(&txn, id.into_inner()).await?;
    posts::ensure_owner(&user.0, &existing)?;
    let post = posts::update(&txn, existing, user.0.id, content).await?;
    posts::sync_categories(&txn, post.id, &split_names(&form.categories)).await?;
    posts::sync_comments(&txn, post.id, &split_names(&form.comments)).await?;
    txn.commit().await?;

    Ok(redirect(&format!("/posts/{}", post.id)))
}

pub async fn delete(
    state: web::Data<AppState>,
    user: SiteUser,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = posts::find(&state.db, id.into_inner()).await?;
    posts::ensure_owner(&user.0, &post)?;
    posts::delete(&state.db, post.id).await?;

    log::info!("{} deleted post {}", user.0.username, post.id);
    Ok(redirect("/"))
}
