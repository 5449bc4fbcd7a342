use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use rust_embed::RustEmbed;

use crate::core::errors::{ApiError, ApiResult};

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

/// Values substituted into `{{key}}` placeholders. Text values are escaped on
/// insertion; html values are inserted as given.
#[derive(Debug, Default, Clone)]
pub struct Context {
    values: Vec<(String, String)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.values
            .push((key.to_string(), escape(value.as_ref())));
        self
    }

    pub fn html(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.push((key.to_string(), value.into()));
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).to_string()
}

pub fn attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).to_string()
}

/// Replaces every `{{key}}` in `template`. Unknown keys render as nothing and
/// inserted values are never scanned again.
pub fn fill(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                if let Some(value) = ctx.get(key) {
                    out.push_str(value);
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn load(name: &str) -> ApiResult<String> {
    let file = Templates::get(name)
        .ok_or_else(|| ApiError::InternalError(format!("template {} not found", name)))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| ApiError::InternalError(format!("template {}: {}", name, e)))
}

fn nav(logged_in: bool) -> &'static str {
    if logged_in {
        r#"<a href="/">Home</a>
<a href="/posts/create">Create a Post</a>
<a href="/categories">Categories</a>
<a href="/profile">Profile</a>
<form class="inline" method="post" action="/logout"><button type="submit">Log out</button></form>"#
    } else {
        r#"<a href="/categories">Categories</a>
<a href="/login">Log in</a>
<a href="/register">Register</a>"#
    }
}

/// Renders `name` inside the shared layout.
pub fn render(name: &str, title: &str, logged_in: bool, ctx: Context) -> ApiResult<HttpResponse> {
    let content = fill(&load(name)?, &ctx);
    let page = Context::new()
        .text("title", title)
        .html("nav", nav(logged_in))
        .html("content", content);
    let html = fill(&load("base.html")?, &page);

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

/// `<div class="banner">` for a flash message, or nothing.
pub fn banner(message: Option<&str>, class: &str) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!(
            r#"<div class="banner {}">{}</div>"#,
            attr(class),
            escape(message)
        ),
        None => String::new(),
    }
}
