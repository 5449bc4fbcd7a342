//! Website form and query payloads.

use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "crate::models::models::validation::alphanumeric")
    )]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub confirm_password: String,
    #[validate(email(message = "Email is not a valid address"))]
    pub email: String,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "crate::models::models::validation::not_blank")
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(
        length(max = 10000, message = "Body must be at most 10000 characters"),
        custom(function = "crate::models::models::validation::not_blank")
    )]
    pub body: String,
    /// Comma separated category names.
    #[serde(default)]
    pub categories: String,
    /// Comma separated comment names.
    #[serde(default)]
    pub comments: String,
    pub csrf_token: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct CommentForm {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "crate::models::models::validation::not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[validate(email(message = "Email is not a valid address"))]
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
    pub csrf_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ForgottenPasswordForm {
    pub email: String,
}

#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct MessageQuery {
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginQuery {
    pub error: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ResetQuery {
    pub token: Option<String>,
}

/// Empty form fields become `None`.
pub fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
