use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user;

/// The externally safe projection of a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl From<&user::Model> for PublicUser {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            website: user.website.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
pub struct CreateUserData {
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "validation::alphanumeric")
    )]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Email is not a valid address"))]
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreatePostData {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "validation::not_blank")
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(
        length(max = 10000, message = "Body must be at most 10000 characters"),
        custom(function = "validation::not_blank")
    )]
    pub body: String,
    /// When present the post's categories are reconciled to exactly these names.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateCategoryData {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CreateCommentData {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "validation::not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchQuery {
    pub term: Option<String>,
}

/// Custom rules for `#[validate(custom(...))]`.
pub mod validation {
    use validator::ValidationError;

    pub fn alphanumeric(username: &str) -> Result<(), ValidationError> {
        if username.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(())
        } else {
            Err(ValidationError::new("alphanumeric")
                .with_message("Username must contain only letters and digits".into()))
        }
    }

    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new("blank").with_message("Must not be blank".into()))
        } else {
            Ok(())
        }
    }
}
