use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Login required")]
    LoginRequired,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal Error: {0}")]
    InternalError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::LoginRequired => StatusCode::SEE_OTHER,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => {
                log::warn!("{}", self);
                msg.as_str()
            }
            ApiError::Unauthorized => {
                log::warn!("rejected unauthenticated api request");
                "Unauthorized"
            }
            ApiError::LoginRequired => {
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, "/login"))
                    .finish();
            }
            ApiError::Forbidden => "Forbidden",
            ApiError::NotFound(msg) => {
                log::debug!("{}", self);
                msg.as_str()
            }
            ApiError::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                "Internal server error"
            }
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ApiError::Conflict(format!("Already exists: {}", detail))
            }
            _ => ApiError::InternalError(format!("database error: {}", err)),
        }
    }
}

/// Every failed rule's message, sorted so the text is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_values()
        .flat_map(|errs| errs.iter())
        .map(|err| match &err.message {
            Some(message) => message.to_string(),
            None => err.code.to_string(),
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::BadRequest(validation_message(&errors))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<actix_session::SessionGetError> for ApiError {
    fn from(err: actix_session::SessionGetError) -> Self {
        ApiError::InternalError(format!("session read failed: {}", err))
    }
}

impl From<actix_session::SessionInsertError> for ApiError {
    fn from(err: actix_session::SessionInsertError) -> Self {
        ApiError::InternalError(format!("session write failed: {}", err))
    }
}

/// Turns extractor failures (malformed JSON, forms, paths, queries) into 400s.
pub fn bad_payload(err: impl std::fmt::Display) -> actix_web::Error {
    ApiError::BadRequest(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("Post").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn login_required_redirects_to_login() {
        let resp = ApiError::LoginRequired.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[test]
    fn validation_errors_become_bad_request() {
        use validator::ValidationError;

        let mut errors = ValidationErrors::new();
        errors.add("title", ValidationError::new("blank").with_message("Must not be blank".into()));
        errors.add("body", ValidationError::new("length"));

        let err: ApiError = errors.into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Must not be blank; length"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn record_not_found_is_internal() {
        let err: ApiError = DbErr::RecordNotFound("posts".into()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
    }
}
