use std::future::{ready, Ready};

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::config::CSRF_TOKEN_BYTES;
use crate::core::errors::{ApiError, ApiResult};
use crate::core::helpers::random_token;

const USER_ID_KEY: &str = "user_id";
const CSRF_TOKEN_KEY: &str = "csrf_token";
const RESET_TOKEN_KEY: &str = "reset_token";

/// Typed view over the cookie session of the website.
///
/// Every value the site keeps between requests goes through one of these
/// accessors, so the raw keys never leak into handlers.
pub struct WebSession(Session);

impl WebSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn user_id(&self) -> ApiResult<Option<Uuid>> {
        Ok(self.0.get::<Uuid>(USER_ID_KEY)?)
    }

    pub fn login(&self, user_id: Uuid) -> ApiResult<()> {
        self.0.renew();
        self.0.insert(USER_ID_KEY, user_id)?;
        Ok(())
    }

    pub fn logout(&self) {
        self.0.purge();
    }

    /// Stores a fresh token for the form about to be rendered and returns it.
    pub fn issue_csrf_token(&self) -> ApiResult<String> {
        let token = random_token(CSRF_TOKEN_BYTES);
        self.0.insert(CSRF_TOKEN_KEY, &token)?;
        Ok(token)
    }

    /// Consumes the stored token; absent or different tokens are rejected.
    pub fn check_csrf_token(&self, presented: Option<&str>) -> ApiResult<()> {
        let expected = match self.0.remove_as::<String>(CSRF_TOKEN_KEY) {
            Some(Ok(token)) => Some(token),
            _ => None,
        };
        match (expected, presented) {
            (Some(expected), Some(presented)) if expected == presented => Ok(()),
            _ => {
                log::warn!("csrf token mismatch");
                Err(ApiError::BadRequest("Invalid CSRF token".to_string()))
            }
        }
    }

    pub fn set_reset_token(&self, token: &str) -> ApiResult<()> {
        self.0.insert(RESET_TOKEN_KEY, token)?;
        Ok(())
    }

    pub fn reset_token(&self) -> ApiResult<Option<String>> {
        Ok(self.0.get::<String>(RESET_TOKEN_KEY)?)
    }

    pub fn clear_reset_token(&self) {
        self.0.remove(RESET_TOKEN_KEY);
    }
}

impl FromRequest for WebSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(WebSession(req.get_session())))
    }
}
