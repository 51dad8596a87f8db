//! Bearer-token sources. Signing in happens in the external identity provider;
//! this crate only asks for the current token before each request.

use async_trait::async_trait;

use crate::errors::ApiError;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the current access token, or `ApiError::MissingToken`.
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// A token fixed at construction time, e.g. pasted from the identity provider
/// into `TT_API_TOKEN`.
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn from_option(token: Option<String>) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ApiError> {
        match self.0.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ApiError::MissingToken),
        }
    }
}
