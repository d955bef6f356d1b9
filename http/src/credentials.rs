//! Credential injection for outgoing requests.
//!
//! Credentials are an explicit dependency of the layer that constructs
//! operations. An endpoint asks its provider for a token when it builds a
//! request; nothing inside an operation reads ambient session state.

use crate::error::HttpError;

/// A source of bearer tokens for outgoing requests.
///
/// Returning `None` means "send the request unauthenticated", which is
/// appropriate for public endpoints. A rejected credential surfaces later
/// as [`HttpError::Unauthorized`] when the server answers 401.
pub trait CredentialProvider: Send + Sync {
    /// The bearer token to attach, if any
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed bearer token supplied at construction.
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Create a provider around an already-obtained token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from an environment variable
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingCredentials`] if the variable is unset
    /// or empty.
    pub fn from_env(var: &str) -> Result<Self, HttpError> {
        match std::env::var(var) {
            Ok(token) if !token.is_empty() => Ok(Self { token }),
            _ => Err(HttpError::MissingCredentials(format!(
                "environment variable {var} is not set"
            ))),
        }
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Provider for unauthenticated endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_yields_its_token() {
        let provider = StaticToken::new("secret-token");
        assert_eq!(provider.bearer_token().as_deref(), Some("secret-token"));
    }

    #[test]
    fn no_credentials_yields_nothing() {
        assert!(NoCredentials.bearer_token().is_none());
    }

    #[test]
    fn from_env_rejects_a_missing_variable() {
        let result = StaticToken::from_env("RESOURCE_SLICE_TEST_UNSET_TOKEN");
        assert!(matches!(result, Err(HttpError::MissingCredentials(_))));
    }
}
