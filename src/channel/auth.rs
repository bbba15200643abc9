//! # Bearer credential interceptor.
//!
//! [`AuthInterceptor`] runs on every outbound call issued through the channel,
//! unary or streaming, and appends the access token under the `authorization`
//! metadata key. Caller-supplied metadata, including an existing
//! `authorization` entry, is left in place.

use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::error::ConfigError;

/// Metadata key carrying the access token.
pub const AUTHORIZATION: &str = "authorization";

/// Appends the access token to request metadata.
#[derive(Clone)]
pub struct AuthInterceptor {
    token: AsciiMetadataValue,
}

impl AuthInterceptor {
    /// Validates the token once so the interceptor itself never fails.
    pub fn new(token: &str) -> Result<Self, ConfigError> {
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let token =
            AsciiMetadataValue::try_from(token).map_err(|_| ConfigError::InvalidToken)?;
        Ok(Self { token })
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .append(AUTHORIZATION, self.token.clone());
        Ok(request)
    }
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_authorization() {
        let mut auth = AuthInterceptor::new("jwt-token").unwrap();
        let req = auth.call(Request::new(())).unwrap();
        let values: Vec<_> = req.metadata().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "jwt-token");
    }

    #[test]
    fn test_keeps_caller_metadata() {
        let mut auth = AuthInterceptor::new("jwt-token").unwrap();
        let mut req = Request::new(());
        req.metadata_mut()
            .insert("x-request-id", AsciiMetadataValue::from_static("42"));
        req.metadata_mut()
            .insert(AUTHORIZATION, AsciiMetadataValue::from_static("caller"));

        let req = auth.call(req).unwrap();
        assert_eq!(req.metadata().get("x-request-id").unwrap(), "42");
        let values: Vec<_> = req.metadata().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "caller");
        assert_eq!(values[1], "jwt-token");
    }

    #[test]
    fn test_rejects_empty_token() {
        assert_eq!(
            AuthInterceptor::new("").unwrap_err(),
            ConfigError::MissingToken
        );
    }

    #[test]
    fn test_rejects_non_ascii_token() {
        assert_eq!(
            AuthInterceptor::new("tok\nen").unwrap_err(),
            ConfigError::InvalidToken
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = AuthInterceptor::new("secret").unwrap();
        assert!(!format!("{auth:?}").contains("secret"));
    }
}
