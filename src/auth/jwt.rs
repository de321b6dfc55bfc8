use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::{AuthError, Claims};

/// Verifies (and, for tooling, issues) HS256 identity tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_expires_in", &self.token_expires_in)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: None,
            audience: None,
            token_expires_in: Duration::hours(1),
        }
    }

    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }

    /// Issue a token for `uid`, stamping issuer/audience and expiry.
    /// `extra` supplies optional claims such as `admin` or `email`.
    pub fn issue_token(&self, uid: &str, extra: Claims) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: uid.to_string(),
            iss: extra.iss.or_else(|| self.issuer.clone()),
            aud: extra.aud.or_else(|| self.audience.clone()),
            iat: now.timestamp() as usize,
            exp: (now + self.token_expires_in).timestamp() as usize,
            ..extra
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = vec!["exp", "sub"];
        match &self.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        // Configured issuer and audience claims are mandatory
        validation.set_required_spec_claims(required.as_slice());

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::Jwt(err),
            })?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }

        Ok(claims)
    }
}

/// Extract the bearer token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and the token is the second
/// space-separated part of the trimmed header.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    let auth_header = auth_header.trim();
    if !auth_header.to_lowercase().starts_with("bearer ") {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    let token = auth_header.split(' ').nth(1).unwrap_or_default().trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}
