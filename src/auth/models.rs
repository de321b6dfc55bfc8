use serde::{Deserialize, Serialize};

/// Identity token claims.
///
/// Mirrors the subset of ID-token claims the API reads: `sub` is the user id,
/// `admin` / `role` are custom claims set by the identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.admin == Some(true) || self.role.as_deref() == Some("admin")
    }
}

/// Verified caller, stored in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub claims: Claims,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            uid: claims.sub.clone(),
            claims,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}
