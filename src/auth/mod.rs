//! Request authentication.
//!
//! A task may declare `authentications`; the first entry is applied to every
//! step of the task as an `Authorization` header, unless the step sets that
//! header itself. Credentials may reference variables (`$token`), which are
//! substituted like any other request field.
//!
//! ```json
//! "authentications": [
//!   {"type": "basic", "username": "$user", "password": "secret"},
//!   {"type": "bearer", "token": "$token"},
//!   {"type": "oauth2", "accessToken": "abc"}
//! ]
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::variables::VariableManager;

/// One authentication declaration of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    /// HTTP Basic authentication (RFC 7617)
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    /// Bearer token authentication (RFC 6750)
    Bearer {
        #[serde(default)]
        token: String,
    },
    /// OAuth 2.0 access token, sent as a bearer token
    #[serde(rename = "oauth2")]
    OAuth2 {
        #[serde(default, rename = "accessToken")]
        access_token: String,
    },
    /// Any scheme this crate cannot apply (digest, oauth1, ...).
    #[serde(other)]
    Unsupported,
}

impl AuthConfig {
    /// The `type` tag of this declaration.
    pub fn scheme(&self) -> &'static str {
        match self {
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::OAuth2 { .. } => "oauth2",
            AuthConfig::Unsupported => "unsupported",
        }
    }

    /// Builds the `Authorization` header value, substituting variables in
    /// the credentials.
    ///
    /// Returns `None` for unsupported schemes and for an OAuth 2.0 entry
    /// without an access token.
    pub fn authorization(&self, scope: &VariableManager) -> Option<String> {
        match self {
            AuthConfig::Basic { username, password } => Some(basic_auth(
                &scope.replace_variables(username),
                &scope.replace_variables(password),
            )),
            AuthConfig::Bearer { token } => Some(bearer_token(&scope.replace_variables(token))),
            AuthConfig::OAuth2 { access_token } if !access_token.is_empty() => {
                Some(bearer_token(&scope.replace_variables(access_token)))
            }
            AuthConfig::OAuth2 { .. } | AuthConfig::Unsupported => None,
        }
    }
}

/// Encodes username and password into a Basic authentication header value.
///
/// # Examples
///
/// ```
/// use api_probe::auth::basic_auth;
///
/// assert_eq!(basic_auth("user", "pass123"), "Basic dXNlcjpwYXNzMTIz");
/// ```
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Formats a token into a Bearer authentication header value.
pub fn bearer_token(token: &str) -> String {
    format!("Bearer {}", token)
}
