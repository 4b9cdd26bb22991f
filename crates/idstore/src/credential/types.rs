//! Presented credentials

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Credential kind tag for username/password credentials
pub const USERNAME_PASSWORD: &str = "UsernamePasswordCredential";
/// Credential kind tag for HTTP basic authentication headers
pub const BASIC_AUTHENTICATION: &str = "BasicAuthenticationCredential";
/// Credential kind tag for opaque tokens
pub const TOKEN: &str = "TokenCredential";

/// Borrowed caller/password pair extracted from a credential
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UsernamePassword<'a> {
    pub caller: Option<&'a str>,
    pub password: &'a str,
}

impl std::fmt::Debug for UsernamePassword<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernamePassword")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

/// A credential presented for validation
pub trait Credential: Send + Sync + std::fmt::Debug {
    /// Kind tag matched against stored credential records and registry keys
    fn kind(&self) -> &str;

    /// Caller the credential claims to belong to, if known
    fn caller(&self) -> Option<&str>;

    /// Whether the credential is well formed
    fn is_valid(&self) -> bool {
        true
    }

    /// Username/password view, for credentials that carry one
    fn as_username_password(&self) -> Option<UsernamePassword<'_>> {
        None
    }

    /// Token view, for credentials that carry one
    fn as_token(&self) -> Option<&str> {
        None
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UsernamePasswordCredential {
    caller: String,
    password: String,
}

impl UsernamePasswordCredential {
    #[must_use]
    pub fn new(caller: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for UsernamePasswordCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernamePasswordCredential")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

impl Credential for UsernamePasswordCredential {
    fn kind(&self) -> &str {
        USERNAME_PASSWORD
    }

    fn caller(&self) -> Option<&str> {
        Some(&self.caller)
    }

    fn as_username_password(&self) -> Option<UsernamePassword<'_>> {
        Some(UsernamePassword {
            caller: Some(&self.caller),
            password: &self.password,
        })
    }
}

/// Credential parsed from an HTTP `Authorization: Basic` header value.
///
/// The header is base64 of `caller:password`, decoded as ISO-8859-1 and split
/// at the first colon. A header that cannot be parsed produces a credential
/// with no caller, which never validates.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthenticationCredential {
    caller: Option<String>,
    password: String,
}

impl BasicAuthenticationCredential {
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let encoded = header
            .trim()
            .strip_prefix("Basic ")
            .unwrap_or_else(|| header.trim());

        let Ok(bytes) = STANDARD.decode(encoded.trim()) else {
            tracing::debug!("Basic authentication header is not valid base64");
            return Self::malformed();
        };

        // ISO-8859-1 maps every byte to the code point of the same value
        let decoded: String = bytes.iter().map(|&b| char::from(b)).collect();

        match decoded.split_once(':') {
            Some((caller, password)) => Self {
                caller: Some(caller.to_string()),
                password: password.to_string(),
            },
            None => {
                tracing::debug!("Basic authentication header has no separator");
                Self::malformed()
            }
        }
    }

    const fn malformed() -> Self {
        Self {
            caller: None,
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for BasicAuthenticationCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthenticationCredential")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

impl Credential for BasicAuthenticationCredential {
    fn kind(&self) -> &str {
        BASIC_AUTHENTICATION
    }

    fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    fn is_valid(&self) -> bool {
        self.caller.is_some()
    }

    fn as_username_password(&self) -> Option<UsernamePassword<'_>> {
        Some(UsernamePassword {
            caller: self.caller.as_deref(),
            password: &self.password,
        })
    }
}

/// Opaque token, optionally bound to a caller
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredential {
    caller: Option<String>,
    token: String,
}

impl TokenCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            caller: None,
            token: token.into(),
        }
    }

    #[must_use]
    pub fn for_caller(caller: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            caller: Some(caller.into()),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCredential")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

impl Credential for TokenCredential {
    fn kind(&self) -> &str {
        TOKEN
    }

    fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }

    fn as_token(&self) -> Option<&str> {
        Some(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_password() {
        let credential = UsernamePasswordCredential::new("jsmith", "welcome1");
        assert_eq!(credential.kind(), USERNAME_PASSWORD);
        assert_eq!(credential.caller(), Some("jsmith"));
        assert!(credential.is_valid());

        let view = credential.as_username_password().unwrap();
        assert_eq!(view.caller, Some("jsmith"));
        assert_eq!(view.password, "welcome1");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = UsernamePasswordCredential::new("jsmith", "welcome1");
        let debug = format!("{credential:?}");
        assert!(debug.contains("jsmith"));
        assert!(!debug.contains("welcome1"));

        let token = TokenCredential::new("secret-token");
        assert!(!format!("{token:?}").contains("secret-token"));

        let basic = BasicAuthenticationCredential::from_header("anNtaXRoOndlbGNvbWUx");
        assert!(!format!("{basic:?}").contains("welcome1"));
    }

    #[test]
    fn test_basic_header() {
        // base64("jsmith:welcome1")
        let credential = BasicAuthenticationCredential::from_header("Basic anNtaXRoOndlbGNvbWUx");
        assert_eq!(credential.kind(), BASIC_AUTHENTICATION);
        assert!(credential.is_valid());

        let view = credential.as_username_password().unwrap();
        assert_eq!(view.caller, Some("jsmith"));
        assert_eq!(view.password, "welcome1");
    }

    #[test]
    fn test_basic_header_without_prefix() {
        let credential = BasicAuthenticationCredential::from_header("anNtaXRoOndlbGNvbWUx");
        assert_eq!(credential.caller(), Some("jsmith"));
    }

    #[test]
    fn test_basic_header_password_may_contain_colon() {
        // base64("jsmith:a:b")
        let credential = BasicAuthenticationCredential::from_header("anNtaXRoOmE6Yg==");
        let view = credential.as_username_password().unwrap();
        assert_eq!(view.caller, Some("jsmith"));
        assert_eq!(view.password, "a:b");
    }

    #[test]
    fn test_basic_header_latin1() {
        // bytes "j\xe9:pw" encoded as base64
        let header = STANDARD.encode([b'j', 0xE9, b':', b'p', b'w']);
        let credential = BasicAuthenticationCredential::from_header(&header);
        assert_eq!(credential.caller(), Some("j\u{e9}"));
    }

    #[test]
    fn test_basic_header_malformed() {
        let credential = BasicAuthenticationCredential::from_header("not base64!!");
        assert!(!credential.is_valid());
        assert!(credential.caller().is_none());

        // base64("nocolon")
        let credential = BasicAuthenticationCredential::from_header("bm9jb2xvbg==");
        assert!(!credential.is_valid());
        assert!(credential.as_username_password().unwrap().caller.is_none());
    }

    #[test]
    fn test_token() {
        let token = TokenCredential::new("ASDJFWEJ");
        assert_eq!(token.kind(), TOKEN);
        assert!(token.caller().is_none());
        assert!(token.as_username_password().is_none());
        assert_eq!(token.token(), "ASDJFWEJ");

        let bound = TokenCredential::for_caller("jsmith", "ASDJFWEJ");
        assert_eq!(bound.caller(), Some("jsmith"));
        assert!(!TokenCredential::new("").is_valid());
    }

    #[test]
    fn test_token_view() {
        let credential: Box<dyn Credential> = Box::new(TokenCredential::new("t"));
        assert_eq!(credential.as_token(), Some("t"));

        let password = UsernamePasswordCredential::new("jsmith", "welcome1");
        assert!(password.as_token().is_none());
    }
}
