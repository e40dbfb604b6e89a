use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use http::HeaderMap;
use tessera_core::{IssuedSession, SessionError};
use time::OffsetDateTime;

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "auth_token";

/// Builds and reads the single session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    secure: bool,
}

impl SessionCookies {
    /// `secure` should be true in production so the cookie never travels over
    /// plain HTTP.
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Create cookie carrying the session token, expiring with the token
    pub fn session_cookie(&self, session: &IssuedSession) -> Result<Cookie<'static>, SessionError> {
        let expires = OffsetDateTime::from_unix_timestamp(session.expires_at())
            .map_err(|e| SessionError::UnexpectedError(e.to_string()))?;

        let mut cookie = self.base_cookie(session.token.as_str().to_owned());
        cookie.set_expires(expires);
        Ok(cookie)
    }

    /// Empty cookie that makes the browser drop the session.
    pub fn end_session(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(time::Duration::ZERO);
        cookie
    }

    /// The session token from a request's `Cookie` headers, if present and non-empty.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|token| !token.is_empty())
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path("/") // apply cookie to all URLs on the server
            .http_only(true) // prevent JavaScript from accessing the cookie
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

impl Default for SessionCookies {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE_NAME, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{COOKIE, HeaderValue};
    use tessera_core::{Email, IdentityId, SessionClaims, SessionToken, TenantId};

    fn session(exp: i64) -> IssuedSession {
        IssuedSession {
            token: SessionToken::new("header.payload.signature".to_owned()),
            claims: SessionClaims {
                sub: IdentityId::new(),
                tenant_id: TenantId::new(),
                email: Email::parse("alice@example.com").unwrap(),
                iat: exp - 3600,
                exp,
            },
        }
    }

    #[test]
    fn session_cookie_attributes() {
        let cookies = SessionCookies::new("auth_token", true);
        let cookie = cookies.session_cookie(&session(1_900_000_000)).unwrap();

        assert_eq!(cookie.name(), "auth_token");
        assert_eq!(cookie.value(), "header.payload.signature");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.expires_datetime().map(|e| e.unix_timestamp()),
            Some(1_900_000_000)
        );
    }

    #[test]
    fn secure_flag_follows_configuration() {
        let cookies = SessionCookies::new("auth_token", false);
        let cookie = cookies.session_cookie(&session(1_900_000_000)).unwrap();

        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn end_session_cookie_expires_at_epoch() {
        let cookie = SessionCookies::default().end_session();

        assert_eq!(cookie.name(), DEFAULT_SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(
            cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn reads_token_from_request_headers() {
        let cookies = SessionCookies::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc.def.ghi"),
        );

        assert_eq!(
            cookies.token_from_headers(&headers),
            Some("abc.def.ghi".to_owned())
        );
        assert_eq!(cookies.token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let cookies = SessionCookies::default();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token="));

        assert_eq!(cookies.token_from_headers(&headers), None);
    }
}
