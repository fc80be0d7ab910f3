use axum::http::{header, HeaderMap};

use crate::config;

pub const SESSION_COOKIE: &str = "session_id";

/// Value of the `session_id` cookie, if the request carries one
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
}

pub fn session_cookie(token: &str) -> String {
    let max_age = config::config().session.expiry_days * 24 * 60 * 60;
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        token,
        max_age,
        secure_suffix()
    )
}

pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        secure_suffix()
    )
}

fn secure_suffix() -> &'static str {
    if config::config().security.cookie_secure {
        "; Secure"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=abc123 ; lang=pt"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_lasts_thirty_days() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("session_id=tok; Max-Age=2592000; Path=/; HttpOnly; SameSite=Lax"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        assert!(clear_session_cookie().starts_with("session_id=; Max-Age=0;"));
    }
}
