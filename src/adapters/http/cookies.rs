//! Refresh credential cookie.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::AuthConfig;

/// HTTP-only refresh cookie attributes.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: u64,
}

impl RefreshCookie {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            name: config.refresh_cookie_name.clone(),
            secure: config.secure_cookie,
            max_age_secs: config.refresh_ttl_secs,
        }
    }

    /// `Set-Cookie` value carrying a new refresh credential.
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}; HttpOnly", self.name, value);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; Path=/; Max-Age={}", self.max_age_secs));
        cookie
    }

    /// `Set-Cookie` value that expires the cookie immediately.
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!("{}=; HttpOnly", self.name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; Path=/; Max-Age=0");
        cookie
    }

    /// Replace the old cookie with `value`: delete first, then set.
    pub fn append_rotation(&self, headers: &mut HeaderMap, value: &str) {
        append(headers, &self.build_delete_cookie());
        append(headers, &self.build_set_cookie(value));
    }

    pub fn append_deletion(&self, headers: &mut HeaderMap) {
        append(headers, &self.build_delete_cookie());
    }

    /// Value of this cookie on the request, if present and non-empty.
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        extract_cookie(headers, &self.name).filter(|value| !value.is_empty())
    }
}

fn append(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Refusing to emit invalid Set-Cookie header: {}", e),
    }
}

/// Extract a cookie value from all `Cookie` headers.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
