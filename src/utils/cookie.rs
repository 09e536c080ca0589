use axum::http::{header, HeaderMap};
use std::{env, sync::OnceLock};

use crate::config::{app::AppEnv, parse_bool_env};

pub const SESSION_COOKIE: &str = "linkbio_session";
pub const REFRESH_COOKIE: &str = "linkbio_refresh";

#[derive(Debug, Clone)]
struct CookieConfig {
    secure: bool,
    same_site: &'static str,
    domain: Option<String>,
}

impl CookieConfig {
    fn from_env() -> Self {
        let same_site = parse_same_site(
            &env::var("AUTH_COOKIE_SAMESITE").unwrap_or_else(|_| "Lax".to_string()),
        );
        let secure = parse_bool_env("AUTH_COOKIE_SECURE", AppEnv::current().is_production())
            // Browsers drop SameSite=None cookies that are not Secure.
            || same_site == "None";
        let domain = env::var("AUTH_COOKIE_DOMAIN")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Self {
            secure,
            same_site,
            domain,
        }
    }

    fn render(&self, name: &str, value: &str, max_age_seconds: u64, expired: bool) -> String {
        let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age_seconds}");
        if expired {
            cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        }
        cookie.push_str("; HttpOnly; SameSite=");
        cookie.push_str(self.same_site);

        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie
    }
}

fn cookie_config() -> &'static CookieConfig {
    static CONFIG: OnceLock<CookieConfig> = OnceLock::new();
    CONFIG.get_or_init(CookieConfig::from_env)
}

fn parse_same_site(value: &str) -> &'static str {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => "Strict",
        "none" => "None",
        _ => "Lax",
    }
}

pub fn build_auth_cookie(name: &str, value: &str, max_age_seconds: u64) -> String {
    cookie_config().render(name, value, max_age_seconds, false)
}

pub fn build_clear_cookie(name: &str) -> String {
    cookie_config().render(name, "", 0, true)
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}
