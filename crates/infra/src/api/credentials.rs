//! Credential storage for the API client
//!
//! The panel backend issues its session as HTTP-only cookies. The client
//! never inspects them: it hands every outgoing request to a
//! [`CredentialStore`] to attach whatever it holds, and hands login/refresh
//! responses back so the store can absorb the replacement.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::RequestBuilder;
use tracing::debug;

/// Trait for attaching session credentials to outgoing requests
///
/// This trait allows dependency injection and testing with mock stores.
pub trait CredentialStore: Send + Sync {
    /// Attach the current credentials (if any) to a request
    fn attach(&self, request: RequestBuilder) -> RequestBuilder;

    /// Absorb credentials issued by a login or refresh response
    fn on_refreshed(&self, headers: &HeaderMap);

    /// Forget all credentials
    fn clear(&self);

    /// Whether anything is stored (presence only, never contents)
    fn has_credentials(&self) -> bool;
}

/// In-memory cookie jar keyed by cookie name.
///
/// Honours deletion via `Max-Age=0` (or negative) and empty values. Other
/// attributes (`Path`, `Domain`, `Expires`, ...) are ignored: the jar only
/// ever talks to the single panel origin it was built for. reqwest's own
/// `cookies` jar is not used because it lives inside the `reqwest::Client`
/// and can not be cleared on logout.
#[derive(Default)]
pub struct CookieCredentialStore {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of stored cookies, for diagnostics
    pub fn cookie_names(&self) -> Vec<String> {
        self.cookies.read().keys().cloned().collect()
    }

    fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.read();
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl CredentialStore for CookieCredentialStore {
    fn attach(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(COOKIE, value),
            None => request,
        }
    }

    fn on_refreshed(&self, headers: &HeaderMap) {
        let mut cookies = self.cookies.write();

        for raw in headers.get_all(SET_COOKIE) {
            let Ok(raw) = raw.to_str() else {
                debug!("ignoring non-ASCII Set-Cookie header");
                continue;
            };

            match parse_set_cookie(raw) {
                Some(SetCookie::Store { name, value }) => {
                    debug!(cookie = %name, "stored session cookie");
                    cookies.insert(name, value);
                }
                Some(SetCookie::Remove { name }) => {
                    debug!(cookie = %name, "removed session cookie");
                    cookies.remove(&name);
                }
                None => debug!("ignoring malformed Set-Cookie header"),
            }
        }
    }

    fn clear(&self) {
        self.cookies.write().clear();
    }

    fn has_credentials(&self) -> bool {
        !self.cookies.read().is_empty()
    }
}

impl fmt::Debug for CookieCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCredentialStore").field("cookies", &self.cookie_names()).finish()
    }
}

enum SetCookie {
    Store { name: String, value: String },
    Remove { name: String },
}

fn parse_set_cookie(raw: &str) -> Option<SetCookie> {
    let mut parts = raw.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    let value = value.trim().trim_matches('"');

    if name.is_empty() {
        return None;
    }

    let expired = parts.filter_map(|attr| attr.split_once('=')).any(|(key, val)| {
        key.trim().eq_ignore_ascii_case("max-age")
            && val.trim().parse::<i64>().map(|age| age <= 0).unwrap_or(false)
    });

    if expired || value.is_empty() {
        Some(SetCookie::Remove { name: name.to_string() })
    } else {
        Some(SetCookie::Store { name: name.to_string(), value: value.to_string() })
    }
}
