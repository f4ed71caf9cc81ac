//! One-shot notices carried across a redirect in a signed cookie.

use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
use sha2::{Digest, Sha512};

pub const FLASH_COOKIE: &str = "_flash";

/// Derives the 64-byte cookie signing key from an arbitrary secret.
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Stores `message` for the next rendered page, replacing any pending one.
pub fn push(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, sanitize(message)))
        .path("/")
        .http_only(true);
    jar.add(cookie)
}

/// Removes and returns the pending message, if any.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let message = cookie.value().to_string();
            (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message))
        }
        None => (jar, None),
    }
}

// Keeps the notice to one printable ASCII line without cookie delimiters.
fn sanitize(message: &str) -> String {
    message
        .chars()
        .map(|c| match c {
            ';' | ',' | '"' | '\\' => ' ',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '?',
        })
        .collect::<String>()
        .trim()
        .to_string()
}
