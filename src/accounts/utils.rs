//! Small helpers for account validation and session token minting.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use regex::Regex;

const SESSION_TOKEN_BYTES: usize = 32;

/// Basic `local@domain.tld` shape check.
pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Control characters (NUL included) are never valid in stored text.
pub(crate) fn has_control_chars(value: &str) -> bool {
    value.chars().any(char::is_control)
}

/// Usernames are stored exactly as given, so they must already be canonical:
/// no surrounding whitespace and no control characters.
pub(crate) fn valid_username(username: &str) -> bool {
    !is_blank(username) && username.trim() == username && !has_control_chars(username)
}

/// Create a new opaque session token (256 bits from the OS RNG, base64url).
pub(crate) fn generate_session_token() -> Result<String, rand::Error> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
