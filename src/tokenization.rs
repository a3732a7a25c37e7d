//! Keyed tokenization of clear values.
//!
//! A token is `{TOKENIZED:<payload>}` where the payload is the HMAC-SHA-256 of the clear
//! value keyed by a caller-supplied pepper, base64url-encoded without padding. The same
//! `(value, pepper)` pair always yields the same token, in any process, so tokenized logs
//! can still be correlated; rotating the pepper breaks that linkage.
//!
//! The pepper is a secret. It is only ever borrowed for the duration of a call and is
//! never logged: [`Pepper`]'s `Debug` output hides its bytes.

use base64::Engine;
use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opening text of a token.
pub const TOKEN_PREFIX: &str = "{TOKENIZED:";

/// Closing text of a token.
pub const TOKEN_SUFFIX: &str = "}";

type HmacSha256 = Hmac<Sha256>;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Tokenize a clear value, returning the complete `{TOKENIZED:...}` marker.
pub fn tokenize(clear_value: &[u8], pepper: &[u8]) -> String {
    let digest = keyed_digest(clear_value, pepper);
    let mut token = String::with_capacity(TOKEN_PREFIX.len() + digest.len() + TOKEN_SUFFIX.len());
    token.push_str(TOKEN_PREFIX);
    token.push_str(&digest);
    token.push_str(TOKEN_SUFFIX);
    token
}

/// The base64url payload of a token, without the marker around it.
pub fn keyed_digest(clear_value: &[u8], pepper: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new(&block_key(pepper));
    mac.update(clear_value);
    ENGINE.encode(mac.finalize().into_bytes())
}

// RFC 2104 key preparation: a key longer than one block is hashed first, and the
// result is zero-padded to the block size.
fn block_key(pepper: &[u8]) -> Key<HmacSha256> {
    let mut key = Key::<HmacSha256>::default();
    if pepper.len() > key.len() {
        let hashed = <Sha256 as Digest>::digest(pepper);
        key[..hashed.len()].copy_from_slice(&hashed);
    } else {
        key[..pepper.len()].copy_from_slice(pepper);
    }
    key
}

/// Whether `s` is exactly one token and nothing else.
pub fn is_token(s: &str) -> bool {
    s.strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_suffix(TOKEN_SUFFIX))
        .is_some_and(is_payload)
}

/// Whether `s` contains a token anywhere, with any surrounding text.
pub fn contains_token(s: &str) -> bool {
    let mut search_from = 0;
    while let Some(found) = s[search_from..].find(TOKEN_PREFIX) {
        let payload_start = search_from + found + TOKEN_PREFIX.len();
        let rest = &s[payload_start..];
        let payload_len = rest
            .find(|c: char| !is_payload_char(c))
            .unwrap_or(rest.len());
        if payload_len > 0 && rest[payload_len..].starts_with(TOKEN_SUFFIX) {
            return true;
        }
        search_from = payload_start;
    }
    false
}

fn is_payload(payload: &str) -> bool {
    !payload.is_empty() && payload.chars().all(is_payload_char)
}

fn is_payload_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// A tokenization secret.
///
/// Holds the pepper bytes for the lifetime of a run. Formatting never reveals them.
#[derive(Clone, PartialEq, Eq)]
pub struct Pepper(Vec<u8>);

impl Pepper {
    /// Wrap secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pepper(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_inputs() {
        assert_eq!(tokenize(b"jdoe", b"pepper"), tokenize(b"jdoe", b"pepper"));
    }

    #[test]
    fn differs_by_value_and_by_pepper() {
        let base = tokenize(b"jdoe", b"pepper");
        assert_ne!(base, tokenize(b"jsmith", b"pepper"));
        assert_ne!(base, tokenize(b"jdoe", b"other pepper"));
    }

    #[test]
    fn matches_known_hmac_vector() {
        // RFC 4231 test case 2.
        let token = tokenize(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            token,
            "{TOKENIZED:W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM}"
        );
    }

    #[test]
    fn pepper_longer_than_block_is_hashed_first() {
        // RFC 4231 test case 6.
        let pepper = [0xaa_u8; 131];
        assert_eq!(
            keyed_digest(b"Test Using Larger Than Block-Size Key - Hash Key First", &pepper),
            "YOQxWR7gtn8Niiaqy_W3f44LxiE3KMUUBUYEDw7jf1Q"
        );
    }

    #[test]
    fn empty_pepper_and_value_are_accepted() {
        let token = tokenize(b"", b"");
        assert!(is_token(&token));
    }

    #[test]
    fn token_shape() {
        let token = tokenize(b"value", b"pepper");
        assert!(token.starts_with(TOKEN_PREFIX));
        assert!(token.ends_with(TOKEN_SUFFIX));
        // 32 digest bytes -> 43 base64url characters without padding.
        assert_eq!(keyed_digest(b"value", b"pepper").len(), 43);
        assert!(!token.contains("{REDACTED}"));
    }

    #[test]
    fn is_token_requires_whole_string() {
        let token = tokenize(b"value", b"pepper");
        assert!(is_token(&token));
        assert!(!is_token(&format!("x{token}")));
        assert!(!is_token("{TOKENIZED:}"));
        assert!(!is_token("{TOKENIZED:abc def}"));
        assert!(!is_token("plain"));
    }

    #[test]
    fn contains_token_with_context() {
        let token = tokenize(b"value", b"pepper");
        assert!(contains_token(&format!("uid={token},dc=example")));
        assert!(contains_token(&format!("prefix{token}")));
        assert!(contains_token(&format!("{token}suffix")));
        assert!(!contains_token("{TOKENIZED:"));
        assert!(!contains_token("{TOKENIZED:}"));
        assert!(!contains_token("{TOKENIZED:abc"));
        assert!(contains_token("{TOKENIZED:{TOKENIZED:abc}"));
        assert!(!contains_token("nothing here"));
    }

    #[test]
    fn pepper_debug_hides_secret() {
        let pepper = Pepper::new("super-secret");
        assert_eq!(format!("{pepper:?}"), "Pepper(<redacted>)");
        assert_eq!(pepper.as_bytes(), b"super-secret");
    }
}
