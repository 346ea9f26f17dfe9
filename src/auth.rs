//! Project authentication: signed session tokens and password hashes.
//!
//! Token layout: `base64url(code ":" issued_at_unix) "." base64url(hmac_sha256)`.
//! The signing secret comes from `AppConfig` and lives inside `TokenSigner`.
//!
//! Password hash layout: `pbkdf2-sha256$<iterations>$<salt>$<hash>`.

use std::{
    num::NonZeroU32,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use ring::{hmac, pbkdf2};
use tracing::debug;

use crate::error::AuthError;

pub const COOKIE_NAME: &str = "ipa_auth_token";
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(14 * 24 * 60 * 60);

const HASH_SCHEME: &str = "pbkdf2-sha256";
const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Issues and checks session tokens bound to a project code.
#[derive(Clone)]
pub struct TokenSigner {
    key: hmac::Key,
    validity: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            validity: TOKEN_VALIDITY,
        }
    }

    pub fn issue(&self, project_code: &str) -> String {
        self.issue_at(project_code, unix_now())
    }

    fn issue_at(&self, project_code: &str, issued_at: u64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!("{project_code}:{issued_at}"));
        let tag = hmac::sign(&self.key, payload.as_bytes());
        format!("{payload}.{}", URL_SAFE_NO_PAD.encode(tag.as_ref()))
    }

    /// Returns the project code the token was issued for.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, unix_now())
    }

    fn validate_at(&self, token: &str, now: u64) -> Result<String, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;
        hmac::verify(&self.key, payload.as_bytes(), &signature).map_err(|_| AuthError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| AuthError::Malformed)?;
        let payload = String::from_utf8(payload).map_err(|_| AuthError::Malformed)?;
        let (code, issued_at) = payload.rsplit_once(':').ok_or(AuthError::Malformed)?;
        let issued_at: u64 = issued_at.parse().map_err(|_| AuthError::Malformed)?;

        if now.saturating_sub(issued_at) > self.validity.as_secs() {
            debug!(target: "auth", %code, issued_at, "token expired");
            return Err(AuthError::Expired);
        }
        Ok(code.to_string())
    }
}

/// Well-formed hash at full cost, verified against when the project is
/// unknown so both login failures take the same time.
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("ipa-unknown-project"))
}

pub fn hash_password(password: &str) -> String {
    hash_password_with(password, PBKDF2_ITERATIONS)
}

fn hash_password_with(password: &str, iterations: u32) -> String {
    let iterations = NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN);
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut hash,
    );
    format!(
        "{HASH_SCHEME}${iterations}${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash)
    )
}

/// `Ok(false)` for a wrong password, `Err` only for an unreadable hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let mut parts = stored.split('$');
    let (Some(HASH_SCHEME), Some(iterations), Some(salt), Some(hash), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::MalformedHash);
    };
    let iterations: NonZeroU32 = iterations.parse().map_err(|_| AuthError::MalformedHash)?;
    let salt = URL_SAFE_NO_PAD.decode(salt).map_err(|_| AuthError::MalformedHash)?;
    let hash = URL_SAFE_NO_PAD.decode(hash).map_err(|_| AuthError::MalformedHash)?;

    Ok(pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok())
}

/// `Set-Cookie` value carrying a fresh token.
pub fn auth_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{COOKIE_NAME}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        TOKEN_VALIDITY.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
}

/// Pull our token out of a raw `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
