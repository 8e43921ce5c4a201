use actix_session::Session;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &str = "csrf_secret";

/// Action name for the visitor intake form.
pub const SUBMIT_ACTION: &str = "safejoy_submit";
pub const FORMS_ACTION: &str = "admin_forms";
pub const LOGIN_ACTION: &str = "admin_login";
pub const LOGOUT_ACTION: &str = "admin_logout";

/// Per-row delete action, e.g. `delete_submission_42`.
pub fn delete_submission_action(id: i64) -> String {
    format!("delete_submission_{id}")
}

/// Get the per-session CSRF secret, or generate and store a new one.
pub fn get_or_create_secret(session: &Session) -> String {
    if let Ok(Some(secret)) = session.get::<String>(SECRET_KEY) {
        return secret;
    }
    let secret = generate_secret();
    let _ = session.insert(SECRET_KEY, &secret);
    secret
}

/// Issue a token bound to this session and `action`.
pub fn token_for(session: &Session, action: &str, lifetime_secs: u64) -> String {
    let secret = get_or_create_secret(session);
    sign(&secret, action, current_tick(lifetime_secs))
}

/// Validate a submitted token for `action`. Fails closed: a missing secret,
/// empty token or signature mismatch is rejected.
pub fn validate_csrf(
    session: &Session,
    action: &str,
    submitted: &str,
    lifetime_secs: u64,
) -> Result<(), AppError> {
    let secret = session
        .get::<String>(SECRET_KEY)
        .unwrap_or(None)
        .unwrap_or_default();
    if verify(&secret, action, submitted, current_tick(lifetime_secs)) {
        Ok(())
    } else {
        log::warn!("Rejected CSRF token for action '{action}'");
        Err(AppError::Csrf)
    }
}

/// Check `token` against the current and the previous tick.
pub fn verify(secret: &str, action: &str, token: &str, tick: u64) -> bool {
    if secret.is_empty() || token.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(token.trim()) else {
        return false;
    };
    [tick, tick.saturating_sub(1)].iter().any(|t| {
        mac_for(secret, action, *t)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    })
}

pub fn sign(secret: &str, action: &str, tick: u64) -> String {
    match mac_for(secret, action, tick) {
        Some(mac) => hex::encode(mac.finalize().into_bytes()),
        None => String::new(),
    }
}

fn mac_for(secret: &str, action: &str, tick: u64) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(action.as_bytes());
    mac.update(b"|");
    mac.update(tick.to_string().as_bytes());
    Some(mac)
}

/// Tokens rotate every half lifetime; accepting the previous tick keeps
/// each one valid for between half and the full lifetime.
fn current_tick(lifetime_secs: u64) -> u64 {
    let half = (lifetime_secs / 2).max(1);
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    now / half
}

/// Generate a random 32-byte hex secret.
fn generate_secret() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}
