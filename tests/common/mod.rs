//! Shared test infrastructure.
//!
//! # Test Database Setup
//! - `setup_test_db()` - fresh in-memory SQLite with migrations applied
//!
//! # HTTP helpers
//! - `test_app!(pool)` - the real route table behind cookie sessions
//! - `session_cookie()` / `extract()` - carry sessions and scrape tokens

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use regex::Regex;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use safejoy::config::AppConfig;
use safejoy::db::MIGRATOR;
use safejoy::models::submission::ValidatedSubmission;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct-horse-battery";
pub const FORM_TITLE: &str = "Community Aid";
pub const SESSION_COOKIE: &str = "safejoy_session";

// ============================================================================
// DATABASE SETUP
// ============================================================================

pub struct TestDb {
    pool: SqlitePool,
}

impl TestDb {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// In-memory databases are per connection, so the pool is pinned to one.
pub async fn setup_test_db() -> TestDb {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory DB");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    TestDb { pool }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        admin_username: ADMIN_USER.to_string(),
        admin_password: ADMIN_PASS.to_string(),
        submissions_per_page: 2,
        ..AppConfig::default()
    }
}

pub fn validated(name: &str, form_title: &str, links: &[&str]) -> ValidatedSubmission {
    ValidatedSubmission {
        form_title: form_title.to_string(),
        name: name.to_string(),
        description: format!("Description for {name}"),
        links: links.iter().map(|s| s.to_string()).collect(),
    }
}

// ============================================================================
// HTTP HELPERS
// ============================================================================

/// Build the application service the way `main` does, minus logging.

macro_rules! test_app {
    ($pool:expr) => {
        test_app!($pool, common::test_config())
    };
    ($pool:expr, $config:expr) => {{
        let config: safejoy::config::AppConfig = $config;
        let limiter = safejoy::auth::rate_limit::RateLimiter::new(
            config.login_max_attempts,
            config.login_window_secs,
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(safejoy::routes::session_middleware(
                    actix_web::cookie::Key::generate(),
                    false,
                ))
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(config))
                .app_data(actix_web::web::Data::new(limiter))
                .configure(safejoy::routes::configure)
                .default_service(actix_web::web::to(safejoy::routes::not_found)),
        )
        .await
    }};
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// First capture group of `pattern` in `html`.
pub fn extract(html: &str, pattern: &str) -> Option<String> {
    Regex::new(pattern)
        .expect("Failed to compile regex")
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn form_body(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("encode form")
}
