use std::str::FromStr;

/// Runtime settings read once at startup and shared with handlers via `web::Data`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub submissions_per_page: i64,
    pub nonce_lifetime_secs: u64,
    pub login_max_attempts: usize,
    pub login_window_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/safejoy.db?mode=rwc".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
            session_key: None,
            cookie_secure: false,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            submissions_per_page: 20,
            nonce_lifetime_secs: 86_400,
            login_max_attempts: 5,
            login_window_secs: 900,
        }
    }
}

impl AppConfig {
    /// Load from the process environment (after `dotenvy` has populated it).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys keep their defaults;
    /// unparsable numbers are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let admin_password = match lookup("ADMIN_PASSWORD") {
            Some(p) if !p.is_empty() => p,
            _ => {
                log::warn!("No ADMIN_PASSWORD set, seeding the default administrator password");
                defaults.admin_password
            }
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_key: lookup("SESSION_KEY"),
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", defaults.cookie_secure),
            admin_username: lookup("ADMIN_USERNAME")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(defaults.admin_username),
            admin_password,
            submissions_per_page: parse_or(&lookup, "SUBMISSIONS_PER_PAGE", defaults.submissions_per_page)
                .clamp(1, 100),
            nonce_lifetime_secs: parse_or(&lookup, "NONCE_LIFETIME_SECS", defaults.nonce_lifetime_secs)
                .max(2),
            login_max_attempts: parse_or(&lookup, "LOGIN_MAX_ATTEMPTS", defaults.login_max_attempts)
                .max(1),
            login_window_secs: parse_or(&lookup, "LOGIN_WINDOW_SECS", defaults.login_window_secs),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using default");
            default
        }),
        None => default,
    }
}
