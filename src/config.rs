use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDB),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Invalid STORE_BACKEND: {}. Supported: mongodb, memory", other)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::MongoDB => write!(f, "mongodb"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Runtime configuration, read once from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl_hours: i64,
    pub admin_phone: String,
    pub admin_name: String,
    pub cancellation_window_hours: i64,
    pub activity_refresh_secs: u64,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3002,
            store_backend: StoreBackend::MongoDB,
            database_url: None,
            jwt_secret: "default-secret-change-me".to_string(),
            jwt_issuer: "studio-booking-service".to_string(),
            jwt_ttl_hours: 24,
            admin_phone: "0500000000".to_string(),
            admin_name: "מנהל מערכת".to_string(),
            cancellation_window_hours: 24,
            activity_refresh_secs: 900,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = AppConfig::default();

        let store_backend = parse_var("STORE_BACKEND", defaults.store_backend)?;
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

        if store_backend == StoreBackend::MongoDB && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORE_BACKEND=mongodb".to_string());
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("⚠️  JWT_SECRET not set, using insecure default");
            defaults.jwt_secret.clone()
        });

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        let config = AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            store_backend,
            database_url,
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            jwt_ttl_hours: parse_var("JWT_TTL_HOURS", defaults.jwt_ttl_hours)?,
            admin_phone: env::var("ADMIN_PHONE").unwrap_or(defaults.admin_phone),
            admin_name: env::var("ADMIN_NAME").unwrap_or(defaults.admin_name),
            cancellation_window_hours: parse_var(
                "CANCELLATION_WINDOW_HOURS",
                defaults.cancellation_window_hours,
            )?,
            activity_refresh_secs: parse_var("ACTIVITY_REFRESH_SECS", defaults.activity_refresh_secs)?,
            allowed_origins,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects hour values that would disable the cancellation cutoff or
    /// overflow chrono's `Duration::hours`
    pub fn validate(&self) -> Result<(), String> {
        check_range("CANCELLATION_WINDOW_HOURS", self.cancellation_window_hours, 0..=MAX_WINDOW_HOURS)?;
        check_range("JWT_TTL_HOURS", self.jwt_ttl_hours, 1..=MAX_JWT_TTL_HOURS)?;
        Ok(())
    }
}

/// 30 days
const MAX_WINDOW_HOURS: i64 = 720;
/// One year
const MAX_JWT_TTL_HOURS: i64 = 8760;

fn check_range<T>(key: &str, value: T, range: RangeInclusive<T>) -> Result<(), String>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {} value '{}': must be between {} and {}",
            key,
            value,
            range.start(),
            range.end()
        ))
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {} value '{}': {}", key, raw, e)),
        Err(_) => {
            log::debug!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_backend_names() {
        assert_eq!("MongoDB".parse::<StoreBackend>(), Ok(StoreBackend::MongoDB));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn defaults_match_studio_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.admin_phone, "0500000000");
        assert_eq!(config.cancellation_window_hours, 24);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn out_of_range_hours_are_rejected() {
        let negative_window = AppConfig { cancellation_window_hours: -1, ..AppConfig::default() };
        assert!(negative_window.validate().unwrap_err().contains("CANCELLATION_WINDOW_HOURS"));

        let huge_window = AppConfig { cancellation_window_hours: i64::MAX, ..AppConfig::default() };
        assert!(huge_window.validate().is_err());

        let no_window = AppConfig { cancellation_window_hours: 0, ..AppConfig::default() };
        assert_eq!(no_window.validate(), Ok(()));

        let zero_ttl = AppConfig { jwt_ttl_hours: 0, ..AppConfig::default() };
        assert!(zero_ttl.validate().unwrap_err().contains("JWT_TTL_HOURS"));

        let huge_ttl = AppConfig { jwt_ttl_hours: i64::MAX / 2, ..AppConfig::default() };
        assert!(huge_ttl.validate().is_err());
    }
}
