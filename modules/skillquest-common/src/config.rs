use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables (and `.env`).
///
/// `LOG_LEVEL` is not part of it: the binary reads it before this is loaded,
/// so the subscriber exists when `log_keys` runs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Profile completion
    pub max_skills_for_employee: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: database_url_from_env()?,
            database_max_connections: parsed_env("DATABASE_MAX_CONNECTIONS", 10)?,
            api_host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: parsed_env("API_PORT", 8000)?,
            max_skills_for_employee: parsed_env("MAX_SKILLS_FOR_EMPLOYEE", 5)?,
        };

        if config.max_skills_for_employee == 0 {
            bail!("MAX_SKILLS_FOR_EMPLOYEE must be at least 1");
        }

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", redact_password(&self.database_url));
        tracing::info!("  DATABASE_MAX_CONNECTIONS: {}", self.database_max_connections);
        tracing::info!("  API: {}:{}", self.api_host, self.api_port);
        tracing::info!("  MAX_SKILLS_FOR_EMPLOYEE: {}", self.max_skills_for_employee);
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `POSTGRES_*` parts.
fn database_url_from_env() -> Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }

    let part = |key: &str| {
        std::env::var(key).with_context(|| format!("{key} is required when DATABASE_URL is not set"))
    };

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        part("POSTGRES_USER")?,
        part("POSTGRES_PASSWORD")?,
        part("POSTGRES_HOST")?,
        part("POSTGRES_PORT")?,
        part("POSTGRES_DB")?,
    ))
}

fn parsed_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn redact_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}
