/// Configuration for the API server
///
/// Loaded from environment variables (and a `.env` file when present).
///
/// # Environment Variables
///
/// - `JWT_SECRET`: Token signing secret (insecure default, logged as a warning)
/// - `JWT_EXPIRE_HOURS`: Token lifetime in hours (default: 24)
/// - `DATABASE_URL`: PostgreSQL connection string; without it the server keeps
///   everything in memory
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8080)
/// - `PAGE_SIZE`: Default article page size (default: 10)
/// - `MAX_PAGE_SIZE`: Largest page size a client may ask for (default: 100)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
///
/// Numbers that fail to parse fall back to their default with a warning.
///
/// # Example
///
/// ```no_run
/// use quillpress_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use quillpress_shared::content::query::PagingConfig;
use tracing::warn;

/// Secret used when `JWT_SECRET` is unset; never deploy with it
pub const INSECURE_DEFAULT_SECRET: &str = "quillpress-insecure-development-secret";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub paging: PagingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, None for the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Session token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expire_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: INSECURE_DEFAULT_SECRET.to_string(),
                expire_hours: 24,
            },
            paging: PagingConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Fails when the paging bounds are inconsistent.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET is not set, using an insecure default secret");
                defaults.jwt.secret
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.api.cors_origins);

        let paging = PagingConfig {
            default_page_size: parse_or(&lookup, "PAGE_SIZE", defaults.paging.default_page_size),
            max_page_size: parse_or(&lookup, "MAX_PAGE_SIZE", defaults.paging.max_page_size),
        };

        if paging.default_page_size < 1 || paging.max_page_size < 1 {
            anyhow::bail!("PAGE_SIZE and MAX_PAGE_SIZE must be at least 1");
        }
        if paging.max_page_size < paging.default_page_size {
            anyhow::bail!(
                "MAX_PAGE_SIZE ({}) must not be smaller than PAGE_SIZE ({})",
                paging.max_page_size,
                paging.default_page_size
            );
        }

        let expire_hours = parse_or(&lookup, "JWT_EXPIRE_HOURS", defaults.jwt.expire_hours);
        if expire_hours < 1 {
            anyhow::bail!("JWT_EXPIRE_HOURS must be at least 1");
        }

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or(defaults.api.host),
                port: parse_or(&lookup, "PORT", defaults.api.port),
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            jwt: JwtConfig {
                secret,
                expire_hours,
            },
            paging,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid number, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.jwt.secret, INSECURE_DEFAULT_SECRET);
        assert_eq!(config.jwt.expire_hours, 24);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.paging, PagingConfig::default());
        assert_eq!(config.api.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "3000"),
            ("API_HOST", "127.0.0.1"),
            ("DATABASE_URL", "postgres://localhost/quillpress"),
            ("PAGE_SIZE", "20"),
            ("MAX_PAGE_SIZE", "50"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.paging.default_page_size, 20);
        assert_eq!(config.paging.max_page_size, 50);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/quillpress")
        );
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = load(&[("PORT", "eighty"), ("PAGE_SIZE", "ten")]).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.paging.default_page_size, 10);
    }

    #[test]
    fn test_inconsistent_paging_rejected() {
        assert!(load(&[("PAGE_SIZE", "50"), ("MAX_PAGE_SIZE", "20")]).is_err());
        assert!(load(&[("PAGE_SIZE", "0")]).is_err());
    }
}
