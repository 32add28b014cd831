//! Server configuration

use std::str::FromStr;

use jsonwebtoken::Algorithm;

/// Fallback signing secret. Startup logs a warning while it is in use.
pub const DEFAULT_SECRET_KEY: &str = "cambia_esto_en_produccion";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub fhir: FhirConfig,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub paging: Paging,
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
}

/// Token signing settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
}

/// External FHIR server settings
#[derive(Debug, Clone)]
pub struct FhirConfig {
    pub server_url: String,
    pub timeout_secs: u64,
}

/// Page sizes for patient listings
#[derive(Debug, Clone, Copy)]
pub struct Paging {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let algorithm = env.parse("ALGORITHM", Algorithm::HS256)?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ConfigError::Invalid {
                name: "ALGORITHM",
                value: format!("{:?}", algorithm),
                reason: "only HS256, HS384 and HS512 are supported".into(),
            });
        }

        let paging = Paging {
            default_limit: env.positive("DEFAULT_PAGE_SIZE", 10)?,
            max_limit: env.positive("MAX_PAGE_SIZE", 100)?,
        };

        Ok(Self {
            bind_address: env.string("BIND_ADDRESS", "0.0.0.0:8000"),
            database: DatabaseConfig {
                url: env.get("DATABASE_URL"),
                host: env.first(&["POSTGRES_HOST", "DB_HOST"], "citus-coordinator"),
                port: env.parse_first(&["POSTGRES_PORT", "DB_PORT"], 5432)?,
                dbname: env.first(&["POSTGRES_DB", "DB_NAME"], "historiaclinica"),
                user: env.first(&["POSTGRES_USER", "DB_USER"], "citus"),
                password: env.first(&["POSTGRES_PASSWORD", "DB_PASSWORD"], "citus"),
                connect_timeout_secs: env.positive("DB_CONNECT_TIMEOUT", 5)?,
            },
            auth: AuthConfig {
                secret_key: env.string("SECRET_KEY", DEFAULT_SECRET_KEY),
                algorithm,
                access_token_expire_minutes: env.at_most(
                    "ACCESS_TOKEN_EXPIRE_MINUTES",
                    30,
                    MAX_TOKEN_TTL_MINUTES,
                )?,
            },
            fhir: FhirConfig {
                server_url: env
                    .string("FHIR_SERVER_URL", "http://hapi.fhir.org/baseR4")
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs: env.positive("FHIR_TIMEOUT", 30)?,
            },
            cors_origins: env
                .string("CORS_ORIGINS", "*")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            rate_limit_rps: env.positive("RATE_LIMIT_RPS", 100)?,
            paging,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_key == DEFAULT_SECRET_KEY
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn first(&self, names: &[&str], default: &str) -> String {
        names
            .iter()
            .find_map(|n| self.get(n))
            .unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse_value(name, self.get(name), default)
    }

    fn parse_first<T>(&self, names: &[&'static str], default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match names.iter().find_map(|n| self.get(n).map(|v| (*n, v))) {
            Some((name, value)) => self.parse_value(name, Some(value), default),
            None => Ok(default),
        }
    }

    fn positive<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default + std::fmt::Display,
        T::Err: std::fmt::Display,
    {
        let value = self.parse(name, default)?;
        if value <= T::default() {
            return Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(value)
    }

    fn at_most<T>(&self, name: &'static str, default: T, max: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default + std::fmt::Display,
        T::Err: std::fmt::Display,
    {
        let value = self.positive(name, default)?;
        if value > max {
            return Err(ConfigError::Invalid {
                name,
                value: value.to_string(),
                reason: format!("must not exceed {}", max),
            });
        }
        Ok(value)
    }

    fn parse_value<T>(
        &self,
        name: &'static str,
        raw: Option<String>,
        default: T,
    ) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match raw {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
