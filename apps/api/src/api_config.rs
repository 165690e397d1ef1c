use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use admiral_application::{
    DEFAULT_GROUP_PAGE_SIZE, DEFAULT_MAX_CONSECUTIVE_EMPTY_PAGES, DEFAULT_MEMBERSHIP_FAN_OUT,
    ListingLimits,
};
use admiral_core::AppError;
use admiral_domain::{DEFAULT_ROLE_CLAIM, DenialVerbosity};
use tracing_subscriber::EnvFilter;

/// Directory implementation backing the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub directory_backend: DirectoryBackend,
    pub role_claim: String,
    pub denial_verbosity: DenialVerbosity,
    pub listing_limits: ListingLimits,
    pub group_page_size: u32,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or("API_PORT", optional("API_PORT"), 3001_u16)?;
        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let directory_backend = match optional("DIRECTORY_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => DirectoryBackend::Postgres {
                database_url: optional("DATABASE_URL").ok_or_else(|| {
                    AppError::Validation(
                        "DATABASE_URL is required when DIRECTORY_BACKEND is 'postgres'".to_owned(),
                    )
                })?,
            },
            "memory" => DirectoryBackend::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "DIRECTORY_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let role_claim = optional("ROLE_CLAIM").unwrap_or_else(|| DEFAULT_ROLE_CLAIM.to_owned());

        let denial_verbosity = match optional("DENIAL_DETAIL")
            .unwrap_or_else(|| "detailed".to_owned())
            .as_str()
        {
            "detailed" => DenialVerbosity::Detailed,
            "redacted" => DenialVerbosity::Redacted,
            other => {
                return Err(AppError::Validation(format!(
                    "DENIAL_DETAIL must be either 'detailed' or 'redacted', got '{other}'"
                )));
            }
        };

        let listing_limits = ListingLimits {
            max_consecutive_empty_pages: positive(
                "LISTING_MAX_EMPTY_PAGES",
                parse_or(
                    "LISTING_MAX_EMPTY_PAGES",
                    optional("LISTING_MAX_EMPTY_PAGES"),
                    DEFAULT_MAX_CONSECUTIVE_EMPTY_PAGES,
                )?,
            )?,
            membership_fan_out: positive(
                "MEMBERSHIP_FAN_OUT",
                parse_or(
                    "MEMBERSHIP_FAN_OUT",
                    optional("MEMBERSHIP_FAN_OUT"),
                    DEFAULT_MEMBERSHIP_FAN_OUT,
                )?,
            )?,
        };

        let group_page_size = positive(
            "GROUP_PAGE_SIZE",
            parse_or(
                "GROUP_PAGE_SIZE",
                optional("GROUP_PAGE_SIZE"),
                DEFAULT_GROUP_PAGE_SIZE,
            )?,
        )?;

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            directory_backend,
            role_claim,
            denial_verbosity,
            listing_limits,
            group_page_size,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
    })
}

fn positive<T>(name: &str, value: T) -> Result<T, AppError>
where
    T: PartialOrd + Default,
{
    if value <= T::default() {
        return Err(AppError::Validation(format!("{name} must be positive")));
    }

    Ok(value)
}
