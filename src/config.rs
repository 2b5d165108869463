use chrono::FixedOffset;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::clock::IST_OFFSET_SECONDS;
use crate::error::{invalid_config_error, Error};

pub const DEFAULT_GOOGLE_MAPS_API_BASE: &str = "https://maps.googleapis.com";

/// Process settings read from the environment (and `.env`, when present).
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub utc_offset: FixedOffset,
    pub pricing_config: Option<PathBuf>,
    pub google_maps: Option<GoogleMapsConfig>,
    pub route_timeout: Duration,
    /// Seeds the random source so a pricing run can be replayed.
    pub random_seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GoogleMapsConfig {
    pub api_base: String,
    pub api_key: String,
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let host: IpAddr = parse_var("HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = parse_var("PORT", 3000)?;

        let offset_minutes: i32 = parse_var("FARES_UTC_OFFSET_MINUTES", IST_OFFSET_SECONDS / 60)?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            invalid_config_error(format!("utc offset {} minutes", offset_minutes))
        })?;

        let pricing_config = optional_var("PRICING_CONFIG")?.map(PathBuf::from);

        let google_maps = match optional_var("GOOGLE_MAPS_API_KEY")? {
            Some(api_key) => Some(GoogleMapsConfig {
                api_base: optional_var("GOOGLE_MAPS_API_BASE")?
                    .unwrap_or_else(|| DEFAULT_GOOGLE_MAPS_API_BASE.into()),
                api_key,
            }),
            None => None,
        };

        let route_timeout = Duration::from_millis(parse_var("ROUTE_TIMEOUT_MS", 2500)?);

        let random_seed = match optional_var("FARES_RANDOM_SEED")? {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| invalid_config_error(format!("FARES_RANDOM_SEED={}", raw)))?,
            ),
            None => None,
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            utc_offset,
            pricing_config,
            google_maps,
            route_timeout,
            random_seed,
        })
    }
}

fn optional_var(name: &str) -> Result<Option<String>, Error> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match optional_var(name)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid_config_error(format!("{}={}", name, raw))),
        None => Ok(default),
    }
}

#[test]
fn parse_var_default_test() {
    let port: u16 = parse_var("FARELINE_TEST_UNSET_PORT", 3000).unwrap();
    assert_eq!(port, 3000);
}

#[test]
fn parse_var_rejects_garbage_test() {
    env::set_var("FARELINE_TEST_BAD_PORT", "not-a-port");

    let result: Result<u16, Error> = parse_var("FARELINE_TEST_BAD_PORT", 3000);
    assert_eq!(result.unwrap_err().code, 6);
}
