//! Fleet source adapters

use fleetmap_infra::{CachedDrivers, HttpFleetSource};
use fleetmap_types::Result;

use crate::config::Config;

/// HTTP source with drivers cached for the session
pub type FleetClient = CachedDrivers<HttpFleetSource>;

/// Open the fleet API configured in `config`
pub fn open_fleet_source(config: &Config) -> Result<FleetClient> {
    config.validate()?;
    let http = HttpFleetSource::new(&config.api_url, config.request_timeout())?;
    Ok(CachedDrivers::new(http))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = Config {
            request_timeout_ms: 10_000,
            ..Config::default()
        };
        assert!(open_fleet_source(&config).is_err());
    }

    #[test]
    fn test_open_uses_configured_url() {
        let config = Config {
            api_url: "http://fleet.local/api/".into(),
            ..Config::default()
        };
        let source = open_fleet_source(&config).unwrap();
        assert_eq!(source.inner().base_url(), "http://fleet.local/api");
    }
}
