use serde::Deserialize;

use crate::commands::{
    ETH_VERSION, MAX_GETBLOCKHASHES_COUNT, MAX_GETBLOCKS_COUNT, NETWORK_ID,
};
use crate::error::{Error, Result};
use crate::lazy::YIELD_EVERY;

pub const ENV_PREFIX: &str = "ETH_WIRE";

///
/// Per protocol instance settings.
///
/// Loaded from an optional config file and `ETH_WIRE_*` environment
/// variables, e.g. `ETH_WIRE_NETWORK_ID=1`. Anything left unset falls back to
/// the protocol defaults.
///
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub eth_version: u64,
    pub network_id: u64,
    /// advisory cap on hashes per outgoing getblocks
    pub max_getblocks_count: usize,
    /// advisory cap on the count asked for by an outgoing getblockhashes
    pub max_getblockhashes_count: usize,
    /// lazy decodes yield to the scheduler after this many elements
    pub yield_every: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        ProtocolConfig {
            eth_version: ETH_VERSION,
            network_id: NETWORK_ID,
            max_getblocks_count: MAX_GETBLOCKS_COUNT,
            max_getblockhashes_count: MAX_GETBLOCKHASHES_COUNT,
            yield_every: YIELD_EVERY,
        }
    }
}

impl ProtocolConfig {
    ///
    /// Load settings. `config_name` names a config file (any format the config
    /// crate understands, extension optional) and must exist if given.
    ///
    pub fn load(config_name: Option<&str>) -> Result<ProtocolConfig> {
        let mut settings = config::Config::default();
        if let Some(name) = config_name {
            settings
                .merge(config::File::with_name(name))
                .map_err(|err| Error::Config(err.to_string()))?;
        }
        settings
            .merge(config::Environment::with_prefix(ENV_PREFIX))
            .map_err(|err| Error::Config(err.to_string()))?;
        ProtocolConfig::from_settings(settings)
    }

    pub fn from_toml(source: &str) -> Result<ProtocolConfig> {
        let mut settings = config::Config::default();
        settings
            .merge(config::File::from_str(source, config::FileFormat::Toml))
            .map_err(|err| Error::Config(err.to_string()))?;
        ProtocolConfig::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> Result<ProtocolConfig> {
        let protocol_config = settings
            .try_into::<ProtocolConfig>()
            .map_err(|err| Error::Config(err.to_string()))?;
        protocol_config.validate()?;
        Ok(protocol_config)
    }

    fn validate(&self) -> Result<()> {
        if self.yield_every == 0 {
            return Err(Error::Config(String::from("yield_every must be at least 1")));
        }
        if self.max_getblocks_count == 0 || self.max_getblockhashes_count == 0 {
            return Err(Error::Config(String::from(
                "request caps must be at least 1",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let protocol_config = ProtocolConfig::default();
        assert_eq!(protocol_config.eth_version, 60);
        assert_eq!(protocol_config.network_id, 99107);
        assert_eq!(protocol_config.max_getblocks_count, 256);
        assert_eq!(protocol_config.max_getblockhashes_count, 2048);
        assert_eq!(protocol_config.yield_every, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let protocol_config =
            ProtocolConfig::from_toml("network_id = 1\nyield_every = 50\n").unwrap();
        assert_eq!(protocol_config.network_id, 1);
        assert_eq!(protocol_config.yield_every, 50);
        assert_eq!(protocol_config.eth_version, 60);
        assert_eq!(protocol_config.max_getblocks_count, 256);
    }

    #[test]
    fn test_zero_yield_cadence_rejected() {
        let err = ProtocolConfig::from_toml("yield_every = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ProtocolConfig::load(Some("does/not/exist/eth_wire")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
