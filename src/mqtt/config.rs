//! Session configuration.

use heapless::String;
use serde::Deserialize;

use super::MAX_CLIENT_ID_LEN;
use super::error::Error;

/// Longest broker host name or address accepted.
pub const MAX_HOST_LEN: usize = 64;

/// Default time allowed for the server's CONNACK.
pub const DEFAULT_CONNACK_TIMEOUT_MS: u32 = 10_000;

fn default_connack_timeout_ms() -> u32 {
    DEFAULT_CONNACK_TIMEOUT_MS
}

/// Broker address and client identity for a [`Session`](super::Session).
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::Config;
///
/// let config = Config::new("192.168.1.10", 1883, "dev1").unwrap();
/// assert_eq!(config.client_id.as_str(), "dev1");
///
/// let json = r#"{"host":"broker.local","port":1883,"client_id":"dev2"}"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.connack_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Broker host name or dotted address.
    pub host: String<MAX_HOST_LEN>,
    /// Broker TCP port.
    pub port: u16,
    /// Client identifier, unique per broker, at most 23 bytes.
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    /// Milliseconds to wait for CONNACK before giving up.
    #[serde(default = "default_connack_timeout_ms")]
    pub connack_timeout_ms: u32,
}

impl Config {
    /// Validate and build a configuration.
    ///
    /// # Errors
    ///
    /// * [`Error::ClientIdTooLong`] - `client_id` is longer than 23 bytes
    /// * [`Error::InvalidConfig`] - empty or over-long host, or port 0
    pub fn new(host: &str, port: u16, client_id: &str) -> Result<Self, Error> {
        let host = String::try_from(host).map_err(|_| Error::InvalidConfig)?;
        let client_id = String::try_from(client_id).map_err(|_| Error::ClientIdTooLong)?;
        let config = Self {
            host,
            port,
            client_id,
            connack_timeout_ms: DEFAULT_CONNACK_TIMEOUT_MS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON object with `host`, `port`,
    /// `client_id` and an optional `connack_timeout_ms`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let (config, _): (Self, usize) =
            serde_json_core::from_str(json).map_err(|_| Error::InvalidConfig)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the CONNACK timeout.
    pub fn with_connack_timeout(mut self, timeout_ms: u32) -> Self {
        self.connack_timeout_ms = timeout_ms;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.host.is_empty() || self.port == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}
