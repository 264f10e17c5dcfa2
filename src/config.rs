//! Client configuration.

use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options read by the connection establisher and the connection wrapper.
///
/// Durations serialize as integer milliseconds. Missing fields take their
/// default, so partial documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Applied as an absolute dial deadline (`now + connect_timeout`).
    #[serde(with = "millis")]
    pub connect_timeout: Duration,
    /// TCP keepalive idle time and probe interval. `None` leaves keepalive off.
    #[serde(with = "option_millis")]
    pub keep_alive: Option<Duration>,
    /// Dial over TLS (peer verification disabled) instead of plain TCP.
    pub use_tls: bool,
    /// Bound on each read issued through the wrapper.
    #[serde(with = "option_millis")]
    pub read_timeout: Option<Duration>,
    /// Bound on each write issued through the wrapper.
    #[serde(with = "option_millis")]
    pub write_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            keep_alive: Some(Duration::from_secs(15)),
            use_tls: false,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document, e.g. `{"connect_timeout": 3000, "use_tls": true}`.
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::InvalidArgument(e.to_string()))
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn keep_alive(mut self, period: Duration) -> Self {
        self.keep_alive = Some(period);
        self
    }

    pub fn no_keep_alive(mut self) -> Self {
        self.keep_alive = None;
        self
    }

    pub fn use_tls(mut self, enabled: bool) -> Self {
        self.use_tls = enabled;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(saturating_millis(d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }

    /// Durations past `u64::MAX` milliseconds are written as `u64::MAX`.
    pub(super) fn saturating_millis(d: &Duration) -> u64 {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    }
}

mod option_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&super::millis::saturating_millis(d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|ms| ms.map(Duration::from_millis))
    }
}
