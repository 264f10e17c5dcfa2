//! TLS profile for broker connections.
//!
//! The profile is fixed: peer certificates and hostnames are NOT verified.
//! Tightening this belongs to whoever configures the client, not to the
//! connection layer, so nothing here is exposed through `ClientConfig`.

use crate::base::neterror::NetError;
use boring::ssl::{ConnectConfiguration, SslConnector, SslMethod, SslVerifyMode, SslVersion};

#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    pub verify_mode: SslVerifyMode,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self::insecure()
    }
}

impl TlsConfig {
    /// TLS 1.2+ with certificate verification disabled.
    pub fn insecure() -> Self {
        Self {
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            verify_mode: SslVerifyMode::NONE,
        }
    }

    pub fn build_connector(&self) -> Result<SslConnector, NetError> {
        let mut builder = SslConnector::builder(SslMethod::tls())?;
        builder.set_min_proto_version(self.min_version)?;
        builder.set_max_proto_version(self.max_version)?;
        builder.set_verify(self.verify_mode);
        Ok(builder.build())
    }

    /// Per-connection configuration for `host`.
    pub fn configure(&self, host: &str) -> Result<ConnectConfiguration, NetError> {
        let mut config = self.build_connector()?.configure()?;
        config.set_verify_hostname(self.verify_mode != SslVerifyMode::NONE);
        config.set_use_server_name_indication(Self::should_set_sni(host));
        Ok(config)
    }

    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        host.parse::<std::net::IpAddr>().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insecure_profile() {
        let config = TlsConfig::default();
        assert_eq!(config.verify_mode, SslVerifyMode::NONE);
        assert!(config.build_connector().is_ok());
    }

    #[test]
    fn test_configure_for_ip_and_hostname() {
        let config = TlsConfig::insecure();
        assert!(config.configure("127.0.0.1").is_ok());
        assert!(config.configure("broker-a.example.com").is_ok());
    }

    #[test]
    fn test_should_set_sni() {
        assert!(TlsConfig::should_set_sni("broker-a.example.com"));
        assert!(!TlsConfig::should_set_sni("10.0.0.1"));
        assert!(!TlsConfig::should_set_sni("::1"));
    }
}
