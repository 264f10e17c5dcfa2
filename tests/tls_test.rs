use boring::ssl::{SslVerifyMode, SslVersion};
use remoting::socket::tls::TlsConfig;

#[test]
fn test_default_broker_profile() {
    let config = TlsConfig::default();

    assert_eq!(config.verify_mode, SslVerifyMode::NONE);
    assert!(config.min_version == Some(SslVersion::TLS1_2));
    assert!(config.max_version == Some(SslVersion::TLS1_3));

    let result = config.build_connector();
    assert!(result.is_ok(), "Failed to build connector for the broker profile");
}

#[test]
fn test_pinned_version_range() {
    let mut config = TlsConfig::insecure();
    config.max_version = Some(SslVersion::TLS1_2);

    assert!(config.build_connector().is_ok());
    assert!(config.configure("broker-a.example.com").is_ok());
}
