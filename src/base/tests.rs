use crate::base::neterror::NetError;
use std::io;
use std::net::SocketAddr;

#[test]
fn test_net_error_codes() {
    assert_eq!(NetError::ConnectionTimedOut.as_i32(), -118);
    assert_eq!(NetError::AddressInvalid("x".into()).as_i32(), -108);
    assert_eq!(NetError::Aborted.as_i32(), -3);

    let refused = NetError::connection_failed_to(
        "127.0.0.1",
        SocketAddr::from(([127, 0, 0, 1], 1)),
        io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
    );
    assert_eq!(refused.as_i32(), -104);
}

#[test]
fn test_io_error_is_kept() {
    let err = NetError::connection_failed_to(
        "broker",
        SocketAddr::from(([10, 0, 0, 7], 10911)),
        io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
    );
    assert_eq!(err.io_error().unwrap().kind(), io::ErrorKind::ConnectionRefused);
    assert!(!err.is_timeout());

    // Clones share the same source
    let cloned = err.clone();
    assert_eq!(cloned.to_string(), err.to_string());
}

#[test]
fn test_is_timeout() {
    assert!(NetError::ConnectionTimedOut.is_timeout());
    let wrapped = NetError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
    assert!(wrapped.is_timeout());
    assert!(!NetError::Aborted.is_timeout());
}
