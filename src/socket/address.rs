//! Endpoint normalization.
//!
//! Brokers advertise endpoints as `host:port`, and IPv6 hosts often arrive
//! unbracketed (`22da:d3:0:2f3a::2000:10911`). Dialing needs the literal in
//! brackets, so [`normalize`] adds them. Nothing here validates that the
//! host is a well-formed address; bad input fails later at dial time.

use crate::base::neterror::NetError;

/// Return `addr` in a form suitable for dialing.
///
/// - anything containing `[` is assumed bracketed and returned as is
/// - `host:port` with at most one colon (IPv4, hostnames) is returned as is
/// - otherwise everything before the last colon is treated as an IPv6
///   literal and wrapped in brackets
///
/// ```
/// use remoting::socket::address::normalize;
///
/// assert_eq!(normalize("1.1.1.1:10911"), "1.1.1.1:10911");
/// assert_eq!(normalize("22da:d3:0:2f3a::2000:10911"), "[22da:d3:0:2f3a::2000]:10911");
/// ```
pub fn normalize(addr: &str) -> String {
    if addr.contains('[') {
        return addr.to_string();
    }

    match addr.rsplit_once(':') {
        Some((host, port)) if host.contains(':') => format!("[{host}]:{port}"),
        _ => addr.to_string(),
    }
}

/// Split a normalized endpoint into an unbracketed host and a port.
pub fn split_host_port(addr: &str) -> Result<(String, u16), NetError> {
    let invalid = |why: &str| NetError::AddressInvalid(format!("{addr}: {why}"));

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(|| invalid("missing ']'"))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port"))?;
        (host, port)
    } else {
        let (host, port) = addr.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        if host.contains(':') {
            return Err(invalid("too many colons"));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;
    Ok((host.to_string(), port))
}
