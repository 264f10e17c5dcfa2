//! Name resolution for broker endpoints.
//!
//! The establisher resolves the host part of an endpoint through the
//! [`Resolve`] trait. Literal IPs never reach a resolver
//! ([`SocketAddrs::try_parse`]); hostnames go to [`GaiResolver`] unless the
//! caller supplies another implementation, e.g. [`DnsResolverWithOverrides`]
//! for tests or pinned broker addresses.

mod gai;
mod resolve;

pub use gai::{GaiResolver, SocketAddrs};
pub use resolve::{Addrs, DnsResolverWithOverrides, Name, Resolve, Resolving};
