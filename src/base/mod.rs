//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): dial and TLS error codes
//! - [`CancellationToken`](cancel::CancellationToken): cancel + deadline for dials
//! - [`IoResultExt`](context::IoResultExt): host/port context for `io::Error`

pub mod cancel;
pub mod context;
pub mod neterror;

#[cfg(test)]
mod tests;
