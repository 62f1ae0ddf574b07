//! DNS MX resolution.
//!
//! The public entry point is [`check_mx`], which performs a synchronous lookup
//! using the system resolver and returns a [`MxStatus`] describing the outcome.
//! [`LookupMx`] is the seam used by the verification pipeline, so any
//! resolver (or a test double) can stand in for the system one.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, check_mx, normalize_domain, resolve_with, system_resolver};
pub use types::{MailExchanger, MxStatus};

#[cfg(test)]
pub(crate) mod tests;
