//! SMTP handshake probe.
//!
//! [`probe`] opens one TCP connection to a mail exchanger and drives
//! `HELO` / `MAIL FROM` / `RCPT TO` without ever sending `DATA`, then
//! classifies the mailbox from the `RCPT TO` answer. The dialogue itself is a
//! socket-free state machine (`session`); the engine owns the socket, the
//! reader thread and the session deadline.

mod engine;
mod options;
mod reply;
mod session;
mod types;

pub use engine::{Prober, SmtpProber, probe};
pub use options::{
    ConfigError, DEFAULT_HELO_DOMAIN, DEFAULT_PROBE_SENDER, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT,
    ProbeOptions, env_keys,
};
pub use reply::{ReplyLine, SmtpReply};
pub use types::{Classification, ProbeOutcome, SmtpEvent, Step};
