#![forbid(unsafe_code)]
//! mailprobe: checks whether a mailbox exists by asking its mail exchangers.
//!
//! The pipeline validates the address locally, resolves the domain's MX
//! records, then walks the exchangers in priority order running a short
//! `HELO` / `MAIL FROM` / `RCPT TO` dialogue against each until one of them
//! accepts or rejects the mailbox. No message is ever sent.

pub mod mx;
pub mod probe;
pub mod validator;
pub mod verify;

#[cfg(feature = "with-http")]
pub mod http;

pub use mx::{Error as MxError, LookupMx, MailExchanger, MxStatus, check_mx};
pub use probe::{
    Classification, ConfigError, ProbeOptions, ProbeOutcome, Prober, SmtpProber, Step,
};
pub use validator::{
    NormalizedEmail, ValidationMode, ValidationReport, normalize_email, validate_email,
};
pub use verify::{
    HostAttempt, VerificationResult, VerificationStatus, Verifier, VerifyError, verify_email,
};
