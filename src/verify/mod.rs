//! Full verification: format check, MX lookup, then probing exchangers in
//! priority order.

mod error;
mod orchestrator;
mod types;

pub use error::VerifyError;
pub use orchestrator::{verify, verify_with_limit};
pub use types::{HostAttempt, VerificationResult, VerificationStatus};

use trust_dns_resolver::Resolver;

use crate::mx::{self, Error as MxError, LookupMx, MxStatus};
use crate::probe::{ProbeOptions, Prober, SmtpProber};
use crate::validator::normalize_email;

use types::NO_MX_REASON;

/// Verification pipeline over a DNS source and a prober.
///
/// A `Verifier` is immutable once built and can be shared between threads
/// when `R` and `P` allow it.
#[derive(Debug)]
pub struct Verifier<R, P> {
    resolver: R,
    prober: P,
    options: ProbeOptions,
}

impl Verifier<Resolver, SmtpProber> {
    /// System resolver plus an SMTP prober configured from `options`.
    pub fn from_system(options: ProbeOptions) -> Result<Self, VerifyError> {
        let resolver = mx::system_resolver()?;
        let prober = SmtpProber::new(options.clone());
        Ok(Self::new(resolver, prober, options))
    }
}

impl<R, P> Verifier<R, P>
where
    R: LookupMx,
    P: Prober,
{
    pub fn new(resolver: R, prober: P, options: ProbeOptions) -> Self {
        Self {
            resolver,
            prober,
            options,
        }
    }

    pub fn verify(&self, email: &str) -> Result<VerificationResult, VerifyError> {
        let normalized = normalize_email(email, self.options.validation_mode);
        if !normalized.valid {
            tracing::info!(email, reasons = ?normalized.reasons, "address rejected by format check");
            return Ok(VerificationResult::invalid_format(&normalized.reasons));
        }

        let exchangers = match mx::resolve_with(&self.resolver, &normalized.ascii_domain) {
            Ok(MxStatus::Records(records)) => records,
            Ok(MxStatus::NoRecords) => {
                tracing::info!(domain = %normalized.ascii_domain, "no MX records");
                return Ok(VerificationResult::no_mx(NO_MX_REASON));
            }
            Err(MxError::Lookup { domain, source }) => {
                tracing::warn!(%domain, error = %source, "MX lookup failed");
                return Ok(VerificationResult::no_mx(format!("MX lookup failed: {source}")));
            }
            Err(other) => return Err(other.into()),
        };

        let mailbox = normalized.mailbox();
        let result =
            verify_with_limit(&mailbox, &exchangers, &self.prober, self.options.max_hosts);
        tracing::info!(
            mailbox,
            status = %result.status,
            host = result.smtp_host_tried.as_deref(),
            code = result.smtp_code,
            "verification finished"
        );
        Ok(result)
    }
}

/// One-shot verification with the system resolver and SMTP over TCP.
pub fn verify_email(email: &str, options: ProbeOptions) -> Result<VerificationResult, VerifyError> {
    Verifier::from_system(options)?.verify(email)
}
