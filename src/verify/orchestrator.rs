use crate::mx::MailExchanger;
use crate::probe::{Classification, Prober};

use super::types::{HostAttempt, NO_MX_REASON, VerificationResult, VerificationStatus};

/// Probes `hosts` one at a time in ascending priority until one of them
/// settles the question.
///
/// Hosts sharing a priority keep their input order. The first `Accepted`
/// yields `Deliverable` and the first `Rejected` yields `Undeliverable`;
/// anything else moves on to the next host. No host is contacted after a
/// definitive answer.
pub fn verify<P>(mailbox: &str, hosts: &[MailExchanger], prober: &P) -> VerificationResult
where
    P: Prober + ?Sized,
{
    verify_with_limit(mailbox, hosts, prober, None)
}

/// Like [`verify`], giving up after `max_hosts` exchangers.
pub fn verify_with_limit<P>(
    mailbox: &str,
    hosts: &[MailExchanger],
    prober: &P,
    max_hosts: Option<usize>,
) -> VerificationResult
where
    P: Prober + ?Sized,
{
    if hosts.is_empty() {
        return VerificationResult::no_mx(NO_MX_REASON);
    }

    let mut ordered: Vec<&MailExchanger> = hosts.iter().collect();
    ordered.sort_by_key(|mx| mx.priority);
    let limit = max_hosts.unwrap_or(usize::MAX);

    let mut attempts = Vec::new();
    for mx in ordered.into_iter().take(limit) {
        tracing::debug!(host = %mx.host, priority = mx.priority, mailbox, "probing exchanger");
        let outcome = prober.probe(&mx.host, mailbox);
        let classification = outcome.classification;
        let definitive = outcome.is_definitive();
        attempts.push(HostAttempt {
            host: mx.host.clone(),
            priority: mx.priority,
            outcome,
        });

        if definitive {
            let status = if classification == Classification::Accepted {
                VerificationStatus::Deliverable
            } else {
                VerificationStatus::Undeliverable
            };
            return VerificationResult::settled(status, attempts);
        }
        tracing::info!(host = %mx.host, %classification, "exchanger inconclusive, trying next");
    }

    VerificationResult::unknown(attempts)
}
