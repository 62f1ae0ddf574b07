use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::probe::ProbeOutcome;

pub(crate) const ALL_AMBIGUOUS_REASON: &str = "All MX hosts were inconclusive or unreachable";
pub(crate) const NO_MX_REASON: &str = "No MX records found";

/// Final classification of an address.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Deliverable,
    Undeliverable,
    Unknown,
    NoMx,
    InvalidFormat,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deliverable => "deliverable",
            Self::Undeliverable => "undeliverable",
            Self::Unknown => "unknown",
            Self::NoMx => "no MX records",
            Self::InvalidFormat => "invalid format",
        })
    }
}

/// One exchanger contacted during a verification.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttempt {
    pub host: String,
    pub priority: u16,
    pub outcome: ProbeOutcome,
}

/// Aggregate over the probes of one verification.
///
/// `valid` is `Some(true)` only for deliverable addresses and `None` when the
/// probes could not settle the question.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub valid: Option<bool>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub smtp_host_tried: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub smtp_code: Option<u16>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub smtp_message: Option<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub reason: Option<String>,
    #[cfg_attr(
        feature = "with-serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub attempts: Vec<HostAttempt>,
}

impl VerificationResult {
    fn bare(status: VerificationStatus, valid: Option<bool>) -> Self {
        Self {
            status,
            valid,
            smtp_host_tried: None,
            smtp_code: None,
            smtp_message: None,
            reason: None,
            attempts: Vec::new(),
        }
    }

    pub fn invalid_format(reasons: &[String]) -> Self {
        let mut result = Self::bare(VerificationStatus::InvalidFormat, Some(false));
        result.reason = Some(if reasons.is_empty() {
            "Invalid email format".to_string()
        } else {
            format!("Invalid email format: {}", reasons.join("; "))
        });
        result
    }

    pub fn no_mx(reason: impl Into<String>) -> Self {
        let mut result = Self::bare(VerificationStatus::NoMx, Some(false));
        result.reason = Some(reason.into());
        result
    }

    /// Deliverable or Undeliverable, settled by the last entry of `attempts`.
    pub(crate) fn settled(status: VerificationStatus, attempts: Vec<HostAttempt>) -> Self {
        let valid = Some(matches!(status, VerificationStatus::Deliverable));
        let mut result = Self::bare(status, valid);
        if let Some(last) = attempts.last() {
            result.smtp_host_tried = Some(last.host.clone());
            result.smtp_code = last.outcome.code;
            result.smtp_message = last.outcome.message.clone();
        }
        result.attempts = attempts;
        result
    }

    pub(crate) fn unknown(attempts: Vec<HostAttempt>) -> Self {
        let mut result = Self::bare(VerificationStatus::Unknown, None);
        result.reason = Some(ALL_AMBIGUOUS_REASON.to_string());
        result.attempts = attempts;
        result
    }

    pub fn is_deliverable(&self) -> bool {
        self.status == VerificationStatus::Deliverable
    }
}
