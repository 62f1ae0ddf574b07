use std::fmt;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use super::reply::SmtpReply;

/// Position in the scripted dialogue: which reply the session is waiting for.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Greeting,
    AfterHelo,
    AfterMailFrom,
    AfterRcpt,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greeting => "greeting",
            Self::AfterHelo => "helo",
            Self::AfterMailFrom => "mail-from",
            Self::AfterRcpt => "rcpt-to",
        })
    }
}

/// How a single probe session ended.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The exchanger accepted the mailbox at `RCPT TO`.
    Accepted,
    /// Permanent (5xx) refusal.
    Rejected,
    /// Transient failure, unexpected code or unparseable reply.
    Inconclusive,
    /// Timeout, socket error or premature close.
    NetworkError,
}

impl Classification {
    /// Accepted and Rejected settle the question for the mailbox.
    pub fn is_definitive(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Inconclusive => "inconclusive",
            Self::NetworkError => "network error",
        })
    }
}

/// A recorded SMTP transcript event used for diagnostics.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case", tag = "kind"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Sent { step: Step, command: String },
    Received { step: Step, reply: SmtpReply },
    Error { step: Step, message: String },
}

impl fmt::Display for SmtpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { command, .. } => write!(f, "C: {command}"),
            Self::Received { reply, .. } => write!(f, "S: {} {}", reply.code, reply.message),
            Self::Error { step, message } => write!(f, "!  {message} (during {step})"),
        }
    }
}

/// Terminal result of one probe session. Produced exactly once per session.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub classification: Classification,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub code: Option<u16>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub message: Option<String>,
    /// Step the session was at when it resolved.
    pub step: Step,
    #[cfg_attr(
        feature = "with-serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub transcript: Vec<SmtpEvent>,
}

impl ProbeOutcome {
    pub fn is_definitive(&self) -> bool {
        self.classification.is_definitive()
    }
}
