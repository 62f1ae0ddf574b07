//! The probe dialogue as a pure state machine.
//!
//! The session never touches a socket: the engine feeds it [`SessionEvent`]s
//! and carries out the returned [`Transition`]. Once an outcome has been
//! produced every further event is ignored.

use super::options::ProbeOptions;
use super::reply::SmtpReply;
use super::types::{Classification, ProbeOutcome, SmtpEvent, Step};

pub(crate) const TIMEOUT_MESSAGE: &str = "Timeout";
pub(crate) const CLOSED_MESSAGE: &str = "Connection ended unexpectedly";
pub(crate) const UNSOLICITED_MESSAGE: &str = "unexpected reply before command";

/// Everything that can end or advance a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    Reply(SmtpReply),
    Fault(Fault),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Bytes that do not frame into an SMTP reply.
    Malformed(String),
    /// Socket-level error (resolution, connect, read or write).
    Io(String),
    /// Peer closed the connection.
    Closed,
    /// Session deadline expired.
    Timeout,
    /// A reply arrived while no command was outstanding.
    Unsolicited(SmtpReply),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Write this command line and wait for the next event.
    Send(String),
    /// The session is over. `quit` asks for a best-effort `QUIT` before the
    /// connection is closed.
    Resolved { outcome: ProbeOutcome, quit: bool },
    /// The session had already resolved.
    Ignored,
}

#[derive(Debug)]
pub(crate) struct ProbeSession {
    step: Step,
    finished: bool,
    helo_domain: String,
    probe_sender: String,
    mailbox: String,
    transcript: Vec<SmtpEvent>,
}

impl ProbeSession {
    pub(crate) fn new(mailbox: &str, options: &ProbeOptions) -> Self {
        Self {
            step: Step::Greeting,
            finished: false,
            helo_domain: options.helo_domain.clone(),
            probe_sender: options.probe_sender.clone(),
            mailbox: mailbox.to_string(),
            transcript: Vec::new(),
        }
    }

    pub(crate) fn step(&self) -> Step {
        self.step
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn handle(&mut self, event: SessionEvent) -> Transition {
        if self.finished {
            return Transition::Ignored;
        }
        match event {
            SessionEvent::Reply(reply) => self.on_reply(reply),
            SessionEvent::Fault(fault) => {
                let quit = matches!(fault, Fault::Malformed(_) | Fault::Unsolicited(_));
                let outcome = self.fail(fault);
                Transition::Resolved { outcome, quit }
            }
        }
    }

    /// Ends a session that never got a connection.
    pub(crate) fn abandon(mut self, fault: Fault) -> ProbeOutcome {
        self.fail(fault)
    }

    fn on_reply(&mut self, reply: SmtpReply) -> Transition {
        tracing::debug!(step = %self.step, code = reply.code, "SMTP reply");
        self.transcript.push(SmtpEvent::Received {
            step: self.step,
            reply: reply.clone(),
        });

        let Some((next, command)) = self.next_command() else {
            // RCPT TO answer: the decision point.
            let classification = if reply.is_positive_completion() {
                Classification::Accepted
            } else if reply.is_permanent_failure() {
                Classification::Rejected
            } else {
                Classification::Inconclusive
            };
            return self.resolve_with_reply(classification, reply);
        };

        if reply.is_positive_completion() {
            self.step = next;
            self.transcript.push(SmtpEvent::Sent {
                step: next,
                command: command.clone(),
            });
            return Transition::Send(command);
        }

        let classification = if reply.is_permanent_failure() {
            Classification::Rejected
        } else {
            Classification::Inconclusive
        };
        self.resolve_with_reply(classification, reply)
    }

    fn next_command(&self) -> Option<(Step, String)> {
        match self.step {
            Step::Greeting => Some((Step::AfterHelo, format!("HELO {}", self.helo_domain))),
            Step::AfterHelo => Some((
                Step::AfterMailFrom,
                format!("MAIL FROM:<{}>", self.probe_sender),
            )),
            Step::AfterMailFrom => Some((Step::AfterRcpt, format!("RCPT TO:<{}>", self.mailbox))),
            Step::AfterRcpt => None,
        }
    }

    fn resolve_with_reply(&mut self, classification: Classification, reply: SmtpReply) -> Transition {
        self.transcript.push(SmtpEvent::Sent {
            step: self.step,
            command: "QUIT".to_string(),
        });
        let outcome = self.resolve(classification, Some(reply.code), Some(reply.message));
        Transition::Resolved {
            outcome,
            quit: true,
        }
    }

    fn fail(&mut self, fault: Fault) -> ProbeOutcome {
        let (classification, message) = match fault {
            Fault::Malformed(detail) => (
                Classification::Inconclusive,
                format!("malformed reply: {detail}"),
            ),
            Fault::Io(detail) => (Classification::NetworkError, detail),
            Fault::Closed => (Classification::NetworkError, CLOSED_MESSAGE.to_string()),
            Fault::Timeout => (Classification::NetworkError, TIMEOUT_MESSAGE.to_string()),
            Fault::Unsolicited(reply) => {
                let message = format!("{UNSOLICITED_MESSAGE}: {} {}", reply.code, reply.message);
                self.transcript.push(SmtpEvent::Received {
                    step: self.step,
                    reply,
                });
                (Classification::Inconclusive, message)
            }
        };
        self.transcript.push(SmtpEvent::Error {
            step: self.step,
            message: message.clone(),
        });
        if matches!(classification, Classification::Inconclusive) {
            self.transcript.push(SmtpEvent::Sent {
                step: self.step,
                command: "QUIT".to_string(),
            });
        }
        self.resolve(classification, None, Some(message))
    }

    fn resolve(
        &mut self,
        classification: Classification,
        code: Option<u16>,
        message: Option<String>,
    ) -> ProbeOutcome {
        self.finished = true;
        tracing::info!(
            step = %self.step,
            %classification,
            code,
            "probe session resolved"
        );
        ProbeOutcome {
            classification,
            code,
            message,
            step: self.step,
            transcript: std::mem::take(&mut self.transcript),
        }
    }
}
