//! SMTP reply framing.
//!
//! Bytes are accumulated until complete lines are available. A line of the
//! form `NNN-text` continues a reply, `NNN text` (or a bare `NNN`) ends it;
//! every line of one reply must carry the same code (RFC 5321 §4.2.1).

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Upper bound on the bytes buffered for a single, still incomplete reply.
pub(crate) const MAX_REPLY_BYTES: usize = 64 * 1024;

/// A complete SMTP reply. Multi-line text is joined with `\n`.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

/// One physical reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    pub code: u16,
    /// `false` for `NNN-` continuation lines.
    pub last: bool,
    pub text: String,
}

impl ReplyLine {
    /// Parses a line with its terminator already stripped. The code must be
    /// three digits with a leading digit in `2..=5` or `1`, followed by
    /// nothing, a space or a dash.
    pub fn parse(line: &str) -> Option<Self> {
        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return None;
        }
        if !(b'1'..=b'5').contains(&bytes[0]) {
            return None;
        }
        let last = match bytes.get(3) {
            None | Some(b' ') => true,
            Some(b'-') => false,
            Some(_) => return None,
        };
        let code = line[..3].parse().ok()?;
        let text = line.get(4..).unwrap_or_default().to_string();
        Some(Self { code, last, text })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Framed {
    Reply(SmtpReply),
    Malformed(String),
}

#[derive(Debug)]
struct Partial {
    code: u16,
    lines: Vec<String>,
    bytes: usize,
}

/// Incremental reply parser fed with whatever each socket read returned.
#[derive(Debug, Default)]
pub(crate) struct ReplyParser {
    buffer: Vec<u8>,
    partial: Option<Partial>,
}

impl ReplyParser {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Returns the next complete reply, if the buffered bytes hold one.
    /// After a `Malformed` result the parser starts over on fresh input.
    pub(crate) fn next_reply(&mut self) -> Option<Framed> {
        loop {
            let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') else {
                let pending = self.partial.as_ref().map_or(0, |p| p.bytes);
                if self.buffer.len() + pending > MAX_REPLY_BYTES {
                    return Some(self.reset(format!("reply exceeds {MAX_REPLY_BYTES} bytes")));
                }
                return None;
            };

            let mut raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if raw.is_empty() {
                continue;
            }
            let line = String::from_utf8_lossy(&raw).into_owned();

            let Some(parsed) = ReplyLine::parse(&line) else {
                return Some(self.reset(format!("invalid reply line '{line}'")));
            };

            let mut partial = match self.partial.take() {
                Some(partial) if partial.code != parsed.code => {
                    return Some(self.reset(format!(
                        "inconsistent reply codes: {} vs {}",
                        partial.code, parsed.code
                    )));
                }
                Some(partial) => partial,
                None => Partial {
                    code: parsed.code,
                    lines: Vec::new(),
                    bytes: 0,
                },
            };
            partial.bytes += raw.len();
            partial.lines.push(parsed.text);

            if parsed.last {
                return Some(Framed::Reply(SmtpReply {
                    code: partial.code,
                    message: partial.lines.join("\n"),
                }));
            }
            if partial.bytes > MAX_REPLY_BYTES {
                return Some(self.reset(format!("reply exceeds {MAX_REPLY_BYTES} bytes")));
            }
            self.partial = Some(partial);
        }
    }

    fn reset(&mut self, reason: String) -> Framed {
        self.buffer.clear();
        self.partial = None;
        Framed::Malformed(reason)
    }
}
