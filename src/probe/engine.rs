use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::options::ProbeOptions;
use super::reply::{Framed, ReplyParser};
use super::session::{Fault, ProbeSession, SessionEvent, Transition};
use super::types::ProbeOutcome;

/// Anything able to probe one exchanger for one mailbox.
pub trait Prober {
    fn probe(&self, host: &str, mailbox: &str) -> ProbeOutcome;
}

/// [`Prober`] speaking SMTP over TCP.
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }
}

impl Prober for SmtpProber {
    fn probe(&self, host: &str, mailbox: &str) -> ProbeOutcome {
        probe(host, mailbox, &self.options)
    }
}

/// Runs one SMTP session against `host` for `mailbox`.
///
/// The whole session, name resolution and connection included, is bounded
/// by `options.timeout`. Every failure is reported as a classified
/// [`ProbeOutcome`]; this function does not panic on network input.
pub fn probe(host: &str, mailbox: &str, options: &ProbeOptions) -> ProbeOutcome {
    let deadline = Instant::now() + options.timeout;
    let mut session = ProbeSession::new(mailbox, options);

    let stream = match connect(host, options.port, deadline) {
        Ok(stream) => stream,
        Err(fault) => {
            tracing::warn!(host, port = options.port, ?fault, "SMTP connection failed");
            return session.abandon(fault);
        }
    };
    tracing::debug!(host, port = options.port, "SMTP connection established");

    let (events, inbox) = mpsc::channel();
    let reader = match stream.try_clone() {
        Ok(reader) => reader,
        Err(err) => {
            close(&stream);
            return session.abandon(Fault::Io(err.to_string()));
        }
    };
    let spawned = thread::Builder::new()
        .name(format!("smtp-reader-{host}"))
        .spawn(move || read_replies(reader, events));
    if let Err(err) = spawned {
        close(&stream);
        return session.abandon(Fault::Io(err.to_string()));
    }

    let mut writer = stream;
    let mut pending: VecDeque<SessionEvent> = VecDeque::new();
    loop {
        let event = match pending.pop_front() {
            Some(SessionEvent::Reply(reply)) => {
                // a second reply already waiting means the server answered
                // something that was never sent
                drain(&inbox, &mut pending);
                match pending.front() {
                    Some(SessionEvent::Reply(extra)) => {
                        tracing::warn!(host, code = extra.code, "reply without a pending command");
                        SessionEvent::Fault(Fault::Unsolicited(extra.clone()))
                    }
                    _ => SessionEvent::Reply(reply),
                }
            }
            Some(event) => event,
            None => match remaining(deadline) {
                Some(budget) => match inbox.recv_timeout(budget) {
                    Ok(batch) => {
                        pending.extend(batch);
                        continue;
                    }
                    Err(RecvTimeoutError::Timeout) => SessionEvent::Fault(Fault::Timeout),
                    Err(RecvTimeoutError::Disconnected) => SessionEvent::Fault(Fault::Closed),
                },
                None => SessionEvent::Fault(Fault::Timeout),
            },
        };

        match session.handle(event) {
            Transition::Send(command) => {
                tracing::debug!(host, step = %session.step(), %command, "SMTP command");
                if let Err(fault) = write_command(&mut writer, &command, deadline) {
                    if let Transition::Resolved { outcome, .. } =
                        session.handle(SessionEvent::Fault(fault))
                    {
                        close(&writer);
                        return outcome;
                    }
                }
            }
            Transition::Resolved { outcome, quit } => {
                if quit {
                    // the QUIT reply is never awaited
                    let _ = write_command(&mut writer, "QUIT", deadline);
                }
                close(&writer);
                return outcome;
            }
            Transition::Ignored => {}
        }
    }
}

fn drain(inbox: &Receiver<Vec<SessionEvent>>, pending: &mut VecDeque<SessionEvent>) {
    while let Ok(batch) = inbox.try_recv() {
        pending.extend(batch);
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|budget| !budget.is_zero())
}

fn connect(host: &str, port: u16, deadline: Instant) -> Result<TcpStream, Fault> {
    let addrs = match host.parse::<IpAddr>() {
        Ok(ip) => vec![SocketAddr::new(ip, port)],
        Err(_) => {
            let name = host.to_string();
            resolve_within(deadline, move || {
                (name.as_str(), port)
                    .to_socket_addrs()
                    .map(|addrs| addrs.collect())
            })
            .map_err(|fault| match fault {
                Fault::Io(err) => Fault::Io(format!("cannot resolve {host}: {err}")),
                other => other,
            })?
        }
    };

    let mut last_err = None;
    for addr in &addrs {
        let budget = remaining(deadline).ok_or(Fault::Timeout)?;
        match TcpStream::connect_timeout(addr, budget) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    if remaining(deadline).is_none() {
        return Err(Fault::Timeout);
    }
    Err(Fault::Io(match last_err {
        Some(err) => err.to_string(),
        None => format!("no socket address for {host}"),
    }))
}

/// Runs a blocking name lookup on a helper thread so the session deadline
/// also bounds it. A lookup still running at the deadline is left behind.
fn resolve_within<F>(deadline: Instant, lookup: F) -> Result<Vec<SocketAddr>, Fault>
where
    F: FnOnce() -> io::Result<Vec<SocketAddr>> + Send + 'static,
{
    let budget = remaining(deadline).ok_or(Fault::Timeout)?;
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("smtp-resolve".to_string())
        .spawn(move || {
            let _ = tx.send(lookup());
        })
        .map_err(|err| Fault::Io(err.to_string()))?;

    match rx.recv_timeout(budget) {
        Ok(Ok(addrs)) => Ok(addrs),
        Ok(Err(err)) => Err(Fault::Io(err.to_string())),
        Err(RecvTimeoutError::Timeout) => Err(Fault::Timeout),
        Err(RecvTimeoutError::Disconnected) => Err(Fault::Io("name lookup aborted".to_string())),
    }
}

/// Writes one CRLF-terminated command within what is left of the deadline.
fn write_command(stream: &mut TcpStream, command: &str, deadline: Instant) -> Result<(), Fault> {
    let budget = remaining(deadline).ok_or(Fault::Timeout)?;
    stream
        .set_write_timeout(Some(budget))
        .map_err(|err| Fault::Io(err.to_string()))?;
    let mut line = command.as_bytes().to_vec();
    line.extend_from_slice(b"\r\n");
    stream
        .write_all(&line)
        .and_then(|()| stream.flush())
        .map_err(|err| match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Fault::Timeout,
            _ => Fault::Io(err.to_string()),
        })
}

fn close(stream: &TcpStream) {
    // also wakes the reader thread blocked on the cloned handle
    let _ = stream.shutdown(Shutdown::Both);
}

/// Reader side of a session: frames replies and forwards everything one
/// read produced as a single batch, then reports how the stream ended.
/// Exits as soon as the session stops listening.
fn read_replies(mut stream: TcpStream, events: Sender<Vec<SessionEvent>>) {
    let mut parser = ReplyParser::default();
    let mut buf = [0u8; 1024];
    loop {
        let read = match stream.read(&mut buf) {
            Ok(0) => {
                let _ = events.send(vec![SessionEvent::Fault(Fault::Closed)]);
                return;
            }
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                let _ = events.send(vec![SessionEvent::Fault(Fault::Io(err.to_string()))]);
                return;
            }
        };
        parser.push(&buf[..read]);
        let batch: Vec<SessionEvent> = std::iter::from_fn(|| parser.next_reply())
            .map(|framed| match framed {
                Framed::Reply(reply) => SessionEvent::Reply(reply),
                Framed::Malformed(reason) => SessionEvent::Fault(Fault::Malformed(reason)),
            })
            .collect();
        if !batch.is_empty() && events.send(batch).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn slow_name_lookup_is_cut_by_the_deadline() {
        let deadline = Instant::now() + Duration::from_millis(150);
        let started = Instant::now();
        let result = resolve_within(deadline, || {
            thread::sleep(Duration::from_secs(3));
            Ok(Vec::new())
        });
        assert_eq!(result, Err(Fault::Timeout));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn name_lookup_error_is_reported() {
        let deadline = Instant::now() + Duration::from_secs(2);
        let result = resolve_within(deadline, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
        });
        assert_eq!(result, Err(Fault::Io("no such host".to_string())));
    }

    #[test]
    fn expired_deadline_skips_the_lookup() {
        let result = resolve_within(Instant::now(), || panic!("lookup must not run"));
        assert_eq!(result, Err(Fault::Timeout));
    }

    #[test]
    fn write_after_deadline_is_a_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let mut stream = TcpStream::connect(addr).expect("connect");
        let (_peer, _) = listener.accept().expect("accept");

        let expired = Instant::now();
        assert_eq!(
            write_command(&mut stream, "QUIT", expired),
            Err(Fault::Timeout)
        );
        let live = Instant::now() + Duration::from_secs(2);
        assert_eq!(write_command(&mut stream, "QUIT", live), Ok(()));
    }
}
