use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::error::SessionError;
use super::types::{ProbeStage, SmtpEvent, SmtpReply};

const MAX_LINE_LEN: u64 = 1024;
const MAX_REPLY_LINES: usize = 128;

/// Opens the byte stream for one SMTP session.
pub trait Dialer {
    type Stream: Read + Write;

    /// Connect to `host:port`. Reads and writes on the returned stream must
    /// give up after `timeout`.
    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Stream>;
}

/// Plain TCP, trying every resolved socket address in turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    debug!(host, %addr, "connected");
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no socket address available",
            )
        }))
    }
}

/// One SMTP conversation with one candidate. Dropping it closes the stream.
pub(crate) struct SmtpSession<S: Read + Write> {
    host: String,
    reader: BufReader<S>,
    events: Vec<SmtpEvent>,
}

impl<S: Read + Write> SmtpSession<S> {
    pub(crate) fn open<D>(
        dialer: &D,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, SessionError>
    where
        D: Dialer<Stream = S> + ?Sized,
    {
        let stream = dialer
            .dial(host, port, timeout)
            .map_err(|source| match source.kind() {
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SessionError::Timeout {
                    stage: ProbeStage::Connect,
                },
                _ => SessionError::Connect {
                    host: host.to_string(),
                    port,
                    source,
                },
            })?;
        Ok(Self {
            host: host.to_string(),
            reader: BufReader::new(stream),
            events: Vec::new(),
        })
    }

    pub(crate) fn into_events(self) -> Vec<SmtpEvent> {
        self.events
    }

    pub(crate) fn record_error(&mut self, err: &SessionError) {
        self.events.push(SmtpEvent::Error {
            stage: err.stage(),
            message: err.to_string(),
        });
    }

    /// Send `command` and wait for its reply.
    pub(crate) fn command(
        &mut self,
        command: &str,
        stage: ProbeStage,
    ) -> Result<SmtpReply, SessionError> {
        self.send_command(command, stage)?;
        self.read_reply(stage)
    }

    pub(crate) fn send_command(
        &mut self,
        command: &str,
        stage: ProbeStage,
    ) -> Result<(), SessionError> {
        if command.contains(|c: char| c == '\r' || c == '\n') {
            return Err(SessionError::protocol(
                stage,
                "command contains a line break",
            ));
        }
        debug!(host = %self.host, %stage, "C: {command}");
        self.events.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let stream = self.reader.get_mut();
        stream
            .write_all(&line)
            .map_err(|err| SessionError::io(stage, err))?;
        stream.flush().map_err(|err| SessionError::io(stage, err))
    }

    /// Read a possibly multi-line reply (`250-...` continuations).
    pub(crate) fn read_reply(&mut self, stage: ProbeStage) -> Result<SmtpReply, SessionError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() >= MAX_REPLY_LINES {
                return Err(SessionError::protocol(stage, "reply has too many lines"));
            }
            let raw = self.read_line(stage)?;
            if raw.len() < 3 || !raw.is_char_boundary(3) {
                return Err(SessionError::protocol(
                    stage,
                    format!("invalid SMTP reply: '{raw}'"),
                ));
            }
            let code_part = &raw[..3];
            if !code_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(SessionError::protocol(
                    stage,
                    format!("invalid SMTP status code: '{code_part}'"),
                ));
            }
            let parsed_code = code_part.parse::<u16>().map_err(|_| {
                SessionError::protocol(stage, format!("invalid SMTP status code: '{code_part}'"))
            })?;
            if let Some(existing) = code {
                if existing != parsed_code {
                    return Err(SessionError::protocol(
                        stage,
                        format!("inconsistent SMTP reply codes: {existing} vs {parsed_code}"),
                    ));
                }
            } else {
                code = Some(parsed_code);
            }
            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            let text = raw.get(4..).unwrap_or_default().to_string();
            message_lines.push(text);
            if !continuation {
                break;
            }
        }
        let reply = SmtpReply {
            code: code.ok_or_else(|| SessionError::protocol(stage, "reply missing status code"))?,
            message: message_lines.join("\n"),
        };
        debug!(host = %self.host, %stage, "S: {reply}");
        self.events.push(SmtpEvent::Received {
            stage,
            reply: reply.clone(),
        });
        Ok(reply)
    }

    fn read_line(&mut self, stage: ProbeStage) -> Result<String, SessionError> {
        let mut raw = String::new();
        let bytes = self
            .reader
            .by_ref()
            .take(MAX_LINE_LEN)
            .read_line(&mut raw)
            .map_err(|err| SessionError::io(stage, err))?;
        if bytes == 0 {
            return Err(SessionError::Closed { stage });
        }
        if !raw.ends_with('\n') {
            return Err(SessionError::protocol(stage, "reply line too long or truncated"));
        }
        raw.pop();
        if raw.ends_with('\r') {
            raw.pop();
        }
        Ok(raw)
    }

    /// Best-effort `QUIT`; failures are only recorded.
    pub(crate) fn quit(&mut self) {
        if let Err(err) = self.command("QUIT", ProbeStage::Quit) {
            self.record_error(&err);
        }
    }
}
