use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use tracing::trace;

use super::error::SmtpError;
use super::types::{ProbeStage, SmtpReply};

/// Longest reply line accepted, CRLF included.
const MAX_LINE_LEN: usize = 1024;
/// Lines accepted in one multi-line reply.
const MAX_REPLY_LINES: usize = 64;

pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Instant,
}

impl SmtpSession {
    /// Tries each address in turn. `timeout` is the budget for the whole
    /// session: connect, every command and every reply line.
    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        timeout: Duration,
    ) -> Result<Self, SmtpError> {
        let deadline = Instant::now() + timeout;
        let mut last_err = None;
        for addr in addrs {
            let Some(remaining) = remaining_until(deadline) else {
                last_err = Some(deadline_exceeded());
                break;
            };
            match TcpStream::connect_timeout(addr, remaining) {
                Ok(stream) => {
                    return Self::from_stream(host, stream, deadline).map_err(|source| {
                        SmtpError::Connect {
                            host: host.to_string(),
                            source,
                        }
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(SmtpError::Connect {
            host: host.to_string(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        })
    }

    fn from_stream(host: &str, stream: TcpStream, deadline: Instant) -> io::Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            host: host.to_string(),
            stream,
            reader,
            deadline,
        })
    }

    /// Shrinks the socket timeouts to what is left of the session budget.
    fn arm_timeouts(&self) -> io::Result<()> {
        let remaining = remaining_until(self.deadline).ok_or_else(deadline_exceeded)?;
        self.stream.set_read_timeout(Some(remaining))?;
        self.stream.set_write_timeout(Some(remaining))
    }

    pub(crate) fn read_greeting(&mut self) -> Result<SmtpReply, SmtpError> {
        self.read_reply(ProbeStage::Greeting)
    }

    /// Sends one command line and waits for the complete (possibly
    /// multi-line) reply. A command carrying CR, LF or NUL is refused before
    /// anything is written.
    pub(crate) fn command(
        &mut self,
        command: &str,
        stage: ProbeStage,
    ) -> Result<SmtpReply, SmtpError> {
        if command.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
            return Err(SmtpError::Protocol(format!(
                "refusing to send {stage} command containing a line break or NUL"
            )));
        }
        trace!(host = %self.host, "C: {command}");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.arm_timeouts()
            .and_then(|()| self.stream.write_all(&line))
            .and_then(|()| self.stream.flush())
            .map_err(|err| SmtpError::io(stage, err))?;
        self.read_reply(stage)
    }

    /// Best effort: the verdict is already known when this runs.
    pub(crate) fn quit(mut self) {
        let _ = self.command("QUIT", ProbeStage::Quit);
    }

    fn read_reply(&mut self, stage: ProbeStage) -> Result<SmtpReply, SmtpError> {
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() == MAX_REPLY_LINES {
                return Err(SmtpError::Protocol(format!(
                    "reply to {stage} exceeds {MAX_REPLY_LINES} lines"
                )));
            }
            let mut raw = String::new();
            let bytes = self
                .arm_timeouts()
                .and_then(|()| {
                    (&mut self.reader)
                        .take(MAX_LINE_LEN as u64)
                        .read_line(&mut raw)
                })
                .map_err(|err| SmtpError::io(stage, err))?;
            if bytes == 0 {
                return Err(SmtpError::Closed { stage });
            }
            if !raw.ends_with('\n') && bytes == MAX_LINE_LEN {
                return Err(SmtpError::Protocol(format!(
                    "reply line to {stage} longer than {MAX_LINE_LEN} bytes"
                )));
            }
            let raw = raw.trim_end_matches(['\r', '\n']);
            trace!(host = %self.host, "S: {raw}");

            let code_part = raw.get(..3).ok_or_else(|| {
                SmtpError::Protocol(format!("invalid SMTP reply to {stage}: '{raw}'"))
            })?;
            let parsed_code = code_part.parse::<u16>().map_err(|_| {
                SmtpError::Protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
            match code {
                Some(existing) if existing != parsed_code => {
                    return Err(SmtpError::Protocol(format!(
                        "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                    )));
                }
                Some(_) => {}
                None => code = Some(parsed_code),
            }

            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            message_lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| SmtpError::Protocol("SMTP reply missing status code".into()))?,
            message: message_lines.join("\n"),
        })
    }
}

fn remaining_until(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|remaining| !remaining.is_zero())
}

fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "SMTP session deadline exceeded")
}
