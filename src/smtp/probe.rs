use std::net::{SocketAddr, ToSocketAddrs};

use tracing::debug;

use super::error::SmtpError;
use super::options::ProbeOptions;
use super::session::SmtpSession;
use super::types::{ProbeResponse, ProbeStage};

/// One recipient check against one mail exchange.
pub trait Probe: Send + Sync {
    fn probe(&self, host: &str, address: &str) -> Result<ProbeResponse, SmtpError>;
}

/// Runs the minimal `HELO` / `MAIL FROM` / `RCPT TO` dialogue over plain TCP
/// and stops before `DATA`, so nothing is ever delivered.
///
/// Acceptance of `RCPT TO` is a heuristic: catch-all domains accept every
/// recipient and servers enforcing sender checks may refuse the probe itself.
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

impl Probe for SmtpProber {
    fn probe(&self, host: &str, address: &str) -> Result<ProbeResponse, SmtpError> {
        let options = &self.options;
        let addrs = resolve_socket_addrs(host, options.port)?;
        let mut session = SmtpSession::connect(host, &addrs, options.effective_timeout())?;

        let greeting = session.read_greeting()?;
        if !greeting.is_positive_completion() {
            debug!(host, code = greeting.code, "greeting refused");
            session.quit();
            return Ok(ProbeResponse::new(ProbeStage::Greeting, greeting));
        }

        let steps = [
            (format!("HELO {}", options.helo_name()), ProbeStage::Helo),
            (options.envelope(), ProbeStage::MailFrom),
        ];
        for (command, stage) in steps {
            let reply = session.command(&command, stage)?;
            if !reply.is_positive_completion() {
                debug!(host, code = reply.code, %stage, "command refused");
                session.quit();
                return Ok(ProbeResponse::new(stage, reply));
            }
        }

        let rcpt = session.command(&format!("RCPT TO:<{address}>"), ProbeStage::RcptTo)?;
        session.quit();
        Ok(ProbeResponse::new(ProbeStage::RcptTo, rcpt))
    }
}

fn resolve_socket_addrs(host: &str, port: u16) -> Result<Vec<SocketAddr>, SmtpError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| SmtpError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(SmtpError::Resolve {
            host: host.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no address for host"),
        });
    }
    Ok(addrs)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{self, BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    pub(crate) type Script = Vec<(&'static str, &'static str)>;

    /// Accepts one connection, greets it, then answers each expected
    /// command with the scripted reply.
    pub(crate) fn spawn_mock_server(
        greeting: &'static str,
        script: Script,
    ) -> (u16, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                handle_session(&mut stream, greeting, script).expect("mock session");
            }
        });
        (port, handle)
    }

    fn handle_session(stream: &mut TcpStream, greeting: &str, script: Script) -> io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        stream.write_all(greeting.as_bytes())?;
        stream.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            assert!(!line.starts_with("DATA"), "DATA must never be sent");
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
        }
        Ok(())
    }

    pub(crate) fn rcpt_script(rcpt_reply: &'static str) -> Script {
        vec![
            ("HELO", "250 mock.example\r\n"),
            ("MAIL FROM:<probe@example.com>", "250 2.1.0 Ok\r\n"),
            ("RCPT TO:<user@example.com>", rcpt_reply),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]
    }

    pub(crate) fn local_options(port: u16) -> ProbeOptions {
        ProbeOptions {
            port,
            timeout: Duration::from_secs(5),
            ..ProbeOptions::default()
        }
    }

    #[test]
    fn rcpt_reply_is_returned() {
        let (port, handle) =
            spawn_mock_server("220 mock ESMTP\r\n", rcpt_script("250 2.1.5 Ok\r\n"));
        let prober = SmtpProber::new(local_options(port));
        let response = prober
            .probe("127.0.0.1", "user@example.com")
            .expect("probe");
        assert!(response.reached_rcpt());
        assert_eq!(response.reply.code, 250);
        handle.join().expect("server thread");
    }

    #[test]
    fn multiline_helo_reply_is_consumed() {
        let (port, handle) = spawn_mock_server(
            "220-mock ESMTP\r\n220 ready\r\n",
            vec![
                ("HELO", "250-mock.example\r\n250 PIPELINING\r\n"),
                ("MAIL FROM:", "250 Ok\r\n"),
                ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
                ("QUIT", "221 Bye\r\n"),
            ],
        );
        let prober = SmtpProber::new(local_options(port));
        let response = prober
            .probe("127.0.0.1", "user@example.com")
            .expect("probe");
        assert_eq!(response.reply.code, 550);
        assert_eq!(response.reply.message, "5.1.1 User unknown");
        handle.join().expect("server thread");
    }

    #[test]
    fn refused_sender_stops_before_rcpt() {
        let (port, handle) = spawn_mock_server(
            "220 mock ESMTP\r\n",
            vec![
                ("HELO", "250 mock.example\r\n"),
                ("MAIL FROM:", "553 5.7.1 Sender rejected\r\n"),
                ("QUIT", "221 Bye\r\n"),
            ],
        );
        let prober = SmtpProber::new(local_options(port));
        let response = prober
            .probe("127.0.0.1", "user@example.com")
            .expect("probe");
        assert_eq!(response.stage, ProbeStage::MailFrom);
        assert_eq!(response.reply.code, 553);
        handle.join().expect("server thread");
    }

    #[test]
    fn refused_connection_is_connection_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let prober = SmtpProber::new(local_options(port));
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("nothing listens");
        assert!(err.is_connection_failure(), "{err}");
    }

    #[test]
    fn silent_server_is_bounded_by_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(2));
                drop(stream);
            }
        });
        let prober = SmtpProber::new(ProbeOptions {
            port,
            timeout: Duration::from_millis(200),
            ..ProbeOptions::default()
        });
        let started = Instant::now();
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("server never greets");
        assert!(err.is_timeout(), "{err}");
        assert!(!err.is_connection_failure());
        assert!(started.elapsed() < Duration::from_secs(2));
        handle.join().expect("server thread");
    }

    #[test]
    fn slow_drip_greeting_hits_session_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let until = Instant::now() + Duration::from_secs(3);
                while Instant::now() < until {
                    if stream.write_all(b"220-still here\r\n").is_err() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            }
        });
        let prober = SmtpProber::new(ProbeOptions {
            port,
            timeout: Duration::from_millis(300),
            ..ProbeOptions::default()
        });
        let started = Instant::now();
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("greeting never ends");
        let elapsed = started.elapsed();
        assert!(err.is_timeout(), "{err}");
        assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
        handle.join().expect("server thread");
    }

    #[test]
    fn endless_multiline_reply_is_cut_off() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let burst = "220-flood\r\n".repeat(500);
                let _ = stream.write_all(burst.as_bytes());
                thread::sleep(Duration::from_millis(200));
            }
        });
        let prober = SmtpProber::new(local_options(port));
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("too many lines");
        assert!(matches!(err, SmtpError::Protocol(_)), "{err}");
        handle.join().expect("server thread");
    }

    #[test]
    fn oversized_reply_line_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let line = format!("220 {}\r\n", "x".repeat(4096));
                let _ = stream.write_all(line.as_bytes());
                thread::sleep(Duration::from_millis(200));
            }
        });
        let prober = SmtpProber::new(local_options(port));
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("line too long");
        assert!(matches!(err, SmtpError::Protocol(_)), "{err}");
        handle.join().expect("server thread");
    }

    #[test]
    fn line_breaks_in_recipient_are_never_sent() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || -> Vec<String> {
            let mut seen = Vec::new();
            let Ok((mut stream, _)) = listener.accept() else {
                return seen;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let _ = stream.write_all(b"220 mock ESMTP\r\n");
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        seen.push(line.trim_end().to_string());
                        let _ = stream.write_all(b"250 Ok\r\n");
                    }
                }
            }
            seen
        });
        let prober = SmtpProber::new(local_options(port));
        let err = prober
            .probe("127.0.0.1", "\"x\r\nDATA\r\n\"@example.com")
            .expect_err("recipient with CRLF");
        assert!(matches!(err, SmtpError::Protocol(_)), "{err}");

        let seen = handle.join().expect("server thread");
        assert_eq!(seen, ["HELO localhost", "MAIL FROM:<probe@example.com>"]);
    }

    #[test]
    fn line_breaks_in_sender_are_never_sent() {
        let (port, handle) = spawn_mock_server(
            "220 mock ESMTP\r\n",
            vec![("HELO", "250 mock.example\r\n")],
        );
        let prober = SmtpProber::new(ProbeOptions {
            sender: "a@b.com>\r\nDATA".to_string(),
            ..local_options(port)
        });
        let err = prober
            .probe("127.0.0.1", "user@example.com")
            .expect_err("sender with CRLF");
        assert!(matches!(err, SmtpError::Protocol(_)), "{err}");
        handle.join().expect("server thread");
    }
}
