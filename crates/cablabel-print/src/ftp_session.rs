// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FTP control session with a CAB printer (RFC 959, explicit TLS per RFC 4217).
//
// CAB printers accept job scripts and images only through their built-in FTP
// server. With TLS enabled the session runs:
//   1. `AUTH TLS`, then the TLS handshake on the control connection
//   2. `USER` / `PASS`
//   3. `PBSZ 0` and `PROT P`, so every data connection is TLS as well
// The printer only accepts the protection commands from a logged-in user.
// Plain mode skips steps 1 and 3.
//
// Only what the printer needs is implemented: login, `TYPE I`, `CWD`, passive
// `STOR` and `QUIT`.
//
// The session is a scoped resource: `QUIT` is sent when the session is closed
// explicitly or, failing that, when it is dropped, so an error at any step
// after connecting never leaves a session open on the printer.
//
// All I/O is blocking. Callers in async code run sessions inside
// `tokio::task::spawn_blocking`.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, StreamOwned};
use tracing::{debug, info, instrument, warn};

use cablabel_core::Credential;
use cablabel_core::error::{CabError, Result};

use crate::addr::socket_addr;

type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// Control or data connection, before or after the TLS upgrade.
enum Channel {
    Plain(TcpStream),
    Secure(Box<TlsStream>),
}

impl Channel {
    fn tcp(&self) -> &TcpStream {
        match self {
            Self::Plain(s) => s,
            Self::Secure(s) => &s.sock,
        }
    }
}

impl Read for Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(s) => s.read(buf),
            Self::Secure(s) => s.read(buf),
        }
    }
}

impl Write for Channel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(s) => s.write(buf),
            Self::Secure(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(s) => s.flush(),
            Self::Secure(s) => s.flush(),
        }
    }
}

/// A server reply: three-digit code plus the text of its last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

/// TLS state shared by the control and data connections.
struct Protection {
    config: Arc<ClientConfig>,
    server_name: ServerName<'static>,
    data_private: bool,
}

/// An authenticated FTP session. Logged out on `close` or drop.
pub struct FtpSession {
    control: BufReader<Channel>,
    tls: Option<Protection>,
    peer: String,
    open: bool,
}

impl FtpSession {
    /// Connect to `host:port`, secure the channel if `tls` is given, log in,
    /// protect the data channel and switch to binary transfers.
    #[instrument(skip(tls, credential), fields(user = credential.username(), tls = tls.is_some()))]
    pub fn open(
        host: &str,
        port: u16,
        tls: Option<Arc<ClientConfig>>,
        credential: &Credential,
    ) -> Result<Self> {
        let peer = socket_addr(host, port);
        let stream = TcpStream::connect(&peer)
            .map_err(|e| CabError::Transport(format!("FTP connect ({peer}): {e}")))?;

        let mut session = Self {
            control: BufReader::new(Channel::Plain(stream)),
            tls: None,
            peer,
            open: false,
        };
        session.expect_reply("greeting", &[220])?;
        session.open = true;

        if let Some(config) = tls {
            session.command("AUTH TLS", "AUTH TLS", &[234])?;
            session.secure_control(config, host)?;
            debug!(peer = %session.peer, "control channel secured");
        }

        session.login(credential)?;

        if session.tls.is_some() {
            session.command("PBSZ 0", "PBSZ", &[200])?;
            session.command("PROT P", "PROT", &[200])?;
            if let Some(tls) = session.tls.as_mut() {
                tls.data_private = true;
            }
        }

        session.command("TYPE I", "set binary mode", &[200])?;

        info!(peer = %session.peer, user = credential.username(), "FTP session open");
        Ok(session)
    }

    /// Change the remote working directory.
    pub fn cwd(&mut self, dir: &str) -> Result<()> {
        self.command(
            &format!("CWD {dir}"),
            &format!("change directory to {dir}"),
            &[200, 250],
        )?;
        Ok(())
    }

    /// Store `data` as `filename` in the current remote directory using a
    /// passive data connection.
    pub fn upload(&mut self, filename: &str, data: &[u8]) -> Result<u64> {
        let step = format!("upload {filename}");
        let reply = self.command("PASV", &step, &[227])?;
        let addr = parse_pasv(&reply.text)
            .ok_or_else(|| self.error(&step, &format!("bad PASV reply: {reply}")))?;

        let stream = TcpStream::connect(addr)
            .map_err(|e| self.error(&step, &format!("data connection to {addr}: {e}")))?;
        self.command(&format!("STOR {filename}"), &step, &[125, 150])?;

        let mut channel = self.data_channel(stream).map_err(|e| self.error(&step, &e))?;
        finish_data(&mut channel, data)
            .map_err(|e| self.error(&step, &format!("data transfer: {e}")))?;
        drop(channel);

        self.expect_reply(&step, &[226, 250])?;
        let sent = data.len() as u64;
        debug!(peer = %self.peer, filename, sent, "upload complete");
        Ok(sent)
    }

    /// Log out and close the control connection.
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.command("QUIT", "quit", &[221])?;
        debug!(peer = %self.peer, "FTP session closed");
        Ok(())
    }

    fn login(&mut self, credential: &Credential) -> Result<()> {
        let step = format!("login as {}", credential.username());
        let user = self.command(&format!("USER {}", credential.username()), &step, &[230, 331])?;
        if user.code == 331 {
            self.command_redacted(
                &format!("PASS {}", credential.password()),
                "PASS ****",
                &step,
                &[202, 230],
            )?;
        }
        Ok(())
    }

    fn secure_control(&mut self, config: Arc<ClientConfig>, host: &str) -> Result<()> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| self.error("TLS negotiation", &format!("invalid server name: {e}")))?;

        // Nothing is buffered past the AUTH reply: the server waits for the
        // handshake.
        let spare = self
            .control
            .get_ref()
            .tcp()
            .try_clone()
            .map_err(|e| self.error("TLS negotiation", &e.to_string()))?;
        let placeholder = BufReader::new(Channel::Plain(spare));
        let tcp = match std::mem::replace(&mut self.control, placeholder).into_inner() {
            Channel::Plain(tcp) => tcp,
            Channel::Secure(_) => return Err(self.error("TLS negotiation", "already secured")),
        };

        let stream = handshake(&config, server_name.clone(), tcp)
            .map_err(|e| self.error("TLS negotiation", &e))?;
        self.control = BufReader::new(Channel::Secure(Box::new(stream)));
        self.tls = Some(Protection {
            config,
            server_name,
            data_private: false,
        });
        Ok(())
    }

    fn data_channel(&self, stream: TcpStream) -> std::result::Result<Channel, String> {
        match &self.tls {
            Some(tls) if tls.data_private => {
                handshake(&tls.config, tls.server_name.clone(), stream)
                    .map(|s| Channel::Secure(Box::new(s)))
            }
            _ => Ok(Channel::Plain(stream)),
        }
    }

    fn command(&mut self, line: &str, step: &str, expected: &[u16]) -> Result<Reply> {
        self.command_redacted(line, line, step, expected)
    }

    fn command_redacted(
        &mut self,
        line: &str,
        logged: &str,
        step: &str,
        expected: &[u16],
    ) -> Result<Reply> {
        debug!(peer = %self.peer, command = logged, "FTP >");
        let sent = {
            let channel = self.control.get_mut();
            channel
                .write_all(format!("{line}\r\n").as_bytes())
                .and_then(|()| channel.flush())
        };
        sent.map_err(|e| self.error(step, &e.to_string()))?;
        self.expect_reply(step, expected)
    }

    fn expect_reply(&mut self, step: &str, expected: &[u16]) -> Result<Reply> {
        let reply = read_reply(&mut self.control).map_err(|e| self.error(step, &e))?;
        debug!(peer = %self.peer, code = reply.code, "FTP <");
        if expected.contains(&reply.code) {
            Ok(reply)
        } else {
            Err(self.error(step, &format!("unexpected reply {reply}")))
        }
    }

    fn error(&self, step: &str, detail: &str) -> CabError {
        CabError::Transport(format!("FTP {step} ({}): {detail}", self.peer))
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.command("QUIT", "quit", &[221]) {
                warn!(peer = %self.peer, error = %e, "failed to log out of aborted FTP session");
            }
        }
    }
}

fn handshake(
    config: &Arc<ClientConfig>,
    server_name: ServerName<'static>,
    mut tcp: TcpStream,
) -> std::result::Result<TlsStream, String> {
    let mut conn =
        ClientConnection::new(Arc::clone(config), server_name).map_err(|e| e.to_string())?;
    while conn.is_handshaking() {
        conn.complete_io(&mut tcp).map_err(|e| e.to_string())?;
    }
    Ok(StreamOwned::new(conn, tcp))
}

/// Write the payload and signal end of file to the server.
fn finish_data(channel: &mut Channel, data: &[u8]) -> io::Result<()> {
    channel.write_all(data)?;
    if let Channel::Secure(stream) = channel {
        stream.conn.send_close_notify();
    }
    channel.flush()?;
    channel.tcp().shutdown(Shutdown::Write)?;

    // Consume post-handshake TLS messages until the server closes, so the
    // socket is not reset with unread data.
    if let Channel::Secure(_) = channel {
        let _ = io::copy(channel, &mut io::sink());
    }
    Ok(())
}

/// Read one reply, following multi-line replies (`123-...` up to `123 ...`).
fn read_reply(reader: &mut impl BufRead) -> std::result::Result<Reply, String> {
    let first = read_line(reader)?;
    let code = reply_code(&first).ok_or_else(|| format!("malformed reply {first:?}"))?;

    let mut last = first;
    if last.as_bytes().get(3) == Some(&b'-') {
        let terminator = format!("{code} ");
        loop {
            last = read_line(reader)?;
            if last.starts_with(&terminator) || last == code.to_string() {
                break;
            }
        }
    }

    let text = last.get(4..).unwrap_or_default().to_string();
    Ok(Reply { code, text })
}

fn read_line(reader: &mut impl BufRead) -> std::result::Result<String, String> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw).map_err(|e| e.to_string())?;
    if n == 0 {
        return Err("connection closed by printer".into());
    }
    Ok(String::from_utf8_lossy(&raw).trim_end_matches(['\r', '\n']).to_string())
}

fn reply_code(line: &str) -> Option<u16> {
    let digits = line.get(..3)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Extract the data address from a `227` reply, e.g.
/// `Entering Passive Mode (192,168,1,20,19,137)`.
fn parse_pasv(text: &str) -> Option<SocketAddr> {
    text.split(|c: char| !(c.is_ascii_digit() || c == ','))
        .find_map(|token| {
            let parts: Vec<u8> = token
                .split(',')
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .ok()?;
            let &[a, b, c, d, hi, lo] = parts.as_slice() else {
                return None;
            };
            let port = u16::from(hi) << 8 | u16::from(lo);
            Some(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), port)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passive_address_is_decoded() {
        assert_eq!(
            parse_pasv("Entering Passive Mode (192,168,1,20,19,137)."),
            Some("192.168.1.20:5001".parse().unwrap())
        );
        assert_eq!(
            parse_pasv("=127,0,0,1,0,21"),
            Some("127.0.0.1:21".parse().unwrap())
        );
        assert_eq!(parse_pasv("Entering Passive Mode"), None);
        assert_eq!(parse_pasv("(300,0,0,1,0,21)"), None);
    }

    #[test]
    fn multi_line_reply_ends_at_matching_code() {
        let raw = b"230-Welcome\r\n to the printer\r\n230 Logged in\r\n200 next\r\n";
        let mut reader = &raw[..];
        let reply = read_reply(&mut reader).unwrap();
        assert_eq!(reply, Reply { code: 230, text: "Logged in".into() });
        assert_eq!(read_reply(&mut reader).unwrap().code, 200);
    }

    #[test]
    fn garbage_and_eof_are_errors() {
        let mut garbage = &b"hello\r\n"[..];
        assert!(read_reply(&mut garbage).is_err());
        let mut empty = &b""[..];
        assert!(read_reply(&mut empty).is_err());
    }
}
