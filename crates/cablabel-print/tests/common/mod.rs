// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared helpers for loopback printer tests.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection, StreamOwned};

pub type TlsServerStream = StreamOwned<ServerConnection, TcpStream>;

/// Server config with a fresh self-signed certificate for `localhost`.
pub fn tls_server_config() -> Arc<ServerConfig> {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

    let config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![cert.der().clone()], key)
            .unwrap();
    Arc::new(config)
}

/// Wrap an accepted socket. The handshake runs on first read or write.
pub fn tls_accept(config: &Arc<ServerConfig>, tcp: TcpStream) -> TlsServerStream {
    let conn = ServerConnection::new(Arc::clone(config)).unwrap();
    StreamOwned::new(conn, tcp)
}

/// Read one CRLF-terminated line a byte at a time, so nothing past it is
/// consumed. `None` on EOF.
pub fn read_line(input: &mut impl Read) -> Option<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) | Err(_) if line.is_empty() => return None,
            Ok(0) | Err(_) => break,
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
        }
    }
    Some(String::from_utf8_lossy(&line).trim_end_matches('\r').to_string())
}

/// Read until EOF, treating a peer that closes without `close_notify` as EOF.
pub fn read_all(input: &mut impl Read) -> Vec<u8> {
    let mut body = Vec::new();
    match input.read_to_end(&mut body) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
        Err(e) => panic!("read failed: {e}"),
    }
    body
}

pub fn write_line(out: &mut impl Write, line: &str) {
    out.write_all(format!("{line}\r\n").as_bytes()).unwrap();
    out.flush().unwrap();
}
