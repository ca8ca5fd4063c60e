// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview retrieval tests against an in-process HTTPS server with a
// self-signed certificate.

mod common;

use std::io::Write;
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use cablabel_core::PrinterConnectionConfig;
use cablabel_core::error::CabError;
use cablabel_print::CabPrinterClient;

use common::{read_line, tls_accept, tls_server_config};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really";
const NONCE: &str = "dcd98b7102dd2f0e8b11d0f600bfb0c093";

#[derive(Debug, Clone)]
struct Request {
    line: String,
    headers: Vec<(String, String)>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Response {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
}

impl Response {
    fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type", "image/png".into())],
            body: body.to_vec(),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

struct FakeWeb {
    port: u16,
    handle: JoinHandle<Vec<Request>>,
}

impl FakeWeb {
    /// Serve `connections` requests, one per connection, answering each with
    /// `respond`.
    fn start(connections: usize, respond: fn(&Request) -> Response) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = tls_server_config();

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for _ in 0..connections {
                let (tcp, _) = listener.accept().unwrap();
                let mut stream = tls_accept(&config, tcp);

                let line = read_line(&mut stream).unwrap();
                let mut headers = Vec::new();
                while let Some(header) = read_line(&mut stream) {
                    if header.is_empty() {
                        break;
                    }
                    if let Some((k, v)) = header.split_once(':') {
                        headers.push((k.trim().to_string(), v.trim().to_string()));
                    }
                }
                let request = Request { line, headers };
                let response = respond(&request);
                requests.push(request);

                let mut head = format!(
                    "HTTP/1.1 {} Status\r\nContent-Length: {}\r\nConnection: close\r\n",
                    response.status,
                    response.body.len()
                );
                for (k, v) in &response.headers {
                    head.push_str(&format!("{k}: {v}\r\n"));
                }
                head.push_str("\r\n");
                stream.write_all(head.as_bytes()).unwrap();
                stream.write_all(&response.body).unwrap();
                stream.conn.send_close_notify();
                stream.flush().unwrap();
            }
            requests
        });
        Self { port, handle }
    }

    fn config(&self, scheme: &str) -> PrinterConnectionConfig {
        PrinterConnectionConfig::new("127.0.0.1", scheme)
            .unwrap()
            .with_tls(true, false)
            .with_web_password("secret")
            .with_web_port(self.port)
    }

    fn finish(self) -> Vec<Request> {
        self.handle.join().unwrap()
    }
}

#[tokio::test]
async fn preview_body_is_returned_on_200() {
    let server = FakeWeb::start(1, |_| Response::ok(PNG));
    let client = CabPrinterClient::new(server.config("none")).unwrap();

    assert_eq!(client.fetch_preview().await.unwrap(), PNG);

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].line.starts_with("GET /cgi-bin/bitmap "));
    assert_eq!(requests[0].header("authorization"), None);
}

#[tokio::test]
async fn non_200_status_is_reported() {
    let cases = [
        (FakeWeb::start(1, |_| Response::status(404)), 404),
        (FakeWeb::start(1, |_| Response::status(503)), 503),
    ];
    for (server, status) in cases {
        let client = CabPrinterClient::new(server.config("none")).unwrap();

        match client.fetch_preview().await.unwrap_err() {
            CabError::PreviewStatus(code) => assert_eq!(code, status),
            other => panic!("unexpected error {other:?}"),
        }
        server.finish();
    }
}

#[tokio::test]
async fn basic_auth_sends_admin_credentials() {
    let server = FakeWeb::start(1, |request| match request.header("authorization") {
        // base64("admin:secret")
        Some("Basic YWRtaW46c2VjcmV0") => Response::ok(PNG),
        _ => Response::status(401),
    });
    let client = CabPrinterClient::new(server.config("basic")).unwrap();

    assert_eq!(client.fetch_preview().await.unwrap(), PNG);
    assert_eq!(server.finish().len(), 1);
}

fn digest_printer(request: &Request) -> Response {
    let Some(header) = request.header("authorization") else {
        return Response {
            status: 401,
            headers: vec![(
                "WWW-Authenticate",
                format!(r#"Digest realm="cab", qop="auth", nonce="{NONCE}", opaque="5ccc069c""#),
            )],
            body: Vec::new(),
        };
    };

    let mut answer = digest_auth::AuthorizationHeader::parse(header).unwrap();
    let sent = answer.response.clone();
    answer.digest(&digest_auth::AuthContext::new("admin", "secret", "/cgi-bin/bitmap"));
    if answer.nonce == NONCE && answer.uri == "/cgi-bin/bitmap" && answer.response == sent {
        Response::ok(PNG)
    } else {
        Response::status(401)
    }
}

#[tokio::test]
async fn digest_challenge_is_answered() {
    let server = FakeWeb::start(2, digest_printer);
    let client = CabPrinterClient::new(server.config("digest")).unwrap();

    assert_eq!(client.fetch_preview().await.unwrap(), PNG);

    let requests = server.finish();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("authorization"), None);
    let answer = requests[1].header("authorization").unwrap();
    assert!(answer.starts_with("Digest "));
    assert!(answer.contains(r#"username="admin""#));
}

#[tokio::test]
async fn wrong_digest_password_is_unauthorised() {
    let server = FakeWeb::start(2, digest_printer);
    let config = server.config("digest").with_web_password("wrong");
    let client = CabPrinterClient::new(config).unwrap();

    match client.fetch_preview().await.unwrap_err() {
        CabError::PreviewStatus(code) => assert_eq!(code, 401),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(server.finish().len(), 2);
}
