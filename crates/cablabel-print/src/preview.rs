// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label preview over the printer web service.
//
// `GET https://{host}[:port]/cgi-bin/bitmap` returns a PNG rendering of the most
// recently received label. The endpoint is protected by whatever scheme is
// configured under the printer's security settings (Digest by default).

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use tracing::{debug, instrument, warn};

use cablabel_core::config::WEB_PORT;
use cablabel_core::error::{CabError, Result};
use cablabel_core::{Credential, PrinterConnectionConfig, WebAuthScheme};

use crate::addr::uri_host;

/// Path of the preview endpoint on the printer.
pub const PREVIEW_PATH: &str = "/cgi-bin/bitmap";

/// HTTP authentication applied to preview requests.
#[derive(Debug, Clone)]
pub enum WebAuth {
    Digest(Credential),
    Basic(Credential),
    None,
}

impl WebAuth {
    pub fn from_config(config: &PrinterConnectionConfig) -> Self {
        let credential = config.web_credential().clone();
        match config.web_auth() {
            WebAuthScheme::Digest => Self::Digest(credential),
            WebAuthScheme::Basic => Self::Basic(credential),
            WebAuthScheme::None => Self::None,
        }
    }
}

/// Full preview URL for `host`. The port is omitted when it is the HTTPS
/// default.
pub fn preview_url(host: &str, port: u16) -> String {
    if port == WEB_PORT {
        format!("https://{}{PREVIEW_PATH}", uri_host(host))
    } else {
        format!("https://{}:{port}{PREVIEW_PATH}", uri_host(host))
    }
}

/// Fetches preview bitmaps from one printer.
#[derive(Debug, Clone)]
pub struct PreviewFetcher {
    http: reqwest::Client,
    url: String,
    auth: WebAuth,
}

impl PreviewFetcher {
    pub fn new(config: &PrinterConnectionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()
            .map_err(|e| CabError::Transport(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            http,
            url: preview_url(config.host(), config.web_port()),
            auth: WebAuth::from_config(config),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the current preview. Anything but `200 OK` is an error.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        let response = match &self.auth {
            WebAuth::None => self.send(self.http.get(&self.url)).await?,
            WebAuth::Basic(credential) => {
                self.send(
                    self.http
                        .get(&self.url)
                        .basic_auth(credential.username(), Some(credential.password())),
                )
                .await?
            }
            WebAuth::Digest(credential) => self.send_with_digest(credential).await?,
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "preview request rejected");
            return Err(CabError::PreviewStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CabError::Transport(format!("read preview body: {e}")))?;
        debug!(bytes = body.len(), "preview received");
        Ok(body.to_vec())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .map_err(|e| CabError::Transport(format!("GET {}: {e}", self.url)))
    }

    /// Challenge-response: an unauthenticated request yields a `401` with the
    /// server nonce, which is answered on a second request.
    async fn send_with_digest(&self, credential: &Credential) -> Result<reqwest::Response> {
        let challenge = self.send(self.http.get(&self.url)).await?;
        if challenge.status() != StatusCode::UNAUTHORIZED {
            return Ok(challenge);
        }

        let header = challenge
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                CabError::Transport("preview endpoint sent 401 without a WWW-Authenticate challenge".into())
            })?;
        let authorization = digest_authorization(header, credential)?;
        debug!("answering digest challenge");

        self.send(self.http.get(&self.url).header(AUTHORIZATION, authorization))
            .await
    }
}

/// Compute the `Authorization` header answering a digest `challenge` for a
/// GET of the preview path.
pub fn digest_authorization(challenge: &str, credential: &Credential) -> Result<String> {
    let mut prompt = digest_auth::parse(challenge)
        .map_err(|e| CabError::Transport(format!("invalid digest challenge: {e}")))?;
    let context =
        digest_auth::AuthContext::new(credential.username(), credential.password(), PREVIEW_PATH);
    let answer = prompt
        .respond(&context)
        .map_err(|e| CabError::Transport(format!("digest response: {e}")))?;
    Ok(answer.to_header_string())
}
