// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer settings and connection configuration.
//
// Settings are owned and persisted by the host application. This module only
// knows the key names, their defaults, and how to turn the raw string values
// into a validated `PrinterConnectionConfig`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CabError, Result};

/// Setting keys recognised by the plugin.
pub mod keys {
    pub const MODEL: &str = "MODEL";
    pub const IP_ADDRESS: &str = "IP_ADDRESS";
    pub const WEB_SERVICE_AUTHENTICATION: &str = "WEB_SERVICE_AUTHENTICATION";
    pub const WEB_SERVICE_CREDENTIAL: &str = "WEB_SERVICE_CREDENTIAL";
    pub const PRINTER_USE_TLS: &str = "PRINTER_USE_TLS";
    pub const PRINTER_VERIFY_TLS: &str = "PRINTER_VERIFY_TLS";
    pub const FTPPRINT_CREDENTIAL: &str = "FTPPRINT_CREDENTIAL";
    pub const FTPCARD_CREDENTIAL: &str = "FTPCARD_CREDENTIAL";

    /// Every key, in the order they are presented to administrators.
    pub const ALL: [&str; 8] = [
        MODEL,
        IP_ADDRESS,
        WEB_SERVICE_AUTHENTICATION,
        WEB_SERVICE_CREDENTIAL,
        PRINTER_USE_TLS,
        PRINTER_VERIFY_TLS,
        FTPPRINT_CREDENTIAL,
        FTPCARD_CREDENTIAL,
    ];
}

/// Fixed user of the printer web service.
pub const WEB_USER: &str = "admin";
/// Fixed FTP user allowed to submit print jobs.
pub const FTPPRINT_USER: &str = "ftpprint";
/// Fixed FTP user with access to the printer memory card.
pub const FTPCARD_USER: &str = "ftpcard";
/// Default FTP control port.
pub const FTP_PORT: u16 = 21;
/// HTTPS port of the printer web service.
pub const WEB_PORT: u16 = 443;

/// HTTP authentication scheme configured on the printer web service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebAuthScheme {
    Digest,
    Basic,
    None,
}

impl WebAuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Digest => "digest",
            Self::Basic => "basic",
            Self::None => "none",
        }
    }
}

impl FromStr for WebAuthScheme {
    type Err = CabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "digest" => Ok(Self::Digest),
            "basic" => Ok(Self::Basic),
            "none" => Ok(Self::None),
            other => Err(CabError::Configuration(format!(
                "unsupported web service authentication scheme '{other}' (expected digest, basic or none)"
            ))),
        }
    }
}

impl fmt::Display for WebAuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A username/password pair. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to talk to one printer.
///
/// Immutable once built; a transport client takes its own copy for the
/// duration of a request.
#[derive(Debug, Clone)]
pub struct PrinterConnectionConfig {
    host: String,
    ftp_port: u16,
    web_port: u16,
    use_tls: bool,
    verify_tls: bool,
    web_auth: WebAuthScheme,
    web_credential: Credential,
    ftpprint_credential: Credential,
    ftpcard_credential: Credential,
}

impl PrinterConnectionConfig {
    /// Create a config for `host` with the given web authentication scheme.
    ///
    /// Fails with `CabError::Configuration` if the host is blank or the scheme
    /// is not one of `digest`, `basic`, `none`. Credentials start at the
    /// printer factory defaults; TLS is on without certificate verification.
    pub fn new(host: &str, web_auth: &str) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(CabError::Configuration(
                "printer IP address must be defined before printing".into(),
            ));
        }
        let web_auth = web_auth.parse()?;
        let defaults = PrinterSettings::default();
        Ok(Self {
            host: host.to_string(),
            ftp_port: FTP_PORT,
            web_port: WEB_PORT,
            use_tls: defaults.printer_use_tls,
            verify_tls: defaults.printer_verify_tls,
            web_auth,
            web_credential: Credential::new(WEB_USER, defaults.web_service_credential),
            ftpprint_credential: Credential::new(FTPPRINT_USER, defaults.ftpprint_credential),
            ftpcard_credential: Credential::new(FTPCARD_USER, defaults.ftpcard_credential),
        })
    }

    pub fn with_tls(mut self, use_tls: bool, verify_tls: bool) -> Self {
        self.use_tls = use_tls;
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_ftp_port(mut self, port: u16) -> Self {
        self.ftp_port = port;
        self
    }

    pub fn with_web_port(mut self, port: u16) -> Self {
        self.web_port = port;
        self
    }

    pub fn with_web_password(mut self, password: impl Into<String>) -> Self {
        self.web_credential = Credential::new(WEB_USER, password);
        self
    }

    pub fn with_ftpprint_password(mut self, password: impl Into<String>) -> Self {
        self.ftpprint_credential = Credential::new(FTPPRINT_USER, password);
        self
    }

    pub fn with_ftpcard_password(mut self, password: impl Into<String>) -> Self {
        self.ftpcard_credential = Credential::new(FTPCARD_USER, password);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ftp_port(&self) -> u16 {
        self.ftp_port
    }

    pub fn web_port(&self) -> u16 {
        self.web_port
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn web_auth(&self) -> WebAuthScheme {
        self.web_auth
    }

    pub fn web_credential(&self) -> &Credential {
        &self.web_credential
    }

    pub fn ftpprint_credential(&self) -> &Credential {
        &self.ftpprint_credential
    }

    pub fn ftpcard_credential(&self) -> &Credential {
        &self.ftpcard_credential
    }
}

/// Raw plugin settings as stored by the host.
///
/// Field names serialise to the host's setting keys, so a settings file is a
/// flat `{"IP_ADDRESS": "...", ...}` object.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct PrinterSettings {
    /// Printer model, informational only.
    pub model: String,
    /// Address of the printer. Required before anything can be printed.
    pub ip_address: String,
    /// One of `digest`, `basic`, `none`. Kept as text until validated.
    pub web_service_authentication: String,
    pub web_service_credential: String,
    pub printer_use_tls: bool,
    pub printer_verify_tls: bool,
    pub ftpprint_credential: String,
    /// Reserved for printer memory uploads.
    pub ftpcard_credential: String,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            model: "MACH 4S".into(),
            ip_address: String::new(),
            web_service_authentication: WebAuthScheme::Digest.as_str().into(),
            web_service_credential: "admin".into(),
            printer_use_tls: true,
            printer_verify_tls: false,
            ftpprint_credential: "print".into(),
            ftpcard_credential: "card".into(),
        }
    }
}

impl fmt::Debug for PrinterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterSettings")
            .field("model", &self.model)
            .field("ip_address", &self.ip_address)
            .field("web_service_authentication", &self.web_service_authentication)
            .field("printer_use_tls", &self.printer_use_tls)
            .field("printer_verify_tls", &self.printer_verify_tls)
            .finish_non_exhaustive()
    }
}

impl PrinterSettings {
    /// Build settings from a key lookup, falling back to defaults for keys the
    /// host has no value for.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(v) = lookup(keys::MODEL) {
            settings.model = v;
        }
        if let Some(v) = lookup(keys::IP_ADDRESS) {
            settings.ip_address = v.trim().to_string();
        }
        if let Some(v) = lookup(keys::WEB_SERVICE_AUTHENTICATION) {
            settings.web_service_authentication = v;
        }
        if let Some(v) = lookup(keys::WEB_SERVICE_CREDENTIAL) {
            settings.web_service_credential = v;
        }
        if let Some(v) = lookup(keys::PRINTER_USE_TLS) {
            settings.printer_use_tls = parse_bool(keys::PRINTER_USE_TLS, &v)?;
        }
        if let Some(v) = lookup(keys::PRINTER_VERIFY_TLS) {
            settings.printer_verify_tls = parse_bool(keys::PRINTER_VERIFY_TLS, &v)?;
        }
        if let Some(v) = lookup(keys::FTPPRINT_CREDENTIAL) {
            settings.ftpprint_credential = v;
        }
        if let Some(v) = lookup(keys::FTPCARD_CREDENTIAL) {
            settings.ftpcard_credential = v;
        }

        Ok(settings)
    }

    /// Validate the settings and produce a connection config.
    pub fn connection_config(&self) -> Result<PrinterConnectionConfig> {
        Ok(
            PrinterConnectionConfig::new(&self.ip_address, &self.web_service_authentication)?
                .with_tls(self.printer_use_tls, self.printer_verify_tls)
                .with_web_password(self.web_service_credential.clone())
                .with_ftpprint_password(self.ftpprint_credential.clone())
                .with_ftpcard_password(self.ftpcard_credential.clone()),
        )
    }
}

/// Parse a host-supplied boolean setting.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CabError::Configuration(format!(
            "{key}: '{other}' is not a boolean"
        ))),
    }
}
