// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// The host decides how failures are presented; this module gives it a plain
// message, a suggestion pointing at the printer setting to check, and a
// severity it can map onto its own UI.

use crate::error::CabError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or busy printer. Trying again may work.
    Transient,
    /// A setting on the printer or in the plugin has to be changed.
    ActionRequired,
    /// Retrying will not help (broken template, corrupted preview).
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `CabError` into something an operator can act on.
pub fn humanize_error(err: &CabError) -> HumanError {
    match err {
        CabError::Configuration(detail) => HumanError {
            message: "The printer settings are incomplete or invalid.".into(),
            suggestion: format!("Check the CAB plugin settings. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CabError::Transport(detail) => humanize_transport_error(detail),

        CabError::PreviewStatus(401) | CabError::PreviewStatus(403) => HumanError {
            message: "The printer refused the preview request.".into(),
            suggestion: "Check the web service authentication scheme and credential match the printer's security settings.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CabError::PreviewStatus(404) => HumanError {
            message: "This printer does not offer a label preview.".into(),
            suggestion: "Print without preview, or update the printer firmware.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        CabError::PreviewStatus(code) => HumanError {
            message: "The printer could not produce a preview.".into(),
            suggestion: format!("Try again in a moment. (HTTP status {code})"),
            retriable: true,
            severity: Severity::Transient,
        },

        CabError::Decode(_) => HumanError {
            message: "The preview returned by the printer is damaged.".into(),
            suggestion: "Try the preview again. If it keeps failing, the printer may be sending a partial image.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CabError::EmptyPreview => HumanError {
            message: "The printer returned no preview images.".into(),
            suggestion: "Make sure the label template produces a JScript that the printer accepts.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        CabError::Render(detail) => HumanError {
            message: "The label could not be rendered.".into(),
            suggestion: format!("Check the label template. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        CabError::Offload(_) => HumanError {
            message: "The print job could not be queued.".into(),
            suggestion: "Check that the background worker is running, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CabError::Storage(_) => HumanError {
            message: "The preview image could not be saved.".into(),
            suggestion: "Check the media storage is writable, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CabError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file could not be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, check disk space and permissions.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        CabError::Serialization(_) => HumanError {
            message: "Some data could not be read.".into(),
            suggestion: "Check the settings or manifest file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Classify control-channel and HTTP failures by their detail text.
fn humanize_transport_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("530") || lower.contains("login") {
        let suggestion = match ftp_user(detail) {
            Some(user) => {
                format!("Check the {user} password in the plugin settings matches the printer.")
            }
            None => "Check the FTP passwords in the plugin settings match the printer.".into(),
        };
        HumanError {
            message: "The printer rejected the FTP login.".into(),
            suggestion,
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("tls") || lower.contains("certificate") || lower.contains("handshake") {
        HumanError {
            message: "A secure connection to the printer could not be established.".into(),
            suggestion: "Check 'Printer Uses TLS' matches the printer's security settings, or disable certificate verification for self-signed printers.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("connection refused") {
        HumanError {
            message: "The printer refused the connection.".into(),
            suggestion: "Make sure the printer is on and that FTP is enabled in its network settings.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("timed out") || lower.contains("no route") || lower.contains("unreachable") {
        HumanError {
            message: "The printer could not be reached.".into(),
            suggestion: "Check the printer IP address and that it is on the same network.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "Communication with the printer failed.".into(),
            suggestion: format!("Try again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

/// Account named in a `login as <user>` transport detail.
fn ftp_user(detail: &str) -> Option<&str> {
    let (_, rest) = detail.split_once("login as ")?;
    rest.split(|c: char| c.is_whitespace() || c == ':' || c == '(')
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_address_is_action_required() {
        let err = CabError::Configuration("printer IP address must be defined".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn rejected_login_points_at_credentials() {
        let err = CabError::Transport("login as ftpprint: 530 Login incorrect".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("ftpprint"));
    }

    #[test]
    fn rejected_login_names_the_account_used() {
        let err = CabError::Transport(
            "FTP login as ftpcard (10.0.0.5:21): unexpected reply 530 Login incorrect".into(),
        );
        let human = humanize_error(&err);
        assert!(human.suggestion.contains("ftpcard"));
        assert!(!human.suggestion.contains("ftpprint"));

        let err = CabError::Transport("FTP PBSZ (10.0.0.5:21): unexpected reply 530 Not logged in".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.suggestion.contains("ftpprint"));
    }

    #[test]
    fn refused_connection_is_transient() {
        let err = CabError::Transport("connect to 10.0.0.5:21: Connection refused".into());
        assert_eq!(humanize_error(&err).severity, Severity::Transient);
    }

    #[test]
    fn unauthorised_preview_is_action_required() {
        let human = humanize_error(&CabError::PreviewStatus(401));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn corrupted_preview_is_distinct_from_transport() {
        let human = humanize_error(&CabError::Decode("truncated PNG".into()));
        assert!(human.message.contains("damaged"));
    }
}
