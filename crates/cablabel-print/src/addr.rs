// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host formatting shared by the FTP and HTTP paths.

use std::borrow::Cow;

/// Wrap bare IPv6 literals in brackets so they can be joined with a port or
/// embedded in a URL.
pub(crate) fn uri_host(host: &str) -> Cow<'_, str> {
    if host.contains(':') && !host.starts_with('[') {
        Cow::Owned(format!("[{host}]"))
    } else {
        Cow::Borrowed(host)
    }
}

/// `host:port`, bracketing IPv6 literals.
pub(crate) fn socket_addr(host: &str, port: u16) -> String {
    format!("{}:{port}", uri_host(host))
}
