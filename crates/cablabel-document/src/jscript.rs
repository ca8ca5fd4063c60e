// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JScript job scripts.
//
// CAB label templates are written in JScript and pushed through the host's
// HTML renderer, which escapes double quotes. The printer's parser needs the
// literal quotes back and a terminating newline.

use std::fmt;

/// Escape sequence the HTML renderer substitutes for `"`.
const ESCAPED_QUOTE: &str = "&quot;";

/// A normalised job script, ready for upload. Always ends with `\n`.
#[derive(Clone, PartialEq, Eq)]
pub struct JobScript(String);

impl JobScript {
    /// Derive the job script from a label rendered to HTML.
    pub fn from_rendered_html(html: &str) -> Self {
        let mut script = html.replace(ESCAPED_QUOTE, "\"");
        script.push('\n');
        Self(script)
    }

    /// Normalise a script read from elsewhere (e.g. a file on disk). The same
    /// rules apply, since templates are often exported straight from the host.
    pub fn from_text(text: &str) -> Self {
        Self::from_rendered_html(text)
    }

    /// Re-wrap text produced by [`JobScript::into_string`]. Returns `None` if
    /// it does not end with `\n` and so cannot have been normalised.
    pub fn from_normalized(script: String) -> Option<Self> {
        script.ends_with('\n').then_some(Self(script))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for JobScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JobScript").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_becomes_single_newline() {
        assert_eq!(JobScript::from_rendered_html("").as_str(), "\n");
    }

    #[test]
    fn plain_body_gets_trailing_newline() {
        assert_eq!(JobScript::from_rendered_html("Hello").as_bytes(), b"Hello\n");
    }

    #[test]
    fn every_escaped_quote_is_restored() {
        let html = "T 10,10,0,3,pt9;&quot;Part&quot; &quot;42&quot;";
        let script = JobScript::from_rendered_html(html);
        assert_eq!(script.as_str(), "T 10,10,0,3,pt9;\"Part\" \"42\"\n");
        assert!(!script.as_str().contains("&quot;"));
    }

    #[test]
    fn existing_newline_is_kept_and_another_appended() {
        let script = JobScript::from_rendered_html("A\n");
        assert_eq!(script.as_str(), "A\n\n");
    }

    #[test]
    fn other_entities_are_left_alone() {
        let script = JobScript::from_text("a &amp; b");
        assert_eq!(script.as_str(), "a &amp; b\n");
    }

    #[test]
    fn normalised_text_can_be_rewrapped() {
        let text = JobScript::from_text("A 1").into_string();
        assert_eq!(JobScript::from_normalized(text).unwrap().as_str(), "A 1\n");
        assert!(JobScript::from_normalized("A 1".into()).is_none());
    }
}
