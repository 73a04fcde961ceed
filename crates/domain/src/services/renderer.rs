//! Template renderer.
//!
//! Substitutes `{{key}}` placeholders in subject and body text. Keys are
//! case-sensitive and not nested. A placeholder with no matching variable is
//! left verbatim in the output, so missing data stays visible in the
//! rendered artifact instead of being silently dropped. The renderer is pure:
//! the same (template, variables) input always yields the same output, which
//! keeps recorded delivery attempts reproducible.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{([A-Za-z0-9_.\-]+)\}\}").expect("placeholder regex is valid");
}

/// Final content produced for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Renders subject and body against the given variables.
pub fn render(
    subject: &str,
    body: &str,
    variables: &HashMap<String, String>,
) -> RenderedMessage {
    RenderedMessage {
        subject: substitute(subject, variables),
        body: substitute(body, variables),
    }
}

fn substitute(text: &str, variables: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            // Unmatched placeholders stay verbatim
            None => caps[0].to_string(),
        })
        .into_owned()
}
