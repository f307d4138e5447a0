//! Shared token and marker patterns.
//!
//! This module contains the regex patterns used across the pipeline to
//! recognize placeholder tokens, editorial leftovers and field values.
//! Pattern definition is kept separate from pattern usage so the extractor,
//! the remediator and the wizard validator all agree on what a token is.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // PLACEHOLDER TOKEN PATTERNS
    // =========================================================================

    /// A double-brace token: `{{ anything but braces }}`.
    pub static ref TOKEN_PATTERN: Regex = Regex::new(
        r"\{\{([^{}]*)\}\}"
    ).unwrap();

    /// A candidate variable: identifier or dotted path (`nom`, `client.nom`).
    pub static ref CANDIDATE_PATTERN: Regex = Regex::new(
        r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$"
    ).unwrap();

    // =========================================================================
    // EDITORIAL MARKER PATTERNS
    // =========================================================================

    /// Bracketed editorial markers left by authors: `[TODO]`, `[FIXME]`,
    /// `[XXX]`, `[PLACEHOLDER]`.
    pub static ref BRACKET_MARKER_PATTERN: Regex = Regex::new(
        r"\[(?:TODO|FIXME|XXX|PLACEHOLDER)\]"
    ).unwrap();

    /// Bare `TODO:` / `FIXME:` labels in literal text.
    pub static ref LABEL_MARKER_PATTERN: Regex = Regex::new(
        r"\b(?:TODO|FIXME):"
    ).unwrap();

    /// Templated editorial markers: `{{TODO ...}}`, `{{ FIXME: ... }}`.
    pub static ref TOKEN_MARKER_PATTERN: Regex = Regex::new(
        r"\{\{\s*(?:TODO|FIXME)[^{}]*\}\}"
    ).unwrap();

    /// Runs of horizontal whitespace left behind after marker removal.
    pub static ref RUN_ON_SPACE_PATTERN: Regex = Regex::new(
        r"[ \t]{2,}"
    ).unwrap();

    /// A stray space ahead of closing punctuation (`bonjour .` -> `bonjour.`).
    pub static ref SPACE_BEFORE_PUNCT_PATTERN: Regex = Regex::new(
        r" +([.,;:!?])"
    ).unwrap();

    // =========================================================================
    // FIELD VALUE PATTERNS
    // =========================================================================

    /// Email address pattern (RFC 5322 simplified).
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

/// Reserved helper names: block helpers and expression helpers that may
/// appear inside a token body but are never variables themselves.
pub const RESERVED_HELPERS: &[&str] = &[
    "if", "each", "with", "unless", "eq", "ne", "gt", "lt", "and", "or", "not", "boolFR", "this",
];

/// Check if a word is a reserved helper name.
pub fn is_reserved_helper(word: &str) -> bool {
    RESERVED_HELPERS.contains(&word)
}

/// Check if content contains any editorial placeholder markers.
pub fn contains_editorial_markers(content: &str) -> bool {
    BRACKET_MARKER_PATTERN.is_match(content)
        || LABEL_MARKER_PATTERN.is_match(content)
        || TOKEN_MARKER_PATTERN.is_match(content)
}

/// Check if a string parses as a valid email address.
pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}
