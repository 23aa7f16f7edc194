//! Existence-conflict classification.
//!
//! The server reports a uniqueness violation only as a message beginning
//! with "Duplicate entry ". The match happens here, at the transport
//! boundary, and is converted to the typed
//! [`ClientError::AlreadyExists`] variant; nothing above this layer ever
//! inspects message text.

use crate::ClientError;
use regex::Regex;
use std::sync::LazyLock;

static DUPLICATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^Duplicate entry ").expect("valid literal pattern"));

/// Convert a server error message into a [`ClientError`], tagging
/// duplicate-entry messages as existence conflicts.
pub(crate) fn classify(message: String) -> ClientError {
    if DUPLICATE.is_match(&message) {
        ClientError::AlreadyExists(message)
    } else {
        ClientError::Api { message }
    }
}
