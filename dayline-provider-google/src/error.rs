use std::fmt;

use dayline_core::remote::protocol::ErrorKind;

/// Marks a failure that retrying with the same session cannot fix.
///
/// Attached anywhere in an `anyhow` chain; `classify` looks for it.
#[derive(Debug)]
pub struct AuthExpired(pub String);

impl fmt::Display for AuthExpired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for AuthExpired {}

pub fn classify(err: &anyhow::Error) -> ErrorKind {
    if err.chain().any(|cause| cause.is::<AuthExpired>()) {
        ErrorKind::AuthExpired
    } else {
        ErrorKind::Transient
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn finds_marker_under_context() {
        let err: anyhow::Result<()> = Err(AuthExpired("401".into()).into());
        let err = err.context("Failed to list calendars").unwrap_err();
        assert_eq!(classify(&err), ErrorKind::AuthExpired);
    }

    #[test]
    fn other_errors_are_transient() {
        let err = anyhow::anyhow!("connection reset");
        assert_eq!(classify(&err), ErrorKind::Transient);
    }
}
