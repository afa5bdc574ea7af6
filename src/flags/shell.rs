//! Shell-quoted flag string parsing and serialization
//!
//! CFLAGS-style variables follow shell quoting rules, the same reading
//! make and cmake apply. A value that cannot be parsed under those rules
//! is an error the caller must see, never something to paper over.

/// Error types for flag string handling
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("Malformed shell quoting in flag string: {0}")]
    MalformedQuoting(String),

    #[error("Flag cannot be shell-quoted: {0}")]
    Unquotable(String),
}

/// Split a shell-quoted flag string into tokens.
pub fn split_flags(value: &str) -> Result<Vec<String>, FlagError> {
    shlex::split(value).ok_or_else(|| FlagError::MalformedQuoting(value.to_string()))
}

/// Join flag tokens into a shell-safe string.
pub fn join_flags<S: AsRef<str>>(tokens: &[S]) -> Result<String, FlagError> {
    shlex::try_join(tokens.iter().map(|token| token.as_ref()))
        .map_err(|e| FlagError::Unquotable(e.to_string()))
}
