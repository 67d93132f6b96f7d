//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for type safety:
//! - `SessionId`: UUID-based opaque transport handle
//! - `DisplayName`: validated participant name (2-31 bytes)

use uuid::Uuid;

use crate::error::AppError;

/// Shortest accepted display name, in bytes
pub const MIN_NAME_LEN: usize = 2;

/// Longest accepted display name, in bytes
pub const MAX_NAME_LEN: usize = 31;

/// Unique session identifier (newtype pattern)
///
/// Issued by the transport for every accepted connection and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant display name
///
/// Chosen once during the handshake and immutable afterwards.
/// Uniqueness is not enforced here; see `Registry::find_by_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Parse a handshake line into a display name
    ///
    /// Surrounding whitespace is trimmed first. The remainder must be
    /// 2-31 bytes long and free of control characters.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let name = raw.trim();
        if name.len() < MIN_NAME_LEN
            || name.len() > MAX_NAME_LEN
            || name.chars().any(char::is_control)
        {
            return Err(AppError::InvalidName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
