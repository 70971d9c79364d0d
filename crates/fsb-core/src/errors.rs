use std::fmt;

/// Core error type.
///
/// Adapter crates map their specific errors into this type so the core can
/// pick a user-facing message without inspecting error text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform error ({kind}): {message}")]
    Platform {
        kind: PlatformErrorKind,
        message: String,
    },

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn platform(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Self::Platform {
            kind,
            message: message.into(),
        }
    }

    /// Classification of a messaging-platform failure, if this is one.
    pub fn platform_kind(&self) -> Option<PlatformErrorKind> {
        match self {
            Self::Platform { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Failure categories reported by a messaging platform adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformErrorKind {
    /// The destination blocked the bot or the bot lacks rights there.
    Forbidden,
    /// A file reference was rejected as unknown or expired.
    InvalidReference,
    /// The target message no longer exists or its id is invalid.
    MessageGone,
    /// Any other request the platform refused.
    BadRequest,
    /// Transport-level or transient failure.
    Network,
    Unknown,
}

impl fmt::Display for PlatformErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Forbidden => "forbidden",
            Self::InvalidReference => "invalid reference",
            Self::MessageGone => "message gone",
            Self::BadRequest => "bad request",
            Self::Network => "network",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
