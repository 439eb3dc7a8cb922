use thiserror::Error;

/// Convenient result alias for the Loopride library.
pub type Result<T> = std::result::Result<T, Error>;

/// Startup-time library errors.
///
/// Request-time failures against the routing engine are reported through
/// [`UpstreamError`] instead so handlers can match on them exhaustively.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured GraphHopper base URL could not be turned into a route URL.
    #[error("invalid GraphHopper base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// Wrapper for HTTP client construction errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Discriminant of an [`UpstreamError`], useful as a metric label or for
/// callers that only care about the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    NetworkUnreachable,
    UpstreamHttpError,
    InvalidJson,
    InvalidShape,
}

impl UpstreamErrorKind {
    /// Stable snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamErrorKind::NetworkUnreachable => "network_unreachable",
            UpstreamErrorKind::UpstreamHttpError => "upstream_http_error",
            UpstreamErrorKind::InvalidJson => "invalid_json",
            UpstreamErrorKind::InvalidShape => "invalid_shape",
        }
    }
}

/// Failure talking to, or interpreting the answer of, the routing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// DNS failure, refused connection, timeout, or a broken body stream.
    #[error("{detail}")]
    Unreachable { detail: String },

    /// The routing engine answered with a non-2xx status.
    #[error("{detail}")]
    Http { status: u16, detail: String },

    /// A 2xx answer whose body is not JSON.
    #[error("{detail}")]
    InvalidJson { detail: String },

    /// Valid JSON that does not have the shape of a GraphHopper route response.
    #[error("Invalid GraphHopper response: {detail}")]
    InvalidShape { detail: String },
}

impl UpstreamError {
    pub fn invalid_shape(detail: impl Into<String>) -> Self {
        UpstreamError::InvalidShape {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            UpstreamError::Unreachable { .. } => UpstreamErrorKind::NetworkUnreachable,
            UpstreamError::Http { .. } => UpstreamErrorKind::UpstreamHttpError,
            UpstreamError::InvalidJson { .. } => UpstreamErrorKind::InvalidJson,
            UpstreamError::InvalidShape { .. } => UpstreamErrorKind::InvalidShape,
        }
    }

    /// Upstream HTTP status, only present when a response was actually received.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The detail text without the shape prefix.
    pub fn detail(&self) -> &str {
        match self {
            UpstreamError::Unreachable { detail }
            | UpstreamError::Http { detail, .. }
            | UpstreamError::InvalidJson { detail }
            | UpstreamError::InvalidShape { detail } => detail,
        }
    }
}
