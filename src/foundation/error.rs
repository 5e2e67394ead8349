/// Convenience result type used across backdrop.
pub type BackdropResult<T> = Result<T, BackdropError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these reach the page: the mount logs them and degrades to the fallback field.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    /// A single candidate locator could not be fetched or parsed.
    #[error("fetch failed for '{locator}': {source}")]
    LocatorFetchFailed {
        /// Locator that was attempted.
        locator: String,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },

    /// Every candidate locator failed.
    #[error("all {tried} candidate locators failed")]
    AllCandidatesExhausted {
        /// Number of distinct locators attempted.
        tried: usize,
    },

    /// Asset data is structurally invalid (bad container, dangling indices, degenerate bounds).
    #[error("malformed asset: {0}")]
    MalformedAsset(String),

    /// Invalid user-provided configuration or keyframe data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackdropError {
    /// Build a [`BackdropError::MalformedAsset`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedAsset(msg.into())
    }

    /// Build a [`BackdropError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BackdropError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`BackdropError::LocatorFetchFailed`] value.
    pub fn fetch_failed(locator: impl Into<String>, source: FetchError) -> Self {
        Self::LocatorFetchFailed {
            locator: locator.into(),
            source,
        }
    }
}

/// Failure of one fetch+parse attempt.
///
/// `Clone` because a single in-flight fetch is shared by every concurrent waiter.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// Nothing exists at the locator.
    #[error("not found")]
    NotFound,

    /// Transport or filesystem failure.
    #[error("io: {0}")]
    Io(String),

    /// Bytes were fetched but could not be parsed into a scene.
    #[error("parse: {0}")]
    Parse(String),

    /// Locator points at a format this fetcher does not understand.
    #[error("unsupported asset '{0}'")]
    Unsupported(String),
}

impl From<BackdropError> for FetchError {
    fn from(err: BackdropError) -> Self {
        match err {
            BackdropError::LocatorFetchFailed { source, .. } => source,
            other => Self::Parse(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
