//! Result and error types for the storefront suite.

use thiserror::Error;

/// Result type for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Coarse classification of a [`ShopError`], stable enough to assert on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A wait did not reach its target state in time
    WaitTimeout,
    /// A named lookup found no match
    NotFound,
    /// An index was outside the current enumeration
    OutOfRange,
    /// The driver could not resolve or act on a selector
    LocatorResolution,
    /// The owning session was already closed
    SessionClosed,
    /// Navigation failed
    Navigation,
    /// Displayed text could not be read as a number
    InvalidNumber,
    /// Fixture setup or teardown failed
    Fixture,
    /// A named test step failed
    Step,
    /// Configuration or browser launch problem
    Environment,
}

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ShopError {
    /// Element did not reach the requested state in time
    #[error("Timed out after {timeout_ms}ms waiting for {target} to be {state}")]
    WaitTimeout {
        /// Description of what was waited for (usually a selector chain)
        target: String,
        /// Target state name
        state: String,
        /// Timeout bound in milliseconds
        timeout_ms: u64,
    },

    /// Named lookup found nothing
    #[error("{kind} \"{name}\" not found")]
    NotFound {
        /// What was being looked up ("Product", "Cart item")
        kind: String,
        /// The name searched for
        name: String,
    },

    /// Index outside the current enumeration
    #[error("Index {index} is out of range ({len} items)")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of items at the time of the call
        len: usize,
    },

    /// Driver failed to resolve or act on a selector
    #[error("Locator {selector} failed: {message}")]
    LocatorResolution {
        /// Selector chain as rendered by the locator
        selector: String,
        /// Driver message
        message: String,
    },

    /// Operation on a session that has been torn down
    #[error("Session {session} is closed")]
    SessionClosed {
        /// Session identifier
        session: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Displayed text is not a number
    #[error("Cannot read {text:?} as a number")]
    InvalidNumber {
        /// The offending text
        text: String,
    },

    /// Fixture setup failed; the test body never ran
    #[error("Fixture '{fixture}' setup failed: {source}")]
    FixtureSetup {
        /// Fixture name
        fixture: String,
        /// Underlying failure
        #[source]
        source: Box<ShopError>,
    },

    /// Fixture teardown failed
    #[error("Fixture '{fixture}' teardown failed: {source}")]
    FixtureTeardown {
        /// Fixture name
        fixture: String,
        /// Underlying failure
        #[source]
        source: Box<ShopError>,
    },

    /// A named test step failed
    #[error("Step '{name}' failed: {source}")]
    Step {
        /// Step title
        name: String,
        /// Underlying failure
        #[source]
        source: Box<ShopError>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ShopError {
    /// Create a locator resolution error
    pub fn locator(selector: impl ToString, message: impl Into<String>) -> Self {
        Self::LocatorResolution {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify this error.
    ///
    /// Wrapping variants (`Step`) report the kind of the wrapped error so a
    /// test can assert on the root cause regardless of step nesting.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WaitTimeout { .. } => ErrorKind::WaitTimeout,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::LocatorResolution { .. } => ErrorKind::LocatorResolution,
            Self::SessionClosed { .. } => ErrorKind::SessionClosed,
            Self::Navigation { .. } => ErrorKind::Navigation,
            Self::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            Self::FixtureSetup { .. } | Self::FixtureTeardown { .. } => ErrorKind::Fixture,
            Self::Step { source, .. } => source.kind(),
            Self::Config { .. }
            | Self::BrowserLaunch { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Environment,
        }
    }

    /// Innermost error, looking through fixture and step wrappers
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::FixtureSetup { source, .. }
            | Self::FixtureTeardown { source, .. }
            | Self::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_timeout_message_names_state_and_bound() {
        let err = ShopError::WaitTimeout {
            target: "[data-test=\"finish\"]".to_string(),
            state: "visible".to_string(),
            timeout_ms: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("100ms"));
        assert!(msg.contains("visible"));
        assert_eq!(err.kind(), ErrorKind::WaitTimeout);
    }

    #[test]
    fn test_step_reports_inner_kind() {
        let err = ShopError::Step {
            name: "Add to cart".to_string(),
            source: Box::new(ShopError::not_found("Product", "Nope")),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("Add to cart"));
        assert!(matches!(err.root_cause(), ShopError::NotFound { .. }));
    }

    #[test]
    fn test_fixture_setup_is_fixture_kind() {
        let err = ShopError::FixtureSetup {
            fixture: "authenticated_page".to_string(),
            source: Box::new(ShopError::OutOfRange { index: 3, len: 1 }),
        };
        assert_eq!(err.kind(), ErrorKind::Fixture);
        assert_eq!(err.root_cause().kind(), ErrorKind::OutOfRange);
    }
}
