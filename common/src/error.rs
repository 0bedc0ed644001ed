//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! - [`ConfigurationError`]: 起動時に検出される致命的な設定ミス。プロセスは起動しない。
//! - [`DaemonError`]: 実行時のインフラ系エラー（DB等）。

use thiserror::Error;

/// Startup-time configuration error.
///
/// Raised while endpoint collections are built and registered, or while the
/// environment is checked. None of these are recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Collection name does not match `^[a-zA-Z0-9\-_]+(/[a-zA-Z0-9\-_]+)*$`
    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    /// Endpoint name does not match `^[a-zA-Z0-9\-_]+$`
    #[error("Invalid endpoint name {endpoint:?} in collection {collection:?}")]
    InvalidEndpointName {
        /// collection name
        collection: String,
        /// offending endpoint name
        endpoint: String,
    },

    /// Endpoint registered twice in the same collection
    #[error("Endpoint {endpoint:?} is already registered in collection {collection:?}")]
    DuplicateEndpoint {
        /// collection name
        collection: String,
        /// duplicated endpoint name
        endpoint: String,
    },

    /// Collection registered twice
    #[error("Collection {0:?} is already registered")]
    DuplicateCollection(String),

    /// Two routes resolve to the same path
    #[error("Route {0} is already registered")]
    RouteConflict(String),

    /// Parameter name is not an identifier
    #[error("Invalid parameter name {parameter:?}")]
    InvalidParameterName {
        /// offending parameter name
        parameter: String,
    },

    /// Parameter declared twice in one signature
    #[error("Parameter {parameter:?} is declared more than once")]
    DuplicateParameter {
        /// duplicated parameter name
        parameter: String,
    },

    /// `user_id` declared as optional
    #[error("Parameter {parameter:?} is reserved for the caller identity and must be required")]
    OptionalIdentity {
        /// reserved parameter name
        parameter: String,
    },

    /// Docstring has no description paragraph
    #[error("Endpoint {endpoint} has no description")]
    MissingDescription {
        /// endpoint path
        endpoint: String,
    },

    /// A public parameter has no `:param` entry
    #[error("Parameter {parameter:?} of endpoint {endpoint} is not documented")]
    UndocumentedParameter {
        /// endpoint path
        endpoint: String,
        /// parameter name
        parameter: String,
    },

    /// `:param` entry for a parameter the endpoint does not declare
    #[error("Endpoint {endpoint} documents unknown parameter {parameter:?}")]
    UnknownParameter {
        /// endpoint path
        endpoint: String,
        /// parameter name
        parameter: String,
    },

    /// Non-metadata line after the first metadata line
    #[error("Endpoint {endpoint} has a malformed docstring line: {line:?}")]
    MalformedDocs {
        /// endpoint path
        endpoint: String,
        /// offending line
        line: String,
    },

    /// Declared signature disagrees with the handler's parameter type
    #[error("Parameters of endpoint {endpoint} do not match the handler type: {message}")]
    SignatureMismatch {
        /// endpoint path
        endpoint: String,
        /// deserializer message
        message: String,
    },

    /// Invalid environment / daemon setting
    #[error("Configuration error: {0}")]
    Environment(String),
}

/// Runtime daemon error type
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Startup configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Session already released
    #[error("Database session {0} has already been released")]
    SessionClosed(uuid::Uuid),
}

/// Daemon result type
pub type DaemonResult<T> = Result<T, DaemonError>;
