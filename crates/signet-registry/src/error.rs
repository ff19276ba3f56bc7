//! Error types for provider registration and configuration.
//!
//! Registration errors indicate bootstrap bugs (duplicate names) and are
//! not recoverable by callers. Configuration errors are strict by design:
//! an unknown option name in deployed configuration is a typo worth
//! failing startup over, not something to silently ignore.

use thiserror::Error;

/// Errors from registering or configuring providers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The requested provider type name is not registered.
    #[error("unknown provider type {type_name:?}")]
    UnknownType {
        /// Type name that was requested.
        type_name: String,
    },

    /// A configuration key matched no declared option of the provider.
    #[error("unknown option {option:?} for provider type {type_name:?}")]
    UnknownOption {
        /// Type name being configured.
        type_name: String,
        /// Offending configuration key.
        option: String,
    },

    /// A declared option's setter rejected the supplied value.
    #[error("could not apply option {option:?} for provider type {type_name:?}: {source}")]
    OptionApply {
        /// Type name being configured.
        type_name: String,
        /// Option whose setter failed.
        option: String,
        /// Underlying setter failure.
        #[source]
        source: OptionApplyError,
    },

    /// A composite provider's selector named no declared backend option set.
    #[error("no options declared for backend {backend:?}")]
    UnknownBackend {
        /// Derived backend option-set name, e.g. `kms-vault`.
        backend: String,
    },

    /// The provider type name is already registered.
    #[error("provider type {type_name:?} is already registered")]
    DuplicateType {
        /// Colliding type name.
        type_name: String,
    },

    /// Two declared options of one provider share a name.
    #[error("duplicate option {option:?} declared for provider type {type_name:?}")]
    DuplicateOption {
        /// Type name being registered.
        type_name: String,
        /// Colliding option name.
        option: String,
    },
}

/// Failure applying one option value to a provider instance.
#[derive(Debug, Error)]
pub enum OptionApplyError {
    /// The supplied value has the wrong kind for this option.
    #[error("expected a {expected} value, got {actual}")]
    WrongKind {
        /// Kind the option declares.
        expected: &'static str,
        /// Kind the caller supplied.
        actual: &'static str,
    },

    /// The value had the right kind but was rejected by the setter.
    #[error("{0}")]
    Invalid(String),
}

impl OptionApplyError {
    /// Builds an `Invalid` error from any displayable reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}
