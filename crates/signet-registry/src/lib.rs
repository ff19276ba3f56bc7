//! Provider registry with self-describing configuration.
//!
//! Maps implementation type names to factories plus declared, typed
//! configuration options, and builds configured provider instances from
//! untyped key/value maps. Includes the nested-configuration protocol for
//! composite providers whose backend options live one layer below the
//! provider's own option set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod nested;
pub mod registry;
pub mod value;

pub use error::{OptionApplyError, RegistryError};
pub use nested::{forward_backend_options, Composite};
pub use registry::{apply_config_options, ConfigOption, EntryInfo, OptionInfo, Registry};
pub use value::{ConfigMap, OptionValue};
