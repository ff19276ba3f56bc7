//! Type-name to factory mapping with declared configuration options.
//!
//! Each provider implementation registers once at process bootstrap with a
//! factory, an ordered set of option descriptors, and a finishing
//! conversion into the registry's common trait object type. Option setters
//! stay fully typed on the concrete provider; type erasure happens only at
//! the registration boundary, so no downcasting is needed anywhere.

use std::collections::BTreeMap;

use crate::error::{OptionApplyError, RegistryError};
use crate::value::{ConfigMap, OptionValue};

type Setter<C> = Box<dyn Fn(&mut C, &OptionValue) -> Result<(), OptionApplyError> + Send + Sync>;
type Builder<T> = Box<dyn Fn(&ConfigMap) -> Result<T, RegistryError> + Send + Sync>;

/// A declared configuration option for a concrete provider type `C`.
///
/// Carries the option's name, a human-readable description for help
/// output, a default value applied before any caller-supplied values, and
/// the typed setter that writes the value into the instance.
pub struct ConfigOption<C> {
    name: &'static str,
    description: &'static str,
    default: OptionValue,
    setter: Setter<C>,
}

impl<C> ConfigOption<C> {
    /// Declares a string-valued option.
    pub fn string(
        name: &'static str,
        description: &'static str,
        default: &str,
        set: impl Fn(&mut C, String) -> Result<(), OptionApplyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            description,
            default: OptionValue::String(default.to_string()),
            setter: Box::new(move |target, value| match value {
                OptionValue::String(s) => set(target, s.clone()),
                other => Err(OptionApplyError::WrongKind {
                    expected: "string",
                    actual: other.kind(),
                }),
            }),
        }
    }

    /// Declares a boolean-valued option.
    pub fn bool(
        name: &'static str,
        description: &'static str,
        default: bool,
        set: impl Fn(&mut C, bool) -> Result<(), OptionApplyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            description,
            default: OptionValue::Bool(default),
            setter: Box::new(move |target, value| match value {
                OptionValue::Bool(b) => set(target, *b),
                other => Err(OptionApplyError::WrongKind {
                    expected: "bool",
                    actual: other.kind(),
                }),
            }),
        }
    }

    /// Declares an integer-valued option.
    pub fn integer(
        name: &'static str,
        description: &'static str,
        default: i64,
        set: impl Fn(&mut C, i64) -> Result<(), OptionApplyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            description,
            default: OptionValue::Integer(default),
            setter: Box::new(move |target, value| match value {
                OptionValue::Integer(i) => set(target, *i),
                other => Err(OptionApplyError::WrongKind {
                    expected: "integer",
                    actual: other.kind(),
                }),
            }),
        }
    }

    /// The option's declared name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Applies a value to the target through the typed setter.
    pub fn apply(&self, target: &mut C, value: &OptionValue) -> Result<(), OptionApplyError> {
        (self.setter)(target, value)
    }

    fn info(&self) -> OptionInfo {
        OptionInfo {
            name: self.name,
            description: self.description,
            default: self.default.clone(),
        }
    }
}

impl<C> std::fmt::Debug for ConfigOption<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOption")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Introspection record for one declared option.
#[derive(Debug, Clone)]
pub struct OptionInfo {
    /// Option name as used in configuration maps.
    pub name: &'static str,
    /// Human-readable description for help output.
    pub description: &'static str,
    /// Default value applied before caller-supplied values.
    pub default: OptionValue,
}

/// Introspection record for one registered provider type.
#[derive(Debug, Clone, Copy)]
pub struct EntryInfo<'a> {
    /// Registered type name.
    pub type_name: &'a str,
    /// Declared options, in registration order.
    pub options: &'a [OptionInfo],
}

struct Entry<T> {
    build: Builder<T>,
    options: Vec<OptionInfo>,
}

/// Registry of provider implementations keyed by type name.
///
/// `T` is the common trait object the registry hands out, typically
/// `Box<dyn SomeProviderTrait>`. Built once at process startup from an
/// explicit bootstrap list; lookups afterwards are read-only.
pub struct Registry<T> {
    entries: BTreeMap<String, Entry<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers a provider implementation under `type_name`.
    ///
    /// `factory` produces a zero-value instance of the concrete type `C`,
    /// `options` declares its configuration surface, and `finish` converts
    /// the configured instance into the registry's common type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateType` if `type_name` is already registered, and
    /// `DuplicateOption` if two declared options share a name. Both are
    /// bootstrap bugs, not runtime conditions.
    pub fn register<C: 'static>(
        &mut self,
        type_name: &str,
        factory: impl Fn() -> C + Send + Sync + 'static,
        options: Vec<ConfigOption<C>>,
        finish: impl Fn(C) -> T + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.register_inner(type_name, factory, options, finish, false)
    }

    /// Registers a composite provider implementation under `type_name`.
    ///
    /// Identical to [`Registry::register`] except for unknown-key
    /// handling: keys carrying a backend prefix (a `-` separator) belong
    /// to the nested-configuration phase and are left for it instead of
    /// failing the build. Keys without a prefix stay strictly validated.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register`].
    pub fn register_composite<C: 'static>(
        &mut self,
        type_name: &str,
        factory: impl Fn() -> C + Send + Sync + 'static,
        options: Vec<ConfigOption<C>>,
        finish: impl Fn(C) -> T + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        self.register_inner(type_name, factory, options, finish, true)
    }

    fn register_inner<C: 'static>(
        &mut self,
        type_name: &str,
        factory: impl Fn() -> C + Send + Sync + 'static,
        options: Vec<ConfigOption<C>>,
        finish: impl Fn(C) -> T + Send + Sync + 'static,
        forwards_backend_options: bool,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(type_name) {
            return Err(RegistryError::DuplicateType {
                type_name: type_name.to_string(),
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for option in &options {
            if !seen.insert(option.name) {
                return Err(RegistryError::DuplicateOption {
                    type_name: type_name.to_string(),
                    option: option.name.to_string(),
                });
            }
        }

        let info: Vec<OptionInfo> = options.iter().map(ConfigOption::info).collect();
        let name = type_name.to_string();
        let build: Builder<T> = Box::new(move |config: &ConfigMap| {
            let mut instance = factory();
            if forwards_backend_options {
                // Keep declared keys and unprefixed keys; backend-scoped
                // keys are validated against the selected backend later.
                let direct: ConfigMap = config
                    .iter()
                    .filter(|(key, _)| {
                        !key.contains('-')
                            || options.iter().any(|option| option.name == key.as_str())
                    })
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                apply_config_options(&mut instance, &options, &direct, &name)?;
            } else {
                apply_config_options(&mut instance, &options, config, &name)?;
            }
            Ok(finish(instance))
        });

        self.entries.insert(
            type_name.to_string(),
            Entry {
                build,
                options: info,
            },
        );
        Ok(())
    }

    /// Builds a configured instance of the named provider type.
    ///
    /// Applies every declared option's default, then the caller-supplied
    /// values. Configuration is strict: a key matching no declared option
    /// fails the whole build, and the first setter failure aborts the
    /// remaining option application.
    ///
    /// # Errors
    ///
    /// `UnknownType` if `type_name` is not registered, `UnknownOption` for
    /// stray keys, `OptionApply` wrapping the first setter failure.
    pub fn build_from_config_map(
        &self,
        type_name: &str,
        config: &ConfigMap,
    ) -> Result<T, RegistryError> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType {
                type_name: type_name.to_string(),
            })?;
        (entry.build)(config)
    }

    /// Returns whether a type name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Lazy, restartable iterator over registered entries.
    ///
    /// Read-only introspection for help output and startup logging.
    pub fn entries(&self) -> impl Iterator<Item = EntryInfo<'_>> + '_ {
        self.entries.iter().map(|(name, entry)| EntryInfo {
            type_name: name,
            options: &entry.options,
        })
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Applies declared options to an instance from an untyped config map.
///
/// Shared by registry builds and composite backend configuration so both
/// follow the same rules: every declared default is applied first, caller
/// keys are validated against declared names before any caller value is
/// written, application order of independent options carries no meaning,
/// and the first setter failure aborts the rest.
///
/// # Errors
///
/// `UnknownOption` for keys matching no declared option, `OptionApply`
/// wrapping the first setter failure.
pub fn apply_config_options<C>(
    target: &mut C,
    options: &[ConfigOption<C>],
    config: &ConfigMap,
    type_name: &str,
) -> Result<(), RegistryError> {
    for key in config.keys() {
        if !options.iter().any(|option| option.name == key) {
            return Err(RegistryError::UnknownOption {
                type_name: type_name.to_string(),
                option: key.clone(),
            });
        }
    }

    for option in options {
        option
            .apply(target, &option.default)
            .map_err(|source| RegistryError::OptionApply {
                type_name: type_name.to_string(),
                option: option.name.to_string(),
                source,
            })?;

        if let Some(value) = config.get(option.name) {
            option
                .apply(target, value)
                .map_err(|source| RegistryError::OptionApply {
                    type_name: type_name.to_string(),
                    option: option.name.to_string(),
                    source,
                })?;
        }
    }

    Ok(())
}
