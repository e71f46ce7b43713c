//! Named query formats and the ordered active subset

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::RegistryError;
use super::format1::FunctionCallFormat;
use super::format2::ObjectFormat;
use super::format3::NestedArrayFormat;
use super::QueryFormat;

/// Registry of query formats
///
/// Built and activated once during startup, then shared read-only behind an
/// `Arc`. Activation order is the dispatch tie-break: the first active format
/// that claims an input wins.
///
/// # Example
///
/// ```rust
/// use sg_restful::query::FormatRegistry;
///
/// let mut registry = FormatRegistry::with_builtin_formats();
/// registry.activate(["format3", "format1"]).unwrap();
/// assert_eq!(registry.active_names(), vec!["format3", "format1"]);
///
/// assert!(registry.activate(["format9"]).is_err());
/// ```
#[derive(Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn QueryFormat>>,
    active: Vec<String>,
}

impl FormatRegistry {
    /// Empty registry with nothing registered
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `format1`, `format2` and `format3`, none active
    #[must_use]
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register(FunctionCallFormat::NAME, FunctionCallFormat);
        registry.register(ObjectFormat::NAME, ObjectFormat);
        registry.register(NestedArrayFormat::NAME, NestedArrayFormat);
        registry
    }

    /// Names of the built-in formats in their default activation order
    #[must_use]
    pub fn builtin_names() -> Vec<String> {
        [FunctionCallFormat::NAME, ObjectFormat::NAME, NestedArrayFormat::NAME]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Insert or replace a format; activation is unchanged
    pub fn register<F>(&mut self, name: impl Into<String>, format: F)
    where
        F: QueryFormat + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
    }

    /// Replace the active list
    ///
    /// Fails without changing anything if a name is not registered.
    pub fn activate<I, S>(&mut self, names: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if let Some(unknown) = names.iter().find(|n| !self.formats.contains_key(n.as_str())) {
            return Err(RegistryError::UnknownFormat(unknown.clone()));
        }
        tracing::debug!(formats = ?names, "activated query formats");
        self.active = names;
        Ok(())
    }

    /// Clear the active list, keeping registrations
    pub fn reset(&mut self) {
        self.active.clear();
    }

    /// Active formats with their names, in activation order
    pub fn active(&self) -> impl Iterator<Item = (&str, &dyn QueryFormat)> + '_ {
        self.active.iter().filter_map(|name| {
            self.formats
                .get(name)
                .map(|format| (name.as_str(), format.as_ref()))
        })
    }

    /// Names of the active formats, in activation order
    #[must_use]
    pub fn active_names(&self) -> Vec<&str> {
        self.active.iter().map(String::as_str).collect()
    }

    /// Whether a format is registered under `name`
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("FormatRegistry")
            .field("registered", &registered)
            .field("active", &self.active)
            .finish()
    }
}
