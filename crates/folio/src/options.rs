//! The options container attached to every formatter instance.
//!
//! [`Options`] is a loosely typed bag of named settings. Values are stored as
//! [`serde_json::Value`] so that renderers, templates and formatters can
//! exchange settings without agreeing on a schema up front. The framework
//! itself acts on two settings:
//!
//! - `io`: an externally supplied [`Sink`] that replaces the formatter's own
//!   output buffer. It is not a JSON value and lives in its own field.
//! - `template`: the name of a [`Template`](crate::Template) whose presets
//!   are applied before rendering, stored as a string option
//!
//! Writing the same name twice keeps the last value.
//!
//! # Example
//!
//! ```rust
//! use folio::Options;
//!
//! let options = Options::new()
//!     .with("show_title", true)
//!     .with("width", 40)
//!     .with_template("compact");
//!
//! assert_eq!(options.get_bool("show_title"), Some(true));
//! assert_eq!(options.get_u64("width"), Some(40));
//! assert_eq!(options.template(), Some("compact"));
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::output::Sink;

/// Option name that disables a formatter's layout when set to `false`.
pub const LAYOUT: &str = "layout";

/// Option name of the output redirection sink.
pub const IO: &str = "io";

/// Option name of the template to apply.
pub const TEMPLATE: &str = "template";

/// Named settings for a single render call.
#[derive(Debug, Clone, Default)]
pub struct Options {
    values: BTreeMap<String, Value>,
    io: Option<Sink>,
}

impl Options {
    /// Creates an empty options container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, returning `self` for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets the output redirection sink, returning `self` for chaining.
    pub fn with_io(mut self, sink: Sink) -> Self {
        self.io = Some(sink);
        self
    }

    /// Sets the template name, returning `self` for chaining.
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.set_template(Some(name.into()));
        self
    }

    /// Sets an option. An existing value under the same name is replaced.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Gets an option value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Gets a string option.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Gets a boolean option.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Gets an unsigned integer option.
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Returns true if an option with this name is set.
    ///
    /// `io` counts as set when a sink was supplied.
    pub fn contains(&self, name: &str) -> bool {
        match name {
            IO => self.io.is_some(),
            _ => self.values.contains_key(name),
        }
    }

    /// Removes an option, returning its value if it was set.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Iterates over the names of all options except `io`.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    /// Returns true if no option at all is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.io.is_none()
    }

    /// The external output sink, if one was supplied.
    pub fn io(&self) -> Option<&Sink> {
        self.io.as_ref()
    }

    /// Sets or clears the external output sink.
    pub fn set_io(&mut self, sink: Option<Sink>) {
        self.io = sink;
    }

    /// The template name, if one was supplied.
    pub fn template(&self) -> Option<&str> {
        self.get_str(TEMPLATE)
    }

    /// Sets or clears the template name.
    pub fn set_template(&mut self, name: Option<String>) {
        match name {
            Some(name) => self.set(TEMPLATE, name),
            None => {
                self.remove(TEMPLATE);
            }
        }
    }

    /// Returns false only when the `layout` option is explicitly `false`.
    pub fn layout_enabled(&self) -> bool {
        self.get_bool(LAYOUT) != Some(false)
    }

    /// Merges `overrides` into `self`. Values from `overrides` win.
    pub fn merge(&mut self, overrides: Options) {
        self.values.extend(overrides.values);
        if overrides.io.is_some() {
            self.io = overrides.io;
        }
    }

    /// Copies each preset into `self` unless the name is already set.
    pub fn fill_missing<'a, I>(&mut self, presets: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (name, value) in presets {
            if !self.values.contains_key(name) {
                self.values.insert(name.clone(), value.clone());
            }
        }
    }
}
