//! Formatter instances.
//!
//! A [`Formatter`] is created by the render pipeline for one render call and
//! dropped when the call returns. It carries the renderer-supplied data, the
//! active format, the options and the output sink, and it is what every stage
//! procedure receives.
//!
//! # Output
//!
//! [`Formatter::output`] returns the `io` option when the caller supplied one.
//! Otherwise it returns a private buffer, created on first use and reused for
//! the rest of the instance's lifetime.
//!
//! # Named operations
//!
//! Procedures are looked up by name rather than called as methods.
//! [`Formatter::call_named`] adds the per-format shortcut on top: a name that
//! matches one of the class's formats runs the given block only while that
//! format is active.
//!
//! ```rust
//! use folio::{FormatterClass, Options, Registry};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry.add_formatter(
//!     FormatterClass::new("Markup")
//!         .renders(["html", "xml"], ["row"])
//!         .build("row", |f| {
//!             f.call_named("html", |f| {
//!                 f.output().push_str("<br/>");
//!                 Ok(())
//!             })?;
//!             f.call_named("xml", |f| {
//!                 f.output().push_str("<break/>");
//!                 Ok(())
//!             })
//!         }),
//! );
//!
//! let html = registry.render_to_string("row", "html", &json!([]), Options::new()).unwrap();
//! assert_eq!(html, "<br/>");
//! ```

use std::path::Path;

use once_cell::unsync::OnceCell;
use serde_json::Value;

use crate::class::FormatterClass;
use crate::error::{FormatError, Result};
use crate::options::Options;
use crate::output::{OutputDestination, Sink};
use crate::registry::Registry;
use crate::stage::build_name;
use crate::template::Template;

/// A formatter instance bound to one render call.
pub struct Formatter<'r> {
    registry: &'r Registry,
    class: &'r FormatterClass,
    data: Value,
    format: String,
    options: Options,
    buffer: OnceCell<Sink>,
}

impl<'r> Formatter<'r> {
    /// Creates an instance of `class`.
    ///
    /// `format` is expected to be one of the class's formats; this is not
    /// checked.
    pub fn new(
        registry: &'r Registry,
        class: &'r FormatterClass,
        data: Value,
        format: impl Into<String>,
        options: Options,
    ) -> Self {
        Self {
            registry,
            class,
            data,
            format: format.into(),
            options,
            buffer: OnceCell::new(),
        }
    }

    /// The registry this instance was created from.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// The class this instance belongs to.
    pub fn class(&self) -> &'r FormatterClass {
        self.class
    }

    /// The data being rendered.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Replaces the data.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// The active format identifier.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The options container.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable access to the options container.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Reads an option through a declared option reader.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UndeclaredOption`] if the class never declared
    /// a reader for `name`.
    pub fn reader(&self, name: &str) -> Result<Option<&Value>> {
        if !self.class.has_reader(name) {
            return Err(FormatError::UndeclaredOption {
                formatter: self.class.name().to_string(),
                name: name.to_string(),
            });
        }
        Ok(self.options.get(name))
    }

    /// The sink output goes to.
    pub fn output(&self) -> Sink {
        match self.options.io() {
            Some(io) => io.clone(),
            None => self.buffer.get_or_init(Sink::new).clone(),
        }
    }

    /// Empties the sink returned by [`output`](Self::output).
    ///
    /// This applies to an external `io` sink as well as to the private
    /// buffer, so everything written through that sink so far is discarded.
    pub fn clear_output(&self) {
        self.output().clear();
    }

    /// Writes the full output to `path`, truncating any existing file.
    ///
    /// Text classes require the output to be valid UTF-8; classes declared
    /// with [`save_as_binary_file`](FormatterClass::save_as_binary_file)
    /// write the bytes unchanged.
    pub fn save_output(&self, path: impl AsRef<Path>) -> Result<()> {
        let destination = OutputDestination::File(path.as_ref().to_path_buf());
        destination.write_sink(&self.output(), self.class.save_mode())
    }

    /// The template named by the `template` option.
    ///
    /// Returns `Ok(None)` when no template is named.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TemplateNotFound`] when the named template is
    /// not registered.
    pub fn template(&self) -> Result<Option<&'r Template>> {
        match self.options.template() {
            Some(name) => self.registry.template(name).map(Some),
            None => Ok(None),
        }
    }

    /// Fills unset options from the named template's presets.
    pub fn apply_template(&mut self) -> Result<()> {
        if let Some(template) = self.template()? {
            tracing::debug!(template = template.name(), "applying template");
            template.apply_to(&mut self.options);
        }
        Ok(())
    }

    /// Runs the procedure stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedOperation`] if the class has no such
    /// procedure, or whatever the procedure itself returns.
    pub fn invoke(&mut self, name: &str) -> Result<()> {
        if self.invoke_if_defined(name)? {
            Ok(())
        } else {
            Err(self.unsupported(name))
        }
    }

    /// Runs the procedure stored under `name` if there is one.
    ///
    /// Returns whether a procedure ran.
    pub fn invoke_if_defined(&mut self, name: &str) -> Result<bool> {
        let class = self.class;
        match class.procedure(name) {
            Some(procedure) => {
                tracing::debug!(formatter = class.name(), procedure = name, "invoking");
                procedure(self)?;
                Ok(true)
            }
            None => {
                tracing::trace!(formatter = class.name(), procedure = name, "not defined");
                Ok(false)
            }
        }
    }

    /// Runs the declared build stage `stage` (the `build_<stage>` procedure).
    pub fn build(&mut self, stage: &str) -> Result<()> {
        self.invoke(&build_name(stage))
    }

    /// Resolves a named operation.
    ///
    /// - a defined procedure runs, and `block` is ignored
    /// - a format of the class runs `block` only if it is the active format
    /// - anything else fails with [`FormatError::UnsupportedOperation`]
    pub fn call_named<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Formatter<'r>) -> Result<()>,
    {
        if self.invoke_if_defined(name)? {
            return Ok(());
        }
        if self.class.supports(name) {
            if self.format == name {
                return block(self);
            }
            return Ok(());
        }
        Err(self.unsupported(name))
    }

    fn unsupported(&self, name: &str) -> FormatError {
        FormatError::UnsupportedOperation {
            formatter: self.class.name().to_string(),
            name: name.to_string(),
        }
    }
}

impl std::fmt::Debug for Formatter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formatter")
            .field("class", &self.class.name())
            .field("format", &self.format)
            .field("data", &self.data)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
