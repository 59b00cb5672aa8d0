//! Formatter class definitions.
//!
//! A [`FormatterClass`] is the static description of a formatter: the
//! formats it supports, the renderers it registers for, its build stages and
//! hooks, its option readers and how its output is saved. Instances are
//! created per render call by the renderer (see [`Formatter`]).
//!
//! # Example
//!
//! ```rust
//! use folio::{FormatterClass, RendererKind};
//!
//! let class = FormatterClass::new("Text")
//!     .renders(["text"], [RendererKind::Table])
//!     .opt_reader(["show_title"])
//!     .build("table_header", |f| {
//!         f.output().push_str("HEADER\n");
//!         Ok(())
//!     });
//!
//! assert!(class.supports("text"));
//! assert!(class.has_procedure("build_table_header"));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::formatter::Formatter;
use crate::options::IO;
use crate::output::SaveMode;
use crate::stage::{build_name, LayoutFn, StageFn, StageRunner};

/// Static description of a formatter.
#[derive(Clone)]
pub struct FormatterClass {
    name: String,
    formats: BTreeSet<String>,
    /// Declared (renderer, format) registrations, applied when the class is
    /// added to a registry.
    bindings: Vec<(String, String)>,
    procedures: HashMap<String, StageFn>,
    layout: Option<LayoutFn>,
    readers: BTreeSet<String>,
    save_mode: SaveMode,
    paginated: bool,
}

impl FormatterClass {
    /// Creates an empty class with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formats: BTreeSet::new(),
            bindings: Vec::new(),
            procedures: HashMap::new(),
            layout: None,
            readers: BTreeSet::new(),
            save_mode: SaveMode::Text,
            paginated: false,
        }
    }

    /// Declares that this class renders `formats` for each of `renderers`.
    ///
    /// The formats join the class's supported set immediately; the renderer
    /// bindings take effect when the class is added to a
    /// [`Registry`](crate::Registry).
    pub fn renders<F, R>(mut self, formats: F, renderers: R) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
        for renderer in renderers {
            for format in &formats {
                self.bindings
                    .push((renderer.as_ref().to_string(), format.clone()));
            }
        }
        for format in formats {
            self.formats.insert(format);
        }
        self
    }

    /// Declares the build stage `stage`, stored as `build_<stage>`.
    pub fn build<F>(self, stage: &str, procedure: F) -> Self
    where
        F: Fn(&mut Formatter<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.define(build_name(stage), procedure)
    }

    /// Installs a procedure under an arbitrary name.
    ///
    /// Used for renderer hooks such as `prepare_table` and `finalize_table`.
    pub fn define<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: Fn(&mut Formatter<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let procedure: StageFn = Arc::new(procedure);
        self.procedures.insert(name.into(), procedure);
        self
    }

    /// Installs a layout wrapping every render of this class.
    pub fn layout<F>(mut self, layout: F) -> Self
    where
        F: Fn(&mut Formatter<'_>, StageRunner<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let layout: LayoutFn = Arc::new(layout);
        self.layout = Some(layout);
        self
    }

    /// Declares option readers: names that can be read through
    /// [`Formatter::reader`].
    ///
    /// `io` holds a sink rather than a value and cannot be read this way;
    /// it is ignored here. Use [`Formatter::output`] instead.
    pub fn opt_reader<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for name in names.into_iter().map(Into::into) {
            if name == IO {
                tracing::warn!(formatter = %self.name, "ignoring option reader for 'io'");
                continue;
            }
            self.readers.insert(name);
        }
        self
    }

    /// Saves output byte for byte instead of as UTF-8 text.
    pub fn save_as_binary_file(mut self) -> Self {
        self.save_mode = SaveMode::Binary;
        self
    }

    /// Marks the class as a paginated (binary family) formatter.
    ///
    /// Nested renders started from a paginated formatter write into a fresh
    /// sink instead of the current one.
    pub fn paginated(mut self) -> Self {
        self.paginated = true;
        self
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The supported format identifiers.
    pub fn formats(&self) -> &BTreeSet<String> {
        &self.formats
    }

    /// Returns true if `format` is in the supported set.
    pub fn supports(&self, format: &str) -> bool {
        self.formats.contains(format)
    }

    /// Looks up a procedure by its full name (e.g. `build_header`).
    pub fn procedure(&self, name: &str) -> Option<&StageFn> {
        self.procedures.get(name)
    }

    /// Returns true if a procedure with this full name is defined.
    pub fn has_procedure(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    /// Iterates over the names of all defined procedures.
    pub fn procedure_names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(|s| s.as_str())
    }

    /// The layout, if one was installed.
    pub fn layout_fn(&self) -> Option<&LayoutFn> {
        self.layout.as_ref()
    }

    /// Returns true if `name` was declared with [`opt_reader`](Self::opt_reader).
    pub fn has_reader(&self, name: &str) -> bool {
        self.readers.contains(name)
    }

    /// How [`Formatter::save_output`] writes files.
    pub fn save_mode(&self) -> SaveMode {
        self.save_mode
    }

    /// Returns true for paginated (binary family) formatters.
    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    pub(crate) fn bindings(&self) -> &[(String, String)] {
        &self.bindings
    }

    /// Adds a format to the supported set. Returns false if already present.
    pub(crate) fn add_format(&mut self, format: &str) -> bool {
        self.formats.insert(format.to_string())
    }
}

impl fmt::Debug for FormatterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut procedures: Vec<&str> = self.procedure_names().collect();
        procedures.sort_unstable();
        f.debug_struct("FormatterClass")
            .field("name", &self.name)
            .field("formats", &self.formats)
            .field("procedures", &procedures)
            .field("layout", &self.layout.is_some())
            .field("readers", &self.readers)
            .field("save_mode", &self.save_mode)
            .field("paginated", &self.paginated)
            .finish()
    }
}
