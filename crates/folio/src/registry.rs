//! Formatter registry.
//!
//! [`Registry`] owns everything the rendering pipeline needs to resolve at
//! dispatch time:
//!
//! - renderer definitions, by name
//! - formatter classes, by name
//! - the handler table mapping `(renderer, format)` to a formatter class
//! - the template store
//!
//! # Lifecycle
//!
//! A registry is populated once, through `&mut self`, and then shared by
//! reference with every render. Rendering only needs `&Registry`, so the
//! borrow checker enforces the write-at-startup, read-afterwards discipline:
//! nothing can register a formatter while a render borrowed from the same
//! registry is running. There is no removal operation.
//!
//! `Registry` is `Send + Sync`: once populated it can sit behind an `Arc` and
//! serve renders on several threads. Each render runs on the thread that
//! started it.
//!
//! # Example
//!
//! ```rust
//! use folio::{FormatterClass, Registry, RendererKind};
//!
//! let mut registry = Registry::new();
//! registry.add_formatter(
//!     FormatterClass::new("Csv").renders(["csv"], [RendererKind::Row, RendererKind::Table]),
//! );
//!
//! assert_eq!(registry.formatter_for("table", "csv").unwrap().name(), "Csv");
//! assert!(registry.formatter_for("table", "html").is_err());
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::class::FormatterClass;
use crate::error::{FormatError, Result};
use crate::renderer::{Renderer, RendererKind};
use crate::template::{Template, TemplateStore};

/// Registry of renderers, formatter classes and templates.
#[derive(Debug, Clone)]
pub struct Registry {
    renderers: HashMap<String, Renderer>,
    classes: HashMap<String, FormatterClass>,
    /// renderer name → format → formatter class name
    handlers: HashMap<String, BTreeMap<String, String>>,
    templates: TemplateStore,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry with the built-in row, table, group and grouping
    /// renderers defined.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for kind in RendererKind::ALL {
            registry.define_renderer(Renderer::builtin(kind));
        }
        registry
    }

    /// Creates a registry with no renderers at all.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            classes: HashMap::new(),
            handlers: HashMap::new(),
            templates: TemplateStore::new(),
        }
    }

    /// Defines a renderer, replacing any renderer with the same name.
    pub fn define_renderer(&mut self, renderer: Renderer) -> &mut Self {
        tracing::debug!(renderer = renderer.name(), "defined renderer");
        self.renderers.insert(renderer.name().to_string(), renderer);
        self
    }

    /// Looks up a renderer definition.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownRenderer`] if it was never defined.
    pub fn renderer(&self, name: &str) -> Result<&Renderer> {
        self.renderers
            .get(name)
            .ok_or_else(|| FormatError::UnknownRenderer(name.to_string()))
    }

    /// Adds a formatter class and applies its declared registrations.
    ///
    /// A class with the same name replaces the previous one; handler entries
    /// keep pointing at the name, so they resolve to the new class.
    pub fn add_formatter(&mut self, class: FormatterClass) -> &mut Self {
        let name = class.name().to_string();
        if self.classes.contains_key(&name) {
            tracing::warn!(formatter = %name, "replacing formatter class");
        }
        for (renderer, format) in class.bindings() {
            self.bind(renderer, format, &name);
        }
        self.classes.insert(name, class);
        self
    }

    /// Registers an already added class for every `(format, renderer)` pair.
    ///
    /// Each format is appended to the class's supported set unless already
    /// present. Renderer names are not validated.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownFormatter`] if no class has this name.
    pub fn register<F, R>(&mut self, class: &str, formats: F, renderers: R) -> Result<()>
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let formats: Vec<F::Item> = formats.into_iter().collect();
        let renderers: Vec<R::Item> = renderers.into_iter().collect();

        let entry = self
            .classes
            .get_mut(class)
            .ok_or_else(|| FormatError::UnknownFormatter(class.to_string()))?;
        for format in &formats {
            entry.add_format(format.as_ref());
        }

        for renderer in &renderers {
            for format in &formats {
                self.bind(renderer.as_ref(), format.as_ref(), class);
            }
        }
        Ok(())
    }

    fn bind(&mut self, renderer: &str, format: &str, class: &str) {
        tracing::debug!(renderer, format, formatter = class, "registered formatter");
        self.handlers
            .entry(renderer.to_string())
            .or_default()
            .insert(format.to_string(), class.to_string());
    }

    /// Looks up a formatter class by name.
    pub fn formatter(&self, name: &str) -> Option<&FormatterClass> {
        self.classes.get(name)
    }

    /// Resolves the formatter class handling `format` for `renderer`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownFormat`] if nothing is registered for
    /// the pair.
    pub fn formatter_for(&self, renderer: &str, format: &str) -> Result<&FormatterClass> {
        self.handlers
            .get(renderer)
            .and_then(|formats| formats.get(format))
            .and_then(|class| self.classes.get(class))
            .ok_or_else(|| FormatError::UnknownFormat {
                renderer: renderer.to_string(),
                format: format.to_string(),
            })
    }

    /// The formats a class supports, or `None` for an unknown class.
    pub fn supported_formats(&self, class: &str) -> Option<Vec<&str>> {
        self.classes
            .get(class)
            .map(|c| c.formats().iter().map(String::as_str).collect())
    }

    /// The formats registered for a renderer, in sorted order.
    pub fn formats_for(&self, renderer: &str) -> Vec<&str> {
        self.handlers
            .get(renderer)
            .map(|formats| formats.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Adds a template, replacing any template with the same name.
    pub fn add_template(&mut self, template: Template) -> &mut Self {
        self.templates.add(template);
        self
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TemplateNotFound`] if no template has this name.
    pub fn template(&self, name: &str) -> Result<&Template> {
        self.templates.get(name)
    }

    /// The template store.
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Mutable access to the template store, e.g. for
    /// [`TemplateStore::load_dir`].
    pub fn templates_mut(&mut self) -> &mut TemplateStore {
        &mut self.templates
    }
}
