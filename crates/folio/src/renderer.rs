//! Renderer definitions and the render pipeline.
//!
//! A [`Renderer`] names an ordered list of stages. Rendering selects the
//! formatter class registered for the requested format, creates an instance
//! and walks the stages, invoking `build_<stage>` on the instance for each
//! one the class defines. Stages a class does not define are skipped.
//!
//! # Pipeline
//!
//! ```text
//! select formatter class for (renderer, format)
//!   → create instance (data, format, options)
//!   → customize callback
//!   → apply template presets
//!   → check required options
//!   → prepare_<name>
//!   → layout { build_<stage> for each stage }   (layout skipped if layout: false)
//!   → finalize_<name>
//!   → output sink
//! ```
//!
//! # Example
//!
//! ```rust
//! use folio::{FormatterClass, Options, Registry, Renderer};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry.define_renderer(Renderer::new("report").stage("header").stage("body"));
//! registry.add_formatter(
//!     FormatterClass::new("Text")
//!         .renders(["text"], ["report"])
//!         .build("header", |f| {
//!             f.output().push_str("H\n");
//!             Ok(())
//!         })
//!         .build("body", |f| {
//!             let body: String = f.data().as_str().unwrap_or_default().chars().rev().collect();
//!             f.output().push_str(&body);
//!             f.output().push_str("\n");
//!             Ok(())
//!         }),
//! );
//!
//! let out = registry
//!     .render_to_string("report", "text", &json!("apple"), Options::new())
//!     .unwrap();
//! assert_eq!(out, "H\nelppa\n");
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{FormatError, Result};
use crate::formatter::Formatter;
use crate::options::Options;
use crate::output::Sink;
use crate::registry::Registry;
use crate::stage::build_name;

/// The built-in renderers used by the nested render helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// A single row (`row` stage)
    Row,
    /// A table (`table_header`, `table_body`, `table_footer`)
    Table,
    /// A named group of rows (`group_header`, `group_body`, `group_footer`)
    Group,
    /// A mapping of groups (`grouping_header`, `grouping_body`, `grouping_footer`)
    Grouping,
}

impl RendererKind {
    /// Every built-in renderer.
    pub const ALL: [RendererKind; 4] = [
        RendererKind::Row,
        RendererKind::Table,
        RendererKind::Group,
        RendererKind::Grouping,
    ];

    /// The renderer name used for registration and lookup.
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Row => "row",
            RendererKind::Table => "table",
            RendererKind::Group => "group",
            RendererKind::Grouping => "grouping",
        }
    }
}

impl AsRef<str> for RendererKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered stage pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    name: String,
    stages: Vec<String>,
    prepare: Option<String>,
    finalize: Option<String>,
    required: Vec<String>,
}

impl Renderer {
    /// Creates a renderer with no stages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            prepare: None,
            finalize: None,
            required: Vec::new(),
        }
    }

    /// The definition of a built-in renderer.
    pub fn builtin(kind: RendererKind) -> Self {
        let name = kind.as_str();
        match kind {
            RendererKind::Row => Self::new(name).stage("row"),
            _ => Self::new(name)
                .prepare(name)
                .stages([
                    format!("{name}_header"),
                    format!("{name}_body"),
                    format!("{name}_footer"),
                ])
                .finalize(name),
        }
    }

    /// Appends a stage.
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Appends several stages in order.
    pub fn stages<I>(mut self, stages: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.stages.extend(stages.into_iter().map(Into::into));
        self
    }

    /// Runs `prepare_<name>` before the stages, when the formatter defines it.
    pub fn prepare(mut self, name: impl Into<String>) -> Self {
        self.prepare = Some(name.into());
        self
    }

    /// Runs `finalize_<name>` after the stages, when the formatter defines it.
    pub fn finalize(mut self, name: impl Into<String>) -> Self {
        self.finalize = Some(name.into());
        self
    }

    /// Requires an option to be present at render time.
    ///
    /// The check runs after template presets are applied, so a template can
    /// supply the option.
    pub fn required_option(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// The renderer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stages, in execution order.
    pub fn stage_names(&self) -> &[String] {
        &self.stages
    }

    /// Options that must be set for a render to start.
    pub fn required_options(&self) -> &[String] {
        &self.required
    }

    fn prepare_hook(&self) -> Option<String> {
        self.prepare.as_ref().map(|name| format!("prepare_{name}"))
    }

    fn finalize_hook(&self) -> Option<String> {
        self.finalize.as_ref().map(|name| format!("finalize_{name}"))
    }

    /// Invokes `build_<stage>` for every stage the formatter defines.
    fn execute_stages(&self, formatter: &mut Formatter<'_>) -> Result<()> {
        for stage in &self.stages {
            formatter.invoke_if_defined(&build_name(stage))?;
        }
        Ok(())
    }
}

impl Registry {
    /// Renders `data` with the formatter registered for `(renderer, format)`.
    ///
    /// Returns the sink the formatter wrote to: the `io` option when one was
    /// supplied, the formatter's own buffer otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the renderer or formatter cannot be resolved, if a required
    /// option is missing, if the named template does not exist, or with
    /// whatever error a stage procedure returns.
    pub fn render<T>(
        &self,
        renderer: &str,
        format: &str,
        data: &T,
        options: Options,
    ) -> Result<Sink>
    where
        T: Serialize + ?Sized,
    {
        self.render_with(renderer, format, data, options, |_| {})
    }

    /// Like [`render`](Self::render), handing the fresh formatter instance to
    /// `customize` before any stage runs.
    pub fn render_with<'r, T, C>(
        &'r self,
        renderer: &str,
        format: &str,
        data: &T,
        options: Options,
        customize: C,
    ) -> Result<Sink>
    where
        T: Serialize + ?Sized,
        C: FnOnce(&mut Formatter<'r>),
    {
        let data = serde_json::to_value(data)?;
        self.render_value(renderer, format, data, options, customize)
    }

    /// Renders and returns the output as text.
    pub fn render_to_string<T>(
        &self,
        renderer: &str,
        format: &str,
        data: &T,
        options: Options,
    ) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        self.render(renderer, format, data, options)?.text()
    }

    pub(crate) fn render_value<'r, C>(
        &'r self,
        renderer: &str,
        format: &str,
        data: Value,
        options: Options,
        customize: C,
    ) -> Result<Sink>
    where
        C: FnOnce(&mut Formatter<'r>),
    {
        let definition = self.renderer(renderer)?;
        let class = self.formatter_for(renderer, format)?;
        tracing::debug!(renderer, format, formatter = class.name(), "rendering");

        let mut formatter = Formatter::new(self, class, data, format, options);
        customize(&mut formatter);

        formatter.apply_template()?;

        for name in definition.required_options() {
            if !formatter.options().contains(name) {
                return Err(FormatError::MissingOption {
                    renderer: renderer.to_string(),
                    name: name.clone(),
                });
            }
        }

        if let Some(hook) = definition.prepare_hook() {
            formatter.invoke_if_defined(&hook)?;
        }

        match class.layout_fn() {
            Some(layout) if formatter.options().layout_enabled() => {
                layout(&mut formatter, &|f: &mut Formatter<'_>| {
                    definition.execute_stages(f)
                })?;
            }
            _ => definition.execute_stages(&mut formatter)?,
        }

        if let Some(hook) = definition.finalize_hook() {
            formatter.invoke_if_defined(&hook)?;
        }

        Ok(formatter.output())
    }
}
