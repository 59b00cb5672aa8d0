//! # Folio - Pluggable Report Formatters
//!
//! `folio` is the formatter layer of a reporting pipeline. Renderers decide
//! *what* gets produced and in which order (a table is a header, a body and a
//! footer); formatters decide *how* each piece looks in a given format (CSV,
//! plain text, a paginated document).
//!
//! ## Core Concepts
//!
//! - [`Registry`]: renderers, formatter classes and templates, resolved by name
//! - [`Renderer`]: a named, ordered list of stages
//! - [`FormatterClass`]: formats, build stages and hooks for one formatter
//! - [`Formatter`]: one instance per render call, holding data, format,
//!   [`Options`] and the output [`Sink`]
//! - [`Template`]: named option presets
//!
//! ## Quick Start
//!
//! ```rust
//! use folio::{FormatterClass, Options, Registry, RendererKind};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry.add_formatter(
//!     FormatterClass::new("Csv")
//!         .renders(["csv"], [RendererKind::Row, RendererKind::Table])
//!         .build("row", |f| {
//!             let cells: Vec<String> = f
//!                 .data()
//!                 .as_array()
//!                 .into_iter()
//!                 .flatten()
//!                 .map(|cell| cell.to_string())
//!                 .collect();
//!             f.output().push_str(&cells.join(","));
//!             f.output().push_str("\n");
//!             Ok(())
//!         })
//!         .build("table_body", |f| f.render_data_by_row(&Options::new())),
//! );
//!
//! let csv = registry
//!     .render_to_string("table", "csv", &json!([[1, 2], [3, 4]]), Options::new())
//!     .unwrap();
//! assert_eq!(csv, "1,2\n3,4\n");
//! ```
//!
//! ## Sinks
//!
//! Every formatter writes to a [`Sink`]. Passing a sink through the `io`
//! option makes the formatter write into it instead of its own buffer; the
//! nested render helpers use this to let a row formatter append to the table
//! output that contains it.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (registration, formatter selection and
//! stage dispatch at `debug`, skipped stages at `trace`). Installing a
//! subscriber is left to the application.

mod class;
mod error;
mod formatter;
mod helpers;
mod options;
mod output;
mod registry;
mod renderer;
pub mod stage;
mod template;

pub use class::FormatterClass;
pub use error::{FormatError, Result};
pub use formatter::Formatter;
pub use options::{Options, IO, LAYOUT, TEMPLATE};
pub use output::{OutputDestination, SaveMode, Sink};
pub use registry::Registry;
pub use renderer::{Renderer, RendererKind};
pub use stage::{LayoutFn, StageFn, StageRunner};
pub use template::{Template, TemplateStore, TEMPLATE_EXTENSIONS};
