//! Nested render helpers.
//!
//! Stage procedures often render parts of their data with another renderer:
//! a table stage renders each row, a grouping stage renders each group. The
//! helpers here start such a nested render with the current format and these
//! default options, which the caller's overrides replace:
//!
//! | Option   | Default                     |
//! |----------|-----------------------------|
//! | `io`     | the current output sink     |
//! | `layout` | `false`                     |
//!
//! so the nested formatter writes straight into the parent's output and does
//! not wrap itself in its layout.
//!
//! Paginated formatters are the exception. Their output cannot be built by
//! appending nested text, so the nested render always gets a fresh sink,
//! whatever the overrides say. Every helper returns the sink the nested
//! render wrote to; a paginated formatter merges it itself.

use serde_json::Value;

use crate::error::{FormatError, Result};
use crate::formatter::Formatter;
use crate::options::{Options, LAYOUT};
use crate::output::Sink;
use crate::renderer::RendererKind;

impl<'r> Formatter<'r> {
    /// Renders `row` with the row renderer.
    pub fn render_row(&self, row: Value, overrides: Options) -> Result<Sink> {
        self.render_nested(RendererKind::Row.as_str(), row, overrides, |_| {})
    }

    /// Renders `table` with the table renderer.
    pub fn render_table(&self, table: Value, overrides: Options) -> Result<Sink> {
        self.render_nested(RendererKind::Table.as_str(), table, overrides, |_| {})
    }

    /// Renders `group` with the group renderer.
    pub fn render_group(&self, group: Value, overrides: Options) -> Result<Sink> {
        self.render_nested(RendererKind::Group.as_str(), group, overrides, |_| {})
    }

    /// Renders `grouping` with the grouping renderer.
    pub fn render_grouping(&self, grouping: Value, overrides: Options) -> Result<Sink> {
        self.render_nested(RendererKind::Grouping.as_str(), grouping, overrides, |_| {})
    }

    /// Renders `data` with any renderer, in the current format.
    ///
    /// `customize` receives the nested formatter instance before its stages
    /// run.
    pub fn render_nested<C>(
        &self,
        renderer: &str,
        data: Value,
        overrides: Options,
        customize: C,
    ) -> Result<Sink>
    where
        C: FnOnce(&mut Formatter<'r>),
    {
        let mut options = Options::new().with(LAYOUT, false).with_io(self.output());
        options.merge(overrides);
        if self.class().is_paginated() {
            options.set_io(Some(Sink::new()));
        }

        self.registry()
            .render_value(renderer, self.format(), data, options, customize)
    }

    /// Renders each element of the data, in order, with the row renderer.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnexpectedData`] if the data is not an array.
    pub fn render_data_by_row(&self, overrides: &Options) -> Result<()> {
        let rows = self.data().as_array().ok_or(FormatError::UnexpectedData {
            expected: "an array of rows",
        })?;
        for row in rows {
            self.render_row(row.clone(), overrides.clone())?;
        }
        Ok(())
    }

    /// Renders each value of the data, in order, with the group renderer,
    /// writing a newline to the current output after each group.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnexpectedData`] if the data is not an object.
    pub fn render_inline_grouping(&self, overrides: &Options) -> Result<()> {
        let groups = self.data().as_object().ok_or(FormatError::UnexpectedData {
            expected: "an object of groups",
        })?;
        for group in groups.values() {
            self.render_group(group.clone(), overrides.clone())?;
            self.output().push_str("\n");
        }
        Ok(())
    }
}
