//! Concrete formatters for the demo: aligned text, CSV, and a paginated
//! page-stream format.

use folio::{FormatError, Formatter, FormatterClass, Options, Registry, RendererKind};
use serde_json::{json, Value};
use unicode_width::UnicodeWidthStr;

pub const TEXT: &str = "text";
pub const CSV: &str = "csv";
pub const PAGES: &str = "pages";

const COLUMN_SEPARATOR: &str = " | ";
const DEFAULT_ROWS_PER_PAGE: u64 = 2;

/// Adds the text, CSV and page formatters to `registry`.
pub fn register(registry: &mut Registry) {
    registry
        .add_formatter(text_formatter())
        .add_formatter(csv_formatter())
        .add_formatter(page_formatter());
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cells(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default()
}

fn column_names(f: &Formatter<'_>) -> folio::Result<Option<Vec<String>>> {
    Ok(f.reader("column_names")?.map(cells))
}

fn show_headers(f: &Formatter<'_>) -> folio::Result<bool> {
    Ok(f.reader("show_table_headers")?.and_then(Value::as_bool) != Some(false))
}

/// Options passed down to nested renders: just the column names.
fn column_options(f: &Formatter<'_>) -> folio::Result<Options> {
    let mut options = Options::new();
    if let Some(names) = f.reader("column_names")? {
        options.set("column_names", names.clone());
    }
    Ok(options)
}

fn group_body(f: &mut Formatter<'_>) -> folio::Result<()> {
    let rows = f.data()["rows"].clone();
    f.render_table(rows, column_options(f)?)?;
    Ok(())
}

fn grouping_body(f: &mut Formatter<'_>) -> folio::Result<()> {
    let options = column_options(f)?;
    f.render_inline_grouping(&options)
}

fn pad_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(padding))
}

fn aligned_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| pad_right(cell, widths.get(i).copied().unwrap_or(0)))
        .collect();
    padded.join(COLUMN_SEPARATOR).trim_end().to_string()
}

fn widths(f: &Formatter<'_>) -> folio::Result<Vec<usize>> {
    Ok(f
        .reader("widths")?
        .and_then(Value::as_array)
        .map(|ws| {
            ws.iter()
                .map(|w| w.as_u64().unwrap_or(0) as usize)
                .collect()
        })
        .unwrap_or_default())
}

/// Column-aligned plain text. Tables are framed by rules unless rendered
/// without layout.
pub fn text_formatter() -> FormatterClass {
    FormatterClass::new("Text")
        .renders([TEXT], RendererKind::ALL)
        .opt_reader(["column_names", "show_table_headers", "widths"])
        .layout(|f, run| {
            let widths = widths(f)?;
            let total: usize = widths.iter().sum();
            let rule =
                "-".repeat(total + COLUMN_SEPARATOR.len() * widths.len().saturating_sub(1));
            if !rule.is_empty() {
                f.output().push_str(&format!("{rule}\n"));
            }
            run(f)?;
            if !rule.is_empty() {
                f.output().push_str(&format!("{rule}\n"));
            }
            Ok(())
        })
        .define("prepare_table", |f| {
            let mut widths: Vec<usize> = column_names(f)?
                .unwrap_or_default()
                .iter()
                .map(|name| name.width())
                .collect();
            for row in f.data().as_array().into_iter().flatten() {
                for (i, cell) in cells(row).iter().enumerate() {
                    if i >= widths.len() {
                        widths.push(0);
                    }
                    widths[i] = widths[i].max(cell.width());
                }
            }
            f.options_mut().set("widths", json!(widths));
            Ok(())
        })
        .build("table_header", |f| {
            let Some(names) = column_names(f)? else {
                return Ok(());
            };
            if !show_headers(f)? {
                return Ok(());
            }
            let widths = widths(f)?;
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            f.output().push_str(&format!("{}\n", aligned_line(&names, &widths)));
            f.output().push_str(&format!("{}\n", rule.join("-+-")));
            Ok(())
        })
        .build("table_body", |f| {
            let overrides = Options::new().with("widths", json!(widths(f)?));
            f.render_data_by_row(&overrides)
        })
        .build("row", |f| {
            let line = aligned_line(&cells(f.data()), &widths(f)?);
            f.output().push_str(&format!("{line}\n"));
            Ok(())
        })
        .build("group_header", |f| {
            let name = cell_text(&f.data()["name"]);
            f.output().push_str(&format!("{name}:\n"));
            Ok(())
        })
        .build("group_body", group_body)
        .build("grouping_body", grouping_body)
}

fn write_record(f: &Formatter<'_>, record: &[String]) -> folio::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(f.output());
    writer
        .write_record(record)
        .map_err(|e| FormatError::stage(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// RFC 4180 style CSV, one record per row.
pub fn csv_formatter() -> FormatterClass {
    FormatterClass::new("Csv")
        .renders([CSV], RendererKind::ALL)
        .opt_reader(["column_names", "show_table_headers"])
        .build("table_header", |f| {
            match column_names(f)? {
                Some(names) if show_headers(f)? => write_record(f, &names),
                _ => Ok(()),
            }
        })
        .build("table_body", |f| f.render_data_by_row(&Options::new()))
        .build("row", |f| write_record(f, &cells(f.data())))
        .build("group_header", |f| {
            write_record(f, &[cell_text(&f.data()["name"])])
        })
        .build("group_body", group_body)
        .build("grouping_body", grouping_body)
}

/// A paginated page stream. Each row is rendered on its own and the
/// captured rows are laid out `rows_per_page` to a page, pages separated by
/// form feeds.
pub fn page_formatter() -> FormatterClass {
    FormatterClass::new("Pages")
        .renders([PAGES], [RendererKind::Row, RendererKind::Table])
        .paginated()
        .save_as_binary_file()
        .opt_reader(["rows_per_page"])
        .define("prepare_table", |f| {
            f.output().push_str("%FOLIO-PAGES 1\n");
            Ok(())
        })
        .build("table_body", |f| {
            let per_page = f
                .reader("rows_per_page")?
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_ROWS_PER_PAGE)
                .max(1) as usize;
            let rows = f.data().as_array().ok_or(FormatError::UnexpectedData {
                expected: "an array of rows",
            })?;

            let mut captured = Vec::with_capacity(rows.len());
            for row in rows {
                captured.push(f.render_row(row.clone(), Options::new())?.bytes());
            }

            let output = f.output();
            for (number, page) in captured.chunks(per_page).enumerate() {
                if number > 0 {
                    output.push_bytes(b"\x0c");
                }
                output.push_str(&format!("page {}\n", number + 1));
                for row in page {
                    output.push_bytes(row);
                }
            }
            Ok(())
        })
        .build("row", |f| {
            let line = cells(f.data()).join("\t");
            f.output().push_str(&format!("{line}\n"));
            Ok(())
        })
        .define("finalize_table", |f| {
            f.output().push_str("%%EOF\n");
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        register(&mut registry);
        registry
    }

    fn fruit() -> Value {
        json!([["apple", 3], ["kiwi", 12]])
    }

    fn columns() -> Options {
        Options::new().with("column_names", json!(["name", "qty"]))
    }

    #[test]
    fn text_table_with_layout() {
        let out = registry()
            .render_to_string("table", TEXT, &fruit(), columns())
            .unwrap();
        assert_eq!(
            out,
            "-----------\n\
             name  | qty\n\
             ------+----\n\
             apple | 3\n\
             kiwi  | 12\n\
             -----------\n"
        );
    }

    #[test]
    fn text_table_without_headers_or_layout() {
        let options = columns()
            .with("show_table_headers", false)
            .with("layout", false);
        let out = registry()
            .render_to_string("table", TEXT, &fruit(), options)
            .unwrap();
        assert_eq!(out, "apple | 3\nkiwi  | 12\n");
    }

    #[test]
    fn text_wide_characters_align() {
        let out = registry()
            .render_to_string(
                "table",
                TEXT,
                &json!([["日本", 1], ["ab", 2]]),
                Options::new().with("layout", false),
            )
            .unwrap();
        assert_eq!(out, "日本 | 1\nab   | 2\n");
    }

    #[test]
    fn text_grouping() {
        let data = json!({
            "east": {"name": "east", "rows": [["apple", 3]]},
            "west": {"name": "west", "rows": [["kiwi", 12]]},
        });
        let out = registry()
            .render_to_string("grouping", TEXT, &data, Options::new())
            .unwrap();
        assert_eq!(out, "east:\napple | 3\n\nwest:\nkiwi | 12\n\n");
    }

    #[test]
    fn csv_table_quotes_fields() {
        let data = json!([["a,b", 1], ["plain", null]]);
        let out = registry()
            .render_to_string("table", CSV, &data, columns())
            .unwrap();
        assert_eq!(out, "name,qty\n\"a,b\",1\nplain,\n");
    }

    #[test]
    fn csv_grouping() {
        let data = json!({
            "east": {"name": "east", "rows": [["apple", 3]]},
        });
        let out = registry()
            .render_to_string("grouping", CSV, &data, columns())
            .unwrap();
        assert_eq!(out, "east\nname,qty\napple,3\n\n");
    }

    #[test]
    fn pages_paginate_captured_rows() {
        let data = json!([["a", 1], ["b", 2], ["c", 3]]);
        let out = registry()
            .render_to_string("table", PAGES, &data, Options::new())
            .unwrap();
        assert_eq!(
            out,
            "%FOLIO-PAGES 1\npage 1\na\t1\nb\t2\n\x0cpage 2\nc\t3\n%%EOF\n"
        );
    }

    #[test]
    fn pages_rows_per_page_option() {
        let data = json!([["a"], ["b"]]);
        let out = registry()
            .render_to_string(
                "table",
                PAGES,
                &data,
                Options::new().with("rows_per_page", 0),
            )
            .unwrap();
        assert_eq!(
            out,
            "%FOLIO-PAGES 1\npage 1\na\n\x0cpage 2\nb\n%%EOF\n"
        );
    }

    #[test]
    fn pages_do_not_render_groupings() {
        let err = registry()
            .render("grouping", PAGES, &json!({}), Options::new())
            .unwrap_err();
        assert!(matches!(err, FormatError::UnknownFormat { .. }));
    }
}
