//! # folio-demo
//!
//! Renders a JSON report as a table or a grouping, in any format the demo
//! formatters support.
//!
//! The input file holds column names plus either a list of rows or an object
//! of named row groups:
//!
//! ```json
//! { "columns": ["name", "qty"], "rows": [["apple", 3], ["kiwi", 12]] }
//! { "columns": ["name", "qty"], "groups": { "east": [["apple", 3]] } }
//! ```
//!
//! Try:
//!   folio-demo report.json
//!   folio-demo report.json --format csv --output report.csv
//!   folio-demo report.json --format pages --template compact --templates ./templates
//!   RUST_LOG=folio=debug folio-demo grouped.json --renderer grouping

mod formatters;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use folio::{Options, OutputDestination, Registry, RendererKind, Sink, LAYOUT};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

/// Render a JSON report with pluggable formatters
#[derive(Parser, Debug)]
#[command(name = "folio-demo")]
struct Cli {
    /// JSON report to render
    input: PathBuf,

    /// How the report is laid out
    #[arg(short, long, value_enum, default_value_t = ReportKind::Table)]
    renderer: ReportKind,

    /// Output format (text, csv, pages)
    #[arg(short, long, default_value = formatters::TEXT)]
    format: String,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Apply the named option template
    #[arg(short, long)]
    template: Option<String>,

    /// Directory of YAML option templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Render without the formatter's layout
    #[arg(long)]
    no_layout: bool,

    /// List the formats available for the renderer and exit
    #[arg(long)]
    list_formats: bool,

    /// List the loaded option templates and exit
    #[arg(long)]
    list_templates: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    Table,
    Grouping,
}

impl ReportKind {
    fn renderer(self) -> RendererKind {
        match self {
            ReportKind::Table => RendererKind::Table,
            ReportKind::Grouping => RendererKind::Grouping,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn build_registry(cli: &Cli) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    formatters::register(&mut registry);
    if let Some(dir) = &cli.templates {
        let loaded = registry
            .templates_mut()
            .load_dir(dir)
            .with_context(|| format!("loading templates from {}", dir.display()))?;
        tracing::info!(count = loaded, dir = %dir.display(), "loaded templates");
    }
    Ok(registry)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = build_registry(&cli)?;
    let renderer = cli.renderer.renderer();

    if cli.list_formats {
        for format in registry.formats_for(renderer.as_str()) {
            println!("{format}");
        }
        return Ok(());
    }
    if cli.list_templates {
        for name in template_names(&registry) {
            println!("{name}");
        }
        return Ok(());
    }

    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let report: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let (data, mut options) = prepare(report, cli.renderer)?;
    if let Some(template) = &cli.template {
        options = options.with_template(template.as_str());
    }
    if cli.no_layout {
        options.set(LAYOUT, false);
    }

    let sink = registry.render(renderer.as_str(), &cli.format, &data, options)?;
    write(&registry, renderer, &cli, &sink)
}

fn template_names(registry: &Registry) -> Vec<&str> {
    let mut names: Vec<&str> = registry.templates().names().collect();
    names.sort_unstable();
    names
}

/// Splits a report into the data handed to the renderer and its options.
fn prepare(report: Value, kind: ReportKind) -> anyhow::Result<(Value, Options)> {
    let Value::Object(mut report) = report else {
        bail!("report must be a JSON object");
    };

    let mut options = Options::new();
    if let Some(columns) = report.remove("columns") {
        options.set("column_names", columns);
    }

    let data = match kind {
        ReportKind::Table => report
            .remove("rows")
            .context("table reports need a \"rows\" array")?,
        ReportKind::Grouping => {
            let Some(Value::Object(groups)) = report.remove("groups") else {
                bail!("grouping reports need a \"groups\" object");
            };
            let groups: Map<String, Value> = groups
                .into_iter()
                .map(|(name, rows)| {
                    let group = serde_json::json!({ "name": name.clone(), "rows": rows });
                    (name, group)
                })
                .collect();
            Value::Object(groups)
        }
    };
    Ok((data, options))
}

fn write(
    registry: &Registry,
    renderer: RendererKind,
    cli: &Cli,
    sink: &Sink,
) -> anyhow::Result<()> {
    let mode = registry
        .formatter_for(renderer.as_str(), &cli.format)?
        .save_mode();
    let destination = match &cli.output {
        Some(path) => OutputDestination::File(path.clone()),
        None => OutputDestination::Stdout,
    };
    destination
        .write_sink(sink, mode)
        .with_context(|| format!("writing {:?}", destination))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cli(input: PathBuf, output: PathBuf) -> Cli {
        Cli {
            input,
            renderer: ReportKind::Table,
            format: formatters::TEXT.to_string(),
            output: Some(output),
            template: None,
            templates: None,
            no_layout: false,
            list_formats: false,
            list_templates: false,
        }
    }

    #[test]
    fn prepare_table_report() {
        let report = json!({"columns": ["a"], "rows": [[1]]});
        let (data, options) = prepare(report, ReportKind::Table).unwrap();
        assert_eq!(data, json!([[1]]));
        assert_eq!(options.get("column_names"), Some(&json!(["a"])));
    }

    #[test]
    fn prepare_grouping_report_names_groups() {
        let report = json!({"groups": {"west": [[1]], "east": [[2]]}});
        let (data, options) = prepare(report, ReportKind::Grouping).unwrap();
        assert!(options.is_empty());
        let names: Vec<&str> = data
            .as_object()
            .unwrap()
            .values()
            .map(|g| g["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["west", "east"]);
        assert_eq!(data["east"]["rows"], json!([[2]]));
    }

    #[test]
    fn prepare_rejects_missing_sections() {
        assert!(prepare(json!({"columns": []}), ReportKind::Table).is_err());
        assert!(prepare(json!({"rows": []}), ReportKind::Grouping).is_err());
        assert!(prepare(json!([1, 2]), ReportKind::Table).is_err());
    }

    #[test]
    fn run_writes_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.json");
        let output = dir.path().join("report.csv");
        std::fs::write(&input, r#"{"columns": ["n"], "rows": [["x"], ["y"]]}"#).unwrap();

        let mut cli = cli(input, output.clone());
        cli.format = formatters::CSV.to_string();
        run(cli).unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "n\nx\ny\n");
    }

    #[test]
    fn run_applies_template_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir(&templates).unwrap();
        std::fs::write(templates.join("single.yaml"), "rows_per_page: 1\n").unwrap();
        let input = dir.path().join("report.json");
        let output = dir.path().join("report.pages");
        std::fs::write(&input, r#"{"rows": [["a"], ["b"]]}"#).unwrap();

        let mut cli = cli(input, output.clone());
        cli.format = formatters::PAGES.to_string();
        cli.template = Some("single".to_string());
        cli.templates = Some(templates);
        run(cli).unwrap();

        assert_eq!(
            std::fs::read(output).unwrap(),
            b"%FOLIO-PAGES 1\npage 1\na\n\x0cpage 2\nb\n%%EOF\n"
        );
    }

    #[test]
    fn registry_lists_loaded_templates_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wide.yaml"), "widths: [20]\n").unwrap();
        std::fs::write(dir.path().join("compact.yml"), "rows_per_page: 1\n").unwrap();

        let mut cli = cli(dir.path().join("unused.json"), dir.path().join("out"));
        cli.templates = Some(dir.path().to_path_buf());
        let registry = build_registry(&cli).unwrap();

        assert_eq!(template_names(&registry), ["compact", "wide"]);
    }

    #[test]
    fn run_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.json");
        std::fs::write(&input, r#"{"rows": []}"#).unwrap();

        let mut cli = cli(input, dir.path().join("out"));
        cli.format = "xlsx".to_string();
        let err = run(cli).unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }
}
