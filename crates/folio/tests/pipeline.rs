//! Integration tests for the render pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use folio::{
    stage, FormatError, FormatterClass, Options, Registry, Renderer, RendererKind, Sink, Template,
};
use serde_json::json;

fn two_stage_registry() -> Registry {
    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("report").stages(["header", "body"]));
    registry.add_formatter(
        FormatterClass::new("Reverser")
            .renders(["text"], ["report"])
            .define("build_header", stage::literal("H\n"))
            .build("body", |f| {
                let reversed: String =
                    f.data().as_str().unwrap_or_default().chars().rev().collect();
                f.output().push_str(&reversed);
                f.output().push_str("\n");
                Ok(())
            }),
    );
    registry
}

#[test]
fn test_two_stage_pipeline_end_to_end() {
    let registry = two_stage_registry();
    let out = registry
        .render_to_string("report", "text", "apple", Options::new())
        .unwrap();
    assert_eq!(out, "H\nelppa\n");
}

#[test]
fn test_render_into_external_sink() {
    let registry = two_stage_registry();
    let sink = Sink::new();
    sink.push_str(">>");

    let returned = registry
        .render("report", "text", "ab", Options::new().with_io(sink.clone()))
        .unwrap();

    assert!(returned.same_as(&sink));
    assert_eq!(sink.to_string_lossy(), ">>H\nba\n");
}

#[test]
fn test_unknown_format_and_renderer() {
    let registry = two_stage_registry();

    let err = registry.render("report", "csv", "x", Options::new()).unwrap_err();
    assert!(matches!(err, FormatError::UnknownFormat { .. }));

    let err = registry.render("invoice", "text", "x", Options::new()).unwrap_err();
    assert!(matches!(err, FormatError::UnknownRenderer(name) if name == "invoice"));
}

#[test]
fn test_undefined_stages_are_skipped() {
    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("report").stages(["header", "body", "footer"]));
    registry.add_formatter(
        FormatterClass::new("BodyOnly")
            .renders(["text"], ["report"])
            .define("build_body", stage::literal("body")),
    );

    let out = registry
        .render_to_string("report", "text", &json!(null), Options::new())
        .unwrap();
    assert_eq!(out, "body");
}

#[test]
fn test_failing_stage_aborts_render() {
    let ran_footer = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran_footer);

    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("report").stages(["body", "footer"]));
    registry.add_formatter(
        FormatterClass::new("Broken")
            .renders(["text"], ["report"])
            .build("body", |_| Err(FormatError::stage("bad row")))
            .build("footer", move |_| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }),
    );

    let err = registry
        .render("report", "text", &json!(null), Options::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "bad row");
    assert!(!ran_footer.load(Ordering::SeqCst));
}

#[test]
fn test_prepare_layout_finalize_order() {
    let mut registry = Registry::new();
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], [RendererKind::Table])
            .define("prepare_table", stage::literal("prepare;"))
            .define("finalize_table", stage::literal("finalize"))
            .layout(|f, run| {
                f.output().push_str("<");
                run(f)?;
                f.output().push_str(">;");
                Ok(())
            })
            .build("table_header", |f| {
                f.output().push_str("head;");
                Ok(())
            })
            .build("table_body", |f| {
                f.output().push_str("body;");
                Ok(())
            })
            .build("table_footer", |f| {
                f.output().push_str("foot;");
                Ok(())
            }),
    );

    let out = registry
        .render_to_string("table", "text", &json!([]), Options::new())
        .unwrap();
    assert_eq!(out, "prepare;<head;body;foot;>;finalize");

    let bare = registry
        .render_to_string("table", "text", &json!([]), Options::new().with("layout", false))
        .unwrap();
    assert_eq!(bare, "prepare;head;body;foot;finalize");
}

#[test]
fn test_nested_render_skips_layout() {
    let mut registry = Registry::new();
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], [RendererKind::Row, RendererKind::Table])
            .layout(|f, run| {
                f.output().push_str("[");
                run(f)?;
                f.output().push_str("]");
                Ok(())
            })
            .build("row", |f| {
                let cell = f.data().to_string();
                f.output().push_str(&cell);
                Ok(())
            })
            .build("table_body", |f| f.render_data_by_row(&Options::new())),
    );

    let out = registry
        .render_to_string("table", "text", &json!([1, 2, 3]), Options::new())
        .unwrap();
    assert_eq!(out, "[123]");
}

#[test]
fn test_required_option_missing() {
    let mut registry = Registry::new();
    registry.define_renderer(
        Renderer::new("invoice")
            .stage("body")
            .required_option("currency"),
    );
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], ["invoice"])
            .build("body", |f| {
                let currency = f.options().get_str("currency").unwrap_or_default().to_string();
                f.output().push_str(&currency);
                Ok(())
            }),
    );

    let err = registry
        .render("invoice", "text", &json!(null), Options::new())
        .unwrap_err();
    assert!(matches!(err, FormatError::MissingOption { name, .. } if name == "currency"));

    let out = registry
        .render_to_string("invoice", "text", &json!(null), Options::new().with("currency", "EUR"))
        .unwrap();
    assert_eq!(out, "EUR");
}

#[test]
fn test_required_option_satisfied_by_customize() {
    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("invoice").required_option("currency"));
    registry.add_formatter(FormatterClass::new("Text").renders(["text"], ["invoice"]));

    let result = registry.render_with("invoice", "text", &json!(null), Options::new(), |f| {
        f.options_mut().set("currency", "USD");
    });
    assert!(result.is_ok());
}

#[test]
fn test_template_supplies_required_option() {
    let mut registry = Registry::new();
    registry.define_renderer(
        Renderer::new("invoice")
            .stage("body")
            .required_option("currency"),
    );
    registry.add_template(Template::new("eu").set("currency", "EUR"));
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], ["invoice"])
            .build("body", |f| {
                let currency = f.options().get_str("currency").unwrap_or_default().to_string();
                f.output().push_str(&currency);
                Ok(())
            }),
    );

    let out = registry
        .render_to_string("invoice", "text", &json!(null), Options::new().with_template("eu"))
        .unwrap();
    assert_eq!(out, "EUR");
}

#[test]
fn test_customize_replaces_data() {
    let registry = two_stage_registry();
    let out = registry
        .render_with("report", "text", "ignored", Options::new(), |f| {
            f.set_data(json!("kiwi"));
        })
        .unwrap();
    assert_eq!(out.to_string_lossy(), "H
iwik
");
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(two_stage_registry());

    let handles: Vec<_> = ["ab", "xyz"]
        .into_iter()
        .map(|word| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .render_to_string("report", "text", word, Options::new())
                    .unwrap()
            })
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, ["H
ba
", "H
zyx
"]);
}

#[test]
fn test_template_presets_fill_unset_options() {
    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("report").stage("body"));
    registry.add_template(Template::new("loud").set("greeting", "HELLO").set("mark", "!"));
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], ["report"])
            .opt_reader(["greeting", "mark"])
            .build("body", |f| {
                let greeting = f.reader("greeting")?.and_then(|v| v.as_str()).unwrap_or("hi");
                let greeting = greeting.to_string();
                let mark = f.reader("mark")?.and_then(|v| v.as_str()).unwrap_or(".");
                let mark = mark.to_string();
                f.output().push_str(&format!("{greeting}{mark}"));
                Ok(())
            }),
    );

    let plain = registry
        .render_to_string("report", "text", &json!(null), Options::new())
        .unwrap();
    assert_eq!(plain, "hi.");

    let templated = registry
        .render_to_string(
            "report",
            "text",
            &json!(null),
            Options::new().with_template("loud").with("mark", "?"),
        )
        .unwrap();
    assert_eq!(templated, "HELLO?");

    let err = registry
        .render("report", "text", &json!(null), Options::new().with_template("quiet"))
        .unwrap_err();
    assert!(matches!(err, FormatError::TemplateNotFound(name) if name == "quiet"));
}

#[test]
fn test_call_named_in_stage() {
    let mut registry = Registry::new();
    registry.add_formatter(
        FormatterClass::new("Markup")
            .renders(["html", "xml"], [RendererKind::Row])
            .build("row", |f| {
                f.output().push_str("<row>");
                f.call_named("html", |f| {
                    f.output().push_str("<br>");
                    Ok(())
                })?;
                f.call_named("xml", |f| {
                    f.output().push_str("<br/>");
                    Ok(())
                })
            }),
    );

    let html = registry
        .render_to_string("row", "html", &json!(null), Options::new())
        .unwrap();
    assert_eq!(html, "<row><br>");

    let xml = registry
        .render_to_string("row", "xml", &json!(null), Options::new())
        .unwrap();
    assert_eq!(xml, "<row><br/>");
}

#[test]
fn test_clear_output_in_stage() {
    let mut registry = Registry::new();
    registry.define_renderer(Renderer::new("report").stages(["draft", "final"]));
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], ["report"])
            .define("build_draft", stage::literal("draft"))
            .build("final", |f| {
                f.clear_output();
                f.output().push_str("final");
                Ok(())
            }),
    );

    let out = registry
        .render_to_string("report", "text", &json!(null), Options::new())
        .unwrap();
    assert_eq!(out, "final");
}

#[test]
fn test_save_output_from_finalize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    let mut registry = Registry::new();
    registry.add_formatter(
        FormatterClass::new("Text")
            .renders(["text"], [RendererKind::Table])
            .define("build_table_body", stage::literal("saved body\n"))
            .define("finalize_table", |f| {
                let target = f.options().get_str("file").unwrap_or("out.txt").to_string();
                f.save_output(target)
            }),
    );

    registry
        .render(
            "table",
            "text",
            &json!([]),
            Options::new().with("file", path.to_string_lossy().to_string()),
        )
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved body\n");
}
