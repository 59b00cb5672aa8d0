//! Stage procedure types.
//!
//! A stage is a named unit of output production. Formatter classes store
//! their stages as boxed closures keyed by name instead of generating
//! methods; the renderer looks them up by name when it walks its pipeline.
//!
//! Procedures are `Arc`-shared and `Send + Sync`, so a populated
//! [`Registry`](crate::Registry) can be read from several threads at once.
//! Each render itself runs on one thread.

use std::sync::Arc;

use crate::error::Result;
use crate::formatter::Formatter;

/// Prefix of the procedure name a declared build stage is stored under.
pub const BUILD_PREFIX: &str = "build_";

/// A named procedure run against a formatter instance.
pub type StageFn = Arc<dyn Fn(&mut Formatter<'_>) -> Result<()> + Send + Sync>;

/// Continuation handed to a layout: runs the renderer's stages.
pub type StageRunner<'a> = &'a dyn Fn(&mut Formatter<'_>) -> Result<()>;

/// A layout wraps the execution of all stages of one render.
///
/// The layout decides what to emit before and after calling the runner.
/// Layouts are skipped when the `layout` option is `false`.
pub type LayoutFn =
    Arc<dyn Fn(&mut Formatter<'_>, StageRunner<'_>) -> Result<()> + Send + Sync>;

/// Returns the procedure name under which stage `stage` is stored.
///
/// ```rust
/// assert_eq!(folio::stage::build_name("header"), "build_header");
/// ```
pub fn build_name(stage: &str) -> String {
    format!("{BUILD_PREFIX}{stage}")
}

/// Pins a closure to the procedure signature so it is inferred as generic
/// over the formatter lifetime.
fn procedure<F>(f: F) -> F
where
    F: Fn(&mut Formatter<'_>) -> Result<()> + Send + Sync,
{
    f
}

/// A procedure that writes fixed text to the output.
///
/// ```rust
/// use folio::{stage, FormatterClass};
///
/// let class = FormatterClass::new("Text").define("build_header", stage::literal("H\n"));
/// assert!(class.has_procedure("build_header"));
/// ```
pub fn literal(
    text: impl Into<String>,
) -> impl Fn(&mut Formatter<'_>) -> Result<()> + Send + Sync + 'static {
    let text = text.into();
    procedure(move |f| {
        f.output().push_str(&text);
        Ok(())
    })
}
