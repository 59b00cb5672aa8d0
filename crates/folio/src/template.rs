//! Named option presets.
//!
//! A [`Template`] bundles option values under a name so that a whole family
//! of renders can share settings. A render picks a template by setting the
//! `template` option; its presets fill every option the caller left unset.
//!
//! Templates are plain YAML mappings when loaded from text:
//!
//! ```rust
//! use folio::Template;
//!
//! let template = Template::from_yaml("compact", r#"
//! show_title: false
//! width: 60
//! "#).unwrap();
//!
//! assert_eq!(template.get("width"), Some(&serde_json::json!(60)));
//! ```
//!
//! [`TemplateStore::load_dir`] loads every `.yaml`/`.yml` file below a
//! directory, naming each template by its relative path without extension
//! (`reports/compact.yaml` becomes `reports/compact`).

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde_json::Value;

use crate::error::{FormatError, Result};
use crate::options::Options;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".yaml", ".yml"];

/// A named set of option presets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    name: String,
    presets: BTreeMap<String, Value>,
}

impl Template {
    /// Creates an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            presets: BTreeMap::new(),
        }
    }

    /// Sets a preset, returning `self` for chaining.
    pub fn set(mut self, option: impl Into<String>, value: impl Into<Value>) -> Self {
        self.presets.insert(option.into(), value.into());
        self
    }

    /// Parses a template from a YAML mapping.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Serialization`] if the YAML is malformed or is
    /// not a mapping.
    pub fn from_yaml(name: impl Into<String>, yaml: &str) -> Result<Self> {
        let presets: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        Ok(Self {
            name: name.into(),
            presets,
        })
    }

    /// The template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets a preset value.
    pub fn get(&self, option: &str) -> Option<&Value> {
        self.presets.get(option)
    }

    /// All presets, ordered by name.
    pub fn presets(&self) -> &BTreeMap<String, Value> {
        &self.presets
    }

    /// Fills every option in `options` that is not already set.
    pub fn apply_to(&self, options: &mut Options) {
        options.fill_missing(&self.presets);
    }
}

/// Name-indexed collection of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, Template>,
}

impl TemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any template with the same name.
    pub fn add(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Looks up a template by name.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TemplateNotFound`] if no template has this name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| FormatError::TemplateNotFound(name.to_string()))
    }

    /// Returns true if a template with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of templates in the store.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the store holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates over template names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    /// Loads every template file below `root`.
    ///
    /// Returns the number of templates loaded.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable directory or file, or on a file that is
    /// not a YAML mapping.
    pub fn load_dir(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        let mut loaded = Vec::new();
        walk_dir_recursive(root, root, &mut loaded)?;

        let count = loaded.len();
        for template in loaded {
            tracing::debug!(template = template.name(), "loaded template");
            self.add(template);
        }
        Ok(count)
    }
}

fn walk_dir_recursive(current: &Path, root: &Path, out: &mut Vec<Template>) -> Result<()> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();

        if path.is_dir() {
            walk_dir_recursive(&path, root, out)?;
        } else if let Some(name) = template_name(&path, root) {
            let content = std::fs::read_to_string(&path)?;
            out.push(Template::from_yaml(name, &content)?);
        }
    }
    Ok(())
}

/// Resolution name for a template file, or `None` for other files.
fn template_name(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let relative = relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");
    let ext = TEMPLATE_EXTENSIONS
        .iter()
        .find(|ext| relative.ends_with(*ext))?;
    Some(relative[..relative.len() - ext.len()].to_string())
}
