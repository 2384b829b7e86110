//! Splitting: decompose a unified yml back into a package directory.
//!
//! [`split`] is the inverse of [`crate::unify::unify`]. It writes the code file (with
//! generated API-module blocks and section markers removed), the image and
//! description of integrations, and the rules, schema and samples of rule items,
//! then writes the manifest with the inlined fields blanked.
//!
//! # Examples
//!
//! ```rust,no_run
//! use packsmith_cli::split::{SplitOptions, split};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let dir = split(Path::new("integration-Demo.yml"), &SplitOptions::default())?;
//! println!("Package written to {}", dir.display());
//! # Ok(())
//! # }
//! ```

pub mod code;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::constants::{
    DOCS_LINK_TEXT, INTEGRATION_DOCS_URL, INTEGRATIONS_DIR, MODELING_RULES_DIR, PARSING_RULES_DIR,
    POWERSHELL_FROM_VERSION, SCRIPTS_DIR,
};
use crate::content::naming::{normalize_integration_id, pascal_case};
use crate::content::node::{scalar_to_string, yaml_to_node};
use crate::core::ContentError;
use crate::unify::code::CodeType;
use crate::utils::fs::{atomic_write, ensure_dir, is_dir_empty, read_yaml_file, write_text_file, write_yaml_file};

use self::code::{ExtractOptions, extract_code};

/// Options for [`split`].
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Target directory; defaults to a sibling directory named after the item.
    pub output: Option<PathBuf>,
    /// When `output` is a kind directory (`Integrations`, `Scripts`, …), create the
    /// package directory inside it.
    pub auto_create_dir: bool,
    /// Do not copy or create a `README.md`.
    pub no_readme: bool,
    /// Skip the mechanical code formatting pass.
    pub no_code_format: bool,
    /// Do not prepend the mock/CommonServer import lines.
    pub no_prologue: bool,
    /// Write into a non-empty output directory.
    pub force: bool,
}

const KIND_DIRS: [&str; 4] = [INTEGRATIONS_DIR, SCRIPTS_DIR, MODELING_RULES_DIR, PARSING_RULES_DIR];

/// The shape of a unified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnifiedShape {
    Integration(CodeType),
    Script(CodeType),
    Rule,
}

fn invalid(path: &Path, reason: impl Into<String>) -> anyhow::Error {
    ContentError::InvalidInput {
        path: path.display().to_string(),
        reason: reason.into(),
    }
    .into()
}

fn classify(doc: &Map<String, Value>, path: &Path) -> Result<UnifiedShape> {
    match doc.get("script") {
        Some(Value::Object(script)) => {
            let type_name = script.get("type").and_then(Value::as_str).unwrap_or_default();
            CodeType::from_yml(type_name)
                .map(UnifiedShape::Integration)
                .ok_or_else(|| invalid(path, format!("unsupported or missing script type '{type_name}'")))
        }
        Some(Value::String(_)) => {
            let type_name = doc.get("type").and_then(Value::as_str).unwrap_or_default();
            CodeType::from_yml(type_name)
                .map(UnifiedShape::Script)
                .ok_or_else(|| invalid(path, format!("unsupported or missing script type '{type_name}'")))
        }
        None if doc.contains_key("rules") => Ok(UnifiedShape::Rule),
        _ => Err(invalid(path, "not a unified yml: no 'script' or 'type'")),
    }
}

/// Rejects `fromversion` values that are not dotted numeric versions.
fn validate_fromversion(doc: &Map<String, Value>) -> Result<()> {
    let Some(raw) = doc.get("fromversion").and_then(scalar_to_string) else {
        return Ok(());
    };
    let padded = match raw.split('.').count() {
        1 => format!("{raw}.0.0"),
        2 => format!("{raw}.0"),
        _ => raw.clone(),
    };
    semver::Version::parse(&padded).map_err(|_| ContentError::InvalidVersion {
        field: "fromversion".to_string(),
        version: raw.clone(),
    })?;
    Ok(())
}

fn output_dir(doc: &Map<String, Value>, input: &Path, options: &SplitOptions) -> Result<PathBuf> {
    let name = doc.get("name").and_then(Value::as_str).filter(|n| !n.is_empty());
    match &options.output {
        Some(out) => {
            let is_kind_dir = out.file_name().and_then(|n| n.to_str()).is_some_and(|n| KIND_DIRS.contains(&n));
            if options.auto_create_dir && is_kind_dir {
                let name = name.ok_or_else(|| {
                    invalid(input, "cannot derive the package directory: the yml has no 'name'")
                })?;
                Ok(out.join(pascal_case(name)))
            } else {
                Ok(out.clone())
            }
        }
        None => {
            let name = name
                .ok_or_else(|| invalid(input, "cannot derive the package directory: the yml has no 'name'"))?;
            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            Ok(parent.join(pascal_case(name)))
        }
    }
}

/// Splits the unified yml at `input` into a package directory and returns that directory.
pub fn split(input: &Path, options: &SplitOptions) -> Result<PathBuf> {
    let yaml: serde_yaml::Value = read_yaml_file(input)?;
    let Value::Object(mut doc) = yaml_to_node(&yaml)? else {
        return Err(invalid(input, "document is not a mapping"));
    };
    let shape = classify(&doc, input)?;
    validate_fromversion(&doc)?;

    let dir = output_dir(&doc, input, options)?;
    if dir.exists() && !options.force && !is_dir_empty(&dir)? {
        return Err(ContentError::OutputExists {
            path: dir.display().to_string(),
        }
        .into());
    }
    ensure_dir(&dir)?;
    let base = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| invalid(&dir, "output directory has no name"))?;
    tracing::debug!(target: "split", "Splitting {} into {}", input.display(), dir.display());

    match shape {
        UnifiedShape::Rule => split_rules(&mut doc, &dir, &base)?,
        UnifiedShape::Integration(code_type) | UnifiedShape::Script(code_type) => {
            let is_integration = matches!(shape, UnifiedShape::Integration(_));
            write_code(&mut doc, input, &dir, &base, code_type, is_integration, options)?;
            if is_integration {
                extract_image(&mut doc, &dir, &base)?;
                extract_description(&mut doc, &dir, &base)?;
            }
            if code_type == CodeType::PowerShell && !doc.contains_key("fromversion") {
                tracing::debug!(target: "split", "Setting fromversion for PowerShell to {POWERSHELL_FROM_VERSION}");
                doc.insert("fromversion".to_string(), Value::String(POWERSHELL_FROM_VERSION.to_string()));
            }
        }
    }

    write_yaml_file(&dir.join(format!("{base}.yml")), &Value::Object(doc))?;

    if !options.no_readme && shape != UnifiedShape::Rule {
        copy_readme(input, &dir)?;
    }
    tracing::info!(target: "split", "Split {} into {}", input.display(), dir.display());
    Ok(dir)
}

fn write_code(
    doc: &mut Map<String, Value>,
    input: &Path,
    dir: &Path,
    base: &str,
    code_type: CodeType,
    is_integration: bool,
    options: &SplitOptions,
) -> Result<()> {
    let holder = if is_integration {
        doc.get_mut("script").and_then(Value::as_object_mut)
    } else {
        Some(doc)
    };
    let Some(holder) = holder else {
        return Err(invalid(input, "integration has no 'script' section"));
    };

    let inlined = holder.get("script").and_then(Value::as_str).unwrap_or_default().to_string();
    let input_text = input.to_string_lossy();
    let extract = ExtractOptions {
        prologue: !options.no_prologue,
        is_common_server: input_text.contains("CommonServerPython") || input_text.contains("CommonServerPowerShell"),
        format: !options.no_code_format,
    };
    let code = extract_code(&inlined, code_type, extract);
    let code_path = dir.join(format!("{base}{}", code_type.extension()));
    write_text_file(&code_path, &code)?;
    tracing::debug!(target: "split", "Wrote code to {}", code_path.display());

    holder.insert("script".to_string(), Value::String(String::new()));
    Ok(())
}

fn extract_image(doc: &mut Map<String, Value>, dir: &Path, base: &str) -> Result<()> {
    let Some(image) = doc.shift_remove("image") else {
        return Ok(());
    };
    let Some(encoded) = image.as_str().and_then(|s| s.split(',').nth(1)) else {
        return Ok(());
    };
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64.decode(cleaned.as_bytes()).map_err(|e| ContentError::MalformedDocument {
        path: dir.display().to_string(),
        reason: format!("image is not valid base64: {e}"),
    })?;
    let path = dir.join(format!("{base}_image.png"));
    atomic_write(&path, &bytes).with_context(|| format!("Failed to write image {}", path.display()))?;
    Ok(())
}

/// Removes the `[View Integration Documentation]` link the unifier appends.
#[must_use]
pub fn remove_integration_documentation(description: &str, integration_id: &str) -> String {
    if !description.contains(DOCS_LINK_TEXT) {
        return description.to_string();
    }
    let link = format!("{DOCS_LINK_TEXT}({INTEGRATION_DOCS_URL}{})", normalize_integration_id(integration_id));
    let separated = format!("\n\n---\n{link}");
    if description.contains(&separated) {
        description.replace(&separated, "")
    } else {
        description.replace(&link, "")
    }
}

fn extract_description(doc: &mut Map<String, Value>, dir: &Path, base: &str) -> Result<()> {
    let id = doc
        .get("commonfields")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_str)
        .or_else(|| doc.get("name").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();
    let Some(description) = doc.shift_remove("detaileddescription") else {
        return Ok(());
    };
    let description = remove_integration_documentation(description.as_str().unwrap_or_default(), &id);
    if !description.is_empty() {
        write_text_file(&dir.join(format!("{base}_description.md")), &description)?;
    }
    Ok(())
}

fn split_rules(doc: &mut Map<String, Value>, dir: &Path, base: &str) -> Result<()> {
    if let Some(rules) = doc.get("rules").and_then(Value::as_str).filter(|r| !r.is_empty()) {
        write_text_file(&dir.join(format!("{base}.xif")), rules)?;
    }
    if doc.contains_key("rules") {
        doc.insert("rules".to_string(), Value::String(String::new()));
    }
    if doc.contains_key("schema") {
        if let Some(schema) = doc.get("schema").and_then(Value::as_str).filter(|s| !s.is_empty()) {
            write_text_file(&dir.join(format!("{base}_schema.json")), schema)?;
        }
        doc.insert("schema".to_string(), Value::String(String::new()));
    }
    if let Some(samples) = doc.shift_remove("samples")
        && let Some(text) = samples.as_str().filter(|s| !s.is_empty())
    {
        write_text_file(&dir.join(format!("{base}.json")), text)?;
    }
    Ok(())
}

/// Copies `<stem>_README.md` next to the input, or creates an empty `README.md`.
fn copy_readme(input: &Path, dir: &Path) -> Result<()> {
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let neighbour = input.with_file_name(format!("{stem}_README.md"));
    let readme = dir.join("README.md");
    if neighbour.is_file() {
        std::fs::copy(&neighbour, &readme)
            .with_context(|| format!("Failed to copy {} to {}", neighbour.display(), readme.display()))?;
    } else if !readme.exists() {
        write_text_file(&readme, "")?;
    }
    Ok(())
}
