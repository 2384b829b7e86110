//! Packaging: merge a package directory into a single unified yml.
//!
//! A package directory holds a manifest yml whose code field is blank, the code file,
//! and for integrations an image and a description. [`unify`] inlines all of them:
//!
//! 1. locate the manifest and the code file
//! 2. splice imported API modules into Python code ([`api_module`])
//! 3. strip mock imports and wrap Python code in section markers ([`code`])
//! 4. inline the image (base64) and the description, with a documentation link
//! 5. resolve marketplace-dependent `hidden` parameters
//! 6. annotate contributed integrations ([`contributor`])
//! 7. apply the `custom` suffix
//! 8. emit one document, or two when a legacy `dockerimage45` is declared ([`docker45`])
//!
//! Rule packages (modeling and parsing rules) inline their `.xif` rules, schema and
//! samples instead of code.
//!
//! # Examples
//!
//! ```rust,no_run
//! use packsmith_cli::unify::{UnifyOptions, unify};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let outputs = unify(Path::new("Packs/Demo/Integrations/Demo"), &UnifyOptions::default())?;
//! for path in outputs {
//!     println!("{}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api_module;
pub mod code;
pub mod contributor;
pub mod docker45;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::constants::{DOCS_LINK_TEXT, IMAGE_PREFIX, INTEGRATION_DOCS_URL, PARSING_RULES_DIR};
use crate::content::naming::normalize_integration_id;
use crate::content::node::yaml_to_node;
use crate::content::{ContentKind, Marketplace, detect_kind_from};
use crate::core::ContentError;
use crate::utils::fs::{
    ensure_dir, glob_files, read_bytes_file, read_text_file, read_text_file_normalized, read_yaml_file,
    write_yaml_file,
};

use self::code::CodeType;

/// Options for [`unify`].
#[derive(Debug, Clone, Default)]
pub struct UnifyOptions {
    /// Destination file, or a directory to place the default file name in.
    pub output: Option<PathBuf>,
    /// Overwrite existing outputs and already-inlined fields.
    pub force: bool,
    /// Active marketplace, used to resolve `hidden` parameters.
    pub marketplace: Option<Marketplace>,
    /// Suffix appended to `name`, `commonfields.id` and `display`.
    pub custom: Option<String>,
    /// Directory of API-module packages; defaults to `<repo>/Packs/ApiModules/Scripts`.
    pub api_modules_dir: Option<PathBuf>,
}

const UNIFIED_PREFIXES: [&str; 5] = ["integration-", "script-", "playbook-", "modelingrule-", "parsingrule-"];

/// Returns true for yml files that are unify outputs rather than manifests.
fn is_unified_file_name(name: &str) -> bool {
    name.contains("unified") || UNIFIED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Locates the single manifest yml of a package directory.
pub fn find_manifest(package_dir: &Path) -> Result<PathBuf> {
    let all = glob_files(package_dir, "*.yml")?;
    let ambiguous = |reason: String| ContentError::ManifestAmbiguous {
        path: package_dir.display().to_string(),
        reason,
    };
    if all.is_empty() {
        return Err(ambiguous("no yml file found".to_string()).into());
    }

    let manifests: Vec<PathBuf> = all
        .iter()
        .filter(|p| {
            p.file_name().and_then(|n| n.to_str()).is_some_and(|name| !is_unified_file_name(name))
        })
        .cloned()
        .collect();

    match manifests.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(ambiguous("only already-unified yml files found".to_string()).into()),
        many => Err(ambiguous(format!(
            "found {} candidate yml files: {}",
            many.len(),
            many.iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .into()),
    }
}

/// Kind of the package, falling back to rule detection for packages outside a pack.
fn package_kind(manifest: &Path, doc: &Value) -> Result<ContentKind> {
    let kind = match detect_kind_from(manifest, doc) {
        Some(kind) => Some(kind),
        None if doc.get("rules").is_some() => {
            let in_parsing_dir = manifest.components().any(|c| c.as_os_str() == PARSING_RULES_DIR);
            if in_parsing_dir || doc.get("samples").is_some() {
                Some(ContentKind::ParsingRule)
            } else {
                Some(ContentKind::ModelingRule)
            }
        }
        None => None,
    };
    match kind {
        Some(kind) if kind.is_packageable() => Ok(kind),
        other => Err(ContentError::InvalidInput {
            path: manifest.display().to_string(),
            reason: match other {
                Some(kind) => format!("{kind} items cannot be unified"),
                None => "not an integration, script or rule manifest".to_string(),
            },
        }
        .into()),
    }
}

fn dir_name(path: &Path) -> String {
    std::path::absolute(path)
        .ok()
        .as_deref()
        .unwrap_or(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Default destination: `<package_dir>/<prefix>-<package name>.yml`.
fn destination(package_dir: &Path, kind: ContentKind, output: Option<&Path>) -> PathBuf {
    let prefix = kind.unified_prefix().unwrap_or("script");
    let file_name = format!("{prefix}-{}.yml", dir_name(package_dir));
    match output {
        Some(out) if out.is_dir() => out.join(file_name),
        Some(out) => out.to_path_buf(),
        None => package_dir.join(file_name),
    }
}

/// Merges the package at `package_dir` into unified yml document(s).
///
/// Returns the written paths: one, or two when a legacy `dockerimage45` is present.
pub fn unify(package_dir: &Path, options: &UnifyOptions) -> Result<Vec<PathBuf>> {
    if !package_dir.is_dir() {
        return Err(ContentError::InvalidInput {
            path: package_dir.display().to_string(),
            reason: "expected a package directory".to_string(),
        }
        .into());
    }

    let manifest = find_manifest(package_dir)?;
    tracing::debug!(target: "unify", "Unifying manifest {}", manifest.display());
    let yaml: serde_yaml::Value = read_yaml_file(&manifest)?;
    let node = yaml_to_node(&yaml)?;
    let kind = package_kind(&manifest, &node)?;
    let Value::Object(mut doc) = node else {
        return Err(ContentError::InvalidInput {
            path: manifest.display().to_string(),
            reason: "manifest is not a mapping".to_string(),
        }
        .into());
    };

    let is_integration = kind == ContentKind::Integration;
    let code_section = has_script_section(&doc);
    if kind.is_rule() {
        inline_rules(&mut doc, package_dir, &manifest)?;
    } else {
        inline_code(&mut doc, package_dir, &manifest, kind, options)?;
    }

    if is_integration {
        inline_image(&mut doc, package_dir, &manifest, options.force)?;
        inline_description(&mut doc, package_dir, &manifest, options.force)?;
        if let Some(mp) = options.marketplace {
            resolve_hidden_params(&mut doc, mp);
        }
        if let Some(contributor) = contributor::find_contributor(package_dir) {
            tracing::debug!(target: "unify", "Adding {} contributor details", contributor.support);
            contributor.annotate(&mut doc);
        }
    }

    if let Some(custom) = options.custom.as_deref().filter(|c| !c.is_empty()) {
        apply_custom_suffix(&mut doc, custom, is_integration);
    }

    let dest = destination(package_dir, kind, options.output.as_deref());
    let outputs = docker45::emit_with_docker45(doc, &dest, code_section)?;

    if !options.force
        && let Some((existing, _)) = outputs.iter().find(|(path, _)| path.exists())
    {
        return Err(ContentError::OutputExists {
            path: existing.display().to_string(),
        }
        .into());
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (path, doc) in outputs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        write_yaml_file(&path, &Value::Object(doc))?;
        tracing::info!(target: "unify", "Created unified yml: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn inline_code(
    doc: &mut Map<String, Value>,
    package_dir: &Path,
    manifest: &Path,
    kind: ContentKind,
    options: &UnifyOptions,
) -> Result<()> {
    let code_section = has_script_section(doc);
    if kind == ContentKind::Integration && !code_section {
        return Err(ContentError::InvalidInput {
            path: manifest.display().to_string(),
            reason: "integration has no 'script' section".to_string(),
        }
        .into());
    }
    let holder = match doc.get("script") {
        Some(Value::Object(section)) => section,
        _ => &*doc,
    };

    if let Some(existing) = holder.get("script").and_then(Value::as_str)
        && code::is_inlined_code(existing)
    {
        tracing::warn!(
            target: "unify",
            "{} already holds inlined code; it will be replaced by the package code file",
            manifest.display()
        );
    }

    let type_name = holder.get("type").and_then(Value::as_str).unwrap_or_default();
    let code_type = CodeType::from_yml(type_name).ok_or_else(|| ContentError::CodeFileAmbiguous {
        path: package_dir.display().to_string(),
        reason: format!("unsupported script type '{type_name}'"),
    })?;

    let code_path = code::find_code_file(package_dir, code_type)?;
    tracing::debug!(target: "unify", "Inlining code from {}", code_path.display());
    let mut source = read_text_file_normalized(&code_path)?;

    let name = doc.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
    match code_type {
        CodeType::Python => {
            let modules_dir = options
                .api_modules_dir
                .clone()
                .unwrap_or_else(|| api_module::default_api_modules_dir(package_dir));
            let mut stack = Vec::new();
            let package_name = dir_name(package_dir);
            if package_name.ends_with("ApiModule") {
                stack.push(package_name);
            }
            source = api_module::insert_api_modules(&source, &modules_dir, &mut stack)?;
            source = code::clean_python_code(&source, true);
            if !name.contains("CommonServer") {
                source = code::inject_section_markers(&source, &name);
            }
        }
        CodeType::PowerShell => source = code::clean_powershell_code(&source),
        CodeType::JavaScript => {}
    }

    let target = if code_section {
        doc.get_mut("script").and_then(Value::as_object_mut)
    } else {
        Some(doc)
    };
    if let Some(target) = target {
        target.insert("script".to_string(), Value::String(source));
    }
    Ok(())
}

/// True when the code lives in a nested `script` mapping (integration-shaped yml).
fn has_script_section(doc: &Map<String, Value>) -> bool {
    matches!(doc.get("script"), Some(Value::Object(_)))
}

/// Reads a sibling file matching `pattern`, preferring the first sorted match.
fn first_match(package_dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    Ok(glob_files(package_dir, pattern)?.into_iter().next())
}

fn is_populated(doc: &Map<String, Value>, key: &str) -> bool {
    doc.get(key).is_some_and(|v| v.as_str().map_or(!v.is_null(), |s| !s.is_empty()))
}

fn inline_image(doc: &mut Map<String, Value>, package_dir: &Path, manifest: &Path, force: bool) -> Result<()> {
    let image = match first_match(package_dir, "*_image.png")? {
        Some(path) => Some(path),
        None => first_match(package_dir, "*.png")?,
    };
    let Some(image) = image else {
        tracing::debug!(target: "unify", "No image found in {}", package_dir.display());
        return Ok(());
    };

    if is_populated(doc, "image") && !force {
        return Err(ContentError::DuplicateInlineField {
            field: "image".to_string(),
            path: manifest.display().to_string(),
        }
        .into());
    }
    let bytes = read_bytes_file(&image)?;
    doc.insert("image".to_string(), Value::String(format!("{IMAGE_PREFIX}{}", BASE64.encode(bytes))));
    Ok(())
}

/// `[View Integration Documentation](<docs url><slug>)` when the package has a non-empty README.
fn integration_doc_link(doc: &Map<String, Value>, package_dir: &Path) -> Option<String> {
    let readme = package_dir.join("README.md");
    let non_empty = std::fs::metadata(&readme).is_ok_and(|m| m.is_file() && m.len() > 0);
    if !non_empty {
        return None;
    }
    let id = doc
        .get("commonfields")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_str)
        .or_else(|| doc.get("name").and_then(Value::as_str))?;
    Some(format!("{DOCS_LINK_TEXT}({INTEGRATION_DOCS_URL}{})", normalize_integration_id(id)))
}

fn inline_description(
    doc: &mut Map<String, Value>,
    package_dir: &Path,
    manifest: &Path,
    force: bool,
) -> Result<()> {
    if is_populated(doc, "detaileddescription") && !force {
        return Err(ContentError::DuplicateInlineField {
            field: "detaileddescription".to_string(),
            path: manifest.display().to_string(),
        }
        .into());
    }

    let mut description = match first_match(package_dir, "*_description.md")? {
        Some(path) => read_text_file(&path)?,
        None => String::new(),
    };

    if !description.contains(DOCS_LINK_TEXT)
        && let Some(link) = integration_doc_link(doc, package_dir)
    {
        if description.is_empty() {
            description = link;
        } else {
            description.push_str("\n\n---\n");
            description.push_str(&link);
        }
    }

    if !description.is_empty() {
        doc.insert("detaileddescription".to_string(), Value::String(description));
    }
    Ok(())
}

/// Replaces list-valued `hidden` parameters with a boolean for `marketplace`.
pub fn resolve_hidden_params(doc: &mut Map<String, Value>, marketplace: Marketplace) {
    let Some(Value::Array(params)) = doc.get_mut("configuration") else {
        return;
    };
    for param in params.iter_mut().filter_map(Value::as_object_mut) {
        let Some(Value::Array(tags)) = param.get("hidden") else {
            continue;
        };
        let mut hidden_in: Vec<Marketplace> = tags.iter().filter_map(|t| t.as_str()?.parse().ok()).collect();
        if hidden_in.contains(&Marketplace::Xsoar) {
            hidden_in.extend([Marketplace::XsoarSaas, Marketplace::XsoarOnPrem]);
        }
        if hidden_in.contains(&Marketplace::XsoarOnPrem) {
            hidden_in.push(Marketplace::Xsoar);
        }
        let hidden = hidden_in.contains(&marketplace);

        let is_credentials = param.get("name").and_then(Value::as_str) == Some("credentials")
            && param.get("type").and_then(Value::as_i64) == Some(9);
        if is_credentials {
            param.shift_remove("hidden");
            param.insert("hiddenusername".to_string(), Value::Bool(hidden));
            param.insert("hiddenpassword".to_string(), Value::Bool(hidden));
        } else {
            param.insert("hidden".to_string(), Value::Bool(hidden));
        }
    }
}

/// Appends ` - <custom>` to `name`, `commonfields.id` and (integrations only) `display`.
pub fn apply_custom_suffix(doc: &mut Map<String, Value>, custom: &str, is_integration: bool) {
    let suffix = format!(" - {custom}");
    if let Some(Value::String(name)) = doc.get_mut("name") {
        name.push_str(&suffix);
    }
    if let Some(Value::String(id)) = doc.get_mut("commonfields").and_then(|c| c.get_mut("id")) {
        id.push_str(&suffix);
    }
    if is_integration && let Some(Value::String(display)) = doc.get_mut("display") {
        display.push_str(&suffix);
    }
}

/// Inlines `.xif` rules, the schema, and samples of a rule package.
fn inline_rules(doc: &mut Map<String, Value>, package_dir: &Path, manifest: &Path) -> Result<()> {
    let stem = manifest.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    let rules = match first_match(package_dir, "*.xif")? {
        Some(path) => read_text_file_normalized(&path)?,
        None => {
            return Err(ContentError::CodeFileAmbiguous {
                path: package_dir.display().to_string(),
                reason: "no .xif rules file found".to_string(),
            }
            .into());
        }
    };
    doc.insert("rules".to_string(), Value::String(rules));

    if let Some(schema) = first_match(package_dir, "*_schema.json")? {
        let text = read_text_file_normalized(&schema)
            .with_context(|| format!("Failed to read rule schema {}", schema.display()))?;
        doc.insert("schema".to_string(), Value::String(text));
    }

    let samples = package_dir.join(format!("{stem}.json"));
    if samples.is_file() {
        doc.insert("samples".to_string(), Value::String(read_text_file_normalized(&samples)?));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn read_doc(path: &Path) -> Value {
        let yaml: serde_yaml::Value = read_yaml_file(path).unwrap();
        yaml_to_node(&yaml).unwrap()
    }

    #[test]
    fn test_unify_script_inlines_code_with_markers() {
        init_test_logging(None);
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(&pkg.join("Demo.yml"), "name: Demo\nscript: '-'\ntype: python\n");
        write(&pkg.join("Demo.py"), "import demistomock as demisto  # noqa: F401\nprint(\"hi\")\n");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        assert_eq!(outputs, vec![pkg.join("script-Demo.yml")]);

        let doc = read_doc(&outputs[0]);
        assert_eq!(
            doc["script"],
            "register_module_line('Demo', 'start', __line__())\nprint(\"hi\")\nregister_module_line('Demo', 'end', __line__())\n"
        );
    }

    #[test]
    fn test_unify_integration_nested_script() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(
            &pkg.join("Demo.yml"),
            "commonfields:\n  id: Demo\nname: Demo\ndisplay: Demo\ncategory: Utilities\nscript:\n  type: python\n  script: '-'\n",
        );
        write(&pkg.join("Demo.py"), "print(\"hi\")\n");
        write(&pkg.join("Demo_image.png"), "PNG");
        write(&pkg.join("Demo_description.md"), "Describe me.");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        assert_eq!(outputs, vec![pkg.join("integration-Demo.yml")]);
        let doc = read_doc(&outputs[0]);
        assert_eq!(
            doc["script"]["script"],
            "register_module_line('Demo', 'start', __line__())\nprint(\"hi\")\nregister_module_line('Demo', 'end', __line__())\n"
        );
        assert_eq!(doc["image"], "data:image/png;base64,UE5H");
        assert_eq!(doc["detaileddescription"], "Describe me.");
    }

    #[test]
    fn test_unify_script_with_nested_script_section() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(&pkg.join("Demo.yml"), "name: Demo\nscript:\n  type: python\n  script: '-'\n");
        write(&pkg.join("Demo.py"), "print(\"hi\")\n");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        let doc = read_doc(&outputs[0]);
        assert_eq!(
            doc["script"]["script"],
            "register_module_line('Demo', 'start', __line__())\nprint(\"hi\")\nregister_module_line('Demo', 'end', __line__())\n"
        );
        assert_eq!(doc["script"]["type"], "python");
    }

    #[test]
    fn test_unify_adds_documentation_link_only_with_readme() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("SomeIntegration");
        write(
            &pkg.join("SomeIntegration.yml"),
            "commonfields:\n  id: SomeIntegration\nname: SomeIntegration\ndisplay: Some\ncategory: Utilities\nscript:\n  type: javascript\n  script: ''\n",
        );
        write(&pkg.join("SomeIntegration.js"), "log(1);\n");
        write(&pkg.join("SomeIntegration_description.md"), "Text");
        write(&pkg.join("README.md"), "");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        assert_eq!(read_doc(&outputs[0])["detaileddescription"], "Text");

        write(&pkg.join("README.md"), "# Docs\n");
        let outputs = unify(
            &pkg,
            &UnifyOptions {
                force: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            read_doc(&outputs[0])["detaileddescription"],
            "Text\n\n---\n[View Integration Documentation](https://xsoar.pan.dev/docs/reference/integrations/some-integration)"
        );
    }

    #[test]
    fn test_unify_splices_api_module() {
        let temp = tempdir().unwrap();
        let repo = temp.path();
        write(&repo.join("Packs/ApiModules/Scripts/MicrosoftApiModule/MicrosoftApiModule.py"), "def foo(): return 1\n");
        let pkg = repo.join("Packs/Ms/Scripts/MsScript");
        write(&pkg.join("MsScript.yml"), "name: MsScript\nscript: ''\ntype: python\n");
        write(&pkg.join("MsScript.py"), "from MicrosoftApiModule import *  # noqa: E402\n");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        let script = read_doc(&outputs[0])["script"].as_str().unwrap().to_string();
        assert!(script.contains(
            "### GENERATED CODE ###: from MicrosoftApiModule import *  # noqa: E402\n# This code was inserted in place of an API module.\nregister_module_line('MicrosoftApiModule', 'start', __line__(), wrapper=-3)\ndef foo(): return 1\nregister_module_line('MicrosoftApiModule', 'end', __line__(), wrapper=1)\n### END GENERATED CODE ###"
        ));
    }

    #[test]
    fn test_unify_missing_api_module() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("S");
        write(&pkg.join("S.yml"), "name: S\nscript: ''\ntype: python\n");
        write(&pkg.join("S.py"), "from GoneApiModule import *\n");
        let err = unify(
            &pkg,
            &UnifyOptions {
                api_modules_dir: Some(temp.path().join("modules")),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::MissingApiModule { .. })));
    }

    #[test]
    fn test_unify_error_kinds() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file.yml");
        write(&file, "name: x\n");
        let err = unify(&file, &UnifyOptions::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::InvalidInput { .. })));

        let empty = temp.path().join("Empty");
        std::fs::create_dir_all(&empty).unwrap();
        let err = unify(&empty, &UnifyOptions::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::ManifestAmbiguous { .. })));

        let only_unified = temp.path().join("Only");
        write(&only_unified.join("script-Only.yml"), "name: Only\n");
        let err = unify(&only_unified, &UnifyOptions::default()).unwrap_err();
        assert!(err.to_string().contains("only already-unified"));

        let no_code = temp.path().join("NoCode");
        write(&no_code.join("NoCode.yml"), "name: NoCode\nscript: ''\ntype: python\n");
        let err = unify(&no_code, &UnifyOptions::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::CodeFileAmbiguous { .. })));
    }

    #[test]
    fn test_unify_refuses_overwrite_without_force() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(&pkg.join("Demo.yml"), "name: Demo\nscript: ''\ntype: python\n");
        write(&pkg.join("Demo.py"), "x = 1\n");

        unify(&pkg, &UnifyOptions::default()).unwrap();
        let err = unify(&pkg, &UnifyOptions::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::OutputExists { .. })));
        unify(
            &pkg,
            &UnifyOptions {
                force: true,
                ..Default::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_unify_duplicate_inline_image() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(
            &pkg.join("Demo.yml"),
            "name: Demo\ndisplay: Demo\ncategory: c\nimage: data:image/png;base64,AAA\nscript:\n  type: python\n  script: ''\n",
        );
        write(&pkg.join("Demo.py"), "x = 1\n");
        write(&pkg.join("Demo_image.png"), "PNG");
        let err = unify(&pkg, &UnifyOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContentError>(),
            Some(ContentError::DuplicateInlineField { field, .. }) if field == "image"
        ));
    }

    #[test]
    fn test_unify_docker45_writes_two_documents() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Demo");
        write(
            &pkg.join("Demo.yml"),
            "name: Demo\ndisplay: Demo\ncategory: c\nfromversion: 4.1.0\ntoversion: 5.5.0\nscript:\n  type: python\n  script: ''\n  dockerimage: Y\n  dockerimage45: X\n",
        );
        write(&pkg.join("Demo.py"), "x = 1\n");
        let out = temp.path().join("out/integration-Demo.yml");

        let outputs = unify(
            &pkg,
            &UnifyOptions {
                output: Some(out.clone()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(outputs, vec![out.clone(), temp.path().join("out/integration-Demo_45.yml")]);

        let current = read_doc(&outputs[0]);
        assert_eq!(current["fromversion"], "5.0.0");
        assert_eq!(current["script"]["dockerimage"], "Y");
        assert!(current["script"].get("dockerimage45").is_none());
        let legacy = read_doc(&outputs[1]);
        assert_eq!(legacy["toversion"], "4.5.9");
        assert_eq!(legacy["script"]["dockerimage"], "X");
    }

    #[test]
    fn test_resolve_hidden_params() {
        let mut doc = json!({"configuration": [
            {"name": "a", "hidden": ["marketplacev2"]},
            {"name": "b", "hidden": ["xsoar"]},
            {"name": "c", "hidden": true},
            {"name": "credentials", "type": 9, "hidden": ["xsoar_on_prem"]},
        ]});
        resolve_hidden_params(doc.as_object_mut().unwrap(), Marketplace::Xsoar);
        assert_eq!(doc["configuration"][0]["hidden"], false);
        assert_eq!(doc["configuration"][1]["hidden"], true);
        assert_eq!(doc["configuration"][2]["hidden"], true);
        assert!(doc["configuration"][3].get("hidden").is_none());
        assert_eq!(doc["configuration"][3]["hiddenusername"], true);
        assert_eq!(doc["configuration"][3]["hiddenpassword"], true);
    }

    #[test]
    fn test_custom_suffix() {
        let mut doc = json!({"name": "N", "display": "D", "commonfields": {"id": "I"}});
        apply_custom_suffix(doc.as_object_mut().unwrap(), "dev", true);
        assert_eq!(doc, json!({"name": "N - dev", "display": "D - dev", "commonfields": {"id": "I - dev"}}));

        let mut script = json!({"name": "S", "display": "D"});
        apply_custom_suffix(script.as_object_mut().unwrap(), "dev", false);
        assert_eq!(script["display"], "D");
    }

    #[test]
    fn test_unify_modeling_rule() {
        let temp = tempdir().unwrap();
        let pkg = temp.path().join("Packs/P/ModelingRules/Rule");
        write(&pkg.join("Rule.yml"), "id: rule\nname: Rule\nrules: ''\nschema: ''\n");
        write(&pkg.join("Rule.xif"), "[MODEL: dataset=x]\nfilter true;\n");
        write(&pkg.join("Rule_schema.json"), "{\"x\": {}}\n");

        let outputs = unify(&pkg, &UnifyOptions::default()).unwrap();
        assert_eq!(outputs, vec![pkg.join("modelingrule-Rule.yml")]);
        let doc = read_doc(&outputs[0]);
        assert_eq!(doc["rules"], "[MODEL: dataset=x]\nfilter true;\n");
        assert_eq!(doc["schema"], "{\"x\": {}}\n");
        assert!(doc.get("samples").is_none());
    }
}
