//! API-module splicing.
//!
//! An API module is shared Python source that consumers import with
//! `from <Name>ApiModule import *`. At unify time the import is replaced by the
//! module's code inside a generated block whose header records the original import,
//! so the splitter can restore it exactly.

use anyhow::Result;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::constants::{API_MODULES_PACK, PACKS_DIR, SCRIPTS_DIR};
use crate::core::ContentError;
use crate::utils::fs::read_text_file_normalized;

static MODULE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from ([\w\d]+ApiModule) import \*(?:  # noqa: E402)?").expect("valid pattern"));

const BLOCK_HEADER: &str = "### GENERATED CODE ###: ";
const BLOCK_FOOTER: &str = "### END GENERATED CODE ###";

/// Names of the API modules `code` imports, sorted and de-duplicated.
#[must_use]
pub fn find_api_module_imports(code: &str) -> Vec<String> {
    MODULE_IMPORT
        .captures_iter(code)
        .map(|caps| caps[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The generated block that replaces `import_line` with `module_code`.
#[must_use]
pub fn generated_block(import_line: &str, module_name: &str, module_code: &str) -> String {
    let body = module_code.strip_suffix('\n').unwrap_or(module_code);
    format!(
        "{BLOCK_HEADER}{import_line}\n\
         # This code was inserted in place of an API module.\n\
         register_module_line('{module_name}', 'start', __line__(), wrapper=-3)\n\
         {body}\n\
         register_module_line('{module_name}', 'end', __line__(), wrapper=1)\n\
         {BLOCK_FOOTER}"
    )
}

/// Replaces every import of `module_name` in `code` with its generated block.
#[must_use]
pub fn splice_api_module(code: &str, module_name: &str, module_code: &str) -> String {
    MODULE_IMPORT
        .replace_all(code, |caps: &Captures<'_>| {
            if &caps[1] == module_name {
                generated_block(&caps[0], module_name, module_code)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Restores the original import line of every generated block, nested blocks included.
#[must_use]
pub fn strip_api_modules(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut copied_to = 0;
    let mut pos = 0;
    let mut depth = 0usize;
    let mut block_start = 0;
    let mut import_line = "";

    loop {
        let next_header = code[pos..].find(BLOCK_HEADER).map(|i| i + pos);
        let next_footer = code[pos..].find(BLOCK_FOOTER).map(|i| i + pos);
        match (next_header, next_footer) {
            (Some(h), f) if f.is_none_or(|f| h < f) => {
                let after = h + BLOCK_HEADER.len();
                let Some(eol) = code[after..].find('\n').map(|i| i + after) else {
                    break;
                };
                if depth == 0 {
                    block_start = h;
                    import_line = &code[after..eol];
                }
                depth += 1;
                pos = eol + 1;
            }
            (_, Some(f)) => {
                let end = f + BLOCK_FOOTER.len();
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        out.push_str(&code[copied_to..block_start]);
                        out.push_str(import_line);
                        copied_to = end;
                    }
                }
                pos = end;
            }
            _ => break,
        }
    }
    out.push_str(&code[copied_to..]);
    out
}

/// The nearest ancestor of `package_dir` that has a `Packs` directory, falling
/// back to the current directory.
#[must_use]
pub fn repo_root_of(package_dir: &Path) -> PathBuf {
    let absolute = std::path::absolute(package_dir).unwrap_or_else(|_| package_dir.to_path_buf());
    absolute
        .ancestors()
        .find(|dir| dir.join(PACKS_DIR).is_dir())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Default directory holding API-module packages: `<repo>/Packs/ApiModules/Scripts`.
#[must_use]
pub fn default_api_modules_dir(package_dir: &Path) -> PathBuf {
    repo_root_of(package_dir).join(PACKS_DIR).join(API_MODULES_PACK).join(SCRIPTS_DIR)
}

/// Splices every imported API module into `code`, recursively.
///
/// Modules already on the splice stack (`stack`) are left as imports to break cycles.
pub fn insert_api_modules(code: &str, modules_dir: &Path, stack: &mut Vec<String>) -> Result<String> {
    let mut spliced = code.to_string();
    for module in find_api_module_imports(code) {
        if stack.contains(&module) {
            tracing::warn!(target: "unify", "Not splicing {module} into itself (import cycle)");
            continue;
        }
        let module_path = modules_dir.join(&module).join(format!("{module}.py"));
        if !module_path.is_file() {
            return Err(ContentError::MissingApiModule {
                module,
                path: module_path.display().to_string(),
            }
            .into());
        }
        tracing::debug!(target: "unify", "Splicing {} from {}", module, module_path.display());
        let module_code = read_text_file_normalized(&module_path)?;

        stack.push(module.clone());
        let module_code = insert_api_modules(&module_code, modules_dir, stack)?;
        stack.pop();

        spliced = splice_api_module(&spliced, &module, &module_code);
    }
    Ok(spliced)
}
