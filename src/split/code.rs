//! Code extraction: undo the unifier's code transforms and prepare a source file.

use crate::unify::api_module::strip_api_modules;
use crate::unify::code::{CodeType, strip_pack_version_lines, strip_section_markers};
use crate::utils::fs::normalize_line_endings;

const PYTHON_MOCK_PROLOGUE: &str = "import demistomock as demisto  # noqa: F401\n";
const PYTHON_COMMON_SERVER_PROLOGUE: &str = "from CommonServerPython import *  # noqa: F401\n";
const POWERSHELL_COMMON_SERVER_PROLOGUE: &str = ". $PSScriptRoot\\CommonServerPowerShell.ps1\n";

/// How extracted code is post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Prepend the mock/CommonServer import lines the unifier strips.
    pub prologue: bool,
    /// Omit the CommonServer line, used when the item *is* a CommonServer library.
    pub is_common_server: bool,
    /// Apply the mechanical formatting pass.
    pub format: bool,
}

/// Restores the package form of inlined code.
#[must_use]
pub fn extract_code(inlined: &str, code_type: CodeType, options: ExtractOptions) -> String {
    let code = strip_api_modules(inlined);
    let code = strip_section_markers(&code);
    let mut code = strip_pack_version_lines(&code);
    if options.format {
        code = format_code(&code);
    }

    let mut out = String::with_capacity(code.len() + 128);
    if options.prologue {
        match code_type {
            CodeType::Python => {
                out.push_str(PYTHON_MOCK_PROLOGUE);
                if !options.is_common_server {
                    out.push_str(PYTHON_COMMON_SERVER_PROLOGUE);
                }
            }
            CodeType::PowerShell if !options.is_common_server => {
                out.push_str(POWERSHELL_COMMON_SERVER_PROLOGUE);
            }
            _ => {}
        }
    }
    out.push_str(&code);
    if !code.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Normalizes line endings, strips trailing whitespace, and ends the text with one newline.
#[must_use]
pub fn format_code(code: &str) -> String {
    let normalized = normalize_line_endings(code);
    let mut lines: Vec<&str> = normalized.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
