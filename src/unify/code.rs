//! Code-file discovery and the mechanical code transforms applied around inlining.
//!
//! Each transform here has an inverse used by the splitter: mock stripping reverses
//! the split prologue, and section-marker stripping reverses marker injection.

use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::core::ContentError;
use crate::utils::fs::glob_files;

static IGNORED_CODE_FILES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)CommonServerPython\.py|CommonServerUserPython\.py|demistomock\.py|_test\.py|conftest\.py|__init__\.py|ApiModule\.py|vulture_whitelist\.py|CommonServerPowerShell\.ps1|CommonServerUserPowerShell\.ps1|demistomock\.ps1|\.Tests\.ps1",
    )
    .expect("valid pattern")
});

static PYTHON_MOCK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:import demistomock as demisto|from CommonServerPython import \*|from CommonServerUserPython import \*)[ \t]*(?:#.*)?(?:\n|$)",
    )
    .expect("valid pattern")
});

static PRINT_FUTURE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^from __future__ import print_function[ \t]*(?:#.*)?(?:\n|$)").expect("valid pattern"));

static POWERSHELL_MOCK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\. \$PSScriptRoot\\(?:demistomock|CommonServerPowerShell)\.ps1[ \t]*(?:\n|$)",
    )
    .expect("valid pattern")
});

static SECTION_MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^register_module_line\('.+', '(?:start|end)', __line__\(\)\)(?:\n|$)",
    )
    .expect("valid pattern")
});

static TRAILING_END_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\nregister_module_line\('.+', 'end', __line__\(\)\)\z").expect("valid pattern"));

static PACK_VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:#|//)+ pack version: (\d+\.\d+\.\d+)(\n|$)").expect("valid pattern"));

/// Source language of an integration or script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeType {
    Python,
    JavaScript,
    PowerShell,
}

impl CodeType {
    /// Parses the yml `type` value.
    #[must_use]
    pub fn from_yml(value: &str) -> Option<Self> {
        match value {
            "python" | "python2" | "python3" => Some(Self::Python),
            "javascript" => Some(Self::JavaScript),
            "powershell" => Some(Self::PowerShell),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Python => ".py",
            Self::JavaScript => ".js",
            Self::PowerShell => ".ps1",
        }
    }
}

/// Locates the single code file of `ext` in `package_dir`, skipping helpers and tests.
///
/// `CommonServerPython`, `CommonServerPowerShell` and API-module packages hold
/// files the filter would skip, so their code file is `<dir>/<dir><ext>`.
pub fn find_code_file(package_dir: &Path, code_type: CodeType) -> Result<PathBuf> {
    let ext = code_type.extension();
    let dir_name = package_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if matches!(dir_name.as_str(), "CommonServerPython" | "CommonServerPowerShell") || dir_name.ends_with("ApiModule") {
        let own = package_dir.join(format!("{dir_name}{ext}"));
        if own.is_file() {
            return Ok(own);
        }
    }
    let candidates: Vec<PathBuf> = glob_files(package_dir, &format!("*{ext}"))?
        .into_iter()
        .filter(|p| {
            let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            !IGNORED_CODE_FILES.is_match(&name)
        })
        .collect();

    match candidates.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(ContentError::CodeFileAmbiguous {
            path: package_dir.display().to_string(),
            reason: format!("no {ext} code file found"),
        }
        .into()),
        many => Err(ContentError::CodeFileAmbiguous {
            path: package_dir.display().to_string(),
            reason: format!(
                "found {} {ext} code files: {}",
                many.len(),
                many.iter()
                    .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
        .into()),
    }
}

/// Removes the demisto mock and `CommonServer` import lines (whole lines).
#[must_use]
pub fn clean_python_code(code: &str, remove_print_future: bool) -> String {
    let cleaned = PYTHON_MOCK_LINES.replace_all(code, "");
    if remove_print_future {
        PRINT_FUTURE_LINE.replace_all(&cleaned, "").into_owned()
    } else {
        cleaned.into_owned()
    }
}

/// Removes the dot-sourced mock and `CommonServerPowerShell` lines.
#[must_use]
pub fn clean_powershell_code(code: &str) -> String {
    POWERSHELL_MOCK_LINES.replace_all(code, "").into_owned()
}

/// Wraps `code` in `register_module_line` start/end markers for `name`.
#[must_use]
pub fn inject_section_markers(code: &str, name: &str) -> String {
    let start = format!("register_module_line('{name}', 'start', __line__())\n");
    let end = format!("register_module_line('{name}', 'end', __line__())");
    if code.ends_with('\n') {
        format!("{start}{code}{end}\n")
    } else {
        format!("{start}{code}\n{end}")
    }
}

/// Inverse of [`inject_section_markers`].
#[must_use]
pub fn strip_section_markers(code: &str) -> String {
    let code = TRAILING_END_MARKER.replace(code, "");
    SECTION_MARKER_LINE.replace_all(&code, "").into_owned()
}

/// Removes `# pack version: x.y.z` comment lines stamped by release tooling.
#[must_use]
pub fn strip_pack_version_lines(code: &str) -> String {
    PACK_VERSION_LINE.replace_all(code, "").into_owned()
}

/// True when a yml code field holds real code rather than the package placeholder.
#[must_use]
pub fn is_inlined_code(field: &str) -> bool {
    !matches!(field.trim(), "" | "-")
}
