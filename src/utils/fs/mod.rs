//! File system utilities
//!
//! Uniform, lossless file I/O shared by the unifier, the splitter and the catalog
//! builder.
//!
//! # Key Features
//!
//! - **Atomic writes**: outputs are written to a temp file and renamed into place
//! - **Format helpers**: YAML and JSON readers/writers that keep key insertion order
//! - **Lenient readers**: malformed documents become an empty mapping plus a warning
//! - **Deterministic discovery**: directory listings and globs are sorted
//!
//! # Examples
//!
//! ```rust,no_run
//! use packsmith_cli::utils::fs::{read_yaml_file, write_yaml_file};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let doc: serde_yaml::Value = read_yaml_file(Path::new("Packs/Demo/Scripts/Demo/Demo.yml"))?;
//! write_yaml_file(Path::new("out/script-Demo.yml"), &doc)?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod discovery;
pub mod formats;

// Directory operations
pub use dirs::{ensure_dir, is_dir_empty, list_dir_sorted};

// Atomic write operations
pub use atomic::{atomic_write, safe_write};

// File discovery
pub use discovery::glob_files;

// Format-specific I/O
pub use formats::{
    normalize_line_endings, read_bytes_file, read_json_file, read_json_lenient, read_text_file,
    read_text_file_normalized, read_yaml_file, read_yaml_lenient, write_json_file,
    write_text_file, write_yaml_file,
};
