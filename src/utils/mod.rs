//! Shared utilities
//!
//! # Modules
//!
//! - [`fs`] - File system operations with atomic writes and format helpers
//! - [`progress`] - Progress bars for long-running operations
//!
//! # Example
//!
//! ```rust,no_run
//! use packsmith_cli::utils::{ensure_dir, atomic_write};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("Packs/Demo/Integrations/Demo"))?;
//! atomic_write(Path::new("Packs/Demo/Integrations/Demo/Demo_image.png"), b"\x89PNG")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use progress::ProgressBar;
