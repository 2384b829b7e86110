//! Progress reporting for long-running operations.
//!
//! Wraps `indicatif` with the project's styling. Progress bars are hidden when
//! `PACKSMITH_NO_PROGRESS` is set (the `--no-progress` flag sets it), so output in
//! CI logs and tests stays clean.

use crate::constants::ENV_PACKSMITH_NO_PROGRESS;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

pub fn is_progress_disabled() -> bool {
    std::env::var(ENV_PACKSMITH_NO_PROGRESS).is_ok()
}

fn default_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

/// A progress bar with consistent styling.
///
/// Cloning is cheap and clones share state, so one bar can be updated from every
/// worker of the catalog walk.
///
/// # Examples
///
/// ```rust
/// use packsmith_cli::utils::progress::ProgressBar;
///
/// let progress = ProgressBar::new(3);
/// progress.set_prefix("id-set");
/// for pack in ["Alpha", "Beta", "Gamma"] {
///     progress.set_message(pack);
///     progress.inc(1);
/// }
/// progress.finish_and_clear();
/// ```
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a progress bar tracking `len` units of work.
    #[must_use]
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Creates a progress bar that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Current position, mostly useful in tests.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.inner.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_still_counts() {
        let bar = ProgressBar::hidden();
        bar.inc(2);
        bar.inc(1);
        assert_eq!(bar.position(), 3);
        bar.finish_and_clear();
    }

    #[test]
    fn test_clones_share_state() {
        let bar = ProgressBar::hidden();
        let clone = bar.clone();
        clone.inc(5);
        assert_eq!(bar.position(), 5);
    }
}
