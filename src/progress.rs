use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Progress tracker for chapcut stages
pub struct ProgressTracker {
    multi: Arc<MultiProgress>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
        }
    }

    /// Create a progress bar counting `total` items
    pub fn create_progress_bar(&self, total: u64, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(total));
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb
    }

    /// Create an indeterminate spinner for unknown-duration operations
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapper for operations with progress tracking
pub struct ProgressOperation {
    pub tracker: ProgressTracker,
    pub enabled: bool,
}

impl ProgressOperation {
    pub fn new(enabled: bool) -> Self {
        Self {
            tracker: ProgressTracker::new(),
            enabled,
        }
    }

    /// Bar for `total` chapters, or `None` when disabled
    pub fn chapter_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        self.enabled
            .then(|| self.tracker.create_progress_bar(total, message))
    }

    /// Await `operation` under a spinner if enabled, marking it failed on `Err`
    pub async fn with_stage<F, Fut, T, E>(&self, message: &str, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            return operation().await;
        }

        let pb = self.tracker.create_spinner(message);
        let result = operation().await;
        match &result {
            Ok(_) => pb.finish_with_message(format!("✓ {}", message)),
            Err(_) => pb.abandon_with_message(format!("✗ {}", message)),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_counts_chapters() {
        let tracker = ProgressTracker::new();
        let pb = tracker.create_progress_bar(3, "Splicing chapters");

        for _ in 0..3 {
            pb.inc(1);
        }
        assert_eq!(pb.position(), 3);

        pb.finish_with_message("done");
        assert!(pb.is_finished());
    }

    #[tokio::test]
    async fn test_stage_returns_value() {
        let progress = ProgressOperation::new(true);

        let result: Result<u32, String> = progress
            .with_stage("Test operation", || async { Ok(42) })
            .await;

        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_stage_passes_errors_through() {
        let progress = ProgressOperation::new(true);

        let result: Result<(), String> = progress
            .with_stage("Failing stage", || async { Err("boom".to_string()) })
            .await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_disabled_progress() {
        let progress = ProgressOperation::new(false);

        let result: Result<&str, String> = progress
            .with_stage("Test", || async { Ok("success") })
            .await;

        assert_eq!(result, Ok("success"));
        assert!(progress.chapter_bar(5, "chapters").is_none());
    }
}
