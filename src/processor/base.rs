use crate::errors::{AppError, AppResult};
use std::time::Instant;
use tracing::{info, warn};

/// Progress tracking for long-running passes
pub struct StandardProgressTracker {
    start_time: Option<Instant>,
    last_report: Option<Instant>,
    report_interval_ms: u64,
}

impl Default for StandardProgressTracker {
    fn default() -> Self {
        Self {
            start_time: None,
            last_report: None,
            report_interval_ms: 500, // Report every 500ms
        }
    }
}

impl StandardProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        let now = Instant::now();
        self.start_time = Some(now);
        self.last_report = Some(now);
    }

    pub fn should_report(&mut self) -> bool {
        let now = Instant::now();
        match self.last_report {
            Some(last) => {
                if now.duration_since(last).as_millis() > self.report_interval_ms as u128 {
                    self.last_report = Some(now);
                    true
                } else {
                    false
                }
            }
            None => {
                self.last_report = Some(now);
                true
            }
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        match self.start_time {
            Some(start) => start.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }
}

/// Configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_pass_config(concurrency: usize, progress_interval: usize) -> AppResult<()> {
        if concurrency == 0 {
            return Err(AppError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }
        if progress_interval == 0 {
            return Err(AppError::Config(
                "Progress interval must be greater than 0".to_string(),
            ));
        }
        if concurrency > 16 {
            warn!(
                "High concurrency: {} - explorer rate limits will serialise most requests",
                concurrency
            );
        }
        Ok(())
    }

    pub fn log_config_summary(
        processor_name: &str,
        concurrency: usize,
        progress_interval: usize,
        additional_info: Option<&str>,
    ) {
        info!("=== {} Configuration ===", processor_name);
        info!("  Concurrency: {}", concurrency);
        info!("  Progress interval: {}", progress_interval);
        if let Some(info) = additional_info {
            info!("  {}", info);
        }
    }
}

/// Trait for pass-specific metrics formatting
/// Each pass's statistics type implements this to provide custom metrics for progress reporting
pub trait StageMetrics {
    /// Format pass-specific metrics for progress display
    /// Returns a formatted string of metrics (e.g., "OK: 100 | Failed: 5")
    fn format_custom_metrics(&self) -> String;
}

/// Progress reporting utilities
pub struct ProgressReporter;

impl ProgressReporter {
    /// Format elapsed seconds into human-readable time (days, hours, minutes, seconds)
    pub fn format_elapsed_time(elapsed_secs: f64) -> String {
        if elapsed_secs < 60.0 {
            format!("{:.1}s", elapsed_secs)
        } else if elapsed_secs < 3600.0 {
            let minutes = (elapsed_secs / 60.0).floor();
            let seconds = elapsed_secs % 60.0;
            format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
        } else if elapsed_secs < 86400.0 {
            let hours = (elapsed_secs / 3600.0).floor();
            let remaining = elapsed_secs % 3600.0;
            let minutes = (remaining / 60.0).floor();
            let seconds = remaining % 60.0;
            format!(
                "{}h {}m {:.0}s ({:.1}s)",
                hours, minutes, seconds, elapsed_secs
            )
        } else {
            // Whole-corpus passes routinely run for days
            let days = (elapsed_secs / 86400.0).floor();
            let remaining = elapsed_secs % 86400.0;
            let hours = (remaining / 3600.0).floor();
            let remaining = remaining % 3600.0;
            let minutes = (remaining / 60.0).floor();
            let seconds = remaining % 60.0;
            format!(
                "{}d {}h {}m {:.0}s ({:.1}s)",
                days, hours, minutes, seconds, elapsed_secs
            )
        }
    }

    pub fn report_completion(
        operation: &str,
        total_seen: usize,
        total_evaluated: usize,
        elapsed: f64,
    ) {
        let rate = if elapsed > 0.0 {
            total_evaluated as f64 / elapsed
        } else {
            0.0
        };
        info!("=== {} Completed ===", operation);
        info!("  Contracts seen: {}", total_seen);
        info!("  Contracts evaluated: {}", total_evaluated);
        info!("  Time elapsed: {}", Self::format_elapsed_time(elapsed));
        info!("  Average rate: {:.2} contracts/sec", rate);
    }

    pub fn finish_progress_line() {
        // End the in-place progress line
        println!();
    }

    pub fn format_standard_progress(
        processed_count: usize,
        total_estimate: Option<usize>,
        rate: f64,
        elapsed: f64,
        custom_metrics: &str,
    ) -> String {
        let progress_pct = match total_estimate {
            Some(total) if total > 0 => {
                format!(" ({:.1}%)", (processed_count as f64 / total as f64) * 100.0)
            }
            _ => String::new(),
        };

        format!(
            "Processed: {}{} | Rate: {:.2}/sec | Elapsed: {} | {}",
            processed_count,
            progress_pct,
            rate,
            Self::format_elapsed_time(elapsed),
            custom_metrics
        )
    }

    pub fn print_progress_line(message: &str) -> AppResult<()> {
        print!("\r{}", message);
        use std::io::Write;
        std::io::stdout().flush().map_err(AppError::Io)?;
        Ok(())
    }

    /// Progress line for any pass statistics implementing [`StageMetrics`]
    pub fn report_progress_with_metrics<T: StageMetrics>(
        metrics: &T,
        processed_count: usize,
        total_estimate: Option<usize>,
        elapsed_secs: f64,
    ) -> AppResult<()> {
        let rate = if elapsed_secs > 0.0 {
            processed_count as f64 / elapsed_secs
        } else {
            0.0
        };

        let progress_message = Self::format_standard_progress(
            processed_count,
            total_estimate,
            rate,
            elapsed_secs,
            &metrics.format_custom_metrics(),
        );

        Self::print_progress_line(&progress_message)
    }
}
