use crate::ui::Icons;
use crate::ui::theme;
use indicatif::{HumanDuration, ProgressBar};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Spinner for the import row loop. The row total is unknown while
/// streaming, so this tracks position and errors in the message instead
/// of a bar. Hidden when stdout is not a terminal.
pub struct ImportProgress {
    pb: ProgressBar,
}

impl ImportProgress {
    pub fn new() -> Self {
        let pb = if console::Term::stdout().is_term() {
            let pb = ProgressBar::new_spinner().with_message("Importing rows");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        Self { pb }
    }

    /// Called at each batch checkpoint
    pub fn checkpoint(&self, rows: u64, errors: u64) {
        self.pb.set_position(rows);
        if errors > 0 {
            self.pb
                .set_message(format!("Importing rows: {} ({} errors)", rows, errors));
        } else {
            self.pb.set_message(format!("Importing rows: {}", rows));
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    pub fn finish_with_summary(&self, duration: Duration, rows: u64, errors: u64) {
        self.finish();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Imported {} rows in {}", rows, HumanDuration(duration))
                .style(theme().success.clone())
        );
        if errors > 0 {
            println!(
                "{} {}",
                Icons::WARN.style(theme().warn.clone()),
                format!("{} rows skipped with errors", errors).style(theme().warn.clone())
            );
        }
    }
}

impl Default for ImportProgress {
    fn default() -> Self {
        Self::new()
    }
}
