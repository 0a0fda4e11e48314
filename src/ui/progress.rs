use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::pipeline::Disposition;
use crate::ui::icons::{CHECK, CHANGES, PENDING, RETRY};

/// Progress display for `editorial batch`, rendered via an `indicatif` bar.
///
/// One line is printed above the bar per finished file; the bar message shows
/// the file currently being scored. When `quiet` is set (JSON output) nothing
/// is drawn but dispositions are still tallied.
pub struct BatchProgress {
    bar: ProgressBar,
    quiet: bool,
    tally: BTreeMap<String, usize>,
}

impl BatchProgress {
    pub fn new(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .expect("progress bar template is a valid static string")
                    .progress_chars("█▓▒░"),
            );
            bar.set_prefix("Scoring");
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        Self {
            bar,
            quiet,
            tally: BTreeMap::new(),
        }
    }

    /// Print a line above the bar.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        self.bar.suspend(|| eprintln!("{}", msg.as_ref()));
    }

    pub fn start_item(&self, name: &str) {
        self.bar.set_message(style(name).dim().to_string());
    }

    /// Record one finished file.
    pub fn finish_item(&mut self, name: &str, disposition: Disposition, score: u32) {
        *self.tally.entry(disposition.to_string()).or_default() += 1;
        let icon = match disposition {
            Disposition::AutoApproved => CHECK,
            Disposition::Queued => PENDING,
            Disposition::Flagged => CHANGES,
            Disposition::Regenerate => RETRY,
        };
        self.print_line(format!(
            "  {}{} {} {}",
            icon,
            name,
            style(format!("score {}", score)).dim(),
            style(disposition).yellow()
        ));
        self.bar.inc(1);
    }

    /// Report a file that could not be read.
    pub fn fail_item(&mut self, name: &str, error: &str) {
        *self.tally.entry("failed".to_string()).or_default() += 1;
        self.print_line(format!("  {}{} {}", crate::ui::icons::CROSS, name, style(error).red()));
        self.bar.inc(1);
    }

    /// Clear the bar and return disposition counts.
    pub fn finish(self) -> BTreeMap<String, usize> {
        self.bar.finish_and_clear();
        self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_progress_still_tallies() {
        let mut progress = BatchProgress::new(3, true);
        progress.start_item("a.html");
        progress.finish_item("a.html", Disposition::AutoApproved, 91);
        progress.finish_item("b.html", Disposition::Queued, 70);
        progress.fail_item("c.html", "unreadable");

        let tally = progress.finish();
        assert_eq!(tally.get("auto_approved"), Some(&1));
        assert_eq!(tally.get("queued"), Some(&1));
        assert_eq!(tally.get("failed"), Some(&1));
        assert_eq!(tally.get("flagged"), None);
    }
}
