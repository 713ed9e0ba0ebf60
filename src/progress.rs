//! # Progress Bar and Statistics Module
//!
//! Questo modulo gestisce la progress bar testuale e le statistiche del run.
//!
//! ## Responsabilità:
//! - Progress bar a larghezza fissa (40 caratteri) con `indicatif`, ridisegnata
//!   sulla stessa riga
//! - Tracking statistiche del run (spostati, già al loro posto, senza data,
//!   non supportati, errori)
//! - Riga di riepilogo finale `Moved <n> files out of <total>.`
//!
//! ## Visual feedback:
//! ```text
//! [================                        ] 12/30 2023/07/a.jpg
//! ```

use indicatif::{ProgressBar, ProgressStyle};

/// Width of the bar, in characters
pub const BAR_WIDTH: usize = 40;

/// Manages the textual progress bar
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a visible progress bar for `total_files`
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);
        let template = format!("[{{bar:{}}}] {{pos}}/{{len}} {{msg}}", BAR_WIDTH);

        bar.set_style(
            ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("= "),
        );

        Self { bar }
    }

    /// A bar that never draws, for quiet runs and tests
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar }
    }

    /// Move the bar to `position` (never past its length) with a message
    pub fn set_position(&self, position: u64, message: &str) {
        let length = self.bar.length().unwrap_or(position);
        self.bar.set_position(position.min(length));
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish, leaving the bar on screen
    pub fn finish(&self) {
        self.bar.finish_with_message(String::new());
    }
}

/// Statistics for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeStats {
    /// Photos and videos found by the counting pass
    pub total: usize,
    pub moved: usize,
    /// Moved into the undated bucket (also counted in `moved`)
    pub undated: usize,
    pub already_in_place: usize,
    pub unsupported: usize,
    pub failed: usize,
}

impl OrganizeStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn add_moved(&mut self, undated: bool) {
        self.moved += 1;
        if undated {
            self.undated += 1;
        }
    }

    pub fn add_already_in_place(&mut self) {
        self.already_in_place += 1;
    }

    pub fn add_unsupported(&mut self) {
        self.unsupported += 1;
    }

    pub fn add_error(&mut self) {
        self.failed += 1;
    }

    /// The final line shown to the user
    pub fn summary_line(&self) -> String {
        format!("Moved {} files out of {}.", self.moved, self.total)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Moved: {} (undated: {}) | Already in place: {} | Unsupported: {} | Errors: {} | Total media: {}",
            self.moved, self.undated, self.already_in_place, self.unsupported, self.failed, self.total
        )
    }
}
