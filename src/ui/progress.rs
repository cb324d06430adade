use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Per-file progress bar; hidden when stdout is not a terminal.
pub struct FileProgress {
    pb: ProgressBar,
}

impl FileProgress {
    pub fn new(total_files: usize) -> Self {
        let pb = if console::Term::stdout().is_term() {
            ProgressBar::new(total_files as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn start_file(&self, relative_path: &str) {
        self.pb.set_message(relative_path.to_string());
    }

    pub fn finish_file(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}
