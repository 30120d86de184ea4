//! Progress bars for the long-running passes.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar of `len` steps, hidden unless `enabled`.
pub fn bar(len: u64, enabled: bool, label: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let template = format!("{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})", label);
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
