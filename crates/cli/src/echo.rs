use broadsheet_core::{Article, DownloadState};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Broadsheet".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Download and extract news articles\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the download state of an article that cannot be parsed
pub fn print_download_diagnostic(article: &Article) {
    match article.download_state() {
        DownloadState::NotStarted => {
            print_error("Article was never downloaded");
            print_detail("State", "not started");
        }
        DownloadState::FailedResponse { message } => {
            print_error("Article download failed");
            print_detail("State", "failed response");
            print_detail("Message", message);
        }
        DownloadState::Success => print_detail("State", "success"),
    }
    print_detail("URL", article.url());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
