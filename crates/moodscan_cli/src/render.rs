//! Plain-text rendering of the view model, notifications and history pages.

use std::io::{self, Write};

use moodscan_core::{AppViewModel, Notification, NotificationLevel, Phase, Plan, SubmissionResult};
use moodscan_engine::{HistoryEntry, Page};

const BAR_WIDTH: usize = 30;

pub fn progress_bar(progress: u8, width: usize) -> String {
    let progress = usize::from(progress.min(100));
    let filled = progress * width / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        progress
    )
}

pub fn notification_line(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Info => "ok",
        NotificationLevel::Error => "error",
    };
    format!(
        "[{marker}] {}: {}",
        notification.title, notification.description
    )
}

pub fn result_lines(result: &SubmissionResult) -> Vec<String> {
    let mut lines = vec![format!("Download link: {}", result.download_link)];
    if let Some(filename) = &result.filename {
        lines.push(format!("File name:     {filename}"));
    }
    if let Some(message) = &result.message {
        lines.push(format!("Message:       {message}"));
    }
    if let Some(meta) = &result.meta {
        lines.push(format!("Analyzed at:   {}", meta.timestamp));
        lines.push(format!("Language:      {}", meta.language));
        lines.push(format!("Input:         {}", meta.input));
    }
    lines
}

pub fn plan_lines() -> Vec<String> {
    let mut lines = vec![format!("{:<8} {:<10} {}", "ID", "NAME", "MODEL")];
    lines.extend(
        Plan::ALL
            .iter()
            .map(|plan| format!("{:<8} {:<10} {}", plan.id(), plan.display_name(), plan.model_name())),
    );
    lines
}

pub fn history_lines(page: &Page<'_, HistoryEntry>) -> Vec<String> {
    if page.total_items == 0 {
        return vec!["No submissions recorded yet.".to_string()];
    }
    let mut lines = vec![format!(
        "{:<20} {:<6} {:<45} {}",
        "DATE", "PLAN", "SOURCE", "DOWNLOAD"
    )];
    for entry in page.items {
        lines.push(format!(
            "{:<20} {:<6} {:<45} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.plan_id,
            entry.source_url,
            entry.download_link
        ));
    }
    lines.push(format!(
        "Page {} of {} ({} entries)",
        page.number, page.total_pages, page.total_items
    ));
    lines
}

/// Redraws a single status line on the terminal as the view changes.
pub struct ProgressRenderer<W: Write> {
    out: W,
    line_open: bool,
}

impl<W: Write> ProgressRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            line_open: false,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        match view.phase {
            Phase::Submitting => {
                write!(
                    self.out,
                    "\rAnalyzing with {} model {}",
                    view.model_name,
                    progress_bar(view.progress, BAR_WIDTH)
                )?;
                self.line_open = true;
            }
            Phase::Succeeded | Phase::Failed => {
                if self.line_open {
                    writeln!(
                        self.out,
                        "\rAnalyzing with {} model {}",
                        view.model_name,
                        progress_bar(view.progress, BAR_WIDTH)
                    )?;
                    self.line_open = false;
                }
            }
            Phase::Idle => {}
        }
        self.out.flush()
    }

    /// Prints a full line, closing any open progress line first.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}
