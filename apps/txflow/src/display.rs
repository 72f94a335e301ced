//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;
use txflow_types::{AppState, ColorChoice};

use crate::report::{CommandResult, InspectReport, RunReport};

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render a command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Run(report) => self.render_run_report(report),
            CommandResult::Inspect(report) => self.render_inspect_report(report),
        }
    }

    fn render_run_report(&self, report: &RunReport) -> io::Result<()> {
        if report.apps.is_empty() {
            println!("No apps registered.");
        } else {
            let mut table = self.table();
            table.set_header(vec![
                Cell::new("App").add_attribute(Attribute::Bold),
                Cell::new("State").add_attribute(Attribute::Bold),
                Cell::new("Progress").add_attribute(Attribute::Bold),
                Cell::new("Version").add_attribute(Attribute::Bold),
            ]);
            for app in &report.apps {
                table.add_row(vec![
                    Cell::new(&app.reference),
                    self.state_cell(app.state),
                    Cell::new(app.progress.to_string()),
                    Cell::new(app.version.as_deref().unwrap_or("-")),
                ]);
            }
            println!("{table}");
        }

        if !report.rebases.is_empty() {
            println!();
            println!("{}", self.heading("Queued rebases"));
            for rebase in &report.rebases {
                println!(
                    "  {} -> {} (remote {})",
                    rebase.old_ref, rebase.new_ref, rebase.remote
                );
            }
        }

        println!();
        if report.success {
            println!(
                "{}",
                self.styled(
                    Style::new().green(),
                    &format!("{} operations completed", report.operations)
                )
            );
        } else if let Some(failed) = &report.failed_operation {
            println!(
                "{}",
                self.styled(
                    Style::new().red(),
                    &format!("Transaction failed at {} {}", failed.kind, failed.reference)
                )
            );
        } else {
            println!("{}", self.styled(Style::new().red(), "Transaction failed"));
        }
        Ok(())
    }

    fn render_inspect_report(&self, report: &InspectReport) -> io::Result<()> {
        if report.operations.is_empty() {
            println!("Plan has no operations.");
            return Ok(());
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Operation").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("Size").add_attribute(Attribute::Bold),
            Cell::new("With related").add_attribute(Attribute::Bold),
            Cell::new("Related to").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
        ]);
        for row in &report.operations {
            let mut reference = Cell::new(&row.reference);
            if row.skipped {
                reference = Cell::new(format!("{} (skipped)", row.reference));
                if self.colors_enabled() {
                    reference = reference.fg(Color::DarkGrey);
                }
            }
            let related = if row.related_to.is_empty() {
                "-".to_string()
            } else {
                row.related_to.join("\n")
            };
            table.add_row(vec![
                Cell::new(row.index),
                reference,
                Cell::new(row.kind),
                Cell::new(format_bytes(row.download_size)),
                Cell::new(format_bytes(row.related_download_size)),
                Cell::new(related),
                Cell::new(format!("{:?}", row.outcome).to_lowercase()),
            ]);
        }
        println!("{table}");
        println!(
            "Total download: {}",
            format_bytes(report.total_download_size)
        );
        Ok(())
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }

    fn state_cell(&self, state: AppState) -> Cell {
        let cell = Cell::new(state);
        if !self.colors_enabled() {
            return cell;
        }
        match state {
            AppState::Installed => cell.fg(Color::Green),
            AppState::UpdatableLive | AppState::Updatable => cell.fg(Color::Yellow),
            AppState::Installing | AppState::Downloading | AppState::Removing => {
                cell.fg(Color::Red)
            }
            _ => cell,
        }
    }

    fn heading(&self, text: &str) -> String {
        self.styled(Style::new().bold(), text)
    }

    fn styled(&self, style: Style, text: &str) -> String {
        if self.colors_enabled() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if colors should be used
    pub fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// Format a byte count for display
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_color_choice() {
        assert!(OutputRenderer::new(false, ColorChoice::Always).colors_enabled());
        assert!(!OutputRenderer::new(false, ColorChoice::Never).colors_enabled());
    }
}
