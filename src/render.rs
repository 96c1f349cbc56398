//! TUI rendering traits for almanac types.
//!
//! Extension traits that add colored terminal rendering to almanac-core
//! types using owo_colors.

use almanac_core::Event;
use almanac_core::month::{MonthGrid, WEEKDAY_LABELS};
use almanac_core::validate::FormErrors;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    /// One-line summary: date, time, title, type and id.
    fn render(&self) -> String {
        let when = format!("{} {}", self.date.format("%Y-%m-%d"), self.time_label());
        let marker = if self.notified { "✓" } else { " " };
        let kind = if self.kind.has_media() {
            format!(" [{}]", self.kind)
        } else {
            String::new()
        };

        format!(
            "{} {} {}{} {}",
            marker.green(),
            when.cyan(),
            self.title.bold(),
            kind.magenta(),
            self.id.dimmed()
        )
    }
}

impl Render for FormErrors {
    fn render(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("  {} {}", format!("{}:", field).red(), message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Width of one day column in the month grid.
const CELL_WIDTH: usize = 5;

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let title = self.month.to_string();
        lines.push(format!("{:^width$}", title, width = CELL_WIDTH * 7).bold().to_string());
        lines.push(
            WEEKDAY_LABELS
                .iter()
                .map(|label| format!("{:^width$}", label, width = CELL_WIDTH))
                .collect::<String>()
                .dimmed()
                .to_string(),
        );

        for week in &self.weeks {
            let row: String = week
                .iter()
                .map(|cell| match cell {
                    None => " ".repeat(CELL_WIDTH),
                    Some(day) => {
                        let marker = if day.events.is_empty() { " " } else { "•" };
                        let text = format!("{:>3}{} ", day.date.format("%-d"), marker);
                        if day.is_today {
                            text.reversed().to_string()
                        } else if day.events.is_empty() {
                            text
                        } else {
                            text.cyan().to_string()
                        }
                    }
                })
                .collect();
            lines.push(row);
        }

        lines.join("\n")
    }
}

/// Multi-line detail view of one event.
pub fn render_details(event: &Event) -> String {
    let mut lines = vec![
        event.title.bold().to_string(),
        format!("  {} {}", "id:".dimmed(), event.id),
        format!(
            "  {} {} {}",
            "when:".dimmed(),
            event.date.format("%A, %B %-d %Y"),
            event.time_label()
        ),
        format!("  {} {}", "type:".dimmed(), event.kind),
    ];

    if let Some(url) = &event.media_url {
        lines.push(format!("  {} {}", "media:".dimmed(), url));
    }

    let status = if event.notified {
        "notified".green().to_string()
    } else {
        "pending".yellow().to_string()
    };
    lines.push(format!("  {} {}", "status:".dimmed(), status));
    lines.push(String::new());
    lines.push(format!("  {}", event.description));

    lines.join("\n")
}
