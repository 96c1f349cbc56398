use almanac_core::EventStore;
use almanac_core::month::{MonthGrid, YearMonth};
use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(store: &EventStore, month: Option<&str>, prev: u32, next: u32) -> Result<()> {
    let today = Local::now().date_naive();

    let start = match month {
        Some(input) => input.parse::<YearMonth>().map_err(|e| anyhow::anyhow!(e))?,
        None => YearMonth::containing(today),
    };
    let month = navigate(start, prev, next);

    let grid = MonthGrid::build(month, &store.snapshot(), today);
    println!("{}", grid.render());

    let scheduled: Vec<_> = grid.days().filter(|day| !day.events.is_empty()).collect();
    if scheduled.is_empty() {
        println!();
        println!("{}", "No events this month".dimmed());
        return Ok(());
    }

    for day in scheduled {
        println!();
        println!("{}", day.date.format("%a %b %-d").bold());
        for event in &day.events {
            println!("  {}", event.render());
        }
    }

    Ok(())
}

fn navigate(mut month: YearMonth, prev: u32, next: u32) -> YearMonth {
    for _ in 0..prev {
        month = month.prev_month();
    }
    for _ in 0..next {
        month = month.next_month();
    }
    month
}
