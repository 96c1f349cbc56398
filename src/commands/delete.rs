use almanac_core::EventStore;
use anyhow::Result;
use owo_colors::OwoColorize;

use super::save_failed;

pub fn run(store: &EventStore, id: &str) -> Result<()> {
    let title = store.get(id).map(|event| event.title);

    if store.delete(id).map_err(save_failed)? {
        println!("{} {}", "Deleted".red(), title.unwrap_or_else(|| id.to_string()));
    } else {
        println!("{}", format!("No event with id '{}'", id).dimmed());
    }

    Ok(())
}
