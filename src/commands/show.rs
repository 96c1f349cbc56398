use almanac_core::EventStore;
use anyhow::Result;

use crate::render::render_details;

pub fn run(store: &EventStore, id: &str) -> Result<()> {
    let Some(event) = store.get(id) else {
        anyhow::bail!("Event '{}' not found", id);
    };

    println!("{}", render_details(&event));
    Ok(())
}
