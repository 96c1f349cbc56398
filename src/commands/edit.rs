use almanac_core::validate::EventForm;
use almanac_core::{EventKind, EventStore};
use anyhow::Result;
use owo_colors::OwoColorize;

use super::{reject, save_failed};
use crate::render::Render;

#[derive(Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub kind: Option<EventKind>,
    pub media_url: Option<String>,
}

impl EditArgs {
    /// Overwrite the fields that were given on the command line.
    fn apply_to(self, form: &mut EventForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(date) = self.date {
            form.date = date;
        }
        if let Some(time) = self.time {
            form.time = time;
        }
        if let Some(kind) = self.kind {
            form.kind = kind;
        }
        if let Some(url) = self.media_url {
            form.media_url = url;
        }
    }
}

pub fn run(store: &EventStore, id: &str, args: EditArgs) -> Result<()> {
    let Some(mut event) = store.get(id) else {
        anyhow::bail!("Event '{}' not found", id);
    };

    let mut form = EventForm::from_event(&event);
    args.apply_to(&mut form);

    let draft = form
        .validate()
        .map_err(|errors| reject("Event not updated:", &errors))?;
    event.apply(draft);

    if !store.update(event).map_err(save_failed)? {
        anyhow::bail!("Event '{}' was deleted before it could be updated", id);
    }

    if let Some(updated) = store.get(id) {
        println!("{} {}", "Updated".green(), updated.render());
    }

    Ok(())
}
