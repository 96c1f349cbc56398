use almanac_core::EventKind;
use almanac_core::config::AlmanacConfig;
use almanac_core::validate::EventForm;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use dialoguer::Input;
use owo_colors::OwoColorize;

use super::{reject, save_failed};
use crate::Session;
use crate::render::Render;

pub struct AddArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub kind: EventKind,
    pub media_url: Option<String>,
}

impl AddArgs {
    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.description.is_some()
            && self.time.is_some()
            && (!self.kind.has_media() || self.media_url.is_some())
    }
}

pub fn run(config: &AlmanacConfig, args: AddArgs) -> Result<()> {
    let interactive = !args.is_complete();
    let today = Local::now().date_naive();

    // Prompt before taking the lock so the notifier is never held up by input.
    let form = build_form(args, today, prompt)?;
    let draft = form
        .validate()
        .map_err(|errors| reject("Event not added:", &errors))?;

    let session = Session::open(config)?;
    let id = session.store.add(draft).map_err(save_failed)?;

    if interactive {
        println!();
    }

    match session.store.get(&id) {
        Some(event) => println!("{} {}", "Added".green(), event.render()),
        None => println!("{} {}", "Added".green(), id),
    }

    Ok(())
}

/// Fill an [`EventForm`] from the arguments, asking `ask` for whatever is
/// missing. The date defaults to `today` and is never prompted for.
fn build_form<F>(args: AddArgs, today: NaiveDate, mut ask: F) -> Result<EventForm>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut form = EventForm::for_date(today);
    form.kind = args.kind;

    form.title = match args.title {
        Some(title) => title,
        None => ask("  Title")?,
    };
    form.description = match args.description {
        Some(description) => description,
        None => ask("  Description")?,
    };
    if let Some(date) = args.date {
        form.date = date;
    }
    form.time = match args.time {
        Some(time) => time,
        None => ask("  Time (HH:MM)")?,
    };
    form.media_url = match args.media_url {
        Some(url) => url,
        None if form.kind.has_media() => ask("  Media URL")?,
        None => String::new(),
    };

    Ok(form)
}

fn prompt(label: &str) -> Result<String> {
    let value = Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}
