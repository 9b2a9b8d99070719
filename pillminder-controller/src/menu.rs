//! Menu tree
//!
//! ```text
//! Home
//! ├── Record
//! ├── Review schedules
//! │   ├── View schedules     (one page per stored schedule)
//! │   └── Delete schedules   (one page per stored schedule)
//! └── Sound options
//!     ├── Mute
//!     └── Unmute
//! ```
//!
//! Schedule pages are produced from the store every time they are drawn.

use std::sync::Arc;

use log::{info, warn};
use pillminder_core::schedule::ScheduleStore;
use pillminder_core::{Effects, Page, PageRef};
use serde_json::Value;

use crate::channels::{Command, CommandSender};

/// Label of the root page
pub const HOME: &str = "Home";

/// What the menu callbacks act on
#[derive(Clone)]
pub struct MenuContext {
    pub store: ScheduleStore,
    pub effects: Arc<Effects>,
    pub commands: CommandSender,
}

/// Build the page tree
pub fn build_menu(ctx: &MenuContext) -> PageRef {
    let commands = ctx.commands.clone();
    let record = Page::builder("Record")
        .on_visit(move |_| send(&commands, Command::Record))
        .build();

    let store = ctx.store.clone();
    let view = Page::builder("View schedules")
        .dynamic(move || view_pages(&store))
        .build();

    let store = ctx.store.clone();
    let commands = ctx.commands.clone();
    let delete = Page::builder("Delete schedules")
        .dynamic(move || delete_pages(&store, &commands))
        .build();

    let review = Page::builder("Review schedules")
        .children(vec![view, delete])
        .build();

    let effects = ctx.effects.clone();
    let mute = Page::builder("Mute")
        .on_visit(move |_| {
            info!("sound muted");
            effects.set_muted(true);
        })
        .build();
    let effects = ctx.effects.clone();
    let unmute = Page::builder("Unmute")
        .on_visit(move |_| {
            info!("sound unmuted");
            effects.set_muted(false);
        })
        .build();
    let sound = Page::builder("Sound options")
        .children(vec![mute, unmute])
        .build();

    Page::builder(HOME)
        .children(vec![record, review, sound])
        .build()
}

fn send(commands: &CommandSender, command: Command) {
    if commands.send(command).is_err() {
        warn!("command loop gone, {:?} dropped", command);
    }
}

fn stored_names(store: &ScheduleStore) -> Vec<String> {
    store.list().unwrap_or_else(|e| {
        warn!("cannot list schedules: {}", e);
        Vec::new()
    })
}

/// Field as display text; strings without quotes
fn field_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".into(),
    }
}

/// Detail lines of one stored schedule
fn detail_lines(value: &Value) -> Vec<PageRef> {
    let mut lines = vec![
        Page::leaf(format!("Slot: {}", field_text(value, "slot"))),
        Page::leaf(format!("Times (H): {}", field_text(value, "hour"))),
        Page::leaf(format!("Dosage: {}", field_text(value, "dosage"))),
    ];
    if let Some(special) = value.get("special").and_then(Value::as_str) {
        lines.push(Page::leaf(special));
    }
    lines
}

fn view_pages(store: &ScheduleStore) -> Vec<PageRef> {
    stored_names(store)
        .into_iter()
        .map(|name| {
            let lines = match store.load(&name) {
                Ok(value) => detail_lines(&value),
                Err(e) => {
                    warn!("{}", e);
                    vec![Page::leaf("Unreadable")]
                }
            };
            Page::builder(name).children(lines).no_prefix().build()
        })
        .collect()
}

fn delete_pages(store: &ScheduleStore, commands: &CommandSender) -> Vec<PageRef> {
    stored_names(store)
        .into_iter()
        .map(|name| {
            let store = store.clone();
            let commands = commands.clone();
            let target = name.clone();
            let confirm = Page::builder("Delete")
                .on_visit(move |_| {
                    match store.remove(&target) {
                        Ok(()) => info!("schedule {} deleted", target),
                        Err(e) => warn!("{}", e),
                    }
                    send(&commands, Command::Rebuild);
                })
                .build();
            Page::builder(name).children(vec![confirm]).build()
        })
        .collect()
}
