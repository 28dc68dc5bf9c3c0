//! Journal commands. Entries list newest first.

use std::sync::Arc;

use tabled::Tabled;

use potpal_core::{DocumentId, JournalEntry};

use crate::cli::{GlobalOpts, JournalCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Plant")]
    plant: String,
    #[tabled(rename = "Entry")]
    content: String,
}

fn to_row(entry: &Arc<JournalEntry>) -> EntryRow {
    EntryRow {
        id: entry.id.to_string(),
        date: entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
        plant: entry.plant_name.clone().unwrap_or_default(),
        content: entry.content.clone(),
    }
}

pub async fn handle(cmd: JournalCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        JournalCommand::List => {
            super::with_session(global, |session| async move {
                let entries = session.journal_snapshot();
                if entries.is_empty() {
                    println!("No journal entries.");
                    return Ok(());
                }
                let rendered =
                    output::render_list(global.output, &entries, to_row, |e| e.id.to_string());
                output::print_output(&rendered);
                Ok(())
            })
            .await
        }

        JournalCommand::Add { content, plant } => {
            super::with_session(global, |session| async move {
                session
                    .add_journal_entry(&content, plant.as_deref())
                    .await?;
                Ok(())
            })
            .await?;
            output::ok_line(output::should_color(global.color), "Entry added");
            Ok(())
        }

        JournalCommand::Remove { id } => {
            super::with_session(global, |session| async move {
                session
                    .delete_journal_entry(&DocumentId::from(id.as_str()))
                    .await?;
                Ok(())
            })
            .await?;
            output::ok_line(output::should_color(global.color), "Entry removed");
            Ok(())
        }
    }
}
