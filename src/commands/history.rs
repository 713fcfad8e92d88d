use crate::cli::HistoryCommand;
use crate::error::Result;
use crate::render::print_response;
use crate::transcript::TranscriptStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(command: HistoryCommand) -> Result<()> {
    let store = TranscriptStore::new()?;

    match command {
        HistoryCommand::List => {
            let sessions = store.list_sessions()?;

            if sessions.is_empty() {
                println!("{}", "No saved sessions found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for session in sessions {
                let title = truncate_title(&session.title);

                table.add_row(prettytable::row![
                    session.id.cyan(),
                    title,
                    session.message_count,
                    session.timestamp
                ]);
            }

            println!("\nSaved Sessions:");
            table.printstd();
            println!();
            println!(
                "Use {} to resume a session.",
                "gemchat chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            if !store.session_exists(&id) {
                println!("{}", format!("No saved session '{}'", id).yellow());
                return Ok(());
            }

            let record = store.load_session(&id)?;
            println!("\n{} ({})\n", record.title.bold(), record.timestamp);
            for message in &record.messages {
                let label = if message.role == "user" {
                    "you".bold().green()
                } else {
                    message.role.bold().cyan()
                };
                println!("{}:", label);
                print_response(&message.content);
                println!();
            }
        }
        HistoryCommand::Delete { id } => {
            if store.delete_session(&id)? {
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!("{}", format!("No saved session '{}'", id).yellow());
            }
        }
        HistoryCommand::Rename { id, title } => {
            if store.rename_session(&id, &title)? {
                println!("{}", format!("Renamed {} to '{}'", id, title).green());
            } else {
                println!("{}", format!("No saved session '{}'", id).yellow());
            }
        }
        HistoryCommand::Import { file, title } => {
            let json = std::fs::read_to_string(&file)?;
            let id = store.import_session(&json, &title)?;
            println!("{}", format!("Imported session {}", id).green());
        }
    }

    Ok(())
}

/// Shorten a title for the listing table
///
/// Counted in characters, not bytes, so multibyte titles never split
/// mid-character.
fn truncate_title(title: &str) -> String {
    if title.chars().count() > 40 {
        let mut short: String = title.chars().take(37).collect();
        short.push_str("...");
        short
    } else {
        title.to_string()
    }
}
