//! Interactive chat mode handler.
//!
//! Runs a readline-based loop that submits user input to the
//! conversation handle (wrapped in the retry layer) and renders replies
//! with fenced code blocks set apart. Slash commands expose the
//! transcript store: save, list, load, rename, delete, and upload.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::fetch_reply;
use crate::providers::{map_role, start_conversation, Message};
use crate::render::print_response;
use crate::retry::retry_with_backoff;
use crate::transcript::TranscriptStore;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::Duration;

/// Assistant turn appended when every attempt at a reply has failed
const APOLOGY: &str =
    "Sorry, I couldn't reach the model just now. Please try again in a moment.";

/// Explicit UI-session state owned by the chat loop
///
/// The visible transcript is the source of truth for saving: it carries
/// UI-facing roles and includes apologetic turns for failed fetches,
/// which the conversation handle's internal history does not.
struct ChatState {
    /// Visible transcript with UI-facing roles (user/assistant)
    transcript: Vec<Message>,
    /// Id of the session this transcript is saved under, once saved
    session_id: Option<String>,
}

/// A parsed slash command from the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatCommand {
    /// `/save [title]`
    Save(Option<String>),
    /// `/list`
    List,
    /// `/load <id>`
    Load(String),
    /// `/rename <id> <title>`
    Rename(String, String),
    /// `/delete <id>`
    Delete(String),
    /// `/upload <path>`
    Upload(String),
    /// `/help`
    Help,
    /// `/quit` or `/exit`
    Quit,
    /// Not a slash command: regular chat input
    None,
}

/// Parse a slash command from trimmed input
fn parse_chat_command(input: &str) -> ChatCommand {
    if !input.starts_with('/') {
        return ChatCommand::None;
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or("").trim();

    match command {
        "/save" => ChatCommand::Save(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }),
        "/list" => ChatCommand::List,
        "/load" if !rest.is_empty() => ChatCommand::Load(rest.to_string()),
        "/rename" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            match (args.next(), args.next()) {
                (Some(id), Some(title)) if !id.is_empty() && !title.trim().is_empty() => {
                    ChatCommand::Rename(id.to_string(), title.trim().to_string())
                }
                _ => ChatCommand::Help,
            }
        }
        "/delete" if !rest.is_empty() => ChatCommand::Delete(rest.to_string()),
        "/upload" if !rest.is_empty() => ChatCommand::Upload(rest.to_string()),
        "/quit" | "/exit" => ChatCommand::Quit,
        _ => ChatCommand::Help,
    }
}

/// Map conversation-handle history to UI-facing roles
fn to_ui_messages(history: &[Message]) -> Vec<Message> {
    history
        .iter()
        .map(|m| Message {
            role: map_role(&m.role).to_string(),
            content: m.content.clone(),
        })
        .collect()
}

/// Map a stored transcript back to the provider's internal roles
fn to_seed_messages(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .map(|m| {
            if m.role == "assistant" {
                Message::model(m.content.clone())
            } else {
                m.clone()
            }
        })
        .collect()
}

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `resume` - Optional id of a saved session to resume
pub async fn run_chat(config: Config, resume: Option<String>) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    // The config-file directory applies unless the env/CLI override is set
    let store = match &config.chat.history_dir {
        Some(dir) if std::env::var("GEMCHAT_HISTORY_DIR").is_err() => {
            TranscriptStore::new_with_dir(dir.clone())?
        }
        _ => TranscriptStore::new()?,
    };

    let mut state = ChatState {
        transcript: Vec::new(),
        session_id: None,
    };

    let seed = match &resume {
        Some(id) if store.session_exists(id) => {
            let record = store.load_session(id)?;
            println!(
                "{}",
                format!("Resumed '{}' ({} messages)", record.title, record.messages.len()).green()
            );
            state.session_id = Some(id.clone());
            to_seed_messages(&record.messages)
        }
        Some(id) => {
            println!(
                "{}",
                format!("No saved session '{}', starting a new chat", id).yellow()
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut conversation = start_conversation(&config, seed)?;
    state.transcript = to_ui_messages(&conversation.history());

    print_welcome_banner(&config);
    for message in &state.transcript {
        print_turn(&config, message);
    }

    let mut rl = DefaultEditor::new()?;
    let max_attempts = config.chat.max_retries;
    let base_delay = Duration::from_millis(config.chat.retry_base_delay_ms);

    loop {
        match rl.readline("you >> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_chat_command(trimmed) {
                    ChatCommand::Save(title) => {
                        let title = title.unwrap_or_else(|| default_title(&state.transcript));
                        match store.save_session(
                            &state.transcript,
                            &title,
                            state.session_id.as_deref(),
                        ) {
                            Ok(id) => {
                                println!("{}", format!("Saved session {}", id).green());
                                state.session_id = Some(id);
                            }
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                        continue;
                    }
                    ChatCommand::List => {
                        match store.list_sessions() {
                            Ok(sessions) if sessions.is_empty() => {
                                println!("{}", "No saved sessions.".yellow());
                            }
                            Ok(sessions) => {
                                for session in sessions {
                                    println!(
                                        "{}  {} ({} messages, {})",
                                        session.id.cyan(),
                                        session.title,
                                        session.message_count,
                                        session.timestamp
                                    );
                                }
                            }
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                        continue;
                    }
                    ChatCommand::Load(id) => {
                        if !store.session_exists(&id) {
                            println!("{}", format!("No saved session '{}'", id).yellow());
                            continue;
                        }
                        match store.load_session(&id) {
                            Ok(record) => {
                                conversation = start_conversation(
                                    &config,
                                    to_seed_messages(&record.messages),
                                )?;
                                state.transcript = to_ui_messages(&conversation.history());
                                state.session_id = Some(id);
                                println!(
                                    "{}",
                                    format!(
                                        "Loaded '{}' ({} messages)",
                                        record.title,
                                        record.messages.len()
                                    )
                                    .green()
                                );
                                for message in &state.transcript {
                                    print_turn(&config, message);
                                }
                            }
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                        continue;
                    }
                    ChatCommand::Rename(id, title) => {
                        match store.rename_session(&id, &title) {
                            Ok(true) => {
                                println!("{}", format!("Renamed {} to '{}'", id, title).green())
                            }
                            Ok(false) => {
                                println!("{}", format!("No saved session '{}'", id).yellow())
                            }
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                        continue;
                    }
                    ChatCommand::Delete(id) => {
                        match store.delete_session(&id) {
                            Ok(true) => println!("{}", format!("Deleted session {}", id).green()),
                            Ok(false) => {
                                println!("{}", format!("No saved session '{}'", id).yellow())
                            }
                            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                        }
                        continue;
                    }
                    ChatCommand::Upload(path) => {
                        match std::fs::read_to_string(&path) {
                            Ok(json) => match store.import_session(&json, "Uploaded chat") {
                                Ok(id) => {
                                    println!("{}", format!("Imported session {}", id).green())
                                }
                                Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                            },
                            Err(e) => {
                                eprintln!("{}", format!("Error: cannot read {}: {}", path, e).red())
                            }
                        }
                        continue;
                    }
                    ChatCommand::Help => {
                        print_help();
                        continue;
                    }
                    ChatCommand::Quit => break,
                    ChatCommand::None => {}
                }

                // Regular turn: retry-wrapped fetch with a busy indicator
                println!("{}", format!("{} is thinking...", config.chat.bot_title).dimmed());

                let result = retry_with_backoff(
                    || fetch_reply(conversation.as_ref(), trimmed),
                    max_attempts,
                    base_delay,
                )
                .await;

                state.transcript.push(Message::user(trimmed));
                match result {
                    Ok(reply) => {
                        println!("{}:", config.chat.bot_title.bold().cyan());
                        print_response(&reply);
                        println!();
                        state.transcript.push(Message::assistant(reply));
                    }
                    Err(e) => {
                        eprintln!("{}", format!("Error: {}", e).red());
                        println!("{}: {}\n", config.chat.bot_title.bold().cyan(), APOLOGY);
                        state.transcript.push(Message::assistant(APOLOGY));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Title derived from the first user turn, for unsaved sessions
fn default_title(transcript: &[Message]) -> String {
    transcript
        .iter()
        .find(|m| m.role == "user")
        .map(|m| {
            let mut title: String = m.content.chars().take(40).collect();
            if m.content.chars().count() > 40 {
                title.push_str("...");
            }
            title
        })
        .unwrap_or_else(|| "Chat".to_string())
}

/// Display welcome banner at the start of interactive chat mode
fn print_welcome_banner(config: &Config) {
    println!();
    println!(
        "{}",
        format!("Chat with {}", config.chat.bot_title).bold()
    );
    println!("Model: {}", config.gemini.model.cyan());
    println!("Type {} for commands, {} to leave.\n", "/help".cyan(), "/quit".cyan());
}

/// Print a single transcript turn with its role label
fn print_turn(config: &Config, message: &Message) {
    let label = if message.role == "user" {
        "you".bold().green()
    } else {
        config.chat.bot_title.bold().cyan()
    };
    println!("{}:", label);
    print_response(&message.content);
    println!();
}

/// Print available slash commands
fn print_help() {
    println!("Available commands:");
    println!("  {}   Save the transcript (new id unless already saved)", "/save [title]".cyan());
    println!("  {}            Show saved sessions", "/list".cyan());
    println!("  {}       Load a saved session", "/load <id>".cyan());
    println!("  {} Rename a saved session", "/rename <id> <title>".cyan());
    println!("  {}     Delete a saved session", "/delete <id>".cyan());
    println!("  {}   Import a JSON transcript document", "/upload <path>".cyan());
    println!("  {}            Leave the chat", "/quit".cyan());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_input() {
        assert_eq!(parse_chat_command("hello there"), ChatCommand::None);
    }

    #[test]
    fn test_parse_save_without_title() {
        assert_eq!(parse_chat_command("/save"), ChatCommand::Save(None));
    }

    #[test]
    fn test_parse_save_with_title() {
        assert_eq!(
            parse_chat_command("/save My first chat"),
            ChatCommand::Save(Some("My first chat".to_string()))
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_chat_command("/list"), ChatCommand::List);
    }

    #[test]
    fn test_parse_load() {
        assert_eq!(
            parse_chat_command("/load 20250101-120000-0001"),
            ChatCommand::Load("20250101-120000-0001".to_string())
        );
    }

    #[test]
    fn test_parse_load_without_id_shows_help() {
        assert_eq!(parse_chat_command("/load"), ChatCommand::Help);
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_chat_command("/rename abc New Title"),
            ChatCommand::Rename("abc".to_string(), "New Title".to_string())
        );
    }

    #[test]
    fn test_parse_rename_missing_title_shows_help() {
        assert_eq!(parse_chat_command("/rename abc"), ChatCommand::Help);
    }

    #[test]
    fn test_parse_delete_and_upload() {
        assert_eq!(
            parse_chat_command("/delete abc"),
            ChatCommand::Delete("abc".to_string())
        );
        assert_eq!(
            parse_chat_command("/upload chat.json"),
            ChatCommand::Upload("chat.json".to_string())
        );
    }

    #[test]
    fn test_parse_quit_variants() {
        assert_eq!(parse_chat_command("/quit"), ChatCommand::Quit);
        assert_eq!(parse_chat_command("/exit"), ChatCommand::Quit);
    }

    #[test]
    fn test_parse_unknown_command_shows_help() {
        assert_eq!(parse_chat_command("/bogus"), ChatCommand::Help);
    }

    #[test]
    fn test_to_ui_messages_maps_model_role() {
        let history = vec![Message::model("hi"), Message::user("hello")];
        let ui = to_ui_messages(&history);
        assert_eq!(ui[0].role, "assistant");
        assert_eq!(ui[1].role, "user");
    }

    #[test]
    fn test_to_seed_messages_restores_model_role() {
        let stored = vec![Message::user("a"), Message::assistant("b")];
        let seed = to_seed_messages(&stored);
        assert_eq!(seed[0].role, "user");
        assert_eq!(seed[1].role, "model");
        assert_eq!(seed[1].content, "b");
    }

    #[test]
    fn test_default_title_from_first_user_turn() {
        let transcript = vec![
            Message::assistant("greeting"),
            Message::user("What is the airspeed velocity of an unladen swallow?"),
        ];
        let title = default_title(&transcript);
        assert!(title.starts_with("What is the airspeed velocity"));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_default_title_empty_transcript() {
        assert_eq!(default_title(&[]), "Chat");
    }
}
