//! Interactive prompt loop

use std::io::Write;

use agent_core::Session;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Quit,
    Reset,
    History,
    Empty,
    Message(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "quit" | "exit" => Self::Quit,
            "clear" | "reset" => Self::Reset,
            "history" => Self::History,
            "" => Self::Empty,
            _ => Self::Message(trimmed),
        }
    }
}

/// Pretty JSON of the session transcript
pub fn history_json(session: &Session) -> String {
    serde_json::to_string_pretty(session.inspect_history()).unwrap_or_else(|e| format!("<{e}>"))
}

/// Run one round and print the reply or a retryable error
pub async fn ask(session: &mut Session, text: &str) -> bool {
    match session.advance_conversation(text).await {
        Ok(reply) => {
            println!("\n{reply}");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Round failed");
            eprintln!("\n{}", e.user_message());
            false
        }
    }
}

/// Prompt until `quit` or end of input
pub async fn chat_loop(session: &mut Session) -> anyhow::Result<()> {
    println!("Type your queries or 'quit' to exit.");
    println!("'clear' resets the conversation, 'history' shows the transcript.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nQuery: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Reset => {
                session.reset();
                println!("Conversation history cleared.");
            }
            Command::History => println!("{}", history_json(session)),
            Command::Empty => {}
            Command::Message(text) => {
                ask(session, text).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("  QUIT \n"), Command::Quit);
        assert_eq!(Command::parse("clear"), Command::Reset);
        assert_eq!(Command::parse("history"), Command::History);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse(" Who wrote BERT? "),
            Command::Message("Who wrote BERT?")
        );
    }
}
