//! Interactive chat
//!
//! Line-oriented front end over a [`Session`]. Plain lines are questions;
//! `/good`, `/bad <text>` and `/quit` are commands.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;

use crate::agents::{Coordinator, Feedback, Session};

const PROMPT: &str = "aqualens> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Query(String),
    Good,
    Bad(String),
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Query(line.to_string());
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match command {
        "/good" => ChatInput::Good,
        "/bad" => ChatInput::Bad(rest.trim().to_string()),
        "/quit" | "/exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other.to_string()),
    }
}

pub struct ChatRepl {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    session: Session,
}

impl ChatRepl {
    pub fn new(coordinator: Arc<Coordinator>, history_path: Option<PathBuf>) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = history_path.as_ref().filter(|p| p.exists()) {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            editor,
            history_path,
            session: Session::new(coordinator),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("AquaLens water-quality assistant");
        println!("Ask a question, then rate the answer with /good or /bad <what was wrong>. /quit exits.");

        loop {
            let line = match self.editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(anyhow::anyhow!("Readline error: {}", err)),
            };
            let _ = self.editor.add_history_entry(line.trim());

            match parse_chat_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::Query(query) => {
                    let answer = self.session.ask(&query).await;
                    println!("\n{}\n", answer);
                }
                ChatInput::Good => self.send_feedback(Feedback::Helpful).await,
                ChatInput::Bad(text) => self.send_feedback(Feedback::NotHelpful(text)).await,
                ChatInput::Unknown(command) => println!("Unknown command {}", command),
            }
        }

        if let Some(path) = &self.history_path {
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    async fn send_feedback(&self, feedback: Feedback) {
        match self.session.feedback(&feedback).await {
            Ok(reflection) => match reflection.score {
                Some(score) => println!("Thanks. Reflection #{} saved (score {}).", reflection.id, score),
                None => println!("Thanks. Reflection #{} saved.", reflection.id),
            },
            Err(e) => println!("Feedback not recorded: {}", e),
        }
    }
}
