//! Interactive chat command backed by the assistant session.

use crate::assistant::{AssistantSession, FileKind};
use crate::cli::output::preview;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Files given on the command line.
#[derive(Debug, Default)]
pub struct Attachments {
    pub image: Option<String>,
    pub csv: Option<String>,
    pub json: Option<String>,
}

impl Attachments {
    fn iter(&self) -> impl Iterator<Item = (FileKind, &str)> {
        [
            (FileKind::Image, self.image.as_deref()),
            (FileKind::Csv, self.csv.as_deref()),
            (FileKind::Json, self.json.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|p| (kind, p)))
    }
}

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Clear,
    Files,
    Help,
    Attach(FileKind, &'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ChatInput::Exit;
    }
    if line.eq_ignore_ascii_case("clear") || line == "/clear" {
        return ChatInput::Clear;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Message(line);
    };
    let (name, arg) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    match (name, arg.trim()) {
        ("files", _) => ChatInput::Files,
        ("image" | "csv" | "json", path) if !path.is_empty() => match name.parse() {
            Ok(kind) => ChatInput::Attach(kind, path),
            Err(_) => ChatInput::Help,
        },
        _ => ChatInput::Help,
    }
}

/// Run the chat command: one question with `--message`, otherwise a REPL.
pub async fn run_chat(
    model: Option<String>,
    attachments: Attachments,
    message: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'palaver doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.llm.model = model;
    }

    let mut session = AssistantSession::new(&settings)?;
    for (kind, path) in attachments.iter() {
        attach(&mut session, kind, path, &settings).await;
    }

    if let Some(message) = message {
        let spinner = Output::spinner("Thinking...");
        let reply = session.chat(&message).await;
        spinner.finish_and_clear();
        println!("{}", reply);
        return Ok(());
    }

    println!("\n{}", style("Palaver Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use /image, /csv or /json <path> to attach files, /files to list them, 'clear' to reset.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Clear => {
                session.clear();
                Output::info("Conversation history cleared.");
            }
            ChatInput::Files => {
                if session.files().is_empty() {
                    Output::info("No files attached.");
                }
                for (kind, path) in session.files().iter() {
                    Output::kv(kind.as_str(), &path.display().to_string());
                }
            }
            ChatInput::Help => {
                Output::warning("Commands: /image <path>, /csv <path>, /json <path>, /files, /clear");
            }
            ChatInput::Attach(kind, path) => {
                attach(&mut session, kind, path, &settings).await;
            }
            ChatInput::Message(text) => {
                let spinner = Output::spinner("Thinking...");
                let result = session.try_chat(text).await;
                spinner.finish_and_clear();
                match result {
                    Ok(response) => {
                        for call in &response.tool_calls {
                            println!("{}", style(format!("  [{}] {}", call.name, preview(&call.result, 60))).dim());
                        }
                        println!("\n{} {}\n", style("Palaver:").cyan().bold(), response.content);
                    }
                    Err(e) => Output::error(&format!(
                        "I encountered an error: {}. Please make sure you have set up your OpenAI API key.",
                        e
                    )),
                }
            }
        }
    }

    Ok(())
}

async fn attach(session: &mut AssistantSession, kind: FileKind, path: &str, settings: &Settings) {
    if kind == FileKind::Image {
        if let Err(e) = preflight::check(Operation::Ocr, settings) {
            Output::warning(&format!("{} (text extraction will fail)", e));
        }
    }

    match session.attach(kind, Path::new(path), true).await {
        Ok(stored) => Output::success(&format!("Attached {}: {}", kind, stored.display())),
        Err(e) => Output::error(&format!("Could not attach {}: {}", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   "), ChatInput::Empty);
        assert_eq!(parse_input("QUIT"), ChatInput::Exit);
        assert_eq!(parse_input("clear"), ChatInput::Clear);
        assert_eq!(parse_input("/files"), ChatInput::Files);
        assert_eq!(
            parse_input("/csv  data/sales.csv "),
            ChatInput::Attach(FileKind::Csv, "data/sales.csv")
        );
        assert_eq!(parse_input("/image"), ChatInput::Help);
        assert_eq!(parse_input("/pdf report.pdf"), ChatInput::Help);
        assert_eq!(parse_input("what is in the file?"), ChatInput::Message("what is in the file?"));
    }

    #[test]
    fn test_attachments_order() {
        let attachments = Attachments {
            image: None,
            csv: Some("a.csv".to_string()),
            json: Some("b.json".to_string()),
        };
        let kinds: Vec<_> = attachments.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, [FileKind::Csv, FileKind::Json]);
    }
}
