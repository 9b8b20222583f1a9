//! `nutriscan chat`: one-shot questions or an interactive session.
//!
//! In interactive mode each stdin line is a message. Lines starting with `/`
//! are session commands:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `/history` | Print the conversation so far |
//! | `/suggest` | List suggested starter questions |
//! | `/suggest N` | Ask suggested question `N` |
//! | `/quit` | End the session |

use anyhow::Result;
use std::io::{BufRead, Write};

use nutriscan_core::assistant::NutritionAssistant;

use crate::config::Config;
use crate::providers::{build_assistant, ProviderFlags};

pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "What is the Nutri-Score?",
    "What is the NOVA group?",
    "Why avoid additives?",
    "How do I read a nutrition label?",
    "What are hidden sugars?",
];

/// A parsed line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Message(&'a str),
    History,
    ListSuggestions,
    Suggestion(usize),
    Quit,
    Blank,
    Unknown(&'a str),
}

pub fn parse_input(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Blank;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Message(line);
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "exit"), None) => ReplInput::Quit,
        (Some("history"), None) => ReplInput::History,
        (Some("suggest"), None) => ReplInput::ListSuggestions,
        (Some("suggest"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if (1..=SUGGESTED_QUESTIONS.len()).contains(&n) => ReplInput::Suggestion(n - 1),
            _ => ReplInput::Unknown(line),
        },
        _ => ReplInput::Unknown(line),
    }
}

/// Drive a chat session from `input` until EOF or `/quit`.
///
/// `context` is attached to every message sent.
pub fn run_repl<R: BufRead, W: Write>(
    assistant: &mut NutritionAssistant,
    context: &str,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "Chatting with {} ({}). /suggest for ideas, /quit to exit.",
        assistant.provider_config().provider,
        assistant.provider_config().model
    )?;

    for line in input.lines() {
        let line = line?;
        let message = match parse_input(&line) {
            ReplInput::Blank => continue,
            ReplInput::Quit => break,
            ReplInput::History => {
                for turn in assistant.history() {
                    writeln!(out, "[{}] {}", turn.role.as_str(), turn.content)?;
                }
                continue;
            }
            ReplInput::ListSuggestions => {
                for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
                    writeln!(out, "  {}. {}", i + 1, question)?;
                }
                continue;
            }
            ReplInput::Unknown(cmd) => {
                writeln!(out, "Unknown command: {}", cmd)?;
                continue;
            }
            ReplInput::Suggestion(i) => SUGGESTED_QUESTIONS[i],
            ReplInput::Message(text) => text,
        };

        let reply = assistant.chat(message, context);
        writeln!(out, "{}", reply)?;
        out.flush()?;
    }

    Ok(())
}

/// Run the chat command. With a message, answer it and exit; otherwise read
/// stdin interactively.
pub fn run_chat(
    config: &Config,
    flags: ProviderFlags<'_>,
    message: Option<&str>,
    context: Option<&str>,
) -> Result<()> {
    let mut assistant = build_assistant(config, flags)?;
    let context = context.unwrap_or("");

    match message {
        Some(message) => {
            println!("{}", assistant.chat(message, context));
            Ok(())
        }
        None => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            run_repl(&mut assistant, context, stdin.lock(), &mut stdout)
        }
    }
}
