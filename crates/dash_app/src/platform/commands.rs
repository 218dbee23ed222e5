//! Interactive commands read from stdin.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use dash_core::Msg;
use engine_logging::{engine_info, engine_warn};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("expected `autoscroll on` or `autoscroll off`, got `{0}`")]
    Autoscroll(String),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Msg>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('/') {
        return Ok(Some(Msg::Navigate(line.to_string())));
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let msg = match command {
        "search" => Msg::SearchChanged(rest.to_string()),
        "tag" if rest.is_empty() => Msg::TagSelected(None),
        "tag" => Msg::TagSelected(Some(rest.to_string())),
        "autoscroll" => match rest {
            "on" => Msg::AutoscrollToggled(true),
            "off" => Msg::AutoscrollToggled(false),
            other => return Err(CommandError::Autoscroll(other.to_string())),
        },
        "quit" | "exit" => Msg::Shutdown,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(msg))
}

/// Forwards parsed stdin commands until EOF, then asks the app to quit.
pub fn spawn_stdin_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(msg)) => {
                    if msg_tx.send(msg).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => eprintln!("{err}"),
            }
        }
        engine_info!("stdin closed; shutting down");
        let _ = msg_tx.send(Msg::Shutdown);
    });
}
