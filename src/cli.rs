//! Command-line interface and REPL
//!
//! The console host has no hardware, so every surface input is typed:
//!
//! ```text
//! press row2_5      tap select3     touch 2 on
//! turn 2 -4         note 36 100     refresh
//! ```

use crate::controller::SurfaceEvent;
use crate::grid::{ButtonEvent, ButtonId, UnknownButton};
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

pub const HELP: &str = "\
Commands:
  press <button>          button down (row1_1..row5_8, select1..select7, p1_up, p1_down)
  release <button>        button up
  tap <button>            button down then up
  touch <knob> on|off     knob touch (knobs 0-7)
  turn <knob> <delta>     knob turn
  note <note> <velocity>  pad note
  refresh                 repaint and show display and LEDs
  status                  show routing state as JSON
  help                    show this help
  quit                    exit";

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Surface input, delivered in order
    Input(Vec<SurfaceEvent>),
    Refresh,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("expected 'on' or 'off', got '{0}'")]
    InvalidSwitch(String),

    #[error(transparent)]
    Button(#[from] UnknownButton),
}

/// Parse one console line; blank lines yield `Ok(None)`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "press" | "down" => {
            let id = button(words.next(), "press")?;
            Command::Input(vec![SurfaceEvent::Button {
                id,
                event: ButtonEvent::Down,
            }])
        },
        "release" | "up" => {
            let id = button(words.next(), "release")?;
            Command::Input(vec![SurfaceEvent::Button {
                id,
                event: ButtonEvent::Up,
            }])
        },
        "tap" => {
            let id = button(words.next(), "tap")?;
            Command::Input(vec![
                SurfaceEvent::Button {
                    id,
                    event: ButtonEvent::Down,
                },
                SurfaceEvent::Button {
                    id,
                    event: ButtonEvent::Up,
                },
            ])
        },
        "touch" => {
            let index = number(words.next(), "touch", "a knob index")?;
            let touched = match words.next() {
                None => true,
                Some(word) => switch(word)?,
            };
            Command::Input(vec![SurfaceEvent::KnobTouch { index, touched }])
        },
        "turn" => {
            let index = number(words.next(), "turn", "a knob index")?;
            let delta = number(words.next(), "turn", "a delta")?;
            Command::Input(vec![SurfaceEvent::KnobTurn { index, delta }])
        },
        "note" => {
            let note = number(words.next(), "note", "a note number")?;
            let velocity = match words.next() {
                None => 127,
                Some(word) => parse_number(word)?,
            };
            Command::Input(vec![SurfaceEvent::GridNote { note, velocity }])
        },
        "refresh" | "r" => Command::Refresh,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn button(word: Option<&str>, command: &'static str) -> Result<ButtonId, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "a button name",
    })?;
    Ok(word.parse()?)
}

fn number<T: FromStr>(word: Option<&str>, command: &'static str, argument: &'static str) -> Result<T, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument { command, argument })?;
    parse_number(word)
}

fn parse_number<T: FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn switch(word: &str) -> Result<bool, CommandError> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(CommandError::InvalidSwitch(word.to_string())),
    }
}

/// Read lines until quit or end of input, forwarding each to `tx`
///
/// Blocks the calling thread; run it on a dedicated thread.
pub fn run_repl(tx: mpsc::UnboundedSender<String>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("surface> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                let quit = matches!(trimmed, "quit" | "exit");
                if tx.send(trimmed.to_string()).is_err() || quit {
                    break;
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                let _ = tx.send("quit".to_string());
                break;
            },
            Err(e) => return Err(e.into()),
        }
    }

    debug!("REPL closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ButtonRow;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_button_commands() {
        let id = ButtonId::row(ButtonRow::Row2, 4);
        assert_eq!(
            parse("press row2_5"),
            Command::Input(vec![SurfaceEvent::Button {
                id,
                event: ButtonEvent::Down
            }])
        );

        match parse("tap SELECT3") {
            Command::Input(events) => {
                assert_eq!(events.len(), 2);
                assert_eq!(
                    events[1],
                    SurfaceEvent::Button {
                        id: ButtonId::RowSelect(3),
                        event: ButtonEvent::Up
                    }
                );
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_knob_and_note_commands() {
        assert_eq!(
            parse("touch 2 off"),
            Command::Input(vec![SurfaceEvent::KnobTouch {
                index: 2,
                touched: false
            }])
        );
        assert_eq!(
            parse("turn 2 -4"),
            Command::Input(vec![SurfaceEvent::KnobTurn { index: 2, delta: -4 }])
        );
        assert_eq!(
            parse("note 36"),
            Command::Input(vec![SurfaceEvent::GridNote {
                note: 36,
                velocity: 127
            }])
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("refresh"), Command::Refresh);
        assert_eq!(parse("status"), Command::Status);
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_command("jump").unwrap_err(),
            CommandError::Unknown("jump".to_string())
        );
        assert!(matches!(
            parse_command("press").unwrap_err(),
            CommandError::MissingArgument { command: "press", .. }
        ));
        assert!(matches!(
            parse_command("press row9_1").unwrap_err(),
            CommandError::Button(_)
        ));
        assert_eq!(
            parse_command("turn 2 lots").unwrap_err(),
            CommandError::InvalidNumber("lots".to_string())
        );
        assert_eq!(
            parse_command("touch 1 maybe").unwrap_err(),
            CommandError::InvalidSwitch("maybe".to_string())
        );
        assert!(parse_command("note 300").is_err());
    }
}
