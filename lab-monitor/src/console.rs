//! Operator console - line-oriented front end
//!
//! ```text
//! add <pc|console> <name…>        register equipment
//! start <sel> [minutes] [player…] start a session (default minutes from config)
//! start! <sel> [minutes] [player…] replace a running session
//! end <sel>                        end a session
//! delete <sel>                     remove equipment
//! in | out                         record entry / exit
//! list | stats | help | quit
//! ```
//!
//! `<sel>` is the 1-based position shown by `list`, an id, or a name. For
//! `start` the longest leading run of words naming an equipment wins, so
//! `start Console A 30` picks "Console A" and `start PC 2 30` picks "PC 2"
//! when both "PC" and "PC 2" exist.

use shared::models::{Equipment, EquipmentType, Notification, NotificationKind};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::core::{AppState, LoungeStats};
use crate::lounge::{LoungeCommand, StartMode};

pub const HELP: &str = "\
Commands:
  add <pc|console> <name>          register equipment
  start <sel> [minutes] [player]   start a session
  start! <sel> [minutes] [player]  replace a running session
  end <sel>                        end a session
  delete <sel>                     remove equipment
  in | out                         record entry / exit
  list | stats | help | quit
<sel> = number from `list`, id, or name";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Add {
        kind: EquipmentType,
        name: String,
    },
    /// Selector, minutes and player are split at execution time, once the
    /// equipment names are known
    Start {
        args: Vec<String>,
        force: bool,
    },
    End {
        selector: String,
    },
    Delete {
        selector: String,
    },
    Entry,
    Exit,
    List,
    Stats,
    Help,
    Quit,
    Empty,
}

/// Parse one input line. Errors are messages for the operator.
pub fn parse_line(line: &str) -> Result<ConsoleAction, String> {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Ok(ConsoleAction::Empty);
    };
    let rest: Vec<&str> = tokens.collect();

    match verb.to_ascii_lowercase().as_str() {
        "add" => {
            let (kind, name) = rest
                .split_first()
                .ok_or_else(|| "usage: add <pc|console> <name>".to_string())?;
            let kind = kind.parse::<EquipmentType>()?;
            Ok(ConsoleAction::Add {
                kind,
                name: name.join(" "),
            })
        }
        verb @ ("start" | "start!") => {
            if rest.is_empty() {
                return Err(format!("usage: {verb} <sel> [minutes] [player]"));
            }
            Ok(ConsoleAction::Start {
                args: rest.iter().map(|t| t.to_string()).collect(),
                force: verb == "start!",
            })
        }
        "end" | "stop" => Ok(ConsoleAction::End {
            selector: single_selector(&rest, "end")?,
        }),
        "delete" | "rm" => Ok(ConsoleAction::Delete {
            selector: single_selector(&rest, "delete")?,
        }),
        "in" | "entry" => Ok(ConsoleAction::Entry),
        "out" | "exit" => Ok(ConsoleAction::Exit),
        "list" | "ls" => Ok(ConsoleAction::List),
        "stats" => Ok(ConsoleAction::Stats),
        "help" | "?" => Ok(ConsoleAction::Help),
        "quit" | "q" => Ok(ConsoleAction::Quit),
        other => Err(format!("unknown command `{other}` (try `help`)")),
    }
}

/// Longest leading run of `tokens` that `lookup` resolves, plus the rest
fn split_selector<'a, T>(
    tokens: &'a [String],
    lookup: impl Fn(&str) -> Option<T>,
) -> Option<(T, &'a [String])> {
    (1..=tokens.len())
        .rev()
        .find_map(|n| lookup(&tokens[..n].join(" ")).map(|found| (found, &tokens[n..])))
}

/// `[minutes] [player…]` following the selector
fn session_args(args: &[String]) -> Result<(Option<u32>, Option<String>), String> {
    let (minutes, player) = match args.split_first() {
        Some((first, player)) => match first.parse::<i64>() {
            Ok(m) if m <= 0 => return Err("Duration must be a positive number of minutes".to_string()),
            Ok(m) => (Some(u32::try_from(m).unwrap_or(u32::MAX)), player),
            Err(_) => (None, args),
        },
        None => (None, args),
    };
    Ok((minutes, Some(player.join(" ")).filter(|p| !p.is_empty())))
}

fn single_selector(rest: &[&str], verb: &str) -> Result<String, String> {
    match rest {
        [] => Err(format!("usage: {verb} <sel>")),
        parts => Ok(parts.join(" ")),
    }
}

/// Apply a parsed action to the state, returning text to print
pub fn execute(state: &AppState, action: ConsoleAction) -> Option<String> {
    let resolve = |selector: &str| {
        state
            .find_equipment(selector)
            .map(|eq| eq.id)
            .ok_or_else(|| format!("no equipment matches `{selector}`"))
    };

    let command = match action {
        ConsoleAction::Empty | ConsoleAction::Quit => return None,
        ConsoleAction::Help => return Some(HELP.to_string()),
        ConsoleAction::List => return Some(render_list(&state.equipment())),
        ConsoleAction::Stats => return Some(render_stats(&state.stats())),
        ConsoleAction::Add { kind, name } => LoungeCommand::AddEquipment { name, kind },
        ConsoleAction::Start { args, force } => {
            let Some((equipment, rest)) = split_selector(&args, |sel| state.find_equipment(sel)) else {
                return Some(format!("no equipment matches `{}`", args.join(" ")));
            };
            let (minutes, player_name) = match session_args(rest) {
                Ok(parsed) => parsed,
                Err(msg) => return Some(msg),
            };
            LoungeCommand::StartSession {
                equipment_id: equipment.id,
                duration_minutes: minutes.unwrap_or(state.config().default_session_minutes),
                player_name,
                mode: if force { StartMode::Replace } else { StartMode::Reject },
            }
        }
        ConsoleAction::End { selector } => match resolve(&selector) {
            Ok(equipment_id) => LoungeCommand::EndSession { equipment_id },
            Err(msg) => return Some(msg),
        },
        ConsoleAction::Delete { selector } => match resolve(&selector) {
            Ok(equipment_id) => LoungeCommand::DeleteEquipment { equipment_id },
            Err(msg) => return Some(msg),
        },
        ConsoleAction::Entry => LoungeCommand::RecordEntry,
        ConsoleAction::Exit => LoungeCommand::RecordExit,
    };

    // Outcomes and rejections are reported through notifications
    let _ = state.dispatch(command);
    None
}

pub fn render_list(equipment: &[Equipment]) -> String {
    if equipment.is_empty() {
        return "No equipment registered. Add PCs and consoles to get started!".to_string();
    }
    equipment
        .iter()
        .enumerate()
        .map(|(i, eq)| {
            let status = match eq.current_session() {
                None => "Free".to_string(),
                Some(session) => {
                    let player = session
                        .player_name
                        .as_deref()
                        .map(|p| format!(" ({p})"))
                        .unwrap_or_default();
                    format!("Busy {}{}", session.remaining_display(), player)
                }
            };
            format!("{:>3}. [{:<7}] {:<20} {}", i + 1, eq.kind.label(), eq.name, status)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stats(stats: &LoungeStats) -> String {
    format!(
        "People inside: {} | Total entries: {} | In use: {} | Equipment: {}",
        stats.people_inside, stats.total_entries, stats.equipment_in_use, stats.total_equipment
    )
}

pub fn render_notification(n: &Notification) -> String {
    let tag = match n.kind {
        NotificationKind::Info => "[i]",
        NotificationKind::Success => "[ok]",
        NotificationKind::Warning => "[!]",
        NotificationKind::Error => "[x]",
    };
    match &n.description {
        Some(description) => format!("{tag} {} - {description}", n.title),
        None => format!("{tag} {}", n.title),
    }
}

/// Read commands from stdin until `quit`, EOF, or `shutdown` fires.
///
/// Notifications are printed as they arrive.
pub async fn run(state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut notifications = state.subscribe();

    println!("{HELP}");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = notifications.recv() => match received {
                Ok(n) => println!("{}", render_notification(&n)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Console fell behind on notifications");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(ConsoleAction::Quit) => break,
                    Ok(action) => {
                        if let Some(output) = execute(&state, action) {
                            println!("{output}");
                        }
                    }
                    Err(msg) => println!("{msg}"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{BroadcastSink, SilentAlert};
    use std::sync::Arc;

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse_line("add console PS5 Arena").unwrap(),
            ConsoleAction::Add {
                kind: EquipmentType::Console,
                name: "PS5 Arena".to_string()
            }
        );
        assert!(parse_line("add").is_err());
        assert!(parse_line("add arcade Pinball").is_err());
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_start_keeps_raw_args() {
        assert_eq!(
            parse_line("start PC01 60 Ana Clara").unwrap(),
            ConsoleAction::Start {
                args: args(&["PC01", "60", "Ana", "Clara"]),
                force: false
            }
        );
        assert_eq!(
            parse_line("start! 2 Bruno").unwrap(),
            ConsoleAction::Start {
                args: args(&["2", "Bruno"]),
                force: true
            }
        );
        assert!(parse_line("start").is_err());
    }

    #[test]
    fn test_split_selector_prefers_longest_name() {
        let names = ["PC", "PC 2", "Console A"];
        let lookup = |sel: &str| names.iter().find(|n| n.eq_ignore_ascii_case(sel)).copied();

        let tokens = args(&["PC", "2", "30"]);
        let (name, rest) = split_selector(&tokens, lookup).unwrap();
        assert_eq!(name, "PC 2");
        assert_eq!(rest, &args(&["30"])[..]);

        let tokens = args(&["PC", "45", "Ana"]);
        let (name, rest) = split_selector(&tokens, lookup).unwrap();
        assert_eq!(name, "PC");
        assert_eq!(rest, &args(&["45", "Ana"])[..]);

        let tokens = args(&["console", "a"]);
        assert_eq!(split_selector(&tokens, lookup).unwrap().0, "Console A");

        assert!(split_selector(&args(&["Xbox", "30"]), lookup).is_none());
    }

    #[test]
    fn test_session_args() {
        assert_eq!(session_args(&[]), Ok((None, None)));
        assert_eq!(
            session_args(&args(&["60", "Ana", "Clara"])),
            Ok((Some(60), Some("Ana Clara".to_string())))
        );
        assert_eq!(session_args(&args(&["Bruno"])), Ok((None, Some("Bruno".to_string()))));
        assert!(session_args(&args(&["0"])).is_err());
        assert!(session_args(&args(&["-5"])).is_err());
    }

    fn test_state() -> AppState {
        AppState::with_parts(
            crate::core::Config::with_work_dir("unused"),
            crate::storage::LocalStore::open_in_memory().unwrap(),
            Arc::new(BroadcastSink::new()),
            Arc::new(SilentAlert),
            BroadcastSink::new(),
        )
    }

    fn remaining_of(state: &AppState, name: &str) -> Option<u32> {
        state
            .find_equipment(name)
            .and_then(|eq| eq.current_session().map(|s| s.time_remaining))
    }

    #[test]
    fn test_start_resolves_multi_word_and_prefix_names() {
        let state = test_state();
        for line in ["add pc PC", "add pc PC 2", "add console Console A"] {
            assert_eq!(execute(&state, parse_line(line).unwrap()), None);
        }

        assert_eq!(execute(&state, parse_line("start PC 2 30").unwrap()), None);
        assert_eq!(remaining_of(&state, "PC 2"), Some(1800));
        assert_eq!(remaining_of(&state, "PC"), None);

        assert_eq!(execute(&state, parse_line("start Console A 45 Ana").unwrap()), None);
        let console = state.find_equipment("Console A").unwrap();
        let session = console.current_session().unwrap();
        assert_eq!(session.time_remaining, 45 * 60);
        assert_eq!(session.player_name.as_deref(), Some("Ana"));

        // Bare selector takes the configured default
        assert_eq!(execute(&state, parse_line("start 1").unwrap()), None);
        assert_eq!(remaining_of(&state, "PC"), Some(30 * 60));
    }

    #[test]
    fn test_start_reports_unknown_selector_and_bad_minutes() {
        let state = test_state();
        execute(&state, parse_line("add pc PC01").unwrap());

        let msg = execute(&state, parse_line("start Xbox 30").unwrap()).unwrap();
        assert!(msg.contains("no equipment matches"));

        let msg = execute(&state, parse_line("start PC01 0").unwrap()).unwrap();
        assert!(msg.contains("positive"));
        assert_eq!(state.stats().equipment_in_use, 0);
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_line("   ").unwrap(), ConsoleAction::Empty);
        assert_eq!(parse_line("IN").unwrap(), ConsoleAction::Entry);
        assert_eq!(parse_line("out").unwrap(), ConsoleAction::Exit);
        assert_eq!(
            parse_line("end Console A").unwrap(),
            ConsoleAction::End { selector: "Console A".into() }
        );
        assert!(parse_line("delete").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn test_render_list() {
        let mut busy = Equipment::new("PC01", EquipmentType::Pc);
        busy.attach_session(shared::models::Session::new(&busy.id, 2, Some("Ana".into())));
        let free = Equipment::new("Xbox", EquipmentType::Console);

        let text = render_list(&[busy, free]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("PC01") && lines[0].contains("Busy 2:00 (Ana)"));
        assert!(lines[1].contains("Xbox") && lines[1].ends_with("Free"));

        assert!(render_list(&[]).starts_with("No equipment"));
    }

    #[test]
    fn test_render_notification() {
        let n = Notification::warning("PC01 - 2 minutes left!")
            .with_description(Some("Player: Ana".into()));
        assert_eq!(render_notification(&n), "[!] PC01 - 2 minutes left! - Player: Ana");
    }
}
