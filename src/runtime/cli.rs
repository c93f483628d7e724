use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::Sender;
use std::thread;

use tracing::warn;

/// A parsed operator command (spec §4.7). `Unknown` carries nothing; the
/// caller just needs to know to print the usage hint.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { ip: String, weight: u32 },
    Del { ip: String },
    Trace { ip: String },
    Quit,
    Unknown,
}

const USAGE: &str = "usage: add <ip> <weight> | del <ip> | trace <ip> | quit";

pub fn usage_line() -> &'static str {
    USAGE
}

/// Parses one line of operator input. Blank lines and lines that don't
/// match a known verb both become `Unknown`; malformed arguments to a
/// known verb do too (spec §7: "operator command error ... no state
/// change").
pub fn parse_command(line: &str) -> Command {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("add") => match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(ip), Some(weight), None) => match weight.parse::<u32>() {
                Ok(weight) if weight > 0 => Command::Add {
                    ip: ip.to_string(),
                    weight,
                },
                _ => Command::Unknown,
            },
            _ => Command::Unknown,
        },
        Some("del") => match (tokens.next(), tokens.next()) {
            (Some(ip), None) => Command::Del { ip: ip.to_string() },
            _ => Command::Unknown,
        },
        Some("trace") => match (tokens.next(), tokens.next()) {
            (Some(ip), None) => Command::Trace { ip: ip.to_string() },
            _ => Command::Unknown,
        },
        Some("quit") if tokens.next().is_none() => Command::Quit,
        _ => Command::Unknown,
    }
}

/// Spawns a dedicated thread that blocks on stdin and forwards each line
/// to `tx`. The main loop drains the channel without ever blocking on
/// input itself, so it stays free to service the socket and the timer
/// (spec §5's "single-threaded event loop multiplexing a socket, a timer,
/// and a stdin stream").
///
/// On EOF (or a read error) the thread pushes a terminal `"quit"` line
/// before returning, matching the reference's treatment of `EOFError` on
/// its input loop as an implicit `quit` (`original_source/router.py`
/// `_cli_loop`) — otherwise a node whose stdin is closed (the normal way
/// a scripted harness ends a run) would never stop.
pub fn spawn_stdin_reader(tx: Sender<String>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let reader = BufReader::new(stdin.lock());
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!("stdin read error: {err}");
                    break;
                }
            }
        }
        let _ = tx.send("quit".to_string());
    });
}

/// Reads commands from a startup file, one per line, in order. Used by
/// `main` before the event loop starts; empty lines are ignored.
pub fn read_startup_commands(mut reader: impl Read) -> std::io::Result<Vec<String>> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents
        .lines()
        .map(str::to_string)
        .filter(|line| !line.trim().is_empty())
        .collect())
}
