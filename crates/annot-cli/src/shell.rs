//! Interactive shell
//!
//! Reads one command per line and dispatches it like a one-shot invocation.
//! Between lines the loop wakes at the debounce deadline so edits are
//! persisted while the annotator is idle.

use crate::app::App;
use annot_state::Clock;
use clap::Command;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const PROMPT_HELP: &str = "commands: status, load, identity, questionnaires, answer, show, next, \
prev, save, correct, media, export, import, clear, help, quit";

fn shell_cli() -> Command {
    Command::new("annot")
        .no_binary_name(true)
        .disable_version_flag(true)
        .subcommand_required(true)
        .subcommands(crate::commands())
}

/// Run the shell until `quit` or end of input
pub(crate) async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{PROMPT_HELP}");

    loop {
        let wait = write_delay(app);
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => continue,
                    "quit" | "exit" => break,
                    "help" => {
                        println!("{PROMPT_HELP}");
                        continue;
                    }
                    _ => {}
                }
                if let Err(e) = execute(app, &line).await {
                    eprintln!("error: {e:#}");
                }
            }
            () = sleep_or_pend(wait) => {
                if let Err(e) = app.session_mut().tick() {
                    eprintln!("error: {e:#}");
                }
            }
        }
    }
    Ok(())
}

async fn execute(app: &mut App, line: &str) -> anyhow::Result<()> {
    let words = split_words(line)?;
    let matches = match shell_cli().try_get_matches_from(words) {
        Ok(matches) => matches,
        Err(e) => {
            // clap renders usage and help itself
            e.print()?;
            return Ok(());
        }
    };
    match matches.subcommand() {
        Some((name, args)) => app.dispatch(name, args).await,
        None => Ok(()),
    }
}

/// Time until the pending write is due
fn write_delay(app: &mut App) -> Option<Duration> {
    let session = app.session_mut();
    let deadline = session.next_write_at()?;
    let remaining = deadline.saturating_sub(session.clock().now());
    Some(Duration::from_millis(u64::try_from(remaining).unwrap_or(0)))
}

async fn sleep_or_pend(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

/// Split a command line into words, honoring single and double quotes
fn split_words(line: &str) -> anyhow::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        anyhow::bail!("unterminated {q} quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
