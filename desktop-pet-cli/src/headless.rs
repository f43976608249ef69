//! Headless host: the pet on a virtual screen, driven from stdin.

use anyhow::{Context, Result};
use desktop_pet_core::{
    tray_menu, AppearanceKind, CommandSender, Config, EventReceiver, LogSurface, MenuItem, Outcome,
    Pet, PetCommand, Runner,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Run the pet until it quits, the time limit passes or the user presses
/// Ctrl-C.
pub async fn run(
    config: Config,
    appearance: AppearanceKind,
    time_limit: Option<Duration>,
    json: bool,
) -> Result<Outcome> {
    let screen = config.fallback_screen;
    let (pet, events) = Pet::new(config, screen, appearance).context("failed to create the pet")?;
    info!(%screen, "running headless");

    let (runner, commands, handle) = Runner::new(pet, LogSurface::new());
    let runner = match time_limit {
        Some(limit) => runner.with_time_limit(limit),
        None => runner,
    };

    let printer = tokio::spawn(print_events(events, json));
    let reader = tokio::spawn(read_commands(commands));
    let interrupt = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted");
                handle.cancel();
            }
        })
    };

    let result = runner.run().await;
    reader.abort();
    interrupt.abort();

    let (outcome, pet, _surface) = result.context("runner failed")?;
    // dropping the pet closes the event channel and lets the printer finish
    drop(pet);
    printer.await.context("event printer panicked")?;
    Ok(outcome)
}

/// Forward parsed stdin lines to the runner until stdin closes.
async fn read_commands(commands: CommandSender) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("tray") {
            for entry in tray_entries() {
                info!("tray: {entry}");
            }
            continue;
        }
        match line.parse::<PetCommand>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Err(err) => warn!(error = %err, "ignoring input"),
        }
    }

    debug!("stdin closed");
    Ok(())
}

/// The tray menu as text, one entry per item with the line that triggers it.
fn tray_entries() -> Vec<String> {
    tray_menu()
        .into_iter()
        .map(|item| match item {
            MenuItem::Action { label, command } => format!("{label} ({command})"),
            MenuItem::Separator => "-".to_string(),
        })
        .collect()
}

async fn print_events(mut events: EventReceiver, json: bool) {
    while let Some(event) = events.recv().await {
        if !json {
            info!("{event}");
            continue;
        }
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(error = %err, "failed to encode event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tray_entries_name_their_commands() {
        let entries = tray_entries();
        assert_eq!(entries, vec!["Show pet (show)", "Hide pet (hide)", "-", "Quit (quit)"]);

        // every listed command can be typed back in
        for entry in entries.iter().filter(|entry| entry.as_str() != "-") {
            let word = entry
                .rsplit_once('(')
                .and_then(|(_, rest)| rest.strip_suffix(')'))
                .unwrap();
            assert!(word.parse::<PetCommand>().is_ok(), "{word}");
        }
    }
}
