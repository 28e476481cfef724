use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use deskplant_core::{AppRuntime, Command, LemonSqueezyClient, PlantType};

use super::{open_coordinator, CmdResult};

const HELP: &str =
    "commands: start, break, pause, resume, stop, skip, status, plant <type>, validate, quit";

pub fn run() -> CmdResult {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async())
}

async fn run_async() -> CmdResult {
    let coordinator = open_coordinator()?;
    let client = Arc::new(LemonSqueezyClient::new(
        &coordinator.config().license.api_base_url,
    ));
    let (runtime, handle) = AppRuntime::new(coordinator, client);

    let mut events = handle.subscribe();
    let runtime_task = tokio::spawn(runtime.run());
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "event not printable"),
                },
                Err(RecvError::Lagged(missed)) => tracing::warn!(missed, "output fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    handle.send(Command::Snapshot).await?;
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(Command::Shutdown)) => break,
            Ok(Some(command)) => handle.send(command).await?,
            Ok(None) => {}
            Err(msg) => eprintln!("error: {msg}"),
        }
    }

    handle.send(Command::Shutdown).await?;
    let coordinator = runtime_task.await?;
    drop(handle);
    printer.await?;
    tracing::info!(
        sessions = coordinator.engine().sessions_completed(),
        health = coordinator.plant().health(),
        "bye"
    );
    Ok(())
}

/// One stdin line to a runtime command. Blank lines are ignored.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "start" | "work" => Command::StartWork,
        "break" => Command::StartBreak,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stop" => Command::Stop,
        "skip" => Command::Skip,
        "status" => Command::Snapshot,
        "validate" => Command::ValidateLicense,
        "plant" => {
            let name = words.next().ok_or("plant needs a type")?;
            let plant_type: PlantType = name.parse().map_err(|e| format!("{e}"))?;
            Command::SetPlantType(plant_type)
        }
        "quit" | "exit" => Command::Shutdown,
        "help" => {
            eprintln!("{HELP}");
            return Ok(None);
        }
        other => return Err(format!("unknown command '{other}' ({HELP})")),
    };
    Ok(Some(command))
}
