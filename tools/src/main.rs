//! round-runner: headless host for the round core.
//!
//! Usage:
//!   round-runner --seed 12345 --rounds 5 --lang ru
//!   round-runner --config data/game.json --realtime
//!   round-runner --seed 12345 --json
//!   round-runner --seed 12345 --ipc-mode     (JSON commands on stdin)

mod console;
mod locale;

use anyhow::Result;
use console::{ConsoleSink, OutputMode};
use crash_core::{
    clock::{FrameSource, ManualClock, RealtimeClock},
    config::GameConfig,
    history::HistoryEntry,
    presentation::FixedGeometry,
    sequencer::{RngStreams, RoundSequencer},
};
use std::env;
use std::io::{self, BufRead, Stdout, Write};

type Runner = RoundSequencer<FixedGeometry, ConsoleSink<Stdout>>;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Launch,
    GetHistory,
    Quit,
}

#[derive(serde::Serialize)]
struct HistoryReply<'a> {
    completed_rounds: u64,
    history:          &'a [HistoryEntry],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let rounds = parse_arg(&args, "--rounds", 3u64);
    let realtime = has_flag(&args, "--realtime");
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let json = ipc_mode || has_flag(&args, "--json");
    let lang = locale::lookup_or_default(string_arg(&args, "--lang").unwrap_or("en"));

    let config = match string_arg(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if !json {
        println!("round-runner");
        println!("  seed:      {seed}");
        println!("  rounds:    {rounds}");
        println!("  language:  {}", lang.code);
        let codes: Vec<&str> = locale::ALL.iter().map(|t| t.code).collect();
        println!("  {}: {}", lang.languages, codes.join(", "));
        println!("  clock:     {}", if realtime { "realtime" } else { "virtual" });
        println!();
    }

    let mode = if json { OutputMode::Json } else { OutputMode::Text };
    let sink = ConsoleSink::new(io::stdout(), mode, lang);
    let mut sequencer = RoundSequencer::new(config, RngStreams::seeded(seed), FixedGeometry::default(), sink)?;

    let mut clock: Box<dyn FrameSource> = if realtime {
        Box::new(RealtimeClock::new())
    } else {
        Box::new(ManualClock::new())
    };

    if ipc_mode {
        run_ipc_loop(&mut sequencer, clock.as_mut())?;
    } else {
        for _ in 0..rounds {
            if let Err(e) = sequencer.run_round(clock.as_mut()) {
                log::error!("Round aborted: {e}");
            }
        }
        if !json {
            print_summary(&mut sequencer)?;
        }
    }

    Ok(())
}

fn run_ipc_loop(sequencer: &mut Runner, clock: &mut dyn FrameSource) -> Result<()> {
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                reply(&serde_json::json!({ "error": e.to_string() }))?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Launch => {
                if let Err(e) = sequencer.run_round(clock) {
                    reply(&serde_json::json!({ "error": e.to_string() }))?;
                }
            }
            IpcCommand::GetHistory => {
                let history: Vec<HistoryEntry> = sequencer.history().iter().cloned().collect();
                reply(&HistoryReply {
                    completed_rounds: sequencer.completed_rounds(),
                    history:          &history,
                })?;
            }
        }
    }
    Ok(())
}

fn reply<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", serde_json::to_string(value)?)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(sequencer: &mut Runner) -> Result<()> {
    let history = sequencer.history();
    let busts = history.iter().filter(|e| e.outcome.is_bust()).count();
    let best = history.iter().filter_map(|e| e.outcome.multiplier()).max();
    let window = sequencer.config().history.display_window;
    let recent = history.recent(window);
    let completed = sequencer.completed_rounds();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  rounds completed: {completed}");
    println!("  busts:            {busts}");
    println!("  wins:             {}", history.len() - busts);
    match best {
        Some(m) => println!("  best multiplier:  {m}"),
        None => println!("  best multiplier:  (none)"),
    }
    println!();
    sequencer.sink_mut().render_history(&recent)?;
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
