//! Cribwatch CLI
//!
//! Usage:
//!   cribwatch                                # Interactive mode (type signals)
//!   cribwatch --replay frames.jsonl          # Replay recorded landmark frames
//!   cribwatch --serve                        # HTTP + WebSocket API server
//!   cribwatch --replay frames.jsonl --json   # JSON output

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use cribwatch::core::{
    dispatch, replay, run_server, Driver, GameConfig, Notifier, ReplaySource, Session,
    SessionClock, TerminalNotifier, TracingNotifier, DRIVER_PERIOD_MS,
};
use cribwatch::types::{BehaviorSignals, SessionState, SessionStatus};
use cribwatch::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "cribwatch",
    version = VERSION,
    about = "Cribwatch - sneak a look at your notes without the observer catching you",
    long_about = "Cribwatch turns camera landmarks into behaviour signals and pits them\n\
                  against an observer that idles, approaches and scans on a random schedule.\n\n\
                  Actions:\n  \
                  HIDDEN_NOTE - look down with an open hand\n  \
                  NEIGHBOR    - turn your head right\n\n\
                  Observer:\n  \
                  IDLE        - safe\n  \
                  PREPARING   - warning, a scan is coming\n  \
                  SCANNING    - any flagged action gets you caught"
)]
struct Args {
    /// Replay a JSON Lines file of landmark snapshots
    #[arg(short, long)]
    replay: Option<String>,

    /// Interactive mode - type signals on stdin while the clock runs
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON config file (missing fields use defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Fix the random seed for a reproducible observer schedule
    #[arg(long)]
    seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show debug logs
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if args.interactive {
        run_interactive(&args, config).await
    } else if args.serve {
        run_serve(&args, config).await
    } else if let Some(ref path) = args.replay {
        run_replay(path, &args, config)
    } else {
        run_interactive(&args, config).await
    }
}

/// Logs go to stderr so JSON on stdout stays parseable
fn init_tracing(args: &Args) {
    let default = if args.verbose {
        "cribwatch=debug"
    } else if args.serve {
        "cribwatch=info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Replay recorded frames on a virtual clock
fn run_replay(path: &str, args: &Args, config: GameConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let mut source = ReplaySource::new(path);
    let mut notifier: Box<dyn Notifier> = if args.json {
        Box::new(TracingNotifier)
    } else {
        print_header("Replay", args.no_color);
        Box::new(TerminalNotifier::stdout(args.no_color))
    };

    let summary = replay(&mut session, &mut source, notifier.as_mut())
        .with_context(|| format!("replay of {} failed", path))?;

    if args.json {
        let out = serde_json::json!({
            "frames": summary.frames,
            "failed_frames": summary.failed_frames,
            "status": summary.status,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!();
        print_status(&summary.status, args);
        println!(
            "Frames: {} ({} dropped) | Observer cycles: {}",
            summary.frames,
            summary.failed_frames,
            session.observer_cycles()
        );
    }
    Ok(())
}

/// Interactive commands
enum Command {
    Start,
    Intro,
    Signals(BehaviorSignals),
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "restart" | "s" => Command::Start,
        "intro" => Command::Intro,
        "note" | "down+hand" | "d" => Command::Signals(BehaviorSignals {
            looking_down: true,
            looking_right: false,
            hand_open: true,
        }),
        "right" | "neighbor" | "r" => Command::Signals(BehaviorSignals {
            looking_down: false,
            looking_right: true,
            hand_open: false,
        }),
        "idle" | "i" | "" => Command::Signals(BehaviorSignals::none()),
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown,
    }
}

/// Run a real-time session driven by typed signals
async fn run_interactive(args: &Args, config: GameConfig) -> anyhow::Result<()> {
    let clock = SessionClock::new();
    let session = Arc::new(Mutex::new(Session::new(config)));
    let mut notifier = TerminalNotifier::stdout(args.no_color);
    let mut driver = Driver::spawn(
        session.clone(),
        clock,
        Box::new(TerminalNotifier::stdout(args.no_color)),
        Duration::from_millis(DRIVER_PERIOD_MS),
    );

    print_header("Interactive", args.no_color);
    println!("Commands: start | note (d) | right (r) | idle (i, empty line) | intro | quit");
    println!("Goal: score while the observer is not scanning. Freeze when it is.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut refresh = tokio::time::interval(Duration::from_millis(250));
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_shown: Option<(u32, SessionState)> = None;

    loop {
        tokio::select! {
            _ = refresh.tick() => {}
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let now = clock.now_ms();
                let mut session = session.lock().await;
                match parse_command(&line) {
                    Command::Start => match session.start_or_restart(now) {
                        Ok(events) => {
                            dispatch(&mut notifier, &events);
                        }
                        Err(err) => println!("  ✗ {}", err),
                    },
                    Command::Intro => {
                        if let Err(err) = session.return_to_intro() {
                            println!("  ✗ {}", err);
                        }
                    }
                    Command::Signals(signals) => {
                        let events = session.submit_signals(now, signals);
                        dispatch(&mut notifier, &events);
                    }
                    Command::Quit => {
                        println!("\nSession ended. Score: {:.0}", session.score());
                        break;
                    }
                    Command::Unknown => println!("  ? unknown command"),
                }
                last_shown = None;
            }
        }

        let status = session.lock().await.status();
        let key = (status.time_remaining_secs, status.state);
        if last_shown != Some(key) {
            print_status(&status, args);
            last_shown = Some(key);
        }
    }

    driver.stop();
    Ok(())
}

/// Run HTTP API server
async fn run_serve(args: &Args, config: GameConfig) -> anyhow::Result<()> {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║  👁 Cribwatch API Server                                    ║");
    println!("║  Version: {}                                            ║", VERSION);
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("  POST /session/new            - Create session");
    println!("  GET  /session/:id            - Get status");
    println!("  DELETE /session/:id          - Drop session");
    println!("  POST /session/:id/start      - Start / restart");
    println!("  POST /session/:id/intro      - Back to intro");
    println!("  POST /session/:id/frame      - Submit landmarks");
    println!("  POST /session/:id/signals    - Submit signals");
    println!("  POST /session/:id/perception - Report camera status");
    println!("  WS   /ws/:id                 - Live events");
    println!("  GET  /health                 - Health check");
    println!();

    run_server(&args.addr, config).await
}

/// Print header
fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Cribwatch v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("\x1b[1m╔════════════════════════════════════════════════════════════╗\x1b[0m");
        println!("\x1b[1m║           Cribwatch v{} - {}                    ║\x1b[0m", VERSION, mode);
        println!("\x1b[1m╚════════════════════════════════════════════════════════════╝\x1b[0m");
    }
    println!();
}

/// Print one status line in the selected format
fn print_status(status: &SessionStatus, args: &Args) {
    if args.json {
        match serde_json::to_string(status) {
            Ok(json) => println!("{}", json),
            Err(err) => tracing::warn!(error = %err, "status not serializable"),
        }
    } else if args.no_color {
        println!("{}", status.to_parseable_string());
    } else {
        let color = status.state.color_code();
        let reset = SessionState::color_reset();
        match status.state {
            SessionState::Playing => println!("{}", status.to_terminal_string()),
            SessionState::Caught => {
                println!("{}{} GAME OVER - score {:.0}{}", color, status.state.emoji(), status.score, reset)
            }
            SessionState::Finished => println!(
                "{}{} EXAM OVER - {:.0} points{}",
                color,
                status.state.emoji(),
                status.score,
                reset
            ),
            SessionState::Intro => println!(
                "{}{} [{}] {}{}",
                color,
                status.state.emoji(),
                status.state,
                status.reason.description(),
                reset
            ),
        }
    }
}
