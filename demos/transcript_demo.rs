//! Transcript Demo: plays a boot transcript, then echoes commands.
//!
//! Usage: `cargo run --example transcript_demo [script.json]`
//!
//! Logs go to `typeout-demo.log`; set `RUST_LOG=typeout=debug` for phase
//! transitions or `typeout=trace` for every tick.
//!
//! Press Escape or Ctrl-C to quit.

use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use typeout::{OutputBlock, Script, Session, SessionConfig, Theme};

fn boot_script() -> Script {
    Script::new(vec![
        OutputBlock::text("typeout 0.1.0")
            .with_theme(Theme::Primary)
            .with_timestamp("00:00"),
        OutputBlock::text("mounting transcript")
            .wait_before(200)
            .wait_after_rounds(1)
            .then(OutputBlock::text("ok").with_theme(Theme::Dark).reveal_budget(100)),
        OutputBlock::text("Type a command and press Enter. Try `help`.")
            .wait_before(300)
            .reveal_budget(1200),
    ])
}

fn respond(command: &str) -> Vec<OutputBlock> {
    let command = command.trim();
    match command {
        "" => Vec::new(),
        "help" => vec![
            OutputBlock::text("help     this message\nslow     a long held reply\nanything else is echoed"),
        ],
        "slow" => vec![
            OutputBlock::text("thinking").wait_after_rounds(2),
            OutputBlock::text("done.").with_theme(Theme::Dark),
        ],
        other => vec![
            OutputBlock::text(format!("$ {other}")).with_theme(Theme::Dark).reveal_budget(0),
            OutputBlock::text(format!("command not found: {other}")).with_theme(Theme::Error),
        ],
    }
}

fn main() -> typeout::Result<()> {
    let log = File::create("typeout-demo.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typeout=info")),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .try_init();

    let script = match std::env::args().nth(1) {
        Some(path) => Script::load(path)?,
        None => boot_script(),
    };

    let mut handler = respond;
    let mut session = Session::with_config(&script, SessionConfig::default())?;
    session.run(&mut handler)
}
