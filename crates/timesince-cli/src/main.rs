use std::time::Duration;

use clap::{Parser, Subcommand};
use timesince_core::{
    format_elapsed, Button, Clock, Config, Dashboard, InsecureHttp, SystemClock,
};

mod term;

#[derive(Parser)]
#[command(name = "timesince", version, about = "Time-since board")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive board (arrows navigate, space resets, q quits)
    Run,
    /// Print each timer's label and elapsed time once
    Status,
    /// Print the configuration file path, writing defaults if absent
    ConfigPath,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run => run(),
        Commands::Status => {
            init_tracing();
            status()
        }
        Commands::ConfigPath => config_path(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();
}

fn build_and_prime(config: &Config) -> Result<Vec<timesince_core::Timer>, Box<dyn std::error::Error>> {
    let mut timers = config.build_timers(&SystemClock)?;
    for timer in timers.iter_mut() {
        if timer.is_pollable() && !timer.prime(Box::new(InsecureHttp::new()?)) {
            eprintln!("warning: initial check failed for '{}'", timer.label());
        }
    }
    Ok(timers)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let settle = Duration::from_millis(config.display.debounce_ms);
    let tick = Duration::from_millis(config.display.tick_ms);

    let mut timers = build_and_prime(&config)?;

    let _raw = term::RawMode::enter()?;
    let screen = term::TermScreen::new()?;
    let mut keys = term::KeyPins::new();
    let mut board = Dashboard::new(
        &mut timers,
        screen,
        Button::new(keys.action_pin(), settle),
        Button::new(keys.next_pin(), settle),
        Button::new(keys.prev_pin(), settle),
    );

    loop {
        keys.pump(tick)?;
        if keys.quit_requested() {
            return Ok(());
        }
        board.tick(SystemClock.now());
    }
}

fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let timers = build_and_prime(&config)?;
    let now = SystemClock.now();
    for timer in &timers {
        println!(
            "{:<16} {}",
            timer.label(),
            format_elapsed(timer.time_since(now))
        );
    }
    Ok(())
}

fn config_path() -> Result<(), Box<dyn std::error::Error>> {
    // Loading writes the default file on first run.
    let _ = Config::load()?;
    println!("{}", Config::path()?.display());
    Ok(())
}
