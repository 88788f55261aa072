mod draws;
mod reports;
mod simulation;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;
use yearbeast_game::{FileStorage, GameConfig, MemoryStorage};

use draws::{DrawSummary, run_draws};
use simulation::{PlayConfig, PlayRecord, run_play};
use util::parse_seeds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Scripted Year Beast play sessions
    Play,
    /// Omikuji draw distribution
    Omikuji,
    /// Run both
    Both,
}

impl TestMode {
    const fn plays(self) -> bool {
        matches!(self, Self::Play | Self::Both)
    }

    const fn draws(self) -> bool {
        matches!(self, Self::Omikuji | Self::Both)
    }
}

#[derive(Debug, Parser)]
#[command(name = "yearbeast-tester", version)]
#[command(about = "Seeded, headless play sessions and omikuji draw checks for Year Beast")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = TestMode::Both)]
    mode: TestMode,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Levels to clear per play session
    #[arg(long, default_value_t = 3)]
    levels: u32,

    /// Milliseconds between scripted taps
    #[arg(long, default_value_t = 200)]
    tap_interval_ms: u64,

    /// Omikuji draws per seed
    #[arg(long, default_value_t = 1_000)]
    draws: u32,

    /// Allowed gap between observed and weighted omikuji shares
    #[arg(long, default_value_t = 0.05)]
    tolerance: f64,

    /// Game config JSON; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist play sessions as JSON files in this directory instead of memory
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_ref())?;
    let seeds = parse_seeds(&args.seeds)?;

    let plays = run_plays(&args, &config, &seeds);
    let draws = run_omikuji(&args, &seeds)?;

    write_reports(&args, &plays, &draws, start_time)?;

    if plays.iter().any(|p| !p.passed()) || draws.iter().any(|d| !d.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🧨 Year Beast Tester".bright_red().bold());
    println!("{}", "====================".red());
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::standard());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn run_plays(args: &Args, config: &GameConfig, seeds: &[u64]) -> Vec<PlayRecord> {
    if !args.mode.plays() {
        return Vec::new();
    }

    println!("{}", "🎯 Running Play Sessions".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    seeds
        .iter()
        .map(|&seed| {
            let play = PlayConfig::new(seed)
                .with_levels(args.levels)
                .with_tap_interval(args.tap_interval_ms);
            let record = match &args.save_dir {
                Some(dir) => {
                    let config = GameConfig {
                        save_slot: format!("{}-{seed}", config.save_slot),
                        ..config.clone()
                    };
                    run_play(FileStorage::new(dir), &config, play)
                }
                None => run_play(MemoryStorage::new(), config, play),
            };
            if args.verbose {
                println!(
                    "  seed {seed}: {} levels, {} taps",
                    record.levels_cleared, record.taps
                );
            }
            record
        })
        .collect()
}

fn run_omikuji(args: &Args, seeds: &[u64]) -> Result<Vec<DrawSummary>> {
    if !args.mode.draws() {
        return Ok(Vec::new());
    }

    println!("{}", "⛩️  Drawing Omikuji".bright_magenta().bold());
    println!("{}", "-".repeat(30).magenta());

    let catalog = omikuji_game::catalog();
    seeds
        .iter()
        .map(|&seed| run_draws(catalog, seed, args.draws, args.tolerance))
        .collect()
}

fn write_reports(
    args: &Args,
    plays: &[PlayRecord],
    draws: &[DrawSummary],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, plays, draws)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, plays, draws)?,
        _ => {
            let duration = start_time.elapsed();
            if plays.is_empty() && draws.is_empty() {
                writeln!(&mut output_target, "Nothing executed.")?;
            } else {
                reports::generate_console_report(&mut output_target, plays, draws, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
