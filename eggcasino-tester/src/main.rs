mod reports;
mod simulation;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use eggcasino_game::{PlinkoConfig, SlotsConfig, SpinTuning, WheelTable};
use simulation::{GameKind, GameReport, SimulationPlan, run_game};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "eggcasino-tester", version)]
#[command(about = "Headless simulation and QA checks for the egg casino minigames")]
struct Args {
    /// Games to simulate (comma-separated, or "all")
    #[arg(long, default_value = "wheel")]
    games: String,

    /// List all available games and exit
    #[arg(long)]
    list_games: bool,

    /// Seeds to run (comma-separated; decimal, 0x-hex or a..b ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Rounds to play per game and seed
    #[arg(long, default_value_t = 100)]
    spins: u32,

    /// Eggs wagered per round
    #[arg(long, default_value_t = 10)]
    wager: u64,

    /// Simulated frame rate for wheel animation
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Cancel each wheel spin after this many frames
    #[arg(long)]
    cancel_after: Option<u32>,

    /// JSON file with a custom wheel table
    #[arg(long)]
    wheel_config: Option<PathBuf>,

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

    if maybe_list_games(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let games = expand_games(&args.games)?;
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let plan = build_plan(&args)?;

    let mut results = Vec::new();
    for &game in &games {
        for &seed in &seeds {
            if args.verbose {
                println!(
                    "🎰 Simulating {} (seed {seed}, {} rounds)",
                    game.key().bright_white(),
                    plan.spins
                );
            }
            results.push(run_game(game, &plan, seed));
        }
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_games(args: &Args) -> Result<bool> {
    if !args.list_games {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available games:")?;
    for game in GameKind::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            game.key(),
            game.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🥚 Egg Casino Simulator".bright_cyan().bold());
    println!("{}", "=======================".cyan());
}

fn expand_games(games_arg: &str) -> Result<Vec<GameKind>> {
    let mut games = Vec::new();
    for token in split_csv(games_arg) {
        if token.eq_ignore_ascii_case("all") {
            games.extend(GameKind::ALL);
        } else if let Some(game) = GameKind::from_key(&token) {
            games.push(game);
        } else {
            bail!("unknown game '{token}' (try --list-games)");
        }
    }
    games.sort_unstable();
    games.dedup();
    Ok(games)
}

fn build_plan(args: &Args) -> Result<SimulationPlan> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        bail!("--fps must be positive (got {})", args.fps);
    }
    let table = match &args.wheel_config {
        Some(path) => load_wheel_table(path)?,
        None => WheelTable::default(),
    };
    Ok(SimulationPlan {
        spins: args.spins,
        wager: args.wager,
        fps: args.fps,
        cancel_after: args.cancel_after,
        table,
        tuning: SpinTuning::default(),
        slots: SlotsConfig::default(),
        plinko: PlinkoConfig::default(),
    })
}

fn load_wheel_table(path: &Path) -> Result<WheelTable> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    WheelTable::from_json(&json)
        .with_context(|| format!("invalid wheel table in {}", path.display()))
}

fn write_reports(args: &Args, results: &[GameReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(&mut output_target, results)?,
        "markdown" => reports::generate_markdown_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No games simulated.")?;
            } else {
                reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
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
