use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use roguesweeper_core::{Run, RunConfig, Stage};

mod autoplay;

use autoplay::AutoPlayer;

#[derive(Parser, Debug)]
#[command(version, about = "Plays roguesweeper runs without a front end", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random, later runs count up from it
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run configuration as TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How many runs to play
    #[arg(short = 'n', long, default_value_t = 1)]
    runs: u32,

    /// Stop a run once this stage is cleared
    #[arg(long, default_value_t = 10)]
    max_stages: Stage,

    /// Chance per move of a blind guess instead of a hint
    #[arg(long, default_value_t = 0.05)]
    guess_rate: f64,

    /// Print every final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config {}", path.display()))?;
    let config: RunConfig =
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {args:?}");

    ensure!(
        (0.0..=1.0).contains(&args.guess_rate),
        "guess rate must be between 0 and 1"
    );

    let base_config = load_config(args.config.as_ref())?;
    let base_seed = args.seed.or(base_config.seed).unwrap_or_else(rand::random);

    for index in 0..args.runs {
        let seed = base_seed.wrapping_add(index.into());
        let mut run = Run::new(base_config.clone().with_seed(seed))?;
        let mut player = AutoPlayer::new(
            SmallRng::seed_from_u64(seed),
            args.guess_rate,
            args.max_stages,
        );

        let report = player.play(&mut run)?;
        println!(
            "seed {:>20}  {:?} on stage {:>3}  cleared {:>3} ({} perfect)  score {:>7}  lives {}  hints {}",
            report.seed,
            report.phase,
            report.stage,
            report.stages_cleared,
            report.perfect_clears,
            report.total_score,
            report.lives,
            report.hints_used,
        );
        if args.json {
            println!("{}", serde_json::to_string_pretty(&run.snapshot())?);
        }
    }

    Ok(())
}
