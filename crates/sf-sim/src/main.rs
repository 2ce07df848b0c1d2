//! ScratchForge simulator
//!
//! Usage:
//!   sf-sim run --seed 7 --clicks 3,1 --arm-before 1   - Play one scripted session
//!   sf-sim run --animate turbo                        - Same, with presentation timeline
//!   sf-sim audit --sessions 100000 --arm-rate 0.25    - Randomized protection audit
//!   sf-sim demo-config                                - Print the demo board as JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use sf_lottery::LotteryConfig;
use sf_present::PresentationTiming;
use sf_sim::{AuditOptions, SessionPlan, run_audit, run_session};

#[derive(Parser)]
#[command(name = "sf-sim", about = "ScratchForge lottery simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Timing {
    Normal,
    Turbo,
    Studio,
}

impl Timing {
    fn presentation(self) -> PresentationTiming {
        match self {
            Self::Normal => PresentationTiming::normal(),
            Self::Turbo => PresentationTiming::turbo(),
            Self::Studio => PresentationTiming::studio(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scripted session and print its log
    Run {
        /// Lottery config (.json / .yaml); demo board if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Slot indices to click, in order (default: every slot)
        #[arg(long, value_delimiter = ',')]
        clicks: Vec<usize>,
        /// Arm the jackpot before the click at this position
        #[arg(long)]
        arm_before: Option<usize>,
        /// Drive the presentation layer with this timing
        #[arg(long, value_enum)]
        animate: Option<Timing>,
    },
    /// Play many randomized sessions and check jackpot protection
    Audit {
        /// Lottery config (.json / .yaml); demo board if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short = 'n', long, default_value_t = 10_000)]
        sessions: usize,
        /// Base seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Share of sessions that arm the jackpot
        #[arg(long, default_value_t = 0.5)]
        arm_rate: f64,
        /// Worker threads (0 = all cores)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,
    },
    /// Print the built-in demo config
    DemoConfig,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            clicks,
            arm_before,
            animate,
        } => {
            let mut config = load_config(config.as_deref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            let plan = SessionPlan {
                clicks,
                arm_before,
                timing: animate.map(Timing::presentation),
            };
            let log = run_session(&config, &plan);
            println!("{}", serde_json::to_string_pretty(&log)?);
            if !log.violations.is_empty() {
                bail!("session broke {} invariant checks", log.violations.len());
            }
            Ok(())
        }
        Commands::Audit {
            config,
            sessions,
            seed,
            arm_rate,
            threads,
        } => {
            let config = load_config(config.as_deref())?;
            let options = AuditOptions {
                sessions,
                seed,
                arm_rate,
                threads,
            };
            let report = run_audit(&config, &options)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                bail!("audit failed: {} violations", report.violations);
            }
            Ok(())
        }
        Commands::DemoConfig => {
            println!("{}", LotteryConfig::demo().to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<LotteryConfig> {
    match path {
        Some(path) => LotteryConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            log::info!("No config given; using the demo board");
            Ok(LotteryConfig::demo())
        }
    }
}
