use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use clearsweep_core::{
    Board, GameConfig, RandomMineGenerator, SolveReport, solve, solve_with_progress,
};
use rand::prelude::*;
use serde::Serialize;

mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Deduction-only minesweeper auto-solver", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Standard board size and mine count
    #[arg(short, long, value_enum, conflicts_with_all = ["rows", "cols", "mines"])]
    preset: Option<Preset>,

    /// Board rows
    #[arg(long, default_value_t = 9)]
    rows: u16,

    /// Board columns
    #[arg(long, default_value_t = 9)]
    cols: u16,

    /// Mine count
    #[arg(long, default_value_t = 10)]
    mines: u32,

    /// Number of boards to generate and solve
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print a count line after every counting pass
    #[arg(long)]
    progress: bool,

    /// Render the final state of every board
    #[arg(long)]
    show: bool,

    /// Render the fully revealed board (mines and all numbers)
    #[arg(long)]
    reveal: bool,

    /// Emit one JSON record per trial
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    /// 9x9, 10 mines
    Beginner,
    /// 16x16, 40 mines
    Intermediate,
    /// 16x30, 99 mines
    Expert,
}

impl Preset {
    fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new((9, 9), 10),
            Self::Intermediate => GameConfig::new((16, 16), 40),
            Self::Expert => GameConfig::new((16, 30), 99),
        }
    }
}

#[derive(Serialize)]
struct TrialRecord<'a> {
    trial: u32,
    seed: u64,
    solved: bool,
    elapsed_ms: u128,
    #[serde(flatten)]
    report: &'a SolveReport,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match args.preset {
        Some(preset) => preset.config(),
        None => GameConfig::new((args.rows, args.cols), args.mines),
    };
    config.validate().context("invalid board configuration")?;

    let base_seed = args.seed.unwrap_or_else(entropy_seed);
    log::debug!("base seed: {base_seed}");
    let mut seeder = SmallRng::seed_from_u64(base_seed);

    let mut wins = 0u32;
    let mut total_exploration = 0.0f64;
    let mut total_time = Duration::ZERO;

    for trial in 0..args.trials {
        let trial_seed: u64 = seeder.random();
        let mut board = Board::new(config)?;
        let start = (
            seeder.random_range(0..config.size.0),
            seeder.random_range(0..config.size.1),
        );
        let mut generator = RandomMineGenerator::from_seed(trial_seed);

        let clock = Instant::now();
        board.start(start, &mut generator)?;
        let report = if args.progress {
            solve_with_progress(&mut board, |snapshot| {
                println!(
                    "pass: opened {} flagged {} covered {}",
                    snapshot.opened, snapshot.flagged, snapshot.covered
                );
            })
        } else {
            solve(&mut board)
        };
        let elapsed = clock.elapsed();

        let solved = board.is_solved();
        if solved {
            wins += 1;
        }
        total_exploration += report.exploration;
        total_time += elapsed;

        if args.reveal {
            print!("{}", render::full_view(&board));
            println!();
        }
        if args.show {
            print!("{}", render::player_view(&board));
            println!();
        }
        if args.json {
            let record = TrialRecord {
                trial,
                seed: trial_seed,
                solved,
                elapsed_ms: elapsed.as_millis(),
                report: &report,
            };
            println!("{}", serde_json::to_string(&record)?);
        }
        log::info!(
            "trial {trial}: {:?} after {} rounds, {:.1}% explored, flags {}/{}",
            report.outcome,
            report.rounds,
            report.exploration,
            report.tiles_flagged,
            report.total_mines,
        );
    }

    if !args.json {
        print_summary(args.trials, wins, total_exploration, total_time);
    }
    Ok(())
}

fn print_summary(trials: u32, wins: u32, total_exploration: f64, total_time: Duration) {
    if trials == 1 {
        if wins == 1 {
            println!("won");
        } else {
            println!("stuck: explored {total_exploration:.1}%");
        }
        return;
    }

    let count = f64::from(trials);
    println!("trials:          {trials}");
    println!("win rate:        {:.1}%", 100.0 * f64::from(wins) / count);
    println!("avg exploration: {:.1}%", total_exploration / count);
    println!("avg time:        {:?}", total_time / trials);
    println!("total time:      {total_time:?}");
}

fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
