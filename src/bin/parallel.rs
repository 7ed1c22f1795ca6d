use ai_987::game::Game;
use ai_987::search::{SampledSearch, SearchConfig};
use ai_987::trace::{self, TraceRecorder};
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "parallel", about = "Play many seeded 987 games across threads")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 8)]
    games: u64,

    /// Seed of the first game; game i uses seed + i (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Lookahead plies
    #[arg(long, default_value_t = SearchConfig::default().depth)]
    depth: u32,

    /// Sampled spawns averaged per move
    #[arg(long, default_value_t = SearchConfig::default().breadth)]
    breadth: u32,

    /// Board dimension
    #[arg(long, default_value_t = ai_987::engine::DEFAULT_SIZE)]
    size: usize,

    /// Worker threads (rayon default if omitted)
    #[arg(long)]
    threads: Option<usize>,

    /// Per-game: stop after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Per-game: stop once score >= this value
    #[arg(long)]
    stop_score: Option<u64>,

    /// Write a binary trace of every game into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Serialize)]
struct GameSummary {
    seed: u64,
    moves: u64,
    score: u64,
    highest_value: u64,
    lost: bool,
    elapsed_s: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    config: SearchConfig,
    board_size: usize,
    games: Vec<GameSummary>,
    mean_score: f64,
    best_score: u64,
    best_tile: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new().num_threads(threads).build_global().context("configuring rayon pool")?;
    }
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let cfg = SearchConfig { depth: args.depth, breadth: args.breadth };
    let base_seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(games = args.games, base_seed, ?cfg, size = args.size, "starting runs");

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:30}] {pos}/{len} games | {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    let games: Vec<GameSummary> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.wrapping_add(i);
            let summary = run_single_game(seed, cfg, &args);
            pb.inc(1);
            pb.set_message(format!("last score: {}", summary.score));
            summary
        })
        .collect();
    pb.finish_and_clear();

    let best_score = games.iter().map(|g| g.score).max().unwrap_or(0);
    let best_tile = games.iter().map(|g| g.highest_value).max().unwrap_or(0);
    let mean_score = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.score as f64).sum::<f64>() / games.len() as f64
    };
    let report = Report { config: cfg, board_size: args.size, games, mean_score, best_score, best_tile };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for g in &report.games {
            println!(
                "seed {:>20} | moves {:>6} | score {:>8} | tile {:>6} | {:.1}s",
                g.seed, g.moves, g.score, g.highest_value, g.elapsed_s
            );
        }
        println!(
            "Games: {} | mean score: {:.1} | best score: {} | best tile: {} | wall: {:.1}s",
            report.games.len(),
            report.mean_score,
            report.best_score,
            report.best_tile,
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

fn run_single_game(seed: u64, cfg: SearchConfig, args: &Args) -> GameSummary {
    let start = Instant::now();
    let mut game = Game::with_size(args.size, StdRng::seed_from_u64(seed));
    let mut policy = SampledSearch::with_config(cfg);
    let mut recorder = args.out_dir.as_ref().map(|_| TraceRecorder::new(game.board(), game.score()));

    while let Some(dir) = game.autoplay_step(&mut policy) {
        if let Some(rec) = recorder.as_mut() {
            rec.push(dir, game.board(), game.score());
        }
        if args.steps.is_some_and(|limit| game.moves() >= limit) {
            break;
        }
        if args.stop_score.is_some_and(|target| game.score() >= target) {
            break;
        }
    }
    let elapsed_s = start.elapsed().as_secs_f64();

    if let (Some(rec), Some(dir)) = (recorder, &args.out_dir) {
        let engine = format!("sampled depth={} breadth={} seed={seed}", cfg.depth, cfg.breadth);
        let path = trace_path(dir, seed);
        let written = rec.finish(elapsed_s as f32, Some(engine)).and_then(|run| trace::write_run_to_path(&path, &run));
        if let Err(e) = written {
            warn!(path = %path.display(), error = %e, "failed to write trace");
        }
    }

    GameSummary {
        seed,
        moves: game.moves(),
        score: game.score(),
        highest_value: game.board().highest_value(),
        lost: game.is_lost(),
        elapsed_s,
    }
}

fn trace_path(dir: &Path, seed: u64) -> PathBuf {
    dir.join(format!("run-{}-{seed:020}.f9run", trace::now_unix_seconds()))
}
