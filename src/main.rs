use std::io::{self, BufRead, Write};

use ai_987::engine::Direction;
use ai_987::game::Game;
use ai_987::search::{SampledSearch, SearchConfig};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ai-987", about = "Play 987 (Fibonacci 2048) or watch the sampled search play it")]
struct Args {
    /// Seed for tile spawns and search sampling (random if omitted)
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

    /// Read moves from stdin instead of auto-playing
    #[arg(long)]
    interactive: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::with_size(args.size, rng);
    let mut policy = SampledSearch::with_config(SearchConfig { depth: args.depth, breadth: args.breadth });

    if args.interactive {
        interactive(&mut game, &mut policy)
    } else {
        autoplay(&mut game, &mut policy);
        Ok(())
    }
}

fn autoplay(game: &mut Game, policy: &mut SampledSearch) {
    println!("{}", game.board());
    let mut total_states: u64 = 0;
    let mut peak_states: u64 = 0;
    while let Some(dir) = game.autoplay_step(policy) {
        println!("{dir} | score: {}{}", game.score(), game.board());
        let stats = policy.last_stats();
        total_states = total_states.saturating_add(stats.nodes);
        peak_states = peak_states.max(stats.nodes);
    }
    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, States considered: {}, Max states considered for a move: {}",
        game.moves(),
        game.score(),
        game.board().highest_value(),
        total_states,
        peak_states
    );
}

fn interactive(game: &mut Game, policy: &mut SampledSearch) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout();
    println!("{}", game.board());
    println!("Moves: up/down/left/right (arrows, wasd), hint, ai, reset, quit");
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "reset" => game.reset(),
            "hint" => {
                let (dir, value) = game.suggest(policy);
                println!("Suggested: {dir} (estimated {value})");
                continue;
            }
            "ai" => {
                if game.autoplay_step(policy).is_none() {
                    println!("No move left.");
                }
            }
            input => match input.parse::<Direction>() {
                Ok(dir) => {
                    if game.play(dir).is_none() {
                        println!("{dir} changes nothing.");
                        continue;
                    }
                }
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
        }
        println!("Score: {}{}", game.score(), game.board());
        if game.is_lost() {
            println!("Game over. Type reset to play again.");
        }
        out.flush()?;
    }
    Ok(())
}
