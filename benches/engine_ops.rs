use ai_987::engine::{Board, Direction};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = Vec::new();
    // Empty and one-tile starts
    boards.push(Board::empty(&mut rng));
    let mut b = Board::empty(&mut rng).with_random_tile(&mut rng);
    boards.push(b.clone());
    // Derive a variety of densities deterministically
    for i in 0..20 {
        let dir = Direction::ALL[i % 4];
        if let Some((nb, _)) = b.shift(dir, &mut rng) {
            b = nb.with_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    for dir in Direction::ALL {
        c.bench_function(&format!("shift/{}", dir.to_string().to_lowercase()), |bch| {
            let mut rng = StdRng::seed_from_u64(1);
            bch.iter(|| {
                let mut acc = 0u64;
                for bd in &boards {
                    if let Some((_, gained)) = bd.shift(dir, &mut rng) { acc += gained; }
                }
                black_box(acc)
            })
        });
    }
}

fn bench_spawn_and_queries(c: &mut Criterion) {
    c.bench_function("board/with_random_tile", |bch| {
        bch.iter_batched(
            || {
                let mut rng = StdRng::seed_from_u64(7);
                (Board::empty(&mut rng), rng)
            },
            |(mut bd, mut rng)| {
                for _ in 0..16 { bd = bd.with_random_tile(&mut rng); }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
    let boards = corpus();
    c.bench_function("query/is_game_over", |bch| {
        bch.iter(|| black_box(boards.iter().filter(|bd| bd.is_game_over()).count()))
    });
    c.bench_function("query/highest_value", |bch| {
        bch.iter(|| black_box(boards.iter().map(Board::highest_value).max()))
    });
}

criterion_group!(engine_ops, bench_shift, bench_spawn_and_queries);
criterion_main!(engine_ops);
