use ai_987::engine::{Board, Direction};
use ai_987::search::{SampledSearch, SampledSearchParallel, SearchConfig};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(4242);
    let mut boards = Vec::new();
    let mut b = Board::empty(&mut rng).with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b.clone());
    for i in 0..16 {
        if let Some((nb, _)) = b.shift(Direction::ALL[i % 4], &mut rng) {
            b = nb.with_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_search(c: &mut Criterion) {
    let boards = corpus();
    let cfg = SearchConfig::default();

    c.bench_function("search_seq/best_move", |bch| {
        let mut search = SampledSearch::with_config(cfg);
        let mut rng = StdRng::seed_from_u64(1);
        bch.iter(|| {
            let mut acc = 0i64;
            for bd in &boards { acc = acc.wrapping_add(search.best_move(bd, &mut rng).1); }
            black_box(acc)
        })
    });

    c.bench_function("search_par/best_move", |bch| {
        let mut search = SampledSearchParallel::with_config(cfg);
        let mut rng = StdRng::seed_from_u64(1);
        bch.iter(|| {
            let mut acc = 0i64;
            for bd in &boards { acc = acc.wrapping_add(search.best_move(bd, &mut rng).1); }
            black_box(acc)
        })
    });
}

criterion_group!(search, bench_search);
criterion_main!(search);
