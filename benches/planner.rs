use criterion::{black_box, criterion_group, criterion_main, Criterion};
use led_curtain::core::Board;
use led_curtain::engine::{best_any, best_for_kind, Engine, GameConfig, Weights};
use led_curtain::frame::{encode_batches, FrameDiffer};
use led_curtain::types::{PieceKind, PALETTE, SPAWN_ROW};

fn ragged_board() -> Board {
    let mut board = Board::new(18, 10);
    // Uneven stack with a couple of holes
    for (c, height) in [3u8, 5, 2, 0, 4, 6, 1, 3, 2, 5].iter().enumerate() {
        for h in 0..*height {
            let r = 17 - h as i8;
            if (r + c as i8) % 5 != 0 {
                board.set(r, c as i8, Some(PALETTE[c % PALETTE.len()]));
            }
        }
    }
    board
}

fn bench_best_any(c: &mut Criterion) {
    let board = ragged_board();
    let weights = Weights::default();

    c.bench_function("best_any_18x10", |b| {
        b.iter(|| best_any(black_box(&board), &weights))
    });
}

fn bench_best_for_kind(c: &mut Criterion) {
    let board = ragged_board();
    let weights = Weights::default();

    c.bench_function("best_for_kind_t", |b| {
        b.iter(|| best_for_kind(black_box(&board), PieceKind::T, SPAWN_ROW, &weights))
    });
}

fn bench_engine_frame(c: &mut Criterion) {
    let Ok(mut engine) = Engine::split(GameConfig::default()) else {
        return;
    };
    let mut frame = engine.new_frame();
    let mut differ = FrameDiffer::new(engine.rows(), engine.cols());

    c.bench_function("tick_render_diff_encode", |b| {
        b.iter(|| {
            engine.tick();
            engine.render(&mut frame);
            let changed = differ.diff(&frame);
            black_box(encode_batches(&changed))
        })
    });
}

criterion_group!(benches, bench_best_any, bench_best_for_kind, bench_engine_frame);
criterion_main!(benches);
