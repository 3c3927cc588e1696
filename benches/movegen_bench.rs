use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use halma::board::{Board, Cell, Occupant, Player, BOARD_SIZE};
use halma::game::Match;
use halma::movegen::compute_moves;

/// A board where every other cell in a checkerboard pattern is occupied,
/// which maximises hop chains.
fn lattice_board() -> Board {
    let mut board = Board::empty();
    for r in 0..BOARD_SIZE as i32 {
        for c in 0..BOARD_SIZE as i32 {
            if r % 2 == 1 && c % 2 == 1 {
                board.place(Cell::new(r, c), Occupant::Piece(Player::Two));
            }
        }
    }
    board.place(Cell::new(0, 0), Occupant::Piece(Player::One));
    board
}

fn random_board(seed: u64, pieces: usize) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::empty();
    for i in 0..pieces {
        let cell = Cell::new(
            rng.gen_range(0..BOARD_SIZE as i32),
            rng.gen_range(0..BOARD_SIZE as i32),
        );
        let player = if i % 2 == 0 { Player::One } else { Player::Two };
        board.place(cell, Occupant::Piece(player));
    }
    board
}

fn bench_opening_moves(c: &mut Criterion) {
    let board = Board::standard();
    c.bench_function("compute_moves_opening", |b| {
        b.iter(|| compute_moves(black_box(&board), black_box(Cell::new(2, 1))))
    });
}

fn bench_lattice_chain(c: &mut Criterion) {
    let board = lattice_board();
    c.bench_function("compute_moves_full_lattice", |b| {
        b.iter(|| compute_moves(black_box(&board), black_box(Cell::new(0, 0))))
    });
}

fn bench_random_boards(c: &mut Criterion) {
    let boards: Vec<Board> = (0..32).map(|s| random_board(s, 60)).collect();
    c.bench_function("compute_moves_random_all_cells", |b| {
        b.iter(|| {
            let mut total = 0;
            for board in &boards {
                for r in 0..BOARD_SIZE as i32 {
                    for col in 0..BOARD_SIZE as i32 {
                        total += compute_moves(board, Cell::new(r, col)).jumps.len();
                    }
                }
            }
            total
        })
    });
}

fn bench_apply_step(c: &mut Criterion) {
    c.bench_function("apply_move_step", |b| {
        b.iter(|| {
            let mut m = Match::new();
            m.apply_move(Player::One, Cell::new(4, 0), Cell::new(5, 0))
        })
    });
}

criterion_group!(
    benches,
    bench_opening_moves,
    bench_lattice_chain,
    bench_random_boards,
    bench_apply_step
);
criterion_main!(benches);
