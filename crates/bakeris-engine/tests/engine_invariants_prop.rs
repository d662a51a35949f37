//! Property tests for engine invariants over generated seeds and command scripts.

use std::collections::HashSet;

use bakeris_engine::{
    BlockColor, BlockStore, Board, ColorCounts, Command, EngineConfig, Game, LineClearPolicy,
    Piece, PieceGenerator, PieceKind, PieceRotation, PieceSeed, Position, RecipeScores,
    StepOutcome, placement, score_row,
};
use proptest::prelude::*;

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => Just(Command::MoveLeft),
        4 => Just(Command::MoveRight),
        3 => Just(Command::RotateCw),
        3 => Just(Command::RotateCcw),
        3 => Just(Command::SoftDrop),
        3 => Just(Command::HardDrop),
        2 => Just(Command::Hold),
        1 => Just(Command::Generate),
    ]
}

fn config() -> impl Strategy<Value = EngineConfig> {
    (1usize..4, any::<bool>(), 6usize..12).prop_map(|(hold_size, mark, width)| EngineConfig {
        board_width: width,
        hold_size,
        target_score: u64::MAX,
        line_clear: if mark {
            LineClearPolicy::MarkInPlace
        } else {
            LineClearPolicy::Compact
        },
        ..EngineConfig::default()
    })
}

const BOARD_WIDTH: usize = 6;
const BOARD_HEIGHT: usize = 8;

/// Collision rule written out cell by cell.
fn fits_cell_by_cell(
    board: &Board,
    piece: &Piece,
    rotation: PieceRotation,
    anchor: Position,
) -> bool {
    piece
        .world_positions_with(rotation, anchor)
        .iter()
        .all(|&pos| {
            let in_bounds = usize::try_from(pos.x).is_ok_and(|x| x < board.width())
                && usize::try_from(pos.y).is_ok_and(|y| y < board.height());
            in_bounds
                && match board.cell_at(pos) {
                    None => true,
                    Some(id) => piece.owns(id),
                }
        })
}

fn assert_board_consistent(game: &Game) {
    // Every occupied cell resolves to a live block.
    for (pos, id) in game.board().occupied_cells() {
        assert!(game.block(id).is_some(), "{pos} references missing {id}");
    }

    // The active piece is stamped exactly where it says it is.
    if let Some(piece) = game.active_piece() {
        for (pos, id) in piece.occupied_cells() {
            assert_eq!(game.board().cell_at(pos), Some(id), "{piece} at {pos}");
        }
    }

    assert!(game.hold().len() <= game.hold().capacity());
    assert_eq!(game.state().is_playing(), game.active_piece().is_some());
}

proptest! {
    #[test]
    fn test_random_scripts_keep_board_consistent(
        seed in any::<[u8; 16]>(),
        config in config(),
        commands in prop::collection::vec(command(), 1..200),
    ) {
        let mut game = Game::new(config).unwrap();
        game.submit(Command::StartGame(Some(PieceSeed::from_bytes(seed))));
        game.step().unwrap();
        assert_board_consistent(&game);

        for command in commands {
            let before = game.snapshot();
            game.submit(command);
            let outcome = game.step().unwrap();
            assert_board_consistent(&game);
            if let StepOutcome::Rejected(_) = outcome {
                prop_assert_eq!(game.snapshot(), before);
            }
        }
    }

    #[test]
    fn test_can_place_matches_cell_rule(
        filled in prop::collection::vec(any::<bool>(), BOARD_WIDTH * BOARD_HEIGHT),
        kind in 0usize..PieceKind::LEN,
        turns in 0u8..4,
        anchor in (-3i32..9, -3i32..11),
        stamped_at in prop::option::of((0i32..6, 0i32..8)),
    ) {
        let mut board = Board::new(BOARD_WIDTH, BOARD_HEIGHT);
        let mut store = BlockStore::new();
        let owner = store.create_piece(PieceKind::O, BlockColor::Plain, Position::new(0, 0));
        for (i, _) in filled.iter().enumerate().filter(|&(_, &f)| f) {
            let x = i32::try_from(i % BOARD_WIDTH).unwrap();
            let y = i32::try_from(i / BOARD_WIDTH).unwrap();
            let id = store.allocate_block(owner.id(), BlockColor::Dough);
            board.place(Position::new(x, y), id);
        }

        let (sx, sy) = stamped_at.unwrap_or_default();
        let piece =
            store.create_piece(PieceKind::ALL[kind], BlockColor::Yeast, Position::new(sx, sy));
        if stamped_at.is_some() {
            placement::stamp(&mut board, &piece);
        }

        let anchor = Position::new(anchor.0, anchor.1);
        let rotation = PieceRotation::new(turns);
        prop_assert_eq!(
            placement::can_place_with(&board, &piece, rotation, anchor),
            fits_cell_by_cell(&board, &piece, rotation, anchor)
        );
        prop_assert_eq!(
            placement::can_place(&board, &piece, anchor),
            fits_cell_by_cell(&board, &piece, piece.rotation(), anchor)
        );
    }

    #[test]
    fn test_recipe_score_is_monotonic(
        dough in 0u32..20,
        yeast in 0u32..20,
        syrup in 0u32..20,
        plain in 0u32..20,
        extra in 0usize..4,
    ) {
        let scores = RecipeScores::default();
        let base = score_row(ColorCounts::new(dough, yeast, syrup, plain), &scores);
        let mut more = ColorCounts::new(dough, yeast, syrup, plain);
        more.add(BlockColor::ALL[extra]);
        prop_assert!(score_row(more, &scores).points >= base.points);
    }

    #[test]
    fn test_batches_are_fair(seed in any::<[u8; 16]>(), batches in 1usize..5) {
        let mut generator = PieceGenerator::with_seed(PieceSeed::from_bytes(seed));
        for _ in 0..batches {
            let batch = generator.next_batch();
            prop_assert_eq!(batch.len(), PieceGenerator::BATCH_LEN);
            for lane in batch.chunks(PieceKind::LEN) {
                let kinds: HashSet<_> = lane.iter().map(|t| t.kind).collect();
                prop_assert_eq!(kinds.len(), PieceKind::LEN);
            }
            for kind in PieceKind::ALL {
                let colors: HashSet<_> = batch
                    .iter()
                    .filter(|t| t.kind == kind)
                    .map(|t| t.color)
                    .collect();
                prop_assert_eq!(colors.len(), BlockColor::LEN);
            }
        }
    }
}
