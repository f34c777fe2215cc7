use super::ProgressSnapshot;
use crate::*;

/// Runs counting passes until one changes nothing. Returns the pass count
/// and the total number of tile transitions. Convergence is guaranteed:
/// tiles only move covered→opened or covered→flagged, never back.
pub(crate) fn run_to_fixpoint(
    board: &mut Board,
    on_pass: &mut impl FnMut(ProgressSnapshot),
) -> (u32, usize) {
    let mut passes = 0;
    let mut total = 0;

    loop {
        let changes = pass(board);
        passes += 1;
        total += changes;
        on_pass(ProgressSnapshot::from_board(board));
        if changes == 0 {
            return (passes, total);
        }
    }
}

fn pass(board: &mut Board) -> usize {
    let mut changes = 0;

    for at in board.unsolved_border() {
        // Every missing mine already flagged: the rest of the neighborhood
        // is safe.
        if board.remaining_at(at) == 0 {
            for pos in board.covered_neighbors_at(at) {
                if board.open_at(pos) {
                    changes += 1;
                }
            }
        }

        // Covered neighbors exactly fit the missing mines: all of them are
        // mines.
        let covered = board.covered_neighbors_at(at);
        if covered.len() as i16 == board.remaining_at(at) {
            for pos in covered {
                if board.flag_at(pos) {
                    changes += 1;
                }
            }
        }
    }

    // Whole-board sweeps, independent of any border tile.
    let covered = board.all_covered();
    let mines_left = i64::from(board.mine_count()) - i64::from(board.flagged_count());
    if mines_left == 0 {
        for &pos in &covered {
            if board.open_at(pos) {
                changes += 1;
            }
        }
    }
    if covered.len() as i64 == mines_left {
        for &pos in &covered {
            if board.flag_at(pos) {
                changes += 1;
            }
        }
    }

    changes
}
