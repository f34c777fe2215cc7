use hashbrown::HashMap;
use ndarray::Array2;

use crate::*;

/// Pivot scan threshold.
const PIVOT_EPS: f64 = 1e-9;
/// Tolerance for matching a row constant against a coefficient sum.
const MATCH_EPS: f64 = 1e-6;

fn nonzero(value: f64) -> bool {
    value > PIVOT_EPS || value < -PIVOT_EPS
}

fn near(a: f64, b: f64) -> bool {
    let diff = a - b;
    -MATCH_EPS < diff && diff < MATCH_EPS
}

/// One constraint pass over the border. Builds the linear system — one row
/// per unsolved border tile, one column per distinct covered border tile
/// plus the remaining-mines constant — reduces it, and flags every unknown
/// the reduced rows force to be a mine. Returns the number of tiles newly
/// flagged.
///
/// Unknowns a row forces to be safe are *not* opened here; once the new
/// flags land, the counting engine reaches them through a zero remaining
/// count on some neighbor.
pub(crate) fn run_once(board: &mut Board) -> usize {
    let constraints = board.unsolved_border();
    let unknowns = board.covered_border();
    if constraints.is_empty() || unknowns.is_empty() {
        return 0;
    }

    let column_of: HashMap<Coord2, usize> = unknowns
        .iter()
        .enumerate()
        .map(|(column, &coords)| (coords, column))
        .collect();

    let vars = unknowns.len();
    let mut matrix = Array2::<f64>::zeros((constraints.len(), vars + 1));
    for (row, &at) in constraints.iter().enumerate() {
        for pos in board.covered_neighbors_at(at) {
            matrix[[row, column_of[&pos]]] = 1.0;
        }
        matrix[[row, vars]] = f64::from(board.remaining_at(at));
    }

    reduce(&mut matrix, vars);

    // A row forces an assignment when its constant equals the sum of its
    // positive coefficients (positives are mines, negatives safe) or the
    // sum of its negative coefficients (the mirror image). Anything else
    // admits several solutions and yields nothing.
    let mut flagged = 0;
    let mut safe = 0;
    for row in 0..matrix.nrows() {
        let constant = matrix[[row, vars]];
        let mut sum_pos = 0.0;
        let mut sum_neg = 0.0;
        for column in 0..vars {
            let coeff = matrix[[row, column]];
            if coeff > PIVOT_EPS {
                sum_pos += coeff;
            } else if coeff < -PIVOT_EPS {
                sum_neg += coeff;
            }
        }
        if sum_pos == 0.0 && sum_neg == 0.0 {
            continue;
        }

        if near(constant, sum_pos) {
            for column in 0..vars {
                let coeff = matrix[[row, column]];
                if coeff > PIVOT_EPS {
                    if board.flag_at(unknowns[column]) {
                        flagged += 1;
                    }
                } else if coeff < -PIVOT_EPS {
                    safe += 1;
                }
            }
        }
        if near(constant, sum_neg) {
            for column in 0..vars {
                let coeff = matrix[[row, column]];
                if coeff < -PIVOT_EPS {
                    if board.flag_at(unknowns[column]) {
                        flagged += 1;
                    }
                } else if coeff > PIVOT_EPS {
                    safe += 1;
                }
            }
        }
    }

    if safe > 0 {
        log::debug!("elimination left {safe} provably safe tiles to the counting engine");
    }
    flagged
}

/// Gauss-Jordan elimination to reduced row-echelon form over the variable
/// columns. Exhausting the rows or the pivot columns is the normal way out
/// of the loop, not a failure.
fn reduce(matrix: &mut Array2<f64>, vars: usize) {
    let rows = matrix.nrows();
    let columns = vars + 1;
    let mut lead = 0;

    for row in 0..rows {
        if lead >= vars {
            return;
        }

        // Scan down the lead column for a pivot, moving right past columns
        // that are all zero below the current row.
        let mut pivot_row = row;
        while !nonzero(matrix[[pivot_row, lead]]) {
            pivot_row += 1;
            if pivot_row == rows {
                pivot_row = row;
                lead += 1;
                if lead == vars {
                    return;
                }
            }
        }

        if pivot_row != row {
            for column in 0..columns {
                matrix.swap([row, column], [pivot_row, column]);
            }
        }

        let pivot = matrix[[row, lead]];
        for column in 0..columns {
            matrix[[row, column]] /= pivot;
        }

        for other in 0..rows {
            if other == row {
                continue;
            }
            let factor = matrix[[other, lead]];
            if !nonzero(factor) {
                continue;
            }
            for column in 0..columns {
                matrix[[other, column]] -= factor * matrix[[row, column]];
            }
        }

        lead += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn matrix_from(rows: usize, columns: usize, values: Vec<f64>) -> Array2<f64> {
        Array2::from_shape_vec((rows, columns), values).unwrap()
    }

    #[test]
    fn reduce_solves_a_determined_system() {
        // x + y = 1, x = 1  =>  x = 1, y = 0
        let mut matrix = matrix_from(2, 3, vec![1.0, 1.0, 1.0, 1.0, 0.0, 1.0]);

        reduce(&mut matrix, 2);

        let expected = matrix_from(2, 3, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        for (a, b) in matrix.iter().zip(expected.iter()) {
            assert!(near(*a, *b));
        }
    }

    #[test]
    fn reduce_leaves_an_underdetermined_row_alone() {
        let mut matrix = matrix_from(1, 3, vec![1.0, 1.0, 1.0]);

        reduce(&mut matrix, 2);

        assert_eq!(matrix, matrix_from(1, 3, vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn reduce_skips_zero_columns() {
        let mut matrix = matrix_from(2, 4, vec![0.0, 1.0, 1.0, 2.0, 0.0, 0.0, 1.0, 1.0]);

        reduce(&mut matrix, 3);

        // Column 0 has no pivot; columns 1 and 2 are eliminated.
        for (a, b) in matrix
            .iter()
            .zip(matrix_from(2, 4, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0]).iter())
        {
            assert!(near(*a, *b));
        }
    }

    #[test]
    fn one_two_one_border_flags_exactly_the_corners() {
        let mut board = Board::with_mines((2, 3), &[(0, 0), (0, 2)]).unwrap();
        for col in 0..3 {
            board.open((1, col)).unwrap();
        }

        let flagged = run_once(&mut board);

        assert_eq!(flagged, 2);
        assert!(board.tile_at((0, 0)).unwrap().flagged);
        assert!(board.tile_at((0, 2)).unwrap().flagged);
        // The provably safe middle tile is left covered, not opened.
        let middle = board.tile_at((0, 1)).unwrap();
        assert!(!middle.flagged && !middle.opened);
    }

    #[test]
    fn ambiguous_border_yields_no_flags() {
        let mut board = Board::with_mines((2, 2), &[(0, 0)]).unwrap();
        board.open((1, 1)).unwrap();

        assert_eq!(run_once(&mut board), 0);
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn boards_without_a_border_are_a_no_op() {
        let mut fresh = Board::with_mines((3, 3), &[(0, 0)]).unwrap();
        assert_eq!(run_once(&mut fresh), 0);

        let mut solved = Board::with_mines((1, 2), &[(0, 0)]).unwrap();
        solved.flag((0, 0)).unwrap();
        solved.open((0, 1)).unwrap();
        assert_eq!(run_once(&mut solved), 0);
    }
}
