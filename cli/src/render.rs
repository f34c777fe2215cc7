use clearsweep_core::{Board, Tile};

/// What a player would see: flags, covered tiles, opened numbers with
/// zeroes as `-`.
pub fn player_view(board: &Board) -> String {
    grid(board, player_cell)
}

/// The fully revealed board: mines as `X`, computed numbers everywhere
/// else.
pub fn full_view(board: &Board) -> String {
    grid(board, full_cell)
}

fn player_cell(tile: Tile) -> char {
    if tile.flagged {
        'F'
    } else if !tile.opened {
        '#'
    } else if tile.mined {
        'X'
    } else {
        match tile.number {
            Some(0) => '-',
            Some(n) => digit(n),
            None => '?',
        }
    }
}

fn full_cell(tile: Tile) -> char {
    if tile.mined {
        'X'
    } else {
        match tile.number {
            Some(n) => digit(n),
            None => '?',
        }
    }
}

fn digit(n: u8) -> char {
    char::from(b'0' + n)
}

fn grid(board: &Board, cell: impl Fn(Tile) -> char) -> String {
    let (rows, cols) = board.size();
    let mut out = String::with_capacity(rows as usize * (cols as usize * 2 + 1));
    for ((_, col), tile) in board.tiles() {
        out.push(cell(tile));
        out.push(if col + 1 == cols { '\n' } else { ' ' });
    }
    out
}
