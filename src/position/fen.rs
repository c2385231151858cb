//! FEN parsing/formatting. Grounded on the teacher's board-setup code and
//! `examples/original_source/src/chess/` FEN handling; the six-field format
//! is standard UCI/FEN.

use super::{Position, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::error::{FenError, FenErrorKind};
use crate::types::{Color, Piece, PieceType, Square};

pub fn parse(fen_str: &str) -> Result<Position, FenError> {
    let fields: Vec<&str> = fen_str.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError {
            kind: FenErrorKind::WrongFieldCount,
            field: fen_str.to_string(),
        });
    }

    let mut pos = Position {
        board: [Piece::NONE; 64],
        pieces_bb: [[0; 6]; 2],
        occupied_bb: [0; 2],
        all_occupied: 0,
        side_to_move: Color::White,
        castling_rights: 0,
        ep_square: None,
        halfmove_clock: 0,
        fullmove_number: 1,
        hash: 0,
        pawn_hash: 0,
        non_pawn_hash: [0; 2],
        checkers: 0,
        history: Vec::new(),
        key_history: Vec::new(),
    };

    let mut rank = 7i32;
    let mut file = 0i32;
    for c in fields[0].chars() {
        match c {
            '/' => {
                if file != 8 {
                    return Err(FenError {
                        kind: FenErrorKind::BadBoardField,
                        field: fields[0].to_string(),
                    });
                }
                rank -= 1;
                file = 0;
            }
            '1'..='8' => {
                file += c.to_digit(10).unwrap() as i32;
            }
            _ => {
                let (piece_type, color) = char_to_piece(c).ok_or_else(|| FenError {
                    kind: FenErrorKind::BadBoardField,
                    field: fields[0].to_string(),
                })?;
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    return Err(FenError {
                        kind: FenErrorKind::BadBoardField,
                        field: fields[0].to_string(),
                    });
                }
                let sq = Square::from_file_rank(file as u8, rank as u8);
                pos.set_piece(sq, Piece::new(piece_type, color));
                file += 1;
            }
        }
    }

    pos.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        _ => {
            return Err(FenError {
                kind: FenErrorKind::BadSideToMove,
                field: fields[1].to_string(),
            })
        }
    };

    if fields[2] != "-" {
        for c in fields[2].chars() {
            pos.castling_rights |= match c {
                'K' => CASTLE_WK,
                'Q' => CASTLE_WQ,
                'k' => CASTLE_BK,
                'q' => CASTLE_BQ,
                _ => {
                    return Err(FenError {
                        kind: FenErrorKind::BadCastlingRights,
                        field: fields[2].to_string(),
                    })
                }
            };
        }
    }

    pos.ep_square = if fields[3] == "-" {
        None
    } else {
        Some(Square::from_str(fields[3]).ok_or_else(|| FenError {
            kind: FenErrorKind::BadEnPassantSquare,
            field: fields[3].to_string(),
        })?)
    };

    pos.halfmove_clock = if fields.len() > 4 {
        fields[4].parse().map_err(|_| FenError {
            kind: FenErrorKind::BadHalfmoveClock,
            field: fields[4].to_string(),
        })?
    } else {
        0
    };

    pos.fullmove_number = if fields.len() > 5 {
        fields[5].parse().map_err(|_| FenError {
            kind: FenErrorKind::BadFullmoveNumber,
            field: fields[5].to_string(),
        })?
    } else {
        1
    };

    pos.rebuild_hashes();
    pos.recompute_checkers();
    Ok(pos)
}

pub fn format(pos: &Position) -> String {
    let mut s = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            let sq = Square::from_file_rank(file, rank);
            let piece = pos.piece_at(sq);
            if piece.is_none() {
                empty += 1;
            } else {
                if empty > 0 {
                    s.push_str(&empty.to_string());
                    empty = 0;
                }
                s.push(piece.piece_type().char(piece.color()));
            }
        }
        if empty > 0 {
            s.push_str(&empty.to_string());
        }
        if rank > 0 {
            s.push('/');
        }
    }

    s.push(' ');
    s.push(if pos.side_to_move == Color::White { 'w' } else { 'b' });

    s.push(' ');
    if pos.castling_rights == 0 {
        s.push('-');
    } else {
        if pos.castling_rights & CASTLE_WK != 0 {
            s.push('K');
        }
        if pos.castling_rights & CASTLE_WQ != 0 {
            s.push('Q');
        }
        if pos.castling_rights & CASTLE_BK != 0 {
            s.push('k');
        }
        if pos.castling_rights & CASTLE_BQ != 0 {
            s.push('q');
        }
    }

    s.push(' ');
    match pos.ep_square {
        Some(sq) => s.push_str(&sq.to_string()),
        None => s.push('-'),
    }

    s.push(' ');
    s.push_str(&pos.halfmove_clock.to_string());
    s.push(' ');
    s.push_str(&pos.fullmove_number.to_string());
    s
}

fn char_to_piece(c: char) -> Option<(PieceType, Color)> {
    let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
    let piece_type = match c.to_ascii_lowercase() {
        'p' => PieceType::Pawn,
        'n' => PieceType::Knight,
        'b' => PieceType::Bishop,
        'r' => PieceType::Rook,
        'q' => PieceType::Queen,
        'k' => PieceType::King,
        _ => return None,
    };
    Some((piece_type, color))
}

impl Position {
    /// Recomputes `hash`/`pawn_hash`/`non_pawn_hash` from scratch. Used only
    /// at FEN-parse time; `make_move`/`undo_move` maintain them
    /// incrementally afterwards.
    pub(super) fn rebuild_hashes(&mut self) {
        let mut hash = 0u64;
        let mut pawn_hash = 0u64;
        let mut non_pawn_hash = [0u64; 2];
        for sq_idx in 0..64u8 {
            let sq = Square(sq_idx);
            let piece = self.piece_at(sq);
            if piece.is_none() {
                continue;
            }
            let key = crate::zobrist::piece_key(piece, sq);
            hash ^= key;
            if piece.piece_type() == PieceType::Pawn {
                pawn_hash ^= key;
            } else if piece.piece_type() != PieceType::King {
                non_pawn_hash[piece.color().index()] ^= key;
            }
        }
        hash ^= crate::zobrist::castling_key(self.castling_rights);
        if let Some(ep) = self.ep_square {
            hash ^= crate::zobrist::en_passant_key(ep.file());
        }
        if self.side_to_move == Color::Black {
            hash ^= crate::zobrist::side_key();
        }
        self.hash = hash;
        self.pawn_hash = pawn_hash;
        self.non_pawn_hash = non_pawn_hash;
        self.key_history.clear();
        self.key_history.push(hash);
    }
}
