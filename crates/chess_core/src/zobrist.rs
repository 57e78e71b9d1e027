//! Zobrist keys for chess positions.
//!
//! `Position::hash` XORs together one key per occupied square plus keys for
//! the side to move, each castling right and the en-passant file. The search
//! compares these hashes to spot repeated positions along a line of play.

use crate::types::Piece;

/// Random keys, one per hashed feature of a position.
pub struct ZobristKeys {
    /// Indexed by [color][piece_kind][square]
    pub pieces: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move
    pub side_to_move: u64,
    /// [wk, wq, bk, bq]
    pub castling: [u64; 4],
    /// En passant file (0-7)
    pub en_passant: [u64; 8],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// splitmix64 step: returns the advanced state and the output value.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (state, z ^ (z >> 31))
}

impl ZobristKeys {
    /// Keys from a fixed seed, so hashes are identical across runs.
    pub const fn new() -> Self {
        let mut state = 0xB7A1_F15C_0DE5_EED5u64;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut sq = 0;
                while sq < 64 {
                    let (s, key) = splitmix64(state);
                    state = s;
                    pieces[color][piece][sq] = key;
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        let (s, side_to_move) = splitmix64(state);
        state = s;

        let mut castling = [0u64; 4];
        let mut i = 0;
        while i < 4 {
            let (s, key) = splitmix64(state);
            state = s;
            castling[i] = key;
            i += 1;
        }

        let mut en_passant = [0u64; 8];
        let mut i = 0;
        while i < 8 {
            let (s, key) = splitmix64(state);
            state = s;
            en_passant[i] = key;
            i += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.color.idx()][piece.kind.idx()][sq as usize]
    }

    /// Castling right index: 0=wk, 1=wq, 2=bk, 3=bq.
    #[inline(always)]
    pub fn castling_key(&self, index: usize) -> u64 {
        self.castling[index]
    }

    #[inline(always)]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }
}

/// Global static Zobrist keys, computed at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
