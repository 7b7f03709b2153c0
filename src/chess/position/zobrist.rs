//! Contains the structure and data for Zobrist hash keys
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A position's key is the XOR-fold of one random word per occupied `(square, color, piece)`
//! triple, one word for the side to move, one word for the pair of castling-rights sets, and
//! one word for the en-passant square (with a dedicated word for "none"). The words are drawn
//! once from the deterministic generator in [`prng`](../../prng/index.html) with a fixed seed,
//! so keys agree between runs and between machines.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use crate::chess::prng::Lcg;
use super::*;

/// Seed for the table generator. Changing this invalidates every stored key.
const ZOBRIST_SEED: u64 = 0;

/// Number of distinct castling-rights sets per side (subsets of short | long).
const RIGHTS_SETS: usize = 4;

struct Words {
    pieces: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    side: [u64; Color::COUNT],
    castling: [[u64; RIGHTS_SETS]; RIGHTS_SETS],
    en_passant: [u64; Square::COUNT + 1],
}

lazy_static! {
    static ref WORDS: Words = {
        let mut rng = Lcg::new(ZOBRIST_SEED);
        let mut words = Words {
            pieces: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            side: [0; Color::COUNT],
            castling: [[0; RIGHTS_SETS]; RIGHTS_SETS],
            en_passant: [0; Square::COUNT + 1],
        };

        for color in words.pieces.iter_mut() {
            for piece in color.iter_mut() {
                for word in piece.iter_mut() {
                    *word = rng.next();
                }
            }
        }
        for word in words.side.iter_mut() {
            *word = rng.next();
        }
        for white in words.castling.iter_mut() {
            for word in white.iter_mut() {
                *word = rng.next();
            }
        }
        for word in words.en_passant.iter_mut() {
            *word = rng.next();
        }

        words
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles the placement of a piece
    pub fn toggle_piece(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= WORDS.pieces[c as usize][p as usize][sq as usize];
    }

    /// Toggles the word for `c` having the move
    pub fn toggle_side(&mut self, c: Color) {
        self.0 ^= WORDS.side[c as usize];
    }

    /// Toggles the word for the pair of castling-rights sets
    pub fn toggle_castling(&mut self, white: u8, black: u8) {
        self.0 ^= WORDS.castling[white as usize][black as usize];
    }

    /// Toggles the word for the en-passant square, including the no-square case
    pub fn toggle_en_passant(&mut self, sq: Option<Square>) {
        let index = match sq {
            Some(sq) => sq as usize,
            None => Square::COUNT,
        };
        self.0 ^= WORDS.en_passant[index];
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to index a hash table
    fn from(key: Zobrist) -> Self {
        key.0
    }
}
