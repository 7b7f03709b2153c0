//! The killer move table.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::Move;

/// The deepest ply the search may reach before aborting.
pub const MAX_PLY: usize = 128;

/// Killer moves remembered per ply.
const SLOTS: usize = 2;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// For each ply from the root, a short history of quiet moves that recently caused a beta
/// cutoff there. Trying those moves early in sibling nodes tends to provoke more cutoffs.
#[derive(Debug, Clone)]
pub struct KillerTable {
    kill: Vec<Vec<Move>>,
}

impl KillerTable {
    /// Creates an empty table covering [`MAX_PLY`](constant.MAX_PLY.html) plies.
    pub fn new() -> KillerTable {
        KillerTable {
            kill: vec![Vec::with_capacity(SLOTS); MAX_PLY],
        }
    }

    /// Returns `moves` with any killers recorded for `ply` moved to the front, in killer
    /// order, preserving the relative order of the rest. Applying the reordering twice gives
    /// the same list as applying it once.
    pub fn ordered(&self, ply: usize, moves: Vec<Move>) -> Vec<Move> {
        let killers = &self.kill[ply];
        if killers.is_empty() {
            return moves;
        }

        let mut front: Vec<Move> = killers.iter()
            .filter(|k| moves.contains(*k))
            .copied()
            .collect();
        if front.is_empty() {
            return moves;
        }

        front.extend(moves.into_iter().filter(|m| !killers.contains(m)));
        front
    }

    /// Records a beta-cutoff move for `ply`, de-duplicated and bounded to the two most
    /// recent. A move already at the front is left alone.
    pub fn insert(&mut self, ply: usize, mv: Move) {
        let list = &mut self.kill[ply];

        if list.first() == Some(&mv) {
            return;
        }
        list.retain(|k| *k != mv);
        list.insert(0, mv);
        list.truncate(SLOTS);
    }

    /// Seeds the table from a principal variation: the i-th move of `pv` becomes a killer at
    /// ply i. Called once per completed deepening iteration.
    pub fn insert_pv(&mut self, pv: &[Move]) {
        for (ply, &mv) in pv.iter().enumerate().take(MAX_PLY) {
            self.insert(ply, mv);
        }
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        KillerTable::new()
    }
}
