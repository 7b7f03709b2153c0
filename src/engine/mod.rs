//! The search engine.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! The [`Searcher`](struct.Searcher.html) owns a position and explores it with an iterative
//! deepening negascout: the first move of every node is searched with the full `(α, β)` window
//! and the rest with null-window scouts that are re-searched on a fail-high. Horizon nodes are
//! extended by a quiescence search over promotions and captures. Both searches run through the
//! transposition table in [`hash`](hash/index.html), and quiet cutoff moves feed the killer
//! table in [`killers`](killers/index.html) for move ordering at sibling nodes.
//!
//! The search is single-threaded, synchronous, and deterministic: identical inputs produce
//! identical principal variations, scores, and info lines. Informational output goes through
//! the injected [`InfoSink`](trait.InfoSink.html) rather than straight to stdout, so callers
//! can capture or discard it.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::{max, min};
use std::fmt;
use std::ops;
use log::debug;
use crate::chess::{Color, Move, Position};

pub mod eval;
pub mod hash;
pub mod killers;

pub use eval::Score;
pub use hash::{Bound, Lookup, TransTable};
pub use killers::{KillerTable, MAX_PLY};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The outcome of a search: a score in centipawns and the principal variation behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The estimated score, from the perspective of the side the search was asked for.
    pub score: Score,
    /// The sequence of moves the search expects under best play.
    pub variation: Vec<Move>,
}

impl SearchResult {
    /// Returns the first move of the principal variation, if any.
    pub fn first(&self) -> Option<Move> {
        self.variation.first().copied()
    }

    /// Returns the result with `mv` pushed onto the front of the variation.
    pub fn prepend(mut self, mv: Move) -> SearchResult {
        self.variation.insert(0, mv);
        self
    }
}

impl ops::Neg for SearchResult {
    type Output = SearchResult;

    /// Negates the score for the other side's perspective; the variation is unchanged.
    fn neg(mut self) -> SearchResult {
        self.score = -self.score;
        self
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A line-oriented destination for the search's informational output.
pub trait InfoSink {
    /// Consumes one informational line.
    fn line(&mut self, line: &str);
}

/// Writes info lines to standard output.
#[derive(Debug, Default)]
pub struct StdoutInfo;

impl InfoSink for StdoutInfo {
    fn line(&mut self, line: &str) {
        println!("{}", line);
    }
}

impl InfoSink for Vec<String> {
    /// Collects info lines, for tests and callers that want them after the fact.
    fn line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl InfoSink for () {
    /// Discards info lines.
    fn line(&mut self, _: &str) { }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// What the transposition-table prologue decided for a node.
enum Probe {
    /// The cached knowledge settles the node.
    Done(SearchResult),
    /// Keep searching, seeded with an optional ordering hint.
    Continue(Option<Move>),
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The search state: a position, the transposition and killer tables, and the node and
/// table-probe counters.
///
/// The counters are observational only; they feed the info lines and never influence the
/// search result.
pub struct Searcher<S: InfoSink> {
    pos: Position,
    table: TransTable,
    killers: KillerTable,
    sink: S,

    tt_hits: u64,
    tt_misses: u64,
    nodes: u64,
    ply: usize,
}

impl<S: InfoSink> Searcher<S> {
    /// Creates a searcher at the standard starting position with empty tables.
    pub fn new(sink: S) -> Searcher<S> {
        Searcher {
            pos: Position::new(),
            table: TransTable::new(),
            killers: KillerTable::new(),
            sink,
            tt_hits: 0,
            tt_misses: 0,
            nodes: 0,
            ply: 0,
        }
    }

    /// Replaces the position to search.
    pub fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the number of nodes visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns the table hits and misses of the last search.
    pub fn table_probes(&self) -> (u64, u64) {
        (self.tt_hits, self.tt_misses)
    }

    /// Returns the info sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Searches the position by iterative deepening from depth 1 to `max_depth` and returns
    /// the result of the deepest iteration. After each iteration the killer table is seeded
    /// from the principal variation found.
    ///
    /// # Panics
    ///
    /// Panics if `max_depth` reaches [`MAX_PLY`](killers/constant.MAX_PLY.html).
    pub fn search(&mut self, max_depth: usize) -> SearchResult {
        assert!(max_depth < MAX_PLY, "search depth {} exceeds the {} ply cap", max_depth, MAX_PLY);

        debug!("searching: {}", self.pos);
        self.tt_hits = 0;
        self.tt_misses = 0;
        self.nodes = 0;
        self.ply = 0;

        let sign = if self.pos.turn() == Color::White { 1 } else { -1 };
        let mut result = SearchResult { score: Score::draw(), variation: Vec::new() };

        for depth in 1..=max_depth {
            self.sink.line(&format!("info depth {}", depth));
            result = self.negascout(depth, depth, -Score::infinity(), Score::infinity(), sign);
            self.killers.insert_pv(&result.variation);
        }

        result
    }

    /// Consults the table for the current position before a node is searched. Exact hits
    /// settle the node outright; bound hits narrow the window and settle it when it closes;
    /// anything else passes along the stored best move, if any, as an ordering hint.
    fn probe(&mut self, depth: usize, alpha: &mut Score, beta: &mut Score) -> Probe {
        match self.table.lookup(&self.pos, depth) {
            Lookup::Hit(entry) => {
                self.tt_hits += 1;
                let score = entry.result().score;
                let hint = entry.result().first();
                match entry.bound() {
                    Bound::Exact => Probe::Done(entry.into_result()),
                    Bound::Lower => {
                        *alpha = max(*alpha, score);
                        if *alpha >= *beta {
                            Probe::Done(SearchResult { score: *alpha, variation: Vec::new() })
                        } else {
                            Probe::Continue(hint)
                        }
                    },
                    Bound::Upper => {
                        *beta = min(*beta, score);
                        if *beta <= *alpha {
                            Probe::Done(SearchResult { score: *alpha, variation: Vec::new() })
                        } else {
                            Probe::Continue(hint)
                        }
                    },
                }
            },
            Lookup::Shallow(hint) => {
                self.tt_hits += 1;
                Probe::Continue(hint)
            },
            Lookup::Miss => {
                self.tt_misses += 1;
                Probe::Continue(None)
            },
        }
    }

    /// Searches the current position to `depth` remaining plies within the window
    /// `(alpha, beta)`, where `sign` colors the evaluation for the side to move.
    fn negascout(
        &mut self,
        max_depth: usize, depth: usize,
        mut alpha: Score, mut beta: Score,
        sign: i32,
    ) -> SearchResult {
        assert!(self.ply < MAX_PLY, "search exceeded the {} ply cap", MAX_PLY);

        let hint = match self.probe(depth, &mut alpha, &mut beta) {
            Probe::Done(result) => return result,
            Probe::Continue(hint) => hint,
        };

        // checkmate and stalemate both end the node; the evaluator tells them apart
        if !self.pos.any_move() {
            self.nodes += 1;
            return SearchResult {
                score: sign * eval::terminal(&self.pos),
                variation: Vec::new(),
            };
        }

        if depth == 0 {
            return self.quiescence(alpha, beta, sign);
        }

        let mut list = self.pos.moves();
        if let Some(hint) = hint {
            list.retain(|m| *m != hint);
            list.insert(0, hint);
        }
        let ply = max_depth - depth;
        let list = self.killers.ordered(ply, list);

        let (bound, result) = self.iterate(list, max_depth, depth, alpha, beta, sign);

        if bound == Bound::Lower {
            if let Some(mv) = result.first() {
                if mv.is_quiet() {
                    self.killers.insert(ply, mv);
                }
            }
        }
        self.table.insert(&self.pos, depth, bound, &result);

        result
    }

    /// Runs the move list through the principal-variation-search schedule: the first legal
    /// move gets the full window, later moves get a null-window scout re-searched with the
    /// full window when the scout lands strictly inside `(α, β)`.
    ///
    /// A child score at or above `beta` cuts the node off immediately with a lower-bound
    /// result. Otherwise the running best starts as an upper bound at `alpha` and turns exact
    /// the first time a move improves on it.
    fn iterate(
        &mut self,
        list: Vec<Move>,
        max_depth: usize, depth: usize,
        alpha: Score, beta: Score,
        sign: i32,
    ) -> (Bound, SearchResult) {
        let root = depth == max_depth;
        let mut bound = Bound::Upper;
        let mut best = SearchResult { score: alpha, variation: Vec::new() };
        let mut first = true;

        for mv in list {
            if self.pos.make_move(mv).is_err() {
                continue;
            }
            self.ply += 1;

            let child = if first {
                -self.negascout(max_depth, depth - 1, -beta, -best.score, -sign)
            } else {
                let scout =
                    -self.negascout(max_depth, depth - 1, -(best.score + 1), -best.score, -sign);
                if best.score < scout.score && scout.score < beta {
                    -self.negascout(max_depth, depth - 1, -beta, -best.score, -sign)
                } else {
                    scout
                }
            };

            self.ply -= 1;
            self.pos.unmake_move(mv);
            first = false;

            if child.score >= beta {
                let result = SearchResult { score: beta, variation: vec![mv] };
                if root {
                    self.report(&result, mv);
                }
                return (Bound::Lower, result);
            }
            if child.score > best.score {
                best = child.prepend(mv);
                bound = Bound::Exact;
            }
            if root {
                self.report(&best, mv);
            }
        }

        (bound, best)
    }

    /// Extends the search past the horizon with promotions and captures only, so the
    /// evaluation settles on a quiet position. Runs through the table at depth 0 and uses no
    /// killers.
    fn quiescence(&mut self, mut alpha: Score, mut beta: Score, sign: i32) -> SearchResult {
        assert!(self.ply < MAX_PLY, "search exceeded the {} ply cap", MAX_PLY);

        let hint = match self.probe(0, &mut alpha, &mut beta) {
            Probe::Done(result) => return result,
            Probe::Continue(hint) => hint,
        };

        let stand_pat = sign * eval::evaluate(&self.pos);
        self.nodes += 1;

        if stand_pat >= beta {
            let result = SearchResult { score: beta, variation: Vec::new() };
            self.table.insert(&self.pos, 0, Bound::Lower, &result);
            return result;
        }

        let mut list = self.pos.forcing_moves();
        if let Some(hint) = hint {
            list.retain(|m| *m != hint);
            list.insert(0, hint);
        }

        let mut bound = Bound::Upper;
        let mut best = SearchResult { score: max(alpha, stand_pat), variation: Vec::new() };

        for mv in list {
            if self.pos.make_move(mv).is_err() {
                continue;
            }
            self.ply += 1;
            let child = -self.quiescence(-beta, -best.score, -sign);
            self.ply -= 1;
            self.pos.unmake_move(mv);

            if child.score >= beta {
                let result = SearchResult { score: beta, variation: vec![mv] };
                self.table.insert(&self.pos, 0, Bound::Lower, &result);
                return result;
            }
            if child.score > best.score {
                best = child.prepend(mv);
                bound = Bound::Exact;
            }
        }

        self.table.insert(&self.pos, 0, bound, &best);
        best
    }

    /// Emits the root progress line: table hit ratio, kilonodes, the principal variation so
    /// far, and the move just processed.
    fn report(&mut self, best: &SearchResult, current: Move) {
        let probes = self.tt_hits + self.tt_misses;
        let ratio = if probes > 0 { 100 * self.tt_hits / probes } else { 0 };
        let variation = best.variation.iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        self.sink.line(&format!("info TPC : {}% {}kn  PV : {}  curr : {}",
            ratio, self.nodes / 1000, variation, current));
    }
}

impl<S: InfoSink> fmt::Debug for Searcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("pos", &self.pos)
            .field("table", &self.table)
            .field("nodes", &self.nodes)
            .finish()
    }
}
