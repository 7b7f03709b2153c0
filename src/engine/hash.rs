//! The transposition table.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A bounded least-recently-used cache from Zobrist keys to search results. Entries carry a
//! compact snapshot of the position they were stored for, so a key collision is detected by
//! comparison and degrades to a miss instead of corrupting the search. Recency is kept in an
//! intrusive doubly-linked list threaded through a slab of nodes; both lookups and inserts
//! count as access.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::collections::HashMap;
use crate::chess::{Move, Position, PositionKey};
use super::SearchResult;

/// Link value meaning "no node".
const NIL: usize = usize::MAX;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates the kind of bound a stored search result carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is a lower bound on the true score (the node failed high).
    Lower,
    /// The stored score is exact.
    Exact,
    /// The stored score is an upper bound on the true score (the node failed low).
    Upper,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An entry in the transposition table.
#[derive(Debug, Clone)]
pub struct TableEntry {
    snapshot: PositionKey,
    depth: usize,
    bound: Bound,
    result: SearchResult,
}

impl TableEntry {
    /// Returns the depth the entry was searched to.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the kind of bound the entry carries.
    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// Returns the stored search result.
    pub fn result(&self) -> &SearchResult {
        &self.result
    }

    /// Consumes the entry, returning the stored search result.
    pub fn into_result(self) -> SearchResult {
        self.result
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The outcome of probing the table.
#[derive(Debug)]
pub enum Lookup {
    /// The position was found at sufficient depth.
    Hit(TableEntry),
    /// The position was found, but at insufficient depth; the stored best move, if any, is
    /// returned as an ordering hint.
    Shallow(Option<Move>),
    /// The key is absent, or present for a different position.
    Miss,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
struct Node {
    key: u64,
    entry: TableEntry,
    prev: usize,
    next: usize,
}

/// A bounded LRU transposition table.
pub struct TransTable {
    map: HashMap<u64, usize>,
    nodes: Vec<Node>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl TransTable {
    /// The default capacity, in entries.
    pub const CAPACITY: usize = 4 * 8192;

    /// Creates an empty table with the default capacity.
    pub fn new() -> TransTable {
        TransTable::with_capacity(Self::CAPACITY)
    }

    /// Creates an empty table bounded to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> TransTable {
        assert!(capacity > 0, "transposition table requires a nonzero capacity");

        TransTable {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Probes the table for `pos` at the given search depth, refreshing the entry's recency.
    pub fn lookup(&mut self, pos: &Position, depth: usize) -> Lookup {
        let key = u64::from(pos.zobrist_key());

        if let Some(&index) = self.map.get(&key) {
            if self.nodes[index].entry.snapshot == pos.key() {
                self.touch(index);
                let entry = &self.nodes[index].entry;
                if entry.depth >= depth {
                    return Lookup::Hit(entry.clone());
                }
                return Lookup::Shallow(entry.result.first());
            }
        }

        Lookup::Miss
    }

    /// Stores a result for `pos`, evicting the least-recently-accessed entry when full.
    ///
    /// A fresh key always inserts. An occupied key is overwritten only when the incoming
    /// bound is `Exact` and the resident one is not: exact scores are the most valuable, a
    /// shallower exact still beats a deeper bound for move ordering, and refusing other
    /// overwrites avoids churn from transient bound updates. Either way the key's recency is
    /// refreshed.
    pub fn insert(&mut self, pos: &Position, depth: usize, bound: Bound, result: &SearchResult) {
        let key = u64::from(pos.zobrist_key());

        if let Some(&index) = self.map.get(&key) {
            self.touch(index);
            let resident = &mut self.nodes[index].entry;
            if bound == Bound::Exact && resident.bound != Bound::Exact {
                *resident = TableEntry {
                    snapshot: pos.key(),
                    depth,
                    bound,
                    result: result.clone(),
                };
            }
            return;
        }

        let entry = TableEntry {
            snapshot: pos.key(),
            depth,
            bound,
            result: result.clone(),
        };

        let index = if self.nodes.len() < self.capacity {
            self.nodes.push(Node { key, entry, prev: NIL, next: NIL });
            self.nodes.len() - 1
        } else {
            // reuse the least-recently-accessed slot
            let index = self.tail;
            self.unlink(index);
            self.map.remove(&self.nodes[index].key);
            self.nodes[index] = Node { key, entry, prev: NIL, next: NIL };
            index
        };

        self.push_front(index);
        self.map.insert(key, index);
    }

    fn touch(&mut self, index: usize) {
        if self.head != index {
            self.unlink(index);
            self.push_front(index);
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = (self.nodes[index].prev, self.nodes[index].next);

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn push_front(&mut self, index: usize) {
        self.nodes[index].prev = NIL;
        self.nodes[index].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = index;
        } else {
            self.tail = index;
        }
        self.head = index;
    }
}

impl Default for TransTable {
    fn default() -> Self {
        TransTable::new()
    }
}

impl std::fmt::Debug for TransTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
