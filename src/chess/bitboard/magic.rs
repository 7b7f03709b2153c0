//! Magic-bitboard lookup tables for sliding piece attacks.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! For each square the database stores a relevance mask (the ray squares whose occupancy can
//! block travel), a magic multiplier, a shift, and an offset into one flat attack array shared
//! by all 64 squares of a piece type (the "fancy" layout, packed by an exclusive prefix sum of
//! the per-square span sizes). A lookup is then
//!
//! ```text
//! dat[base + ((occupancy & mask) * magic) >> shift]
//! ```
//!
//! The magic multipliers are found at startup by randomized search: sparse candidates are drawn
//! from a deterministic generator (see [`prng::Lcg`](../../prng/struct.Lcg.html), seeded 0) and
//! accepted once the hash above maps every subset of the mask to its ray-cast attack set without
//! a conflicting collision. The search is reproducible, so every run builds identical tables.
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use lazy_static::lazy_static;
use log::debug;
use crate::chess::prng::Lcg;
use super::*;

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Candidates whose mask hash cannot reach at least this many bits in the top byte are
/// discarded without a trial.
const MIN_TOP_BYTE_BITS: u32 = 6;

/// Upper bound on candidate draws per square before construction gives up.
const MAX_TRIALS: usize = 100_000_000;

lazy_static! {
    static ref ROOK_TABLE: MagicTable = MagicTable::build(&ROOK_DIRECTIONS, "rook");
    static ref BISHOP_TABLE: MagicTable = MagicTable::build(&BISHOP_DIRECTIONS, "bishop");
}

/// Computes rook-like attacks to or from `sq` based on the occupied squares given by `occ`
#[inline]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    ROOK_TABLE.attacks(sq, occ)
}

/// Computes bishop-like attacks to or from `sq` based on the occupied squares given by `occ`
#[inline]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    BISHOP_TABLE.attacks(sq, occ)
}

/// Computes queen-like attacks to or from `sq` based on the occupied squares given by `occ`
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The per-square lookup parameters
#[derive(Debug, Copy, Clone)]
struct Magic {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    base: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occ: Bitboard) -> usize {
        let hash = (u64::from(occ) & u64::from(self.mask)).wrapping_mul(self.magic);
        self.base + (hash >> self.shift) as usize
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A complete attack database for one sliding piece type
#[derive(Debug)]
struct MagicTable {
    magics: Vec<Magic>,
    dat: Vec<Bitboard>,
}

impl MagicTable {
    /// Builds the database for the piece sliding along `directions`.
    ///
    /// # Panics
    ///
    /// Panics if the magic search fails to find a multiplier for some square, which cannot
    /// happen with the fixed generator seed and standard masks.
    fn build(directions: &[(i8, i8); 4], name: &str) -> MagicTable {
        let mut magics = Vec::with_capacity(Square::COUNT);
        let mut dat = Vec::new();
        let mut rng = Lcg::new(0);

        for index in 0..Square::COUNT {
            let sq = Square::try_from(index).expect("INFALLIBLE");
            let mask = sliding_mask(directions, sq);
            let shift = 64 - mask.len() as u32;
            let base = dat.len();

            // every subset of the mask, paired with its reference attack set
            let subsets: Vec<(Bitboard, Bitboard)> = mask_subsets(mask)
                .into_iter()
                .map(|occ| (occ, ray_attacks(directions, sq, occ)))
                .collect();

            let magic = find_magic(mask, shift, &subsets, &mut rng)
                .unwrap_or_else(|| {
                    panic!("no {} magic number found for {} after {} candidates",
                        name, sq, MAX_TRIALS)
                });

            let entry = Magic { mask, magic, shift, base };
            dat.resize(base + subsets.len(), Bitboard::new());
            for &(occ, attacks) in &subsets {
                dat[entry.index(occ)] = attacks;
            }

            magics.push(entry);
        }

        debug!("{} attack table built: {} entries", name, dat.len());

        MagicTable { magics, dat }
    }

    #[inline]
    fn attacks(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let index = self.magics[sq as usize].index(occ);

        debug_assert!(index < self.dat.len());
        // in range by construction: the hash of any occupancy lands inside the square's span
        unsafe { *self.dat.get_unchecked(index) }
    }
}

/// Searches for a multiplier that maps every subset of `mask` to a distinct slot, allowing
/// collisions only between subsets that agree on the attack set.
fn find_magic(
    mask: Bitboard,
    shift: u32,
    subsets: &[(Bitboard, Bitboard)],
    rng: &mut Lcg,
) -> Option<u64> {
    let span = subsets.len();
    let mut slots = vec![(0usize, Bitboard::new()); span];
    let mut stamp = 0;

    for _ in 0..MAX_TRIALS {
        let candidate = rng.next_sparse();
        if (candidate.wrapping_mul(u64::from(mask)) >> 56).count_ones() < MIN_TOP_BYTE_BITS {
            continue;
        }

        stamp += 1;
        let trial = Magic { mask, magic: candidate, shift, base: 0 };
        let mut ok = true;
        for &(occ, attacks) in subsets {
            let slot = &mut slots[trial.index(occ)];
            if slot.0 != stamp {
                *slot = (stamp, attacks);
            } else if slot.1 != attacks {
                ok = false;
                break;
            }
        }

        if ok {
            return Some(candidate);
        }
    }

    None
}

/// Returns the relevant occupancy mask for a slider on `sq`: the attack rays on an empty board
/// with each ray's terminal edge square removed, since a piece on the edge can never block
/// further travel.
fn sliding_mask(directions: &[(i8, i8); 4], sq: Square) -> Bitboard {
    let mut mask = Bitboard::new();

    for &(dx, dy) in directions {
        let mut file = sq.file() as i8 + dx;
        let mut rank = sq.rank() as i8 + dy;
        while on_board(file + dx, rank + dy) {
            mask.insert(coord(file, rank));
            file += dx;
            rank += dy;
        }
    }

    mask
}

/// Computes a slider's attack set by casting rays that halt at the first occupied square.
fn ray_attacks(directions: &[(i8, i8); 4], sq: Square, occ: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::new();

    for &(dx, dy) in directions {
        let mut file = sq.file() as i8 + dx;
        let mut rank = sq.rank() as i8 + dy;
        while on_board(file, rank) {
            let dest = coord(file, rank);
            attacks.insert(dest);
            if occ.contains(dest) {
                break;
            }
            file += dx;
            rank += dy;
        }
    }

    attacks
}

/// Enumerates every subset of `mask` using the carry-rippler technique.
fn mask_subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mask = u64::from(mask);
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;

    loop {
        subsets.push(Bitboard::from(subset));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }

    subsets
}

fn on_board(file: i8, rank: i8) -> bool {
    (0..File::COUNT as i8).contains(&file) && (0..Rank::COUNT as i8).contains(&rank)
}

fn coord(file: i8, rank: i8) -> Square {
    Square::from_coord(
        File::try_from(file as usize).expect("INFALLIBLE"),
        Rank::try_from(rank as usize).expect("INFALLIBLE"),
    )
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::convert::TryFrom;
    use super::*;

    #[test]
    fn masks_strip_the_edges() {
        // a rook on a1 is blocked only by a2..a7 and b1..g1
        let mask = sliding_mask(&ROOK_DIRECTIONS, Square::A1);
        assert_eq!(mask.len(), 12);
        assert!(!mask.contains(Square::A8));
        assert!(!mask.contains(Square::H1));
        assert!(mask.contains(Square::A7));
        assert!(mask.contains(Square::G1));

        // a bishop in the corner has the long diagonal minus both ends
        let mask = sliding_mask(&BISHOP_DIRECTIONS, Square::A1);
        assert_eq!(mask.len(), 6);
        assert!(!mask.contains(Square::H8));
    }

    #[test]
    fn empty_board_lookups_match_the_rays() {
        for index in 0..Square::COUNT {
            let sq = Square::try_from(index).unwrap();
            assert_eq!(rook_attacks(sq, Bitboard::new()),
                ray_attacks(&ROOK_DIRECTIONS, sq, Bitboard::new()));
            assert_eq!(bishop_attacks(sq, Bitboard::new()),
                ray_attacks(&BISHOP_DIRECTIONS, sq, Bitboard::new()));
        }
    }

    #[test]
    fn every_subset_of_every_mask_matches_the_rays() {
        for index in 0..Square::COUNT {
            let sq = Square::try_from(index).unwrap();

            for occ in mask_subsets(sliding_mask(&ROOK_DIRECTIONS, sq)) {
                assert_eq!(rook_attacks(sq, occ), ray_attacks(&ROOK_DIRECTIONS, sq, occ),
                    "rook on {} with occupancy {:x}", sq, occ);
            }
            for occ in mask_subsets(sliding_mask(&BISHOP_DIRECTIONS, sq)) {
                assert_eq!(bishop_attacks(sq, occ), ray_attacks(&BISHOP_DIRECTIONS, sq, occ),
                    "bishop on {} with occupancy {:x}", sq, occ);
            }
        }
    }

    #[test]
    fn rook_on_a1_sees_through_to_the_first_blockers() {
        let occ = Bitboard::from(Square::A4) | Square::D1.into();
        let expected: Bitboard = [Square::A2, Square::A3, Square::A4,
            Square::B1, Square::C1, Square::D1].iter().copied().collect();
        assert_eq!(rook_attacks(Square::A1, occ), expected);
    }

    #[test]
    fn blockers_outside_the_mask_are_ignored_correctly() {
        // a blocker on the edge square h1 does not change the attacks from a1
        let occ = Bitboard::from(Square::H1);
        assert_eq!(rook_attacks(Square::A1, occ),
            rook_attacks(Square::A1, Bitboard::new()));
    }

    #[test]
    fn queen_is_the_union_of_rook_and_bishop() {
        let occ = Bitboard::from(Square::D4) | Square::F6.into();
        assert_eq!(queen_attacks(Square::D1, occ),
            rook_attacks(Square::D1, occ) | bishop_attacks(Square::D1, occ));
    }
}
