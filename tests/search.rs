//! End-to-end search scenarios.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::max;
use caissa::chess::Position;
use caissa::engine::{eval, Score, Searcher};

fn searcher_at(fen: &str) -> Searcher<Vec<String>> {
    let mut searcher = Searcher::new(Vec::new());
    searcher.set_position(fen.parse().expect("valid fen"));
    searcher
}

#[test]
fn starting_position_is_roughly_balanced() {
    let mut searcher = Searcher::new(());
    let result = searcher.search(1);

    assert!(result.score > Score::from(-50) && result.score < Score::from(50),
        "score {} out of tolerance", result.score);
    assert_eq!(result.variation.len(), 1);
    assert!(searcher.nodes() >= 20);
}

#[test]
fn king_and_pawn_endgame_pushes_the_pawn() {
    let mut searcher = searcher_at("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
    let result = searcher.search(4);

    let best = result.first().expect("a move").to_string();
    assert!(best == "e2e4" || best == "e2e3", "unexpected best move {}", best);
    assert!(result.score > Score::draw());
}

#[test]
fn mate_in_one_is_found_with_the_sentinel_score() {
    let mut searcher = searcher_at("6k1/5ppp/8/8/8/8/5PPP/R6K w - - 0 1");
    let result = searcher.search(2);

    assert_eq!(result.first().expect("a move").to_string(), "a1a8");
    assert_eq!(result.score, Score::mate());
}

#[test]
fn stalemate_returns_the_terminal_score_with_an_empty_variation() {
    let mut searcher = searcher_at("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let result = searcher.search(1);

    assert_eq!(result.score, Score::draw());
    assert!(result.variation.is_empty());
}

#[test]
fn hash_round_trips_through_an_opening_line() {
    let mut pos = Position::new();
    let initial = pos.zobrist_key();

    let mut made = Vec::new();
    for step in &["e2e4", "e7e5", "g1f3", "b8c6"] {
        let mv = pos.moves().into_iter()
            .find(|m| m.to_string() == *step)
            .expect("line move is generated");
        pos.make_move(mv).expect("line move is legal");
        made.push(mv);
    }
    assert_ne!(pos.zobrist_key(), initial);

    for mv in made.into_iter().rev() {
        pos.unmake_move(mv);
    }
    assert_eq!(pos.zobrist_key(), initial);
    assert_eq!(pos, Position::new());
}

#[test]
fn identical_searches_agree_move_for_move() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";

    let mut first = searcher_at(fen);
    let mut second = searcher_at(fen);
    let a = first.search(4);
    let b = second.search(4);

    assert_eq!(a.score, b.score);
    assert_eq!(a.variation, b.variation);
    assert_eq!(first.sink(), second.sink());
}

#[test]
fn info_lines_follow_the_reporting_format() {
    let mut searcher = searcher_at("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
    searcher.search(2);

    let lines = searcher.sink();
    assert_eq!(lines[0], "info depth 1");
    assert!(lines.contains(&"info depth 2".to_string()));

    let progress: Vec<_> = lines.iter()
        .filter(|l| l.starts_with("info TPC : "))
        .collect();
    assert!(!progress.is_empty());
    for line in progress {
        assert!(line.contains("kn  PV : "), "malformed line {}", line);
        assert!(line.contains("  curr : "), "malformed line {}", line);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// A plain fail-hard alpha-beta over the same evaluation and quiescence, as a reference for the
// negascout scores.

fn reference_quiescence(pos: &mut Position, alpha: Score, beta: Score, sign: i32) -> Score {
    let stand_pat = sign * eval::evaluate(pos);
    if stand_pat >= beta {
        return beta;
    }
    let mut alpha = max(alpha, stand_pat);

    for mv in pos.forcing_moves() {
        if pos.make_move(mv).is_err() {
            continue;
        }
        let score = -reference_quiescence(pos, -beta, -alpha, -sign);
        pos.unmake_move(mv);

        if score >= beta {
            return beta;
        }
        alpha = max(alpha, score);
    }

    alpha
}

fn reference_alphabeta(
    pos: &mut Position, depth: usize,
    alpha: Score, beta: Score, sign: i32,
) -> Score {
    if !pos.any_move() {
        return sign * eval::terminal(pos);
    }
    if depth == 0 {
        return reference_quiescence(pos, alpha, beta, sign);
    }

    let mut alpha = alpha;
    for mv in pos.moves() {
        if pos.make_move(mv).is_err() {
            continue;
        }
        let score = -reference_alphabeta(pos, depth - 1, -beta, -alpha, -sign);
        pos.unmake_move(mv);

        if score >= beta {
            return beta;
        }
        alpha = max(alpha, score);
    }

    alpha
}

#[test]
fn negascout_matches_plain_alphabeta() {
    for &(fen, depth) in &[
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3),
        ("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 1", 2),
        ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", 3),
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1", 2),
    ] {
        let mut pos: Position = fen.parse().expect("valid fen");
        let sign = if pos.turn() == caissa::chess::Color::White { 1 } else { -1 };
        let expected = reference_alphabeta(
            &mut pos, depth, -Score::infinity(), Score::infinity(), sign);

        let mut searcher = searcher_at(fen);
        let result = searcher.search(depth);

        assert_eq!(result.score, expected, "depth {} of {}", depth, fen);
    }
}
