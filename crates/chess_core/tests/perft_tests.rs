use std::time::Instant;

use rayon::prelude::*;

use chess_core::{perft, Position};

const FULL_PERFT_ENV: &str = "FULL_PERFT";
const NODE_LIMIT: u64 = 100_000;

fn parse_epd_line(line: &str) -> Option<(String, Vec<(u8, u64)>)> {
    let mut parts = line.split(';');
    let fen = parts.next()?.trim();
    if fen.is_empty() {
        return None;
    }

    let mut depths = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut items = part.split_whitespace();
        let key = items.next().unwrap_or("");
        let val = items.next().unwrap_or("");
        if !key.starts_with('D') {
            continue;
        }
        let depth: u8 = key[1..]
            .parse()
            .unwrap_or_else(|_| panic!("Invalid depth token in EPD: {}", key));
        let expected: u64 = val
            .parse()
            .unwrap_or_else(|_| panic!("Invalid node count in EPD: {}", val));
        depths.push((depth, expected));
    }
    if depths.is_empty() {
        return None;
    }
    depths.sort_by_key(|(d, _)| *d);
    Some((fen.to_string(), depths))
}

#[test]
fn perft_from_standard_epd() {
    let full = std::env::var(FULL_PERFT_ENV).is_ok();
    let data = include_str!("standard.epd");
    let cases: Vec<(usize, String, Vec<(u8, u64)>)> = data
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            parse_epd_line(line).map(|(fen, depths)| (idx, fen, depths))
        })
        .collect();
    assert_eq!(cases.len(), 6);

    cases.par_iter().for_each(|(idx, fen, depths)| {
        let pos = Position::from_fen(fen)
            .unwrap_or_else(|e| panic!("EPD case {} has a bad FEN: {e}", idx + 1));
        let case_start = Instant::now();
        let mut total_nodes: u64 = 0;

        for (depth, expected) in depths {
            if !full && *expected > NODE_LIMIT {
                continue;
            }
            let got = perft(&pos, *depth);
            assert!(
                got == *expected,
                "Perft mismatch for FEN '{}' at depth {}: expected {}, got {}",
                fen,
                depth,
                expected,
                got
            );
            total_nodes += got;
        }

        println!(
            "Case {:03} done: total nodes {}, elapsed {:.3?}",
            idx + 1,
            total_nodes,
            case_start.elapsed()
        );
    });
}

#[test]
fn perft_depth_zero_is_one() {
    assert_eq!(perft(&Position::startpos(), 0), 1);
}
