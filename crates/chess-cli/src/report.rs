//! Serializable command results.
//!
//! Printed as JSON with `--json`, otherwise as plain text.

use chess_search::SearchResult;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Node count of one root move in a perft divide.
#[derive(Debug, Serialize)]
pub struct DivideEntry {
    #[serde(rename = "move")]
    pub mv: String,
    pub nodes: u64,
}

#[derive(Debug, Serialize)]
pub struct PerftReport {
    pub fen: String,
    pub depth: u32,
    pub nodes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub divide: Vec<DivideEntry>,
    pub time_ms: u64,
    pub nps: u64,
}

impl PerftReport {
    pub fn new(
        fen: String,
        depth: u32,
        divide: Vec<(String, u64)>,
        nodes: u64,
        elapsed: Duration,
    ) -> Self {
        let divide: Vec<DivideEntry> = divide
            .into_iter()
            .map(|(mv, nodes)| DivideEntry { mv, nodes })
            .collect();
        PerftReport {
            fen,
            depth,
            nodes,
            divide,
            time_ms: elapsed.as_millis() as u64,
            nps: per_second(nodes, elapsed),
        }
    }
}

impl fmt::Display for PerftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.divide {
            writeln!(f, "{}: {}", entry.mv, entry.nodes)?;
        }
        if !self.divide.is_empty() {
            writeln!(f)?;
        }
        write!(
            f,
            "perft({}) = {} ({} ms, {} nps)",
            self.depth, self.nodes, self.time_ms, self.nps
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub fen: String,
    /// `None` when the side to move has no legal move.
    pub best_move: Option<String>,
    pub score_cp: Option<i32>,
    pub mate_in: Option<i32>,
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
    /// Final result when the game is already over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl SearchReport {
    pub fn new(
        fen: String,
        result: Option<SearchResult>,
        game_result: Option<String>,
        elapsed: Duration,
    ) -> Self {
        let time_ms = elapsed.as_millis() as u64;
        match result {
            Some(found) => {
                let mate_in = found.mate_in();
                SearchReport {
                    fen,
                    best_move: Some(found.best_move.to_uci()),
                    score_cp: mate_in.is_none().then_some(found.score),
                    mate_in,
                    depth: found.depth,
                    nodes: found.nodes,
                    time_ms,
                    result: game_result,
                }
            }
            None => SearchReport {
                fen,
                best_move: None,
                score_cp: None,
                mate_in: None,
                depth: 0,
                nodes: 0,
                time_ms,
                result: game_result,
            },
        }
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(best) = &self.best_move else {
            return match &self.result {
                Some(result) => write!(f, "game over: {}", result),
                None => write!(f, "no legal move"),
            };
        };
        let score = match (self.mate_in, self.score_cp) {
            (Some(mate), _) => format!("mate {}", mate),
            (None, Some(cp)) => format!("cp {}", cp),
            (None, None) => "-".to_string(),
        };
        write!(
            f,
            "bestmove {} ({}, depth {}, {} nodes, {} ms)",
            best, score, self.depth, self.nodes, self.time_ms
        )
    }
}

fn per_second(nodes: u64, elapsed: Duration) -> u64 {
    let micros = elapsed.as_micros().max(1);
    (nodes as u128 * 1_000_000 / micros) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Move, Square};
    use chess_search::MATE_SCORE;

    #[test]
    fn test_perft_report_json() {
        let report = PerftReport::new(
            "fen".to_string(),
            1,
            vec![("e2e4".to_string(), 1)],
            1,
            Duration::from_millis(2),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["nodes"], 1);
        assert_eq!(json["divide"][0]["move"], "e2e4");
        assert_eq!(json["nps"], 500);
    }

    #[test]
    fn test_divide_omitted_when_empty() {
        let report = PerftReport::new("fen".to_string(), 3, Vec::new(), 8902, Duration::ZERO);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("divide").is_none());
        assert_eq!(report.to_string().lines().count(), 1);
    }

    #[test]
    fn test_search_report_mate() {
        let found = SearchResult {
            best_move: Move::new(Square::A1, Square::A8),
            score: MATE_SCORE - 1,
            depth: 1,
            nodes: 40,
        };
        let elapsed = Duration::from_millis(3);
        let report = SearchReport::new("fen".to_string(), Some(found), None, elapsed);
        assert_eq!(report.best_move.as_deref(), Some("a1a8"));
        assert_eq!(report.mate_in, Some(1));
        assert_eq!(report.score_cp, None);
        assert!(report.to_string().starts_with("bestmove a1a8 (mate 1"));
    }

    #[test]
    fn test_search_report_game_over() {
        let report = SearchReport::new(
            "fen".to_string(),
            None,
            Some("1-0".to_string()),
            Duration::ZERO,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["best_move"].is_null());
        assert_eq!(json["result"], "1-0");
        assert_eq!(report.to_string(), "game over: 1-0");
    }
}
