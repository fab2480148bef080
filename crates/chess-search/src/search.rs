//! Iterative-deepening alpha-beta search.
//!
//! Negamax with fail-soft alpha-beta. Every node branches on its own clone
//! of the [`Game`], so sibling subtrees never share mutable state. The
//! transposition table is consulted before a node is expanded and written
//! once it is resolved.

use crate::eval::evaluate;
use crate::ordering::order_moves;
use crate::tt::{Bound, TranspositionTable, TtEntry};
use chess_core::Move;
use chess_engine::Game;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 1_000_000;

/// Base score for checkmate (adjusted by ply for mate distance).
pub const MATE_SCORE: i32 = 100_000;

/// Scores above this threshold indicate a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

/// Deepest iteration the engine will start.
pub const MAX_DEPTH: u8 = 64;

/// Nodes between clock reads.
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Shared stop flag. Clones observe the same flag, so a host can keep one
/// and cancel a search running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// When to stop searching. With neither limit set the search runs to
/// [`MAX_DEPTH`] or until cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub time: Option<Duration>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        SearchLimits {
            depth: Some(depth),
            time: None,
        }
    }

    pub fn time(time: Duration) -> Self {
        SearchLimits {
            depth: None,
            time: Some(time),
        }
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Centipawns from the side to move's perspective.
    pub score: i32,
    /// Deepest fully completed iteration; 0 if none completed.
    pub depth: u8,
    pub nodes: u64,
}

impl SearchResult {
    /// Moves to mate when the score is a mate score: positive when the side
    /// to move mates, negative when it gets mated.
    pub fn mate_in(&self) -> Option<i32> {
        if self.score.abs() < MATE_THRESHOLD {
            return None;
        }
        let plies = MATE_SCORE - self.score.abs();
        let moves = (plies + 1) / 2;
        Some(if self.score > 0 { moves } else { -moves })
    }
}

/// Search engine owning a transposition table and a cancellation flag.
#[derive(Debug, Default)]
pub struct Engine {
    tt: TranspositionTable,
    cancel: CancelToken,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stops the current search when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Best-effort interruption of a running search.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Forgets all cached results, e.g. between games.
    pub fn clear(&mut self) {
        self.tt.clear();
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Searches `game` and returns the move to play.
    ///
    /// Returns `None` only when the side to move has no legal move or the
    /// game is over. When stopped early the result is the best move of the
    /// deepest completed iteration, or the best root move examined so far
    /// if not even the first iteration finished.
    pub fn search(&mut self, game: &Game, limits: SearchLimits) -> Option<SearchResult> {
        self.cancel.reset();
        if game.is_game_over() {
            return None;
        }
        let mut root_moves = game.legal_move_list();
        if root_moves.is_empty() {
            return None;
        }

        let tt_move = self.tt.probe(game.hash()).and_then(|e| e.best_move);
        order_moves(game, root_moves.as_mut_slice(), tt_move);
        let root_moves = root_moves.as_slice().to_vec();

        let max_depth = limits.depth.unwrap_or(MAX_DEPTH).clamp(1, MAX_DEPTH);
        let mut searcher = Searcher {
            tt: &mut self.tt,
            cancel: &self.cancel,
            nodes: 0,
            start: Instant::now(),
            max_time: limits.time,
            stopped: false,
        };
        searcher.iterate(game, root_moves, max_depth)
    }
}

struct Searcher<'a> {
    tt: &'a mut TranspositionTable,
    cancel: &'a CancelToken,
    nodes: u64,
    start: Instant,
    max_time: Option<Duration>,
    stopped: bool,
}

impl Searcher<'_> {
    fn check_stop(&mut self) -> bool {
        if !self.stopped {
            let out_of_time = self.nodes % TIME_CHECK_INTERVAL == 0
                && self
                    .max_time
                    .is_some_and(|limit| self.start.elapsed() >= limit);
            self.stopped = out_of_time || self.cancel.is_cancelled();
        }
        self.stopped
    }

    fn iterate(
        &mut self,
        game: &Game,
        mut root_moves: Vec<Move>,
        max_depth: u8,
    ) -> Option<SearchResult> {
        let mut best: Option<SearchResult> = None;

        for depth in 1..=max_depth {
            let mut alpha = -INF;
            let beta = INF;
            let mut iteration: Option<(usize, i32)> = None;

            for (i, &mv) in root_moves.iter().enumerate() {
                let mut child = game.clone();
                child.make_move(mv);
                let score = -self.negamax(&child, depth - 1, 1, -beta, -alpha);

                if self.stopped {
                    break;
                }
                if iteration.map_or(true, |(_, s)| score > s) {
                    iteration = Some((i, score));
                    alpha = alpha.max(score);
                }
            }

            let Some((index, score)) = iteration else {
                break;
            };

            if self.stopped {
                // Partial iteration: only useful when nothing completed.
                if best.is_none() {
                    best = Some(SearchResult {
                        best_move: root_moves[index],
                        score,
                        depth: 0,
                        nodes: self.nodes,
                    });
                }
                break;
            }

            // Principal move first in the next iteration.
            root_moves[..=index].rotate_right(1);
            let result = SearchResult {
                best_move: root_moves[0],
                score,
                depth,
                nodes: self.nodes,
            };
            tracing::debug!(
                depth,
                score,
                nodes = self.nodes,
                best = %result.best_move,
                elapsed_ms = self.start.elapsed().as_millis() as u64,
                "iteration complete"
            );
            best = Some(result);

            if score.abs() >= MATE_THRESHOLD {
                break;
            }
            // Unlikely to complete the next depth in time.
            if self
                .max_time
                .is_some_and(|limit| self.start.elapsed() > limit / 2)
            {
                break;
            }
        }

        // Stopped before any root move was scored.
        best.or_else(|| {
            root_moves.first().map(|&mv| SearchResult {
                best_move: mv,
                score: 0,
                depth: 0,
                nodes: self.nodes,
            })
        })
    }

    fn negamax(
        &mut self,
        game: &Game,
        depth: u8,
        ply: i32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        if self.check_stop() {
            return 0;
        }

        // Mate and stalemate take precedence over the draw rules.
        if !game.has_legal_move() {
            return terminal_score(game, ply);
        }
        if game.draw_by_rule().is_some() {
            return 0;
        }

        let key = game.hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            tt_move = entry.best_move;
            if entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Exact => return score,
                    Bound::Lower => alpha = alpha.max(score),
                    Bound::Upper => beta = beta.min(score),
                }
                if alpha >= beta {
                    return score;
                }
            }
        }

        if depth == 0 {
            return evaluate(game);
        }

        // Bounds are classified against the window as narrowed by the table.
        let alpha_orig = alpha;
        let mut moves = game.legal_move_list();
        order_moves(game, moves.as_mut_slice(), tt_move);

        let mut best_score = -INF;
        let mut best_move = None;
        for &mv in &moves {
            let mut child = game.clone();
            child.make_move(mv);
            let score = -self.negamax(&child, depth - 1, ply + 1, -beta, -alpha);

            if self.stopped {
                return 0;
            }
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(
            key,
            TtEntry {
                depth,
                score: score_to_tt(best_score, ply),
                bound,
                best_move,
            },
        );
        best_score
    }
}

/// Score of a node with no legal move: mated, or stalemate.
fn terminal_score(game: &Game, ply: i32) -> i32 {
    if game.is_check() {
        -(MATE_SCORE - ply)
    } else {
        0
    }
}

/// Mate scores are stored relative to the node, not the root.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Square;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn finds_back_rank_mate() {
        let game = Game::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let result = Engine::new().search(&game, SearchLimits::depth(3)).unwrap();
        assert_eq!(result.best_move, Move::new(sq("a1"), sq("a8")));
        assert_eq!(result.score, MATE_SCORE - 1);
        assert_eq!(result.mate_in(), Some(1));
    }

    #[test]
    fn takes_hanging_queen() {
        let game = Game::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let result = Engine::new().search(&game, SearchLimits::depth(2)).unwrap();
        assert_eq!(result.best_move, Move::new(sq("d1"), sq("d5")));
        assert!(result.score > 0);
    }

    #[test]
    fn no_move_when_game_is_over() {
        let mated = Game::from_fen("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1").unwrap();
        assert!(Engine::new().search(&mated, SearchLimits::depth(2)).is_none());
        let stalemate = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(Engine::new().search(&stalemate, SearchLimits::depth(2)).is_none());
    }

    #[test]
    fn depth_limit_is_respected() {
        let game = Game::new();
        let result = Engine::new().search(&game, SearchLimits::depth(3)).unwrap();
        assert_eq!(result.depth, 3);
        assert!(game.legal_move_list().contains(result.best_move));
    }

    #[test]
    fn time_limit_returns_a_legal_move() {
        let game = Game::new();
        let result = Engine::new()
            .search(&game, SearchLimits::time(Duration::from_millis(50)))
            .unwrap();
        assert!(game.legal_move_list().contains(result.best_move));
    }

    #[test]
    fn cancelled_search_returns_best_so_far() {
        let game = Game::new();
        let mut engine = Engine::new();
        let token = engine.cancel_token();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            token.cancel();
        });
        let result = engine.search(&game, SearchLimits::default()).unwrap();
        canceller.join().unwrap();
        assert!(game.legal_move_list().contains(result.best_move));
        assert!(result.depth < MAX_DEPTH);
    }

    #[test]
    fn table_fills_and_clears() {
        let mut engine = Engine::new();
        engine.search(&Game::new(), SearchLimits::depth(2));
        assert!(!engine.transposition_table().is_empty());
        engine.clear();
        assert!(engine.transposition_table().is_empty());
    }

    #[test]
    fn mate_scores_survive_the_table() {
        let stored = score_to_tt(MATE_SCORE - 5, 3);
        assert_eq!(score_from_tt(stored, 3), MATE_SCORE - 5);
        assert_eq!(score_from_tt(stored, 1), MATE_SCORE - 3);
        assert_eq!(score_to_tt(120, 7), 120);
    }

    #[test]
    fn mate_outranks_the_fifty_move_rule() {
        // Ra8 mates and brings the halfmove clock to 100 in the same move.
        let game = Game::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 99 60").unwrap();
        let mut after = game.clone();
        assert_eq!(
            after.execute_move(sq("a1"), sq("a8"), None),
            chess_engine::MoveStatus::Checkmate
        );

        let result = Engine::new().search(&game, SearchLimits::depth(3)).unwrap();
        assert_eq!(result.best_move, Move::new(sq("a1"), sq("a8")));
        assert_eq!(result.score, MATE_SCORE - 1);
    }

    /// Position after 1.e4, searched one ply deep from ply 1.
    fn after_e4() -> Game {
        let mut game = Game::new();
        assert!(game.execute_move(sq("e2"), sq("e4"), None).is_executed());
        game
    }

    fn search_node(tt: &mut TranspositionTable, game: &Game, alpha: i32, beta: i32) -> i32 {
        let cancel = CancelToken::new();
        let mut searcher = Searcher {
            tt,
            cancel: &cancel,
            nodes: 0,
            start: Instant::now(),
            max_time: None,
            stopped: false,
        };
        searcher.negamax(game, 1, 1, alpha, beta)
    }

    #[test]
    fn score_inside_the_window_is_exact() {
        let game = after_e4();
        let mut tt = TranspositionTable::new();
        let score = search_node(&mut tt, &game, -INF, INF);
        let entry = tt.probe(game.hash()).unwrap();
        assert_eq!(entry.bound, Bound::Exact);
        assert_eq!(entry.score, score);
        assert_eq!(entry.depth, 1);
        assert!(entry.best_move.is_some());
    }

    #[test]
    fn beta_cutoff_stores_a_lower_bound() {
        let game = after_e4();
        let mut tt = TranspositionTable::new();
        let score = search_node(&mut tt, &game, -INF, -5_000);
        assert!(score >= -5_000);
        assert_eq!(tt.probe(game.hash()).unwrap().bound, Bound::Lower);
    }

    #[test]
    fn fail_low_stores_an_upper_bound() {
        let game = after_e4();
        let mut tt = TranspositionTable::new();
        let score = search_node(&mut tt, &game, 5_000, INF);
        assert!(score <= 5_000);
        assert_eq!(tt.probe(game.hash()).unwrap().bound, Bound::Upper);
    }

    #[test]
    fn window_raised_by_the_table_is_used_for_the_bound() {
        let game = after_e4();
        let mut tt = TranspositionTable::new();
        tt.store(
            game.hash(),
            TtEntry {
                depth: 1,
                score: 5_000,
                bound: Bound::Lower,
                best_move: None,
            },
        );
        // Alpha rises to 5000 from the stored lower bound; the search then
        // fails low against it, so the result is only an upper bound.
        let score = search_node(&mut tt, &game, -INF, INF);
        assert!(score < 5_000);
        let entry = tt.probe(game.hash()).unwrap();
        assert_eq!(entry.bound, Bound::Upper);
        assert_eq!(entry.score, score);
    }

    #[test]
    fn mate_in_reports_moves() {
        let result = |score| SearchResult {
            best_move: Move::NULL,
            score,
            depth: 1,
            nodes: 0,
        };
        assert_eq!(result(MATE_SCORE - 1).mate_in(), Some(1));
        assert_eq!(result(MATE_SCORE - 3).mate_in(), Some(2));
        assert_eq!(result(-(MATE_SCORE - 2)).mate_in(), Some(-1));
        assert_eq!(result(35).mate_in(), None);
    }
}
