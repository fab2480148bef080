//! Move search for [`chess_engine::Game`].
//!
//! [`Engine::search`] runs iterative-deepening negamax with alpha-beta
//! pruning over a transposition table. Moves are ordered by
//! [`order_moves`] and leaves are scored by [`evaluate`].
//!
//! ```
//! use chess_engine::Game;
//! use chess_search::{Engine, SearchLimits};
//!
//! let game = Game::new();
//! let mut engine = Engine::new();
//! let result = engine.search(&game, SearchLimits::depth(3)).unwrap();
//! assert!(game.legal_move_list().contains(result.best_move));
//! ```

mod eval;
mod ordering;
mod search;
mod tt;

pub use eval::{evaluate, piece_value, GamePhase};
pub use ordering::{order_moves, score_move};
pub use search::{
    CancelToken, Engine, SearchLimits, SearchResult, INF, MATE_SCORE, MATE_THRESHOLD, MAX_DEPTH,
};
pub use tt::{Bound, TranspositionTable, TtEntry, TtStats};
