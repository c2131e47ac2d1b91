use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::MoveSelector;
use crate::board::{Board, Move};
use crate::config::{Difficulty, GameConfig};
use crate::error::ReversiError;
use crate::types::{GameEvent, GameResult, GameState, LastMove, Phase, Position, Side};

/// A detached computer decision job.
///
/// Built from a snapshot of the session so the host can run it after yielding
/// to its event loop. Human input stays locked out until the resulting
/// [`ComputerDecision`] is handed back to [`GameSession::complete_computer_turn`].
#[derive(Debug, Clone)]
pub struct ComputerTurn {
    board: Board,
    side: Side,
    candidates: Vec<Move>,
    config: GameConfig,
    generation: u64,
}

impl ComputerTurn {
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn candidates(&self) -> &[Move] {
        &self.candidates
    }

    pub fn decide(&self, selector: &mut dyn MoveSelector) -> ComputerDecision {
        let choice = selector.select_move(&self.board, self.side, &self.candidates, &self.config);
        ComputerDecision {
            generation: self.generation,
            side: self.side,
            choice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputerDecision {
    generation: u64,
    side: Side,
    choice: Option<Move>,
}

impl ComputerDecision {
    pub fn choice(&self) -> Option<Move> {
        self.choice
    }
}

/// One game against the computer, from the opening to game over.
pub struct GameSession {
    board: Board,
    current: Side,
    human: Side,
    config: GameConfig,
    phase: Phase,
    is_pass: bool,
    last_move: Option<LastMove>,
    result: Option<GameResult>,
    /// Bumped on every restart so late decisions can be recognized.
    generation: u64,
    events: Vec<GameEvent>,
    rng: StdRng,
    selector: Box<dyn MoveSelector>,
}

impl GameSession {
    /// Starts a session with a random human/computer side assignment.
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector>) -> Self {
        Self::with_rng(config, selector, StdRng::from_os_rng())
    }

    /// Like [`GameSession::new`], drawing side assignments from `rng`.
    pub fn with_rng(config: GameConfig, selector: Box<dyn MoveSelector>, mut rng: StdRng) -> Self {
        let human = coin_flip(&mut rng);
        Self::build(config, selector, rng, human)
    }

    /// Starts the first game with a fixed human side; later restarts are random.
    pub fn with_human_side(
        config: GameConfig,
        selector: Box<dyn MoveSelector>,
        human: Side,
    ) -> Self {
        Self::build(config, selector, StdRng::from_os_rng(), human)
    }

    fn build(
        config: GameConfig,
        selector: Box<dyn MoveSelector>,
        rng: StdRng,
        human: Side,
    ) -> Self {
        let mut session = Self {
            board: Board::new(),
            current: Side::Black,
            human,
            config,
            phase: Phase::TurnResolved,
            is_pass: false,
            last_move: None,
            result: None,
            generation: 0,
            events: Vec::new(),
            rng,
            selector,
        };
        session.reset(human);
        session
    }

    /// Begins a new game with a fresh coin flip for the human's side.
    /// Black always moves first.
    pub fn restart(&mut self) {
        let human = coin_flip(&mut self.rng);
        self.reset(human);
    }

    fn reset(&mut self, human: Side) {
        self.generation += 1;
        self.board = Board::new();
        self.current = Side::Black;
        self.human = human;
        self.is_pass = false;
        self.last_move = None;
        self.result = None;
        self.events.clear();
        self.events.push(GameEvent::Restarted {
            human,
            computer: human.opponent(),
        });
        log::info!(
            "new game #{}: human plays {:?}, computer plays {:?} ({})",
            self.generation,
            human,
            human.opponent(),
            self.config.difficulty
        );

        self.phase = Phase::TurnResolved;
        self.resolve_turn();
    }

    /// Attempts a human move. Returns `false`, leaving everything untouched,
    /// when it is not the human's turn or the square is not a legal move.
    pub fn select_move(&mut self, row: u8, col: u8) -> bool {
        if self.phase != Phase::AwaitingHumanMove {
            return false;
        }
        let Ok(pos) = Position::try_new(row, col) else {
            return false;
        };

        let Some(mv) = self
            .board
            .legal_moves(self.current)
            .into_iter()
            .find(|mv| mv.position() == pos)
        else {
            return false;
        };

        self.apply_move(mv);
        true
    }

    /// Takes effect on the next computer turn.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    /// Stored as given; the hard tier clamps it when searching.
    pub fn set_search_depth(&mut self, depth: u8) {
        self.config.search_depth = depth;
    }

    /// Flips the hint display flag and returns the new value.
    pub fn toggle_hint_mode(&mut self) -> bool {
        self.config.show_hints = !self.config.show_hints;
        self.config.show_hints
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_side(&self) -> Side {
        self.current
    }

    pub fn human_side(&self) -> Side {
        self.human
    }

    pub fn computer_side(&self) -> Side {
        self.human.opponent()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_computer_thinking(&self) -> bool {
        self.phase == Phase::ComputerThinking
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Legal moves for the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.board.legal_moves(self.current)
    }

    /// Drains the notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameState {
        let (black_count, white_count) = self.board.count();
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current,
            human_side: self.human,
            computer_side: self.computer_side(),
            black_count,
            white_count,
            legal_moves: self.legal_moves().iter().map(Move::position).collect(),
            phase: self.phase,
            is_game_over: self.is_game_over(),
            is_pass: self.is_pass,
            last_move: self.last_move.clone(),
            result: self.result,
            show_hints: self.config.show_hints,
        }
    }

    /// The pending computer decision, if the computer is to move.
    pub fn computer_turn(&self) -> Option<ComputerTurn> {
        if self.phase != Phase::ComputerThinking {
            return None;
        }
        Some(ComputerTurn {
            board: self.board,
            side: self.current,
            candidates: self.board.legal_moves(self.current),
            config: self.config.clone(),
            generation: self.generation,
        })
    }

    /// Applies a decision produced by [`ComputerTurn::decide`].
    ///
    /// A decision without a move is treated as a forced pass.
    pub fn complete_computer_turn(
        &mut self,
        decision: ComputerDecision,
    ) -> Result<(), ReversiError> {
        if decision.generation != self.generation {
            return Err(ReversiError::StaleDecision {
                decided: decision.generation,
                current: self.generation,
            });
        }
        if self.phase != Phase::ComputerThinking || decision.side != self.current {
            return Err(ReversiError::NotComputerTurn);
        }

        let Some(choice) = decision.choice else {
            log::warn!("computer returned no move for {:?}, passing", self.current);
            self.pass();
            return Ok(());
        };

        if !self.board.legal_moves(self.current).contains(&choice) {
            return Err(ReversiError::IllegalMove {
                row: choice.row(),
                col: choice.col(),
            });
        }

        self.apply_move(choice);
        Ok(())
    }

    /// Decides and applies the computer's move in one step, using the
    /// session's own selector.
    pub fn play_computer_turn(&mut self) -> Result<(), ReversiError> {
        let turn = self.computer_turn().ok_or(ReversiError::NotComputerTurn)?;
        let decision = turn.decide(self.selector.as_mut());
        self.complete_computer_turn(decision)
    }

    fn apply_move(&mut self, mv: Move) {
        let side = self.current;
        self.board.apply(&mv, side);

        let flipped = mv.flipped();
        self.is_pass = false;
        self.last_move = Some(LastMove {
            side,
            position: mv.position(),
            flipped: flipped.clone(),
        });
        self.events.push(GameEvent::MoveApplied {
            side,
            position: mv.position(),
            flipped,
        });

        self.switch_side();
        self.phase = Phase::TurnResolved;
        self.resolve_turn();
    }

    fn pass(&mut self) {
        log::trace!("{:?} has no legal move and passes", self.current);
        self.is_pass = true;
        self.last_move = None;
        self.events.push(GameEvent::Passed { side: self.current });
        self.switch_side();
        self.phase = Phase::TurnResolved;
        self.resolve_turn();
    }

    fn switch_side(&mut self) {
        self.current = self.current.opponent();
        self.events.push(GameEvent::TurnChanged { side: self.current });
    }

    /// Turn-start evaluation: game over, forced pass, or wait for a mover.
    fn resolve_turn(&mut self) {
        if self.board.has_legal_move(self.current) {
            self.phase = if self.current == self.human {
                Phase::AwaitingHumanMove
            } else {
                Phase::ComputerThinking
            };
            return;
        }

        if !self.board.has_legal_move(self.current.opponent()) {
            self.end_game();
            return;
        }

        // The opponent can move, so one pass always settles the turn.
        self.pass();
    }

    fn end_game(&mut self) {
        let (black_count, white_count) = self.board.count();
        let result = GameResult::from_counts(black_count, white_count);
        log::info!(
            "game over: black {black_count} - white {white_count}, winner {:?}",
            result.winner
        );

        self.phase = Phase::GameOver;
        self.result = Some(result);
        self.events.push(GameEvent::GameOver(result));
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current: Side) {
        self.board = board;
        self.current = current;
        self.is_pass = false;
        self.last_move = None;
        self.result = None;
        self.events.clear();
        self.phase = Phase::TurnResolved;
        self.resolve_turn();
    }
}

fn coin_flip(rng: &mut StdRng) -> Side {
    if rng.random_bool(0.5) {
        Side::Black
    } else {
        Side::White
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::TieredSelector;

    /// Always plays the first candidate.
    struct FirstCandidate;

    impl MoveSelector for FirstCandidate {
        fn select_move(
            &mut self,
            _board: &Board,
            _side: Side,
            candidates: &[Move],
            _config: &GameConfig,
        ) -> Option<Move> {
            candidates.first().copied()
        }
    }

    /// Answers with a move that belongs to the other side.
    struct WrongSideSelector;

    impl MoveSelector for WrongSideSelector {
        fn select_move(
            &mut self,
            board: &Board,
            side: Side,
            _candidates: &[Move],
            _config: &GameConfig,
        ) -> Option<Move> {
            board.legal_moves(side.opponent()).first().copied()
        }
    }

    fn session(human: Side) -> GameSession {
        GameSession::with_human_side(GameConfig::default(), Box::new(FirstCandidate), human)
    }

    fn pass_board() -> Board {
        // Black cannot move; white can take a1.
        Board::from_diagram([
            ".BWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
        ])
    }

    #[test]
    fn initial_state_is_correct() {
        let game = session(Side::Black);
        let state = game.snapshot();

        assert_eq!(state.current_player, Side::Black);
        assert_eq!(state.human_side, Side::Black);
        assert_eq!(state.computer_side, Side::White);
        assert_eq!(state.black_count, 2);
        assert_eq!(state.white_count, 2);
        assert_eq!(state.phase, Phase::AwaitingHumanMove);
        assert!(!state.is_game_over);
        assert!(!state.is_pass);
        assert!(state.last_move.is_none());
        assert_eq!(
            state.legal_moves,
            vec![
                Position { row: 2, col: 3 },
                Position { row: 3, col: 2 },
                Position { row: 4, col: 5 },
                Position { row: 5, col: 4 },
            ]
        );
    }

    #[test]
    fn computer_playing_black_opens_the_game() {
        let mut game = session(Side::White);

        assert_eq!(game.phase(), Phase::ComputerThinking);
        assert!(!game.select_move(2, 3));

        game.play_computer_turn().unwrap();

        assert_eq!(game.current_side(), Side::White);
        assert_eq!(game.phase(), Phase::AwaitingHumanMove);
        assert_eq!(game.board().count(), (4, 1));
    }

    #[test]
    fn t02_illegal_player_move_is_ignored() {
        let mut game = session(Side::Black);
        game.take_events();
        let before = game.snapshot();

        assert!(!game.select_move(0, 0));
        assert!(!game.select_move(3, 3));
        assert!(!game.select_move(8, 2));

        assert_eq!(game.snapshot(), before);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn legal_player_move_hands_turn_to_computer() {
        let mut game = session(Side::Black);
        game.take_events();

        assert!(game.select_move(2, 3));

        let d4 = Position { row: 3, col: 3 };
        assert_eq!(
            game.take_events(),
            vec![
                GameEvent::MoveApplied {
                    side: Side::Black,
                    position: Position { row: 2, col: 3 },
                    flipped: vec![d4],
                },
                GameEvent::TurnChanged { side: Side::White },
            ]
        );
        let state = game.snapshot();
        assert_eq!(state.phase, Phase::ComputerThinking);
        assert_eq!(state.last_move.unwrap().flipped, vec![d4]);
    }

    #[test]
    fn human_input_is_locked_while_computer_decides() {
        let mut game = session(Side::Black);
        assert!(game.select_move(2, 3));

        let turn = game.computer_turn().unwrap();
        assert_eq!(turn.side(), Side::White);
        let legal_for_white = turn.candidates()[0].position();
        assert!(!game.select_move(legal_for_white.row, legal_for_white.col));

        let decision = turn.decide(&mut FirstCandidate);
        game.complete_computer_turn(decision).unwrap();

        assert_eq!(game.phase(), Phase::AwaitingHumanMove);
        assert!(game.computer_turn().is_none());
    }

    #[test]
    fn t03_forced_pass_switches_turn_without_touching_board() {
        let mut game = session(Side::Black);
        game.set_board_for_test(pass_board(), Side::Black);

        assert_eq!(game.board(), &pass_board());
        assert_eq!(game.current_side(), Side::White);
        assert_eq!(game.phase(), Phase::ComputerThinking);
        assert!(game.snapshot().is_pass);
        assert_eq!(
            game.take_events(),
            vec![
                GameEvent::Passed { side: Side::Black },
                GameEvent::TurnChanged { side: Side::White },
            ]
        );
    }

    #[test]
    fn t04_no_moves_for_either_side_ends_game() {
        let mut game = session(Side::Black);
        let board = Board::from_diagram([
            ".BBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
        ]);
        game.set_board_for_test(board, Side::White);

        let result = game.result().unwrap();
        assert!(game.is_game_over());
        assert_eq!(result.winner, Some(Side::Black));
        assert_eq!((result.black_count, result.white_count), (63, 0));
        assert!(game.legal_moves().is_empty());
        assert!(!game.select_move(0, 0));
        assert_eq!(game.take_events(), vec![GameEvent::GameOver(result)]);
    }

    #[test]
    fn full_board_with_equal_counts_is_a_draw() {
        let mut game = session(Side::White);
        let board = Board::from_diagram([
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "BBBBBBBB",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
            "WWWWWWWW",
        ]);
        game.set_board_for_test(board, Side::Black);

        let result = game.result().unwrap();
        assert!(result.is_draw());
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn t05_full_board_after_move_sets_game_over() {
        let mut game = session(Side::Black);
        game.set_board_for_test(pass_board(), Side::Black);

        game.play_computer_turn().unwrap();
        let state = game.snapshot();

        assert!(state.is_game_over);
        assert_eq!(state.black_count, 0);
        assert_eq!(state.white_count, 64);
        assert_eq!(state.result.map(|r| r.winner), Some(Some(Side::White)));
        assert_eq!(
            state.last_move.unwrap().flipped,
            vec![Position { row: 0, col: 1 }]
        );
    }

    #[test]
    fn decision_from_previous_game_is_discarded() {
        let mut game = session(Side::White);
        let turn = game.computer_turn().unwrap();
        let decision = turn.decide(&mut FirstCandidate);

        game.restart();
        let before = *game.board();

        let err = game.complete_computer_turn(decision).unwrap_err();
        assert!(matches!(err, ReversiError::StaleDecision { .. }));
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn illegal_computer_choice_is_rejected() {
        let mut game = GameSession::with_human_side(
            GameConfig::default(),
            Box::new(WrongSideSelector),
            Side::White,
        );

        let err = game.play_computer_turn().unwrap_err();

        assert!(matches!(err, ReversiError::IllegalMove { .. }));
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.phase(), Phase::ComputerThinking);
    }

    #[test]
    fn empty_decision_counts_as_pass() {
        let mut game = session(Side::White);
        let decision = ComputerDecision {
            generation: game.generation,
            side: Side::Black,
            choice: None,
        };

        game.complete_computer_turn(decision).unwrap();

        assert_eq!(game.current_side(), Side::White);
        assert_eq!(game.board(), &Board::new());
        assert!(game.snapshot().is_pass);
    }

    #[test]
    fn play_computer_turn_outside_its_turn_fails() {
        let mut game = session(Side::Black);

        assert_eq!(game.play_computer_turn(), Err(ReversiError::NotComputerTurn));
    }

    #[test]
    fn restart_resets_board_and_starts_with_black() {
        let mut game = session(Side::Black);
        assert!(game.select_move(2, 3));
        game.play_computer_turn().unwrap();

        game.restart();

        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.current_side(), Side::Black);
        assert!(game.snapshot().last_move.is_none());
        let events = game.take_events();
        assert!(matches!(events[0], GameEvent::Restarted { .. }));
        let expected_phase = if game.human_side() == Side::Black {
            Phase::AwaitingHumanMove
        } else {
            Phase::ComputerThinking
        };
        assert_eq!(game.phase(), expected_phase);
    }

    #[test]
    fn restart_side_assignment_follows_the_rng() {
        let mut sides = Vec::new();
        for seed in 0..16 {
            let game = GameSession::with_rng(
                GameConfig::default(),
                Box::new(FirstCandidate),
                StdRng::seed_from_u64(seed),
            );
            assert_eq!(game.computer_side(), game.human_side().opponent());
            sides.push(game.human_side());
        }

        assert!(sides.contains(&Side::Black));
        assert!(sides.contains(&Side::White));
    }

    #[test]
    fn changed_difficulty_drives_the_next_computer_move() {
        let config = GameConfig {
            difficulty: Difficulty::Easy,
            ..GameConfig::default()
        };
        let mut game = GameSession::with_human_side(
            config,
            Box::new(TieredSelector::seeded(5)),
            Side::White,
        );
        // Black may take a1 (one flip) or e5 (three flips, interior).
        let board = Board::from_diagram([
            "........",
            ".W......",
            "..B.....",
            "...W....",
            "..BW.WB.",
            "........",
            "........",
            "........",
        ]);
        game.set_board_for_test(board, Side::Black);
        assert_eq!(game.phase(), Phase::ComputerThinking);

        game.set_difficulty(Difficulty::Medium);
        game.play_computer_turn().unwrap();

        let last = game.snapshot().last_move.unwrap();
        assert_eq!(last.side, Side::Black);
        assert_eq!(last.position, Position { row: 0, col: 0 });
        assert_eq!(last.flipped, vec![Position { row: 1, col: 1 }]);
    }

    #[test]
    fn settings_apply_without_touching_the_board() {
        let mut game = session(Side::Black);

        game.set_difficulty(Difficulty::Easy);
        game.set_search_depth(42);
        let hints = game.toggle_hint_mode();

        assert_eq!(game.config().difficulty, Difficulty::Easy);
        assert_eq!(game.config().search_depth, 42);
        assert_eq!(game.config().effective_depth(), 5);
        assert!(!hints);
        assert!(!game.snapshot().show_hints);
        assert_eq!(game.legal_moves().len(), 4);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn full_games_against_every_tier_reach_game_over() {
        for (seed, difficulty) in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .enumerate()
        {
            let config = GameConfig {
                difficulty,
                search_depth: 2,
                ..GameConfig::default()
            };
            let mut game = GameSession::with_rng(
                config,
                Box::new(TieredSelector::seeded(seed as u64)),
                StdRng::seed_from_u64(seed as u64),
            );

            let mut turns = 0;
            while !game.is_game_over() {
                let (black, white) = game.board().count();
                match game.phase() {
                    Phase::AwaitingHumanMove => {
                        let mv = game.legal_moves()[0];
                        assert!(game.select_move(mv.row(), mv.col()));
                    }
                    Phase::ComputerThinking => game.play_computer_turn().unwrap(),
                    other => panic!("unexpected phase {other:?}"),
                }
                let (next_black, next_white) = game.board().count();
                assert!(next_black + next_white > black + white);
                turns += 1;
                assert!(turns <= 60);
            }

            let result = game.result().unwrap();
            let (black, white) = game.board().count();
            assert_eq!(result, GameResult::from_counts(black, white));
        }
    }
}
