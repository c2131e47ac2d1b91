use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::ai::TieredSelector;
use crate::config::{Difficulty, GameConfig};
use crate::error::ReversiError;
use crate::game::GameSession;
use crate::types::Position;

/// Installs the console logger and panic hook. Safe to call more than once.
#[wasm_bindgen]
pub fn init(level: Option<String>) {
    console_error_panic_hook::set_once();

    let level = level
        .and_then(|name| name.parse::<log::Level>().ok())
        .unwrap_or(log::Level::Info);
    // Already initialized on repeated calls.
    let _ = console_log::init_with_level(level);
}

/// Browser handle for one game session.
#[wasm_bindgen]
pub struct ReversiGame {
    session: GameSession,
}

#[wasm_bindgen]
impl ReversiGame {
    /// `config` may be `undefined` or an object such as
    /// `{ difficulty: "hard", searchDepth: 4, showHints: true }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReversiGame, JsValue> {
        let config = parse_config(config).map_err(to_js_error)?;
        Ok(Self {
            session: GameSession::new(config, Box::new(TieredSelector::new())),
        })
    }

    #[wasm_bindgen(js_name = selectMove)]
    pub fn select_move(&mut self, row: u8, col: u8) -> bool {
        self.session.select_move(row, col)
    }

    /// Unknown tiers fall back to hard.
    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, tier: &str) {
        self.session.set_difficulty(Difficulty::parse_lenient(tier));
    }

    #[wasm_bindgen(js_name = setSearchDepth)]
    pub fn set_search_depth(&mut self, depth: i32) {
        self.session.set_search_depth(depth.clamp(0, u8::MAX as i32) as u8);
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    #[wasm_bindgen(js_name = toggleHintMode)]
    pub fn toggle_hint_mode(&mut self) -> bool {
        self.session.toggle_hint_mode()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.snapshot())
    }

    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.session.take_events())
    }

    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        let moves: Vec<Position> = self
            .session
            .legal_moves()
            .iter()
            .map(|mv| mv.position())
            .collect();
        to_js(&moves)
    }

    #[wasm_bindgen(js_name = isAiThinking)]
    pub fn is_ai_thinking(&self) -> bool {
        self.session.is_computer_thinking()
    }

    /// Runs the pending computer move; the host decides how long to wait
    /// before calling this. Returns the new state.
    #[wasm_bindgen(js_name = playAiTurn)]
    pub fn play_ai_turn(&mut self) -> Result<JsValue, JsValue> {
        self.session.play_computer_turn().map_err(to_js_error)?;
        self.state()
    }
}

fn parse_config(value: JsValue) -> Result<GameConfig, ReversiError> {
    if value.is_undefined() || value.is_null() {
        return Ok(GameConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| ReversiError::InvalidConfig(err.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}

fn to_js_error(err: ReversiError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
