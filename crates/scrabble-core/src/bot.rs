//! AI bot players.
//!
//! The bot scans the board for every placement its rack can support, runs
//! each through the same validator and word resolver a human move goes
//! through, and ranks the survivors by estimated score.
//!
//! - Easy: sometimes passes or exchanges, otherwise plays a modest word
//! - Hard: always plays the best-scoring word

use crate::actions::Action;
use crate::board::{Coord, Direction, BOARD_MAX, BOARD_SIZE, CENTER};
use crate::dictionary::{Dictionary, WordPattern};
use crate::game::GameState;
use crate::letters::WILDCARD;
use crate::player::PlayerId;
use crate::validator::plan_placement;
use crate::words::WordResolver;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::debug;

/// Names given to bot opponents
pub const BOT_NAMES: [&str; 3] = ["Jimmy", "Sasha", "Beep"];

/// How far an opening word may reach either side of the center
const OPENING_REACH: usize = 7;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Hard,
}

/// A legal placement the bot could make
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub action: Action,
    /// The word as given in the action, uppercase
    pub word: String,
    /// Estimated points, bonuses included
    pub points: u32,
}

/// Pick a bot name that differs from the opponent's
pub fn pick_bot_name<R: Rng>(rng: &mut R, opponent: &str) -> &'static str {
    let names: Vec<&'static str> = BOT_NAMES
        .iter()
        .copied()
        .filter(|name| !name.eq_ignore_ascii_case(opponent.trim()))
        .collect();
    names.choose(rng).copied().unwrap_or(BOT_NAMES[0])
}

/// Maximal runs of occupied cells in a line, as inclusive (first, last) indices
fn clusters(line: &[Option<char>]) -> Vec<(usize, usize)> {
    let mut result = Vec::new();
    let mut start = None;
    for (i, cell) in line.iter().enumerate() {
        match (cell.is_some(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                result.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        result.push((s, line.len() - 1));
    }
    result
}

fn coord_on_line(direction: Direction, line: usize, along: usize) -> Coord {
    match direction {
        Direction::Horizontal => Coord::new(along, line),
        Direction::Vertical => Coord::new(line, along),
    }
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decide on an action, or `None` if the bot cannot act right now
    pub fn choose_action(&mut self, game: &GameState, dictionary: &dyn Dictionary) -> Option<Action> {
        if game.is_finished()
            || game.pending_revert.is_some()
            || game.active_player() != self.player_id
        {
            return None;
        }

        let candidates = self.candidates(game, dictionary);
        debug!(
            player = self.player_id,
            candidates = candidates.len(),
            best = candidates.first().map(|c| c.points),
            "Bot searched placements"
        );

        let action = match self.difficulty {
            BotDifficulty::Easy => self.choose_easy(game, &candidates),
            BotDifficulty::Hard => match candidates.first() {
                Some(best) => best.action.clone(),
                None => self.when_stuck(game),
            },
        };
        Some(action)
    }

    /// Every legal, word-forming placement, best first.
    ///
    /// Ties are broken by word, then position, so the ranking is stable for
    /// a given board and rack.
    pub fn candidates(&mut self, game: &GameState, dictionary: &dyn Dictionary) -> Vec<Candidate> {
        let rack: Vec<char> = match game.get_player(self.player_id) {
            Some(p) => p.rack.chars(),
            None => return Vec::new(),
        };

        let actions = if game.board.is_empty() {
            self.opening_actions(&rack, dictionary)
        } else {
            self.line_actions(game, &rack, dictionary)
        };

        let mut seen = HashSet::new();
        let mut candidates: Vec<Candidate> = actions
            .into_iter()
            .filter(|a| seen.insert(a.clone()))
            .filter_map(|a| evaluate(game, a, dictionary))
            .collect();

        candidates.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.word.cmp(&b.word))
                .then_with(|| sort_key(&a.action).cmp(&sort_key(&b.action)))
        });
        candidates
    }

    /// Seed a word on the center with each distinct rack letter
    fn opening_actions(&mut self, rack: &[char], dictionary: &dyn Dictionary) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut seeded = HashSet::new();

        for (i, &seed) in rack.iter().enumerate() {
            if seed == WILDCARD || !seeded.insert(seed) {
                continue;
            }
            let mut available = rack.to_vec();
            available.remove(i);

            let direction = if self.rng.gen_bool(0.5) {
                Direction::Horizontal
            } else {
                Direction::Vertical
            };
            let pattern = WordPattern {
                core: vec![Some(seed)],
                max_prefix: OPENING_REACH,
                max_suffix: OPENING_REACH,
            };

            for word in dictionary.find_words_matching(&pattern, &available) {
                for prefix in pattern.alignments(&word, &available) {
                    let along = match CENTER.along(direction).checked_sub(prefix) {
                        Some(along) => along,
                        None => continue,
                    };
                    let line = CENTER.along(direction.perpendicular());
                    let start = coord_on_line(direction, line, along);
                    actions.push(Action::place(
                        &word.to_lowercase(),
                        start.x,
                        start.y,
                        direction,
                        self.player_id,
                    ));
                }
            }
        }
        actions
    }

    /// Scan rows then columns, growing words around runs of existing letters.
    ///
    /// For every window of consecutive letter runs in a line, the pattern is
    /// the window itself (gaps open), free to extend up to one cell short of
    /// the neighbouring runs or to the board edge.
    fn line_actions(&self, game: &GameState, rack: &[char], dictionary: &dyn Dictionary) -> Vec<Action> {
        let mut actions = Vec::new();

        for direction in Direction::ALL {
            for line in 0..BOARD_SIZE {
                let cells: Vec<Option<char>> = game
                    .board
                    .line(direction, line)
                    .into_iter()
                    .map(|c| game.board.letter_at(c).map(|l| l.ch))
                    .collect();
                let runs = clusters(&cells);

                for size in 1..=runs.len() {
                    for first in 0..=runs.len() - size {
                        let last = first + size - 1;
                        let (core_start, core_end) = (runs[first].0, runs[last].1);

                        let before = if first == 0 {
                            core_start
                        } else {
                            (core_start - runs[first - 1].1 - 1).saturating_sub(1)
                        };
                        let after = if last + 1 == runs.len() {
                            BOARD_MAX - core_end
                        } else {
                            (runs[last + 1].0 - core_end - 1).saturating_sub(1)
                        };

                        let pattern = WordPattern {
                            core: cells[core_start..=core_end].to_vec(),
                            max_prefix: before.min(rack.len()),
                            max_suffix: after.min(rack.len()),
                        };

                        for word in dictionary.find_words_matching(&pattern, rack) {
                            for prefix in pattern.alignments(&word, rack) {
                                let start = coord_on_line(direction, line, core_start - prefix);
                                actions.push(Action::place(
                                    &word.to_lowercase(),
                                    start.x,
                                    start.y,
                                    direction,
                                    self.player_id,
                                ));
                            }
                        }
                    }
                }
            }
        }
        actions
    }

    /// Easy: pass or exchange now and then, otherwise aim for a points band
    fn choose_easy(&mut self, game: &GameState, candidates: &[Candidate]) -> Action {
        let roll = self.rng.gen_range(0..100);
        if roll < 10 {
            return Action::pass(self.player_id);
        }
        if roll < 20 {
            if let Some(action) = self.random_exchange(game) {
                return action;
            }
        }
        if candidates.is_empty() {
            return self.when_stuck(game);
        }

        let band: RangeInclusive<u32> = match self.rng.gen_range(0..100) {
            0..=39 => 0..=6,
            40..=69 => 7..=12,
            _ => 13..=18,
        };
        let in_band: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| band.contains(&c.points))
            .collect();
        if let Some(pick) = in_band.choose(&mut self.rng) {
            return pick.action.clone();
        }

        // Candidates are sorted best first: take the best one under the band,
        // or the weakest one if everything scores above it
        candidates
            .iter()
            .find(|c| c.points < *band.start())
            .or_else(|| candidates.last())
            .map(|c| c.action.clone())
            .unwrap_or_else(|| Action::pass(self.player_id))
    }

    fn random_exchange(&mut self, game: &GameState) -> Option<Action> {
        let mut letters = self.rack_demand(game)?;
        letters.shuffle(&mut self.rng);
        let count = self.rng.gen_range(1..=letters.len());
        letters.truncate(count);

        let action = Action::ExchangeLetter {
            letters,
            player: self.player_id,
        };
        game.validate(&action).ok().map(|_| action)
    }

    /// No playable word: swap the whole rack if allowed, otherwise pass
    fn when_stuck(&self, game: &GameState) -> Action {
        if game.config.bot_exchanges_when_stuck {
            if let Some(letters) = self.rack_demand(game) {
                let action = Action::ExchangeLetter {
                    letters,
                    player: self.player_id,
                };
                if game.validate(&action).is_ok() {
                    return action;
                }
            }
        }
        Action::pass(self.player_id)
    }

    /// The bot's rack as exact-letter demand characters
    fn rack_demand(&self, game: &GameState) -> Option<Vec<char>> {
        let rack = &game.get_player(self.player_id)?.rack;
        if rack.is_empty() {
            return None;
        }
        Some(rack.chars().iter().map(|c| c.to_ascii_lowercase()).collect())
    }
}

fn sort_key(action: &Action) -> (usize, usize, u8) {
    match action {
        Action::PlaceLetter {
            x, y, direction, ..
        } => (*y, *x, matches!(direction, Direction::Vertical) as u8),
        _ => (0, 0, 0),
    }
}

/// Run a hypothetical placement through validation, word resolution and scoring
fn evaluate(game: &GameState, action: Action, dictionary: &dyn Dictionary) -> Option<Candidate> {
    game.validate(&action).ok()?;

    let rack = &game.get_player(action.player())?.rack;
    let (word, placements, direction) = match &action {
        Action::PlaceLetter {
            word, x, y, direction, ..
        } => {
            let (_, placements) =
                plan_placement(word, Coord::new(*x, *y), *direction, &game.board, rack)?;
            (word.to_uppercase(), placements, *direction)
        }
        _ => return None,
    };

    let resolution =
        WordResolver::new(&game.board, &placements).resolve(&placements, direction, dictionary);
    if !resolution.is_valid() {
        return None;
    }
    let points = game
        .scorer()
        .estimate(&game.board, &resolution.valid_words(), placements.len());

    Some(Candidate {
        action,
        word,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardLayout;
    use crate::dictionary::WordList;
    use crate::game::{GameConfig, TurnState};
    use crate::letters::Letter;
    use crate::player::Rack;

    fn dict() -> WordList {
        WordList::from_text("bateau\nbat\ntea\nmat\nma\nta\nat\neau\nbeau\nxu")
    }

    fn game(racks: [&str; 2], config: GameConfig) -> GameState {
        let mut game = GameState::with_seed(vec!["Ana".into(), "Bot".into()], config, 3);
        for (player, rack) in game.players.iter_mut().zip(racks) {
            player.rack = Rack::from_chars(rack);
            player.active = player.id == 1;
        }
        game.turn = TurnState::new(1);
        game
    }

    fn plain() -> GameConfig {
        GameConfig {
            layout: BoardLayout::Plain,
            ..GameConfig::default()
        }
    }

    fn put(game: &mut GameState, word: &str, x: usize, y: usize, direction: Direction) {
        for (i, ch) in word.chars().enumerate() {
            game.board.place(Coord::new(x, y).offset(direction, i), Letter::new(ch));
        }
    }

    #[test]
    fn test_clusters() {
        let line = [None, Some('A'), Some('B'), None, None, Some('C')];
        assert_eq!(clusters(&line), vec![(1, 2), (5, 5)]);
        assert!(clusters(&[None, None]).is_empty());
    }

    #[test]
    fn test_opening_covers_center() {
        let game = game(["zzzzzzz", "bateau*"], plain());
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 11);
        let candidates = bot.candidates(&game, &dict());
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].word, "BATEAU");
        assert_eq!(candidates[0].points, 8);
        for c in &candidates {
            assert_eq!(game.validate(&c.action), Ok(()));
        }
    }

    #[test]
    fn test_hard_bot_plays_best_candidate() {
        let mut game = game(["zzzzzzz", "bateau*"], plain());
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        let action = bot.choose_action(&game, &dict()).unwrap();
        let events = game.apply_action(action, &dict()).unwrap();
        assert!(matches!(
            &events[0],
            crate::actions::GameEvent::LettersPlaced { points: 8, .. }
        ));
    }

    #[test]
    fn test_extends_existing_word() {
        let mut game = game(["zzzzzzz", "tqqqqqq"], plain());
        put(&mut game, "ma", 6, 7, Direction::Horizontal);
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        let candidates = bot.candidates(&game, &dict());
        let words: Vec<&str> = candidates.iter().map(|c| c.word.as_str()).collect();
        assert!(words.contains(&"MAT"), "found {:?}", words);
        // Every candidate touches the board and forms a real word
        for c in &candidates {
            assert_eq!(game.validate(&c.action), Ok(()));
        }
        assert_eq!(
            candidates.iter().find(|c| c.word == "MAT").unwrap().action,
            Action::place("mat", 6, 7, Direction::Horizontal, 1)
        );
    }

    #[test]
    fn test_fills_gap_between_runs() {
        let mut game = game(["zzzzzzz", "eqqqqqq"], plain());
        put(&mut game, "b", 5, 7, Direction::Horizontal);
        put(&mut game, "au", 7, 7, Direction::Horizontal);
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        let candidates = bot.candidates(&game, &dict());
        assert!(candidates
            .iter()
            .any(|c| c.action == Action::place("beau", 5, 7, Direction::Horizontal, 1)));
    }

    #[test]
    fn test_stuck_bot_passes() {
        let mut game = game(["zzzzzzz", "qqqqqqq"], plain());
        put(&mut game, "ma", 6, 7, Direction::Horizontal);
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        assert_eq!(bot.choose_action(&game, &dict()), Some(Action::pass(1)));
    }

    #[test]
    fn test_stuck_bot_exchanges_when_configured() {
        let config = GameConfig {
            bot_exchanges_when_stuck: true,
            ..plain()
        };
        let mut game = game(["zzzzzzz", "qqqqqq*"], config);
        put(&mut game, "ma", 6, 7, Direction::Horizontal);
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        // The wildcard alone can make "MAT"
        assert!(matches!(
            bot.choose_action(&game, &dict()),
            Some(Action::PlaceLetter { .. })
        ));

        game.players[1].rack = Rack::from_chars("qqqqqqq");
        assert_eq!(
            bot.choose_action(&game, &dict()),
            Some(Action::exchange("qqqqqqq", 1))
        );
    }

    #[test]
    fn test_no_action_out_of_turn() {
        let mut game = game(["zzzzzzz", "bateau*"], plain());
        let mut bot = Bot::with_seed(0, BotDifficulty::Hard, 5);
        assert_eq!(bot.choose_action(&game, &dict()), None);

        game.phase = crate::game::GamePhase::Finished {
            reason: crate::actions::EndReason::TooManyPasses,
        };
        let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 5);
        assert_eq!(bot.choose_action(&game, &dict()), None);
    }

    #[test]
    fn test_easy_bot_only_makes_legal_moves() {
        for seed in 0..40 {
            let mut game = game(["zzzzzzz", "bateau*"], plain());
            put(&mut game, "ma", 6, 7, Direction::Horizontal);
            let mut bot = Bot::with_seed(1, BotDifficulty::Easy, seed);
            let action = bot.choose_action(&game, &dict()).unwrap();
            assert_eq!(game.validate(&action), Ok(()), "seed {}", seed);
            assert!(game.apply_action(action, &dict()).is_ok());
        }
    }

    #[test]
    fn test_bot_name_differs_from_opponent() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_ne!(pick_bot_name(&mut rng, "Sasha"), "Sasha");
            assert_ne!(pick_bot_name(&mut rng, " jimmy "), "Jimmy");
        }
    }
}
