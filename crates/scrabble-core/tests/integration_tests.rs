//! Integration tests for the game engine.
//!
//! These tests drive complete turn flows through the public API: placements,
//! reverts, timers, end-of-game settlement and bot play.

use pretty_assertions::assert_eq;
use scrabble_core::*;

fn dict() -> WordList {
    WordList::from_text("bateau\neau\nbeau\nma\nmat\nta\nat\ntea")
}

/// A two-player game with fixed racks and player 0 to move
fn two_player_game(racks: [&str; 2], layout: BoardLayout) -> GameState {
    let config = GameConfig {
        layout,
        ..GameConfig::default()
    };
    let mut game = GameState::with_seed(vec!["Ana".into(), "Bo".into()], config, 2024);
    for (player, rack) in game.players.iter_mut().zip(racks) {
        player.rack = Rack::from_chars(rack);
        player.active = player.id == 0;
    }
    game.turn = TurnState::new(0);
    game
}

fn letters_on(game: &GameState, coords: &[(usize, usize)]) -> String {
    coords
        .iter()
        .map(|&(x, y)| {
            game.board
                .letter_at(Coord::new(x, y))
                .map(|l| l.ch)
                .unwrap_or('.')
        })
        .collect()
}

#[test]
fn test_bateau_on_empty_board() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    let events = game
        .apply_action(Action::place("bateau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();

    match &events[0] {
        GameEvent::LettersPlaced {
            player,
            words,
            points,
            placements,
            ..
        } => {
            assert_eq!(*player, 0);
            assert_eq!(words, &vec!["BATEAU".to_string()]);
            assert_eq!(*points, 8);
            assert_eq!(placements.len(), 6);
        }
        other => panic!("unexpected event {:?}", other),
    }
    let row: Vec<(usize, usize)> = (4..10).map(|x| (x, 7)).collect();
    assert_eq!(letters_on(&game, &row), "BATEAU");
    assert_eq!(game.players[0].points, 8);
    assert_eq!(game.active_player(), 1);
}

#[test]
fn test_first_move_must_cover_center() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    for (x, y) in [(0, 0), (8, 7), (4, 6)] {
        assert_eq!(
            game.apply_action(Action::place("bateau", x, y, Direction::Horizontal, 0), &dict()),
            Err(GameError::Rejected(RejectReason::NotOnCenter))
        );
    }
    assert_eq!(game.board.letter_count(), 0);
    assert!(game
        .apply_action(Action::place("bateau", 7, 2, Direction::Vertical, 0), &dict())
        .is_ok());
}

#[test]
fn test_invalid_placement_reverts_after_delay() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    let board_before = game.board.clone();
    let rack_before = game.players[0].rack.clone();

    let events = game
        .apply_action(Action::place("tabu", 6, 7, Direction::Horizontal, 0), &dict())
        .unwrap();
    assert!(matches!(
        &events[..],
        [GameEvent::PlacementInvalid {
            player: 0,
            revert_in_ms: 3000,
            ..
        }]
    ));
    // The letters sit on the board while the revert is pending
    assert_eq!(letters_on(&game, &[(6, 7), (7, 7), (8, 7), (9, 7)]), "TABU");
    assert_eq!(game.players[0].rack.len(), 3);

    // Nobody can act in the meantime
    assert_eq!(
        game.apply_action(Action::pass(0), &dict()),
        Err(GameError::RevertPending)
    );
    assert_eq!(
        game.apply_action(Action::pass(1), &dict()),
        Err(GameError::Rejected(RejectReason::WrongTurn))
    );

    // Nothing fires before the revert delay has elapsed
    for _ in 0..29 {
        assert!(game.tick(100).is_empty());
    }
    let events = game.tick(100);
    assert_eq!(
        events,
        vec![
            GameEvent::PlacementReverted {
                player: 0,
                coords: vec![
                    Coord::new(6, 7),
                    Coord::new(7, 7),
                    Coord::new(8, 7),
                    Coord::new(9, 7)
                ],
            },
            GameEvent::TurnEnded {
                player: 0,
                next_player: 1
            },
        ]
    );

    assert_eq!(game.board, board_before);
    let mut returned = game.players[0].rack.chars();
    let mut original = rack_before.chars();
    returned.sort_unstable();
    original.sort_unstable();
    assert_eq!(returned, original);
    assert_eq!(game.players[0].points, 0);
    assert_eq!(game.turn.consecutive_passes, 0);
}

#[test]
fn test_turn_timer_cannot_fire_during_revert() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    game.config.turn_duration_ms = 1_000;
    game.turn_timer_ms = Some(1_000);

    game.apply_action(Action::place("tabu", 6, 7, Direction::Horizontal, 0), &dict())
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..30 {
        events.extend(game.tick(100));
    }
    assert_eq!(
        events,
        vec![
            GameEvent::PlacementReverted {
                player: 0,
                coords: vec![
                    Coord::new(6, 7),
                    Coord::new(7, 7),
                    Coord::new(8, 7),
                    Coord::new(9, 7)
                ],
            },
            GameEvent::TurnEnded {
                player: 0,
                next_player: 1
            },
        ]
    );
    assert_eq!(game.turn.consecutive_passes, 0);
    // The next player's countdown starts fresh after the revert
    assert_eq!(game.turn_timer_ms, Some(1_000));
}

#[test]
fn test_removed_letters_match_needed_letters() {
    let mut game = two_player_game(["bateau*", "auxyzkw"], BoardLayout::Plain);
    game.apply_action(Action::place("bateau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();

    // No refills, so the rack shows exactly what was taken
    game.bag = LetterBag::new();
    // "eau" down from the E on the center: only A and U are new
    let events = game
        .apply_action(Action::place("eau", 7, 7, Direction::Vertical, 1), &dict())
        .unwrap();
    assert!(matches!(
        &events[0],
        GameEvent::LettersPlaced { points: 3, .. }
    ));
    assert_eq!(game.players[1].rack.chars(), vec!['X', 'Y', 'Z', 'K', 'W']);
}

#[test]
fn test_bonus_square_applies_once() {
    let mut game = two_player_game(["bateau*", "auqqqqq"], BoardLayout::Standard);
    let events = game
        .apply_action(Action::place("bateau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();
    // Center double word
    assert!(matches!(
        &events[0],
        GameEvent::LettersPlaced { points: 16, .. }
    ));

    // Reusing the center E: its double word is already spent
    let events = game
        .apply_action(Action::place("eau", 7, 7, Direction::Vertical, 1), &dict())
        .unwrap();
    assert!(matches!(
        &events[0],
        GameEvent::LettersPlaced { points: 3, .. }
    ));
}

#[test]
fn test_uppercase_letter_is_played_with_wildcard() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    game.bag = LetterBag::new();
    let events = game
        .apply_action(Action::place("baTeau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();
    // The wildcard T scores nothing
    assert!(matches!(
        &events[0],
        GameEvent::LettersPlaced { points: 7, .. }
    ));
    assert_eq!(game.players[0].rack.chars(), vec!['T']);
    let t = game.board.letter_at(Coord::new(6, 7)).unwrap();
    assert!(t.blank);
    assert_eq!(t.ch, 'T');
}

#[test]
fn test_pass_out_deducts_remaining_racks() {
    // K = 10, A + B = 4
    let mut game = two_player_game(["k", "ab"], BoardLayout::Plain);
    let mut last = Vec::new();
    for i in 0..6u8 {
        last = game.apply_action(Action::pass(i % 2), &dict()).unwrap();
    }
    assert_eq!(
        last.last(),
        Some(&GameEvent::GameEnded {
            reason: EndReason::TooManyPasses,
            scores: vec![(0, -10), (1, -4)],
            winners: vec![1],
        })
    );
    assert_eq!(
        game.phase,
        GamePhase::Finished {
            reason: EndReason::TooManyPasses
        }
    );
    assert_eq!(game.winners(), vec![1]);
}

#[test]
fn test_emptying_rack_with_empty_bag_ends_game() {
    let mut game = two_player_game(["bateau", "k"], BoardLayout::Plain);
    game.bag = LetterBag::new();
    let events = game
        .apply_action(Action::place("bateau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameEnded {
            reason: EndReason::OutOfLetters,
            scores: vec![(0, 18), (1, -10)],
            winners: vec![0],
        })
    );
    assert!(game.is_finished());
}

#[test]
fn test_turn_timeouts_end_game() {
    let mut game = two_player_game(["k", "ab"], BoardLayout::Plain);
    let mut timed_out = 0;
    while !game.is_finished() {
        for event in game.tick(scrabble_core::game::DEFAULT_TURN_DURATION_MS) {
            if let GameEvent::TurnPassed { timed_out: true, .. } = event {
                timed_out += 1;
            }
        }
    }
    assert_eq!(timed_out, 6);
    assert_eq!(game.scores(), vec![(0, -10), (1, -4)]);
}

#[test]
fn test_exchange_requires_full_bag() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    game.bag = LetterBag::from_letters(vec![Letter::new('e'); 6]);
    assert_eq!(
        game.apply_action(Action::exchange("b", 0), &dict()),
        Err(GameError::Rejected(RejectReason::BagTooSmall {
            remaining: 6,
            required: 7
        }))
    );

    game.bag = LetterBag::from_letters(vec![Letter::new('e'); 7]);
    game.apply_action(Action::exchange("ba", 0), &dict()).unwrap();
    assert_eq!(game.players[0].rack.len(), 7);
    assert_eq!(game.bag.len(), 7);
}

#[test]
fn test_concurrent_validation_of_snapshot() {
    let mut game = two_player_game(["bateau*", "zzzzzzz"], BoardLayout::Plain);
    game.apply_action(Action::place("bateau", 4, 7, Direction::Horizontal, 0), &dict())
        .unwrap();
    game.players[1].rack = Rack::from_chars("mtaqqqq");
    let snapshot = game.clone();

    let mut bot = Bot::with_seed(1, BotDifficulty::Hard, 9);
    let candidates = bot.candidates(&game, &dict());
    assert!(!candidates.is_empty());

    std::thread::scope(|scope| {
        for chunk in candidates.chunks(2) {
            let game = &game;
            scope.spawn(move || {
                for candidate in chunk {
                    assert_eq!(game.validate(&candidate.action), Ok(()));
                }
            });
        }
    });

    assert_eq!(game.board, snapshot.board);
    assert_eq!(game.players[1].rack, snapshot.players[1].rack);
}

#[test]
fn test_bots_play_a_full_game() {
    let config = GameConfig {
        turn_duration_ms: 0,
        ..GameConfig::default()
    };
    let mut game = GameState::with_seed(vec!["Jimmy".into(), "Beep".into()], config, 77);
    let dictionary = WordList::embedded();
    let mut bots = [
        Bot::with_seed(0, BotDifficulty::Hard, 1),
        Bot::with_seed(1, BotDifficulty::Easy, 2),
    ];
    let total_letters = 102;

    let mut turns = 0;
    while !game.is_finished() && turns < 1_000 {
        let bot = &mut bots[game.active_player() as usize];
        let action = bot.choose_action(&game, &dictionary).unwrap();
        let events = game.apply_action(action, &dictionary).unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::PlacementInvalid { .. })));

        let on_racks: usize = game.players.iter().map(|p| p.rack.len()).sum();
        assert_eq!(game.board.letter_count() + game.bag.len() + on_racks, total_letters);
        assert!(game.players.iter().all(|p| p.rack.len() <= 7));
        turns += 1;
    }
    assert!(game.is_finished());
    assert!(!game.winners().is_empty());
}
