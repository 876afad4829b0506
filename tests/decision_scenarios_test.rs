// Integration tests for the turn decision pipeline
//
// Drives the public engine API with hand-built boards and checks the filter,
// mode selection, picking and fallback behaviour end to end.

use mode_snake::engine::{self, Mode, FALLBACK_MOVE};
use mode_snake::types::{Battlesnake, Board, Coord, Direction, Game, GameState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn snake(id: &str, health: i32, body: &[(i32, i32)]) -> Battlesnake {
    let body: Vec<Coord> = body.iter().map(|&(x, y)| Coord { x, y }).collect();
    Battlesnake {
        id: id.to_string(),
        name: id.to_string(),
        health,
        head: body[0],
        length: body.len() as i32,
        body,
        latency: "0".to_string(),
        shout: None,
    }
}

fn game_state(
    width: i32,
    height: i32,
    food: &[(i32, i32)],
    you: Battlesnake,
    others: Vec<Battlesnake>,
) -> GameState {
    let mut snakes = vec![you.clone()];
    snakes.extend(others);
    GameState {
        game: Game {
            id: "scenario".to_string(),
            ruleset: HashMap::new(),
            timeout: 500,
            source: "test".to_string(),
        },
        turn: 12,
        board: Board {
            height,
            width,
            food: food.iter().map(|&(x, y)| Coord { x, y }).collect(),
            snakes,
            hazards: vec![],
        },
        you,
    }
}

/// Scenario A: open board, came from below, plenty of health
#[test]
fn test_open_board_excludes_only_the_neck() {
    let state = game_state(11, 11, &[], snake("me", 50, &[(5, 5), (5, 4)]), vec![]);

    let safe = engine::safe_moves(&state).unwrap();
    assert_eq!(safe, vec![Direction::Up, Direction::Left, Direction::Right]);
    assert_eq!(Mode::select(&state.board, &state.you), Mode::Default);

    for seed in 0..32 {
        let decision = engine::decide(&state, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(decision.mode, Mode::Default);
        assert!(!decision.fallback);
        assert_ne!(decision.chosen, Direction::Down);
        assert!(safe.contains(&decision.chosen));
    }
}

/// The random walk reaches every safe move given enough draws
#[test]
fn test_random_walk_uses_every_safe_move() {
    let state = game_state(11, 11, &[], snake("me", 50, &[(5, 5), (5, 4)]), vec![]);
    let mut rng = StdRng::seed_from_u64(2024);

    let mut seen = Vec::new();
    for _ in 0..200 {
        let decision = engine::decide(&state, &mut rng).unwrap();
        if !seen.contains(&decision.chosen) {
            seen.push(decision.chosen);
        }
    }
    seen.sort_by_key(|d| d.as_str());
    assert_eq!(seen, vec![Direction::Left, Direction::Right, Direction::Up]);
}

/// Scenario B: head on the left wall
#[test]
fn test_left_wall_excludes_left() {
    let state = game_state(11, 11, &[], snake("me", 50, &[(0, 5), (1, 5)]), vec![]);
    let safe = engine::safe_moves(&state).unwrap();
    assert!(!safe.contains(&Direction::Left));
    // Neck is to the right as well
    assert_eq!(safe, vec![Direction::Up, Direction::Down]);
}

#[test]
fn test_every_wall_on_a_small_board() {
    let (w, h) = (4, 3);
    for x in 0..w {
        for y in 0..h {
            // A neck stacked under the head keeps the neck rule out of the way
            let state = game_state(w, h, &[], snake("me", 90, &[(x, y), (x, y)]), vec![]);
            let safe = engine::safe_moves(&state).unwrap();
            assert_eq!(x == 0, !safe.contains(&Direction::Left), "left at ({},{})", x, y);
            assert_eq!(x == w - 1, !safe.contains(&Direction::Right), "right at ({},{})", x, y);
            assert_eq!(y == 0, !safe.contains(&Direction::Down), "down at ({},{})", x, y);
            assert_eq!(y == h - 1, !safe.contains(&Direction::Up), "up at ({},{})", x, y);
        }
    }
}

/// Scenario C: starving, four-way open, food up and to the right
#[test]
fn test_starving_steps_toward_food() {
    let state = game_state(11, 11, &[(8, 8)], snake("me", 5, &[(5, 5), (5, 5)]), vec![]);

    assert_eq!(engine::starvation_threshold(&state.board), 20);
    let safe = engine::safe_moves(&state).unwrap();
    assert_eq!(safe, Direction::all().to_vec());

    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(decision.mode, Mode::Starving);
    assert!(
        decision.chosen == Direction::Up || decision.chosen == Direction::Right,
        "expected up or right, got {}",
        decision.chosen
    );

    let chosen_distance =
        engine::nearest_food_distance(&state.board, engine::next_head(&state, decision.chosen).unwrap());
    assert_eq!(chosen_distance, 5);
    for dir in &safe {
        let other = engine::nearest_food_distance(&state.board, engine::next_head(&state, *dir).unwrap());
        assert!(chosen_distance <= other);
    }
}

/// Ties go to the earlier direction in up, down, left, right order
#[test]
fn test_starving_tie_goes_to_first_direction() {
    let state = game_state(11, 11, &[(8, 8)], snake("me", 5, &[(5, 5), (5, 5)]), vec![]);
    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(decision.chosen, Direction::Up);
}

#[test]
fn test_starving_uses_nearest_of_several_foods() {
    let state = game_state(
        11,
        11,
        &[(10, 10), (5, 1)],
        snake("me", 3, &[(5, 5), (6, 5), (7, 5)]),
        vec![],
    );
    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(decision.mode, Mode::Starving);
    assert_eq!(decision.chosen, Direction::Down);
}

#[test]
fn test_starving_never_picks_an_unsafe_move() {
    // Food is straight up but an opponent sits there
    let me = snake("me", 5, &[(5, 5), (5, 4)]);
    let them = snake("them", 90, &[(5, 6), (6, 6), (7, 6)]);
    let state = game_state(11, 11, &[(5, 8)], me, vec![them]);

    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(decision.safe_moves, vec![Direction::Left, Direction::Right]);
    assert_eq!(decision.chosen, Direction::Left);
}

/// Scenario D: length three snake with nowhere to go
#[test]
fn test_boxed_in_falls_back_to_down() {
    let state = game_state(1, 3, &[], snake("me", 90, &[(0, 0), (0, 1), (0, 2)]), vec![]);

    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(decision.safe_moves.is_empty());
    assert!(decision.fallback);
    assert_eq!(decision.chosen, FALLBACK_MOVE);
    assert_eq!(decision.chosen, Direction::Down);
}

#[test]
fn test_fallback_ignores_starving_mode() {
    let me = snake("me", 2, &[(0, 0), (1, 0), (1, 1)]);
    let them = snake("them", 90, &[(0, 1), (0, 2), (0, 3)]);
    let state = game_state(11, 11, &[(5, 5)], me, vec![them]);

    let decision = engine::decide(&state, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(decision.mode, Mode::Starving);
    assert!(decision.fallback);
    assert_eq!(decision.chosen, Direction::Down);
}

#[test]
fn test_opponent_tail_is_treated_as_solid() {
    let me = snake("me", 90, &[(5, 5), (4, 5)]);
    let them = snake("them", 90, &[(8, 8), (8, 7), (7, 7), (6, 7), (6, 6), (6, 5)]);
    let state = game_state(11, 11, &[], me, vec![them]);

    let safe = engine::safe_moves(&state).unwrap();
    assert_eq!(safe, vec![Direction::Up, Direction::Down]);
}

#[test]
fn test_chosen_move_is_always_a_valid_token() {
    let tokens = ["up", "down", "left", "right"];
    let mut rng = StdRng::seed_from_u64(99);

    for x in 0..5 {
        for y in 0..5 {
            for back in Direction::all() {
                let neck = back.apply(&Coord { x, y });
                if neck.x < 0 || neck.x >= 5 || neck.y < 0 || neck.y >= 5 {
                    continue;
                }
                for health in [1, 50] {
                    let state = game_state(
                        5,
                        5,
                        &[(2, 2)],
                        snake("me", health, &[(x, y), (neck.x, neck.y)]),
                        vec![],
                    );
                    let decision = engine::decide(&state, &mut rng).unwrap();
                    assert!(tokens.contains(&decision.chosen.as_str()));
                    assert!(!decision.safe_moves.contains(&back));
                    assert!(decision.fallback || decision.safe_moves.contains(&decision.chosen));
                }
            }
        }
    }
}

#[test]
fn test_unknown_move_name_is_rejected() {
    assert!("sideways".parse::<Direction>().is_err());
    assert!("upp".parse::<Direction>().is_err());
}
