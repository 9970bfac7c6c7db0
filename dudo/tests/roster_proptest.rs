//! Property-based tests for the roster, its turn queues and round scoring.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

use dudo::{
    FinalGuess, PlayerId, Username,
    entities::Round,
    game::Roster,
};

#[derive(Clone, Debug)]
enum Op {
    Join(PlayerId),
    Flee(PlayerId),
    RotateQuestioners,
    RotateGuessers,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..8).prop_map(Op::Join),
        (0i64..8).prop_map(Op::Flee),
        Just(Op::RotateQuestioners),
        Just(Op::RotateGuessers),
    ]
}

fn sorted<'a>(players: impl Iterator<Item = &'a PlayerId>) -> Vec<PlayerId> {
    let mut players: Vec<PlayerId> = players.copied().collect();
    players.sort_unstable();
    players
}

proptest! {
    #[test]
    fn test_queues_are_permutations_of_players(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut roster = Roster::new();
        let mut expected = BTreeSet::new();

        for op in ops {
            match op {
                Op::Join(player) => {
                    let added = roster.add(player, Username::new(&format!("p{player}")));
                    prop_assert_eq!(added, expected.insert(player));
                }
                Op::Flee(player) => {
                    let removed = roster.remove(&player);
                    prop_assert_eq!(removed, expected.remove(&player));
                }
                Op::RotateQuestioners => {
                    roster.rotate_questioners();
                }
                Op::RotateGuessers => {
                    roster.rotate_guessers();
                }
            }

            let players: Vec<PlayerId> = expected.iter().copied().collect();
            prop_assert_eq!(roster.len(), players.len());
            prop_assert_eq!(sorted(roster.players().iter()), players.clone());
            prop_assert_eq!(sorted(roster.questioners()), players.clone());
            prop_assert_eq!(sorted(roster.guessers()), players);
        }
    }

    #[test]
    fn test_full_rotation_is_identity(n in 1i64..10, rounds in 1usize..4) {
        let mut roster = Roster::new();
        for player in 0..n {
            roster.add(player, Username::new(&format!("p{player}")));
        }
        let questioners: Vec<PlayerId> = roster.questioners().copied().collect();
        let guessers: Vec<PlayerId> = roster.guessers().copied().collect();

        for _ in 0..(n as usize * rounds) {
            roster.rotate_questioners();
            roster.rotate_guessers();
        }

        prop_assert_eq!(roster.questioners().copied().collect::<Vec<_>>(), questioners);
        prop_assert_eq!(roster.guessers().copied().collect::<Vec<_>>(), guessers);
    }

    #[test]
    fn test_owner_is_first_joiner(players in prop::collection::vec(0i64..20, 1..10)) {
        let mut roster = Roster::new();
        for player in &players {
            roster.add(*player, Username::new("x"));
        }
        prop_assert_eq!(roster.owner(), Some(players[0]));

        roster.remove(&players[0]);
        prop_assert_eq!(roster.owner(), Some(players[0]));
    }

    #[test]
    fn test_doubt_and_fit_never_both_hold(
        answers in prop::collection::vec(any::<bool>(), 1..12),
        bet in 1u32..12,
    ) {
        let players: Vec<PlayerId> = (0..answers.len() as PlayerId).collect();
        let round = Round {
            answers: players.iter().copied().zip(answers.iter().copied()).collect::<HashMap<_, _>>(),
            bet,
            ..Round::default()
        };
        let correct = round.count_yes(&players);
        prop_assert_eq!(correct, answers.iter().filter(|a| **a).count());

        let doubt = FinalGuess::Doubt.holds(bet, correct);
        let fit = FinalGuess::Fit.holds(bet, correct);
        prop_assert!(!(doubt && fit));
        if (bet as usize) < correct {
            // An under-bet that gets called is lost either way.
            prop_assert!(!doubt && !fit);
        }
    }
}
