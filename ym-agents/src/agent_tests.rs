use ym_core::{
    play_game, AgentConfig, Aggregate, Category, DiceSource, Keep, LockConfig, Player, ScorerConfig,
    Scoresheet, Throw, ELIMINATION_ORDER,
};

use crate::{eliminate_row, Agent, AgentError, RandomLock, SearchConfig, SearchLock, ThrowScorer};

fn t(d: [u8; 5]) -> Throw {
    Throw::new(d).unwrap()
}

fn greedy_raw() -> Agent {
    Agent::new(ThrowScorer::raw_best(true), Box::new(SearchLock::one_ply()))
}

fn config(scorer: ScorerConfig, lock: LockConfig) -> AgentConfig {
    AgentConfig {
        name: None,
        scorer,
        lock,
    }
}

#[test]
fn names_follow_policies() {
    assert_eq!(greedy_raw().name(), "YamsT1");
    let a = Agent::from_config(&AgentConfig::default(), 0).unwrap();
    assert_eq!(a.name(), "YamsT2K3E");
    let a = Agent::from_config(
        &config(ScorerConfig::RawBest { memoize: false }, LockConfig::Random),
        0,
    )
    .unwrap();
    assert_eq!(a.name(), "YamsRandom");
    let a = Agent::from_config(
        &config(
            ScorerConfig::default(),
            LockConfig::Lookahead {
                top_k: None,
                deep_aggregate: Aggregate::Mean,
            },
        ),
        0,
    )
    .unwrap();
    assert_eq!(a.name(), "YamsT2E");

    let named = AgentConfig {
        name: Some("baseline".into()),
        ..AgentConfig::default()
    };
    assert_eq!(Agent::from_config(&named, 0).unwrap().name(), "baseline");
}

#[test]
fn missing_target_file_fails_construction() {
    let cfg = config(
        ScorerConfig::TargetRelative {
            targets: "/nonexistent/target_x.json".into(),
        },
        LockConfig::Greedy,
    );
    assert!(matches!(
        Agent::from_config(&cfg, 0),
        Err(AgentError::Targets(_))
    ));
}

#[test]
fn choose_row_takes_yams() {
    let mut a = greedy_raw();
    let row = a.choose_row(&Scoresheet::new(), t([1, 1, 1, 1, 1])).unwrap();
    assert_eq!(row, Category::Yams);
}

#[test]
fn choose_row_with_yams_filled_keeps_the_scorer_pick_when_open() {
    let mut sheet = Scoresheet::new();
    sheet.fill(Category::Yams, 50).unwrap();
    let mut a = greedy_raw();
    // One and Chance tie at 5; the later row is taken and it is open.
    let row = a.choose_row(&sheet, t([1, 1, 1, 1, 1])).unwrap();
    assert_eq!(row, Category::Chance);
}

#[test]
fn choose_row_falls_back_to_elimination() {
    let mut sheet = Scoresheet::new();
    for (c, p) in [
        (Category::Yams, 50),
        (Category::Two, 4),
        (Category::Three, 6),
        (Category::Five, 5),
        (Category::Chance, 15),
    ] {
        sheet.fill(c, p).unwrap();
    }
    let mut a = greedy_raw();
    let throw = t([2, 2, 3, 3, 5]);
    // Every open row scores 0, so the raw pick is the filled Yams row.
    assert_eq!(a.score_throw(&sheet, throw).category, Category::Yams);
    let row = a.choose_row(&sheet, throw).unwrap();
    assert_eq!(row, Category::One);
    assert_eq!(ym_core::realized_points(&sheet, throw, row), 0);
}

#[test]
fn elimination_order_is_fixed_and_terminates() {
    let mut sheet = Scoresheet::new();
    let mut visited = Vec::new();
    for _ in 0..ELIMINATION_ORDER.len() + 1 {
        match eliminate_row(&sheet) {
            Ok(row) => {
                visited.push(row);
                sheet.fill(row, 0).unwrap();
            }
            Err(e) => {
                assert!(matches!(e, AgentError::SheetExhausted));
                break;
            }
        }
    }
    assert_eq!(visited, ELIMINATION_ORDER.to_vec());
    assert!(visited.len() <= 14);
    assert_eq!(&visited[..3], &[Category::Yams, Category::One, Category::GrandeSuite]);
}

#[test]
fn full_sheet_is_an_error_through_player() {
    let mut sheet = Scoresheet::new();
    for c in Category::ALL {
        if c.is_choosable() {
            sheet.fill(c, 0).unwrap();
        }
    }
    let mut a = greedy_raw();
    assert!(matches!(
        a.choose_row(&sheet, t([1, 2, 3, 4, 5])),
        Err(AgentError::SheetExhausted)
    ));
    let err = Player::choose_row(&mut a, &sheet, t([1, 2, 3, 4, 5])).unwrap_err();
    assert!(err.to_string().contains("no open row"));
}

#[test]
fn locks_are_subsets_of_the_throw() {
    let mut a = Agent::new(
        ThrowScorer::power_normalized(1.5),
        Box::new(SearchLock::two_ply(SearchConfig {
            top_k: Some(3),
            deep_aggregate: Aggregate::Median,
        })),
    );
    let sheet = Scoresheet::new();
    for throw in [t([1, 1, 1, 1, 2]), t([1, 2, 3, 4, 6])] {
        for first in [true, false] {
            let keep = a.lock_dice(&sheet, throw, first);
            assert!(keep.is_subset_of(&throw), "{keep} not in {throw}");
        }
    }
    // Distinct outcomes weigh equally, so rerolling everything beats chasing the Yams.
    assert_eq!(a.lock_dice(&sheet, t([1, 1, 1, 1, 2]), false), Keep::EMPTY);
    assert!(a.cache_stats().lock.entries > 0);
}

#[test]
fn random_lock_is_seeded() {
    let throw = t([1, 2, 3, 4, 6]);
    let keeps = |seed| {
        let mut a = Agent::new(ThrowScorer::raw_best(false), Box::new(RandomLock::new(seed)));
        (0..8)
            .map(|_| a.lock_dice(&Scoresheet::new(), throw, true))
            .collect::<Vec<_>>()
    };
    assert_eq!(keeps(5), keeps(5));
    assert!(keeps(5).iter().all(|k| k.is_subset_of(&throw)));
}

#[test]
fn greedy_agent_plays_a_full_game() {
    let mut a = greedy_raw();
    let mut dice = DiceSource::event_keyed(42);
    let record = play_game(&mut a, &mut dice).unwrap();
    assert_eq!(record.rounds.len(), 13);
    assert!(record.sheet.is_complete());
    assert_eq!(record.player, "YamsT1");

    let stats = a.cache_stats();
    assert!(stats.score.misses > 0);
    assert!(stats.lock.misses > 0);

    // Same dice, same decisions.
    let mut b = greedy_raw();
    let again = play_game(&mut b, &mut DiceSource::event_keyed(42)).unwrap();
    assert_eq!(again.rounds, record.rounds);

    a.reset_caches();
    assert_eq!(a.cache_stats(), Default::default());
}
