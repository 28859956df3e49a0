//! Determinism, undo and termination guarantees

use hexfray::battle::{
    Ability, Battle, BattleOptions, Effect, TargetKind, Trigger, UnitSpec,
};
use hexfray::core::types::Winner;

fn armies() -> (Vec<UnitSpec>, Vec<UnitSpec>) {
    let p1 = vec![
        UnitSpec::new("Page", 3, 1, 1).with_count(6),
        UnitSpec::new("Librarian", 4, 2, 3)
            .with_count(3)
            .with_ability(
                Ability::new(Trigger::EndTurn, Effect::Sunder, TargetKind::Random, 1).with_range(4),
            ),
    ];
    let p2 = vec![
        UnitSpec::new("Apprentice", 8, 1, 2)
            .with_count(6)
            .with_ability(Ability::new(Trigger::OnHit, Effect::Push, TargetKind::Target, 1)),
        UnitSpec::new("Seeker", 3, 1, 4)
            .with_count(3)
            .with_ability(Ability::new(Trigger::OnHit, Effect::Ramp, TargetKind::SelfUnit, 1)),
    ];
    (p1, p2)
}

fn unit_fingerprint(battle: &Battle) -> Vec<(u32, i32, i32, i32, (i32, i32))> {
    battle
        .units()
        .iter()
        .map(|u| (u.id.0, u.hp, u.damage, u.armor, (u.pos.col, u.pos.row)))
        .collect()
}

#[test]
fn test_same_seed_same_trajectory() {
    let (p1, p2) = armies();
    let mut a = Battle::new(&p1, &p2, 7, BattleOptions::default()).expect("valid armies");
    let mut b = Battle::new(&p1, &p2, 7, BattleOptions::default()).expect("valid armies");

    for _ in 0..3000 {
        let ra = a.step();
        let rb = b.step();
        assert_eq!(ra, rb);
        assert_eq!(unit_fingerprint(&a), unit_fingerprint(&b));
        assert_eq!(
            serde_json::to_string(a.last_action()).expect("serialize"),
            serde_json::to_string(b.last_action()).expect("serialize"),
        );
        if !ra {
            break;
        }
    }
    assert_eq!(a.winner(), b.winner());
    assert!(a.winner().is_some(), "battle must have terminated");
}

#[test]
fn test_different_seeds_usually_diverge() {
    let (p1, p2) = armies();
    let mut a = Battle::new(&p1, &p2, 1, BattleOptions::default()).expect("valid armies");
    let mut b = Battle::new(&p1, &p2, 2, BattleOptions::default()).expect("valid armies");
    let mut diverged = false;
    for _ in 0..50 {
        a.step();
        b.step();
        if unit_fingerprint(&a) != unit_fingerprint(&b) {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "different seeds should shuffle differently");
}

#[test]
fn test_undo_is_a_left_inverse_of_step() {
    let (p1, p2) = armies();
    let mut b = Battle::new(&p1, &p2, 11, BattleOptions::default()).expect("valid armies");

    for _ in 0..40 {
        let before = serde_json::to_string(&b).expect("serialize battle");
        let more = b.step();
        assert!(b.undo(), "history must not be empty after a step");
        let after = serde_json::to_string(&b).expect("serialize battle");
        assert_eq!(before, after, "undo must restore the exact state");
        // redo the step for real so the test walks through the battle
        if !b.step() || !more {
            break;
        }
    }
}

#[test]
fn test_undo_replays_identically() {
    let (p1, p2) = armies();
    let mut b = Battle::new(&p1, &p2, 13, BattleOptions::default()).expect("valid armies");
    for _ in 0..10 {
        b.step();
    }
    let fingerprint_before = unit_fingerprint(&b);
    // rewind five steps, replay five steps: the RNG snapshot must make
    // the replay land on the same state
    for _ in 0..5 {
        assert!(b.undo());
    }
    for _ in 0..5 {
        b.step();
    }
    assert_eq!(unit_fingerprint(&b), fingerprint_before);
}

#[test]
fn test_plain_melee_battle_terminates() {
    let p1 = vec![UnitSpec::new("Page", 3, 1, 1).with_count(5)];
    let p2 = vec![UnitSpec::new("Thug", 4, 1, 1).with_count(4)];
    let mut b = Battle::new(&p1, &p2, 3, BattleOptions::default()).expect("valid armies");
    let mut steps = 0;
    while b.step() {
        steps += 1;
        assert!(steps < 5000, "bounded termination");
    }
    assert!(matches!(b.winner(), Some(Winner::Player(_))));
}

#[test]
fn test_invariants_hold_at_every_observable_moment() {
    let (p1, p2) = armies();
    let mut b = Battle::new(&p1, &p2, 17, BattleOptions::default()).expect("valid armies");
    for _ in 0..3000 {
        let more = b.step();
        let mut seen = std::collections::HashSet::new();
        for u in b.units() {
            if u.is_alive() {
                assert!(u.hp <= u.max_hp, "hp within cap");
                assert!(seen.insert((u.pos.col, u.pos.row)), "one unit per hex");
                assert!((0..b.cols()).contains(&u.pos.col));
                assert!((0..b.rows()).contains(&u.pos.row));
            } else {
                assert!(u.hp <= 0, "dead units have non-positive hp");
            }
        }
        if !more {
            break;
        }
    }
}

#[test]
fn test_history_grows_per_step_and_shrinks_per_undo() {
    let (p1, p2) = armies();
    let mut b = Battle::new(&p1, &p2, 19, BattleOptions::default()).expect("valid armies");
    b.step();
    b.step();
    b.step();
    let depth = b.history_len();
    assert!(depth >= 3);
    b.undo();
    b.undo();
    assert_eq!(b.history_len(), depth - 2);
}

#[test]
fn test_deferred_event_mode_still_terminates_deterministically() {
    let (p1, p2) = armies();
    let options = BattleOptions {
        apply_events_immediately: false,
        ..BattleOptions::default()
    };
    let mut a = Battle::new(&p1, &p2, 23, options).expect("valid armies");
    let mut b = Battle::new(&p1, &p2, 23, options).expect("valid armies");
    for _ in 0..3000 {
        let ra = a.step();
        let rb = b.step();
        assert_eq!(ra, rb);
        if !ra {
            break;
        }
    }
    assert_eq!(a.winner(), b.winner());
    assert!(a.winner().is_some());
}
