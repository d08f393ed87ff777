//! Property-based tests for grid, resolver and session invariants.
//!
//! Grids are drawn as random sketches so every object kind and status shows
//! up in arbitrary arrangements.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use congaline::grid::{Coord, Grid, ObjectKind, WalkerStatus};
use congaline::protocol::sketch::{encode_sketch, parse_sketch};
use congaline::resolve::{apply_statuses, apply_step, trigger, CongaResolver, Link};
use congaline::session::budget::{ActionBudget, Counter};
use congaline::session::config::SessionConfig;
use congaline::session::score::Score;
use congaline::session::LevelSession;

const TOKENS: &[&str] = &[
    ".", ".", ".", "#", ">", "<", "^", "v", ">", "<", "^", "v", "!>", "!^", "R2<", "R5v", "G",
    "g", "M", "C", "O", "O", "o",
];

fn sketch_strategy() -> impl Strategy<Value = String> {
    (1usize..7, 1usize..7).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::sample::select(TOKENS), rows * cols).prop_map(move |cells| {
            cells
                .chunks(cols)
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join(" / ")
        })
    })
}

fn grid_of(sketch: &str) -> Grid {
    parse_sketch(sketch).unwrap()
}

fn session_on(sketch: &str) -> LevelSession {
    LevelSession::from_grid(
        grid_of(sketch),
        ActionBudget::with_counters(4, [2, 2, 2, 2, 2]),
        SessionConfig::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// A cell is occupied right after `place` and empty right after `vacate`.
    #[test]
    fn prop_place_then_vacate(sketch in sketch_strategy(), pick in any::<prop::sample::Index>()) {
        let mut grid = grid_of(&sketch);
        let empties: Vec<Coord> = (0..grid.rows() as i32)
            .flat_map(|r| (0..grid.cols() as i32).map(move |c| Coord::new(r, c)))
            .filter(|&c| grid.is_empty(c))
            .collect();
        let ids: Vec<_> = grid.objects().map(|o| o.id()).collect();
        prop_assume!(!empties.is_empty() && !ids.is_empty());

        let target = empties[pick.index(empties.len())];
        let id = ids[pick.index(ids.len())];
        grid.place(id, target).unwrap();
        prop_assert!(!grid.is_empty(target));
        prop_assert_eq!(grid.get(id).unwrap().pos(), target);
        prop_assert!(grid.check_consistency().is_ok());

        let removed = grid.vacate(target).unwrap();
        prop_assert_eq!(removed.id(), id);
        prop_assert!(grid.is_empty(target));
        prop_assert!(grid.check_consistency().is_ok());
    }

    /// Moving any object onto its own cell never touches the budget.
    #[test]
    fn prop_noop_move_is_free(sketch in sketch_strategy()) {
        let mut session = session_on(&sketch);
        let objects: Vec<_> = session.grid().objects().map(|o| (o.id(), o.pos())).collect();
        for (id, pos) in objects {
            session.request_move(id, pos).unwrap();
        }
        prop_assert_eq!(session.budget().actions_remaining(), 4);
        for counter in Counter::COLORS {
            prop_assert_eq!(session.budget().remaining(counter), 2);
        }
        prop_assert_eq!(encode_sketch(session.grid()), encode_sketch(&grid_of(&sketch)));
    }

    /// Planning reads the grid only and gives the same answer every time.
    #[test]
    fn prop_plan_is_deterministic(sketch in sketch_strategy()) {
        let grid = grid_of(&sketch);
        let mut resolver = CongaResolver::new();
        let first = resolver.plan(&grid);
        let second = resolver.plan(&grid);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(CongaResolver::new().plan(&grid), first);
        prop_assert_eq!(encode_sketch(&grid), encode_sketch(&grid_of(&sketch)));
    }

    /// A follower only congas behind a congoing leader, so a burnt leader
    /// stops everything behind it.
    #[test]
    fn prop_followers_need_congoing_leader(sketch in sketch_strategy()) {
        let grid = grid_of(&sketch);
        let plan = CongaResolver::new().plan(&grid);
        for a in &plan.assignments {
            let burnt = grid.get(a.id).and_then(|o| o.walker()).map_or(false, |w| w.is_burnt());
            if burnt {
                prop_assert_ne!(a.status, WalkerStatus::Congoing);
            }
            if let (Link::Follower { leader, .. }, WalkerStatus::Congoing) = (a.link, a.status) {
                prop_assert_eq!(plan.status_of(leader), Some(WalkerStatus::Congoing));
            }
        }
    }

    /// Applying a step keeps the grid consistent and removes exactly the
    /// anchors that were saved.
    #[test]
    fn prop_step_keeps_grid_consistent(sketch in sketch_strategy()) {
        let mut grid = grid_of(&sketch);
        let before = grid.object_count();
        let plan = CongaResolver::new().plan(&grid);
        apply_statuses(&mut grid, &plan);
        let outcome = apply_step(&mut grid, &plan).unwrap();
        prop_assert!(grid.check_consistency().is_ok());
        prop_assert_eq!(grid.object_count() + outcome.saved.len(), before);
        prop_assert_eq!(outcome.saved.len() + outcome.advanced.len(), plan.moves.len());
    }

    /// Triggering a grenade twice has no further effect.
    #[test]
    fn prop_trigger_is_idempotent(sketch in sketch_strategy()) {
        let mut grid = grid_of(&sketch);
        let grenades: Vec<_> = grid
            .objects()
            .filter(|o| matches!(o.kind, ObjectKind::Grenade(_)))
            .map(|o| (o.id(), o.kind.is_live_grenade()))
            .collect();
        for (id, live) in grenades {
            prop_assert_eq!(trigger(&mut grid, id), live);
            prop_assert!(!trigger(&mut grid, id));
        }
    }

    /// Every conga run ends with nothing in flight.
    #[test]
    fn prop_conga_run_terminates(sketch in sketch_strategy()) {
        let mut session = session_on(&sketch);
        session.start_conga().unwrap();
        session.run_until_idle().unwrap();
        prop_assert!(!session.is_step_running());
        prop_assert!(session.grid().check_consistency().is_ok());
    }

    /// The score never drops below zero and reports what it really applied.
    #[test]
    fn prop_score_saturates(deltas in prop::collection::vec(-200i64..200, 0..40)) {
        let mut score = Score::default();
        let mut expected: i64 = 0;
        for d in deltas {
            let next = (expected + d).max(0);
            prop_assert_eq!(score.apply(d), next - expected);
            expected = next;
            prop_assert_eq!(score.value() as i64, expected);
        }
    }
}
