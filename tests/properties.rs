use delta_life::rules::count_neighbors;
use delta_life::{advance, Cell, ControlEvent, Grid, RunState, SeedMode, Session, SimConfig};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1usize..12, 1usize..12).prop_flat_map(|(width, height)| {
        proptest::collection::vec(any::<bool>(), width * height).prop_map(move |cells| {
            let mut grid = Grid::new(width, height).unwrap();
            for (idx, alive) in cells.into_iter().enumerate() {
                grid.set(idx / width, idx % width, Cell::from(alive)).unwrap();
            }
            grid
        })
    })
}

fn event_strategy() -> impl Strategy<Value = ControlEvent> {
    prop_oneof![
        Just(ControlEvent::Pause),
        Just(ControlEvent::Resume),
        Just(ControlEvent::Restart),
        Just(ControlEvent::SpeedUp),
        Just(ControlEvent::SpeedDown),
    ]
}

proptest! {
    /// A cell is in the change set exactly when its value differs.
    #[test]
    fn prop_change_set_is_exact(grid in grid_strategy(), wrap: bool) {
        let (next, changes) = advance(&grid, wrap);
        prop_assert_eq!((next.width(), next.height()), (grid.width(), grid.height()));

        let mut listed = changes.iter().peekable();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let before = grid.get(row, col).unwrap();
                let after = next.get(row, col).unwrap();
                if before != after {
                    let change = listed.next();
                    prop_assert!(change.is_some(), "({}, {}) changed but is missing", row, col);
                    let change = change.unwrap();
                    prop_assert_eq!((change.row, change.col, change.value), (row, col, after));
                } else if let Some(change) = listed.peek() {
                    prop_assert!((change.row, change.col) != (row, col),
                        "({}, {}) unchanged but listed", row, col);
                }
            }
        }
        prop_assert!(listed.next().is_none());
    }

    /// Replaying the change set over the old grid gives the new grid.
    #[test]
    fn prop_change_set_replays_to_next(grid in grid_strategy(), wrap: bool) {
        let (next, changes) = advance(&grid, wrap);
        let mut replayed = grid.clone();
        for change in &changes {
            replayed.set(change.row, change.col, change.value).unwrap();
        }
        prop_assert_eq!(replayed, next);
    }

    /// `advance` leaves its input untouched and is deterministic.
    #[test]
    fn prop_advance_is_pure(grid in grid_strategy(), wrap: bool) {
        let snapshot = grid.clone();
        let first = advance(&grid, wrap);
        let second = advance(&grid, wrap);
        prop_assert_eq!(&grid, &snapshot);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_neighbor_counts_stay_in_range(grid in grid_strategy(), wrap: bool) {
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                prop_assert!(count_neighbors(&grid, row, col, wrap) <= 8);
            }
        }
    }

    /// Quit always stops the session, whatever came before it.
    #[test]
    fn prop_quit_always_stops(events in proptest::collection::vec(event_strategy(), 0..20)) {
        let mode = SeedMode::Random { width: 8, height: 8, probability: 0.5 };
        let config = SimConfig::new(mode, true, 1).unwrap().with_rng_seed(Some(3));
        let mut session = Session::new(config).unwrap();
        for event in events {
            session.handle(event).unwrap();
            prop_assert!(session.speed() >= 1);
            prop_assert!(session.state() != RunState::Stopped);
        }
        session.handle(ControlEvent::Quit).unwrap();
        prop_assert_eq!(session.state(), RunState::Stopped);
        prop_assert!(session.grid().is_none());
    }
}
