use delta_life::rules::patterns::{seed, GLIDER_GUN_OFFSET, SINGLE_GLIDER_GUN};
use delta_life::{advance, Cell, ControlEvent, Grid, Response, RunState, SeedMode, Session, SimConfig};
use std::time::{Duration, Instant};

fn alive(grid: &Grid) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (row, cells) in grid.rows().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.is_alive() {
                out.push((row, col));
            }
        }
    }
    out
}

#[test]
fn glider_circles_a_torus() {
    let mut grid = Grid::new(10, 10).unwrap();
    for (row, col) in [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
        grid.set(row, col, Cell::Alive).unwrap();
    }
    let start = grid.clone();

    // One diagonal step every 4 generations; 40 brings it back home.
    for generation in 1..=40 {
        let (next, _) = advance(&grid, true);
        assert_eq!(next.live_count(), 5, "generation {generation}");
        grid = next;
    }
    assert_eq!(grid, start);
}

#[test]
fn glider_gun_keeps_firing() {
    let mut grid = seed(&SeedMode::GliderGun { count: 1 }).unwrap();
    let initial = grid.live_count();
    let (row, col) = GLIDER_GUN_OFFSET;

    for _ in 0..120 {
        grid = advance(&grid, false).0;
    }

    // The gun's left block is a still life that never moves.
    for (dr, dc) in [(4, 0), (4, 1), (5, 0), (5, 1)] {
        assert_eq!(grid.get(row + dr, col + dc), Ok(Cell::Alive));
    }
    assert!(grid.live_count() > initial);
    assert_eq!(initial, SINGLE_GLIDER_GUN.live_count());
}

#[test]
fn full_world_collapses_to_corners() {
    let mode = SeedMode::Random { width: 10, height: 10, probability: 1.0 };
    let config = SimConfig::new(mode, false, 5).unwrap();
    let mut session = Session::new(config).unwrap();
    let t0 = Instant::now();
    let step = session.interval();

    let changes = session.tick(t0).unwrap();
    assert_eq!(changes.len(), 96);
    assert!(changes.iter().all(|change| change.value == Cell::Dead));
    assert_eq!(
        alive(session.grid().unwrap()),
        vec![(0, 0), (0, 9), (9, 0), (9, 9)]
    );

    let changes = session.tick(t0 + step).unwrap();
    assert_eq!(changes.len(), 4);

    let changes = session.tick(t0 + step * 2).unwrap();
    assert!(changes.is_empty());
    assert_eq!(session.generation(), 3);
}

#[test]
fn shell_lifecycle() {
    let config = SimConfig::new(SeedMode::GliderGun { count: 2 }, true, 8).unwrap();
    let mut session = Session::new(config).unwrap();
    let mut now = Instant::now();

    for _ in 0..5 {
        assert!(session.tick(now).is_some());
        now += Duration::from_millis(100);
    }
    assert_eq!(session.generation(), 5);

    session.handle(ControlEvent::Pause).unwrap();
    assert_eq!(session.state(), RunState::Paused);
    assert_eq!(session.handle(ControlEvent::SpeedUp).unwrap(), Response::SpeedChanged(11));
    assert_eq!(session.handle(ControlEvent::Restart).unwrap(), Response::Restarted);
    assert_eq!(session.generation(), 0);

    session.handle(ControlEvent::Quit).unwrap();
    assert_eq!(session.state(), RunState::Stopped);
    assert!(session.tick(now + Duration::from_secs(1)).is_none());
}
