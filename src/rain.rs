// Copyright (c) 2026 rezky_nightky

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::grid::{Grid, Hue, Shade};

/// Cells painted per drop, head included.
pub const TRAIL_LEN: u16 = 5;
/// Ticks between hue resamples.
pub const HUE_PERIOD: u32 = 20;
pub const DEFAULT_SPAWN_CHANCE: f32 = 0.05;

/// Source of the two random decisions a tick makes.
pub trait RainRng {
    /// Uniform in `[0, 1)`.
    fn chance(&mut self) -> f32;
    /// Uniform in `[0, len)`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl RainRng for SeededRng {
    fn chance(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.inner.random_range(0..len)
    }
}

/// Head of a falling trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Droplet {
    pub col: u16,
    pub row: u16,
}

impl Droplet {
    /// One row further down, or `None` once it leaves a grid of `rows` rows.
    pub fn advanced(self, rows: u16) -> Option<Droplet> {
        let row = self.row.checked_add(1)?;
        (row < rows).then_some(Droplet { col: self.col, row })
    }
}

pub fn trail_alpha(offset: u16) -> f32 {
    1.0 - 0.2 * offset as f32
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    pub grid: Grid,
    pub drops: Vec<Droplet>,
    pub hue: Hue,
    pub color_step: u32,
    pub score: u64,
    pub spawn_chance: f32,
}

impl SimulationState {
    pub fn new(rows: u16, cols: u16, hue: Hue) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            drops: Vec::new(),
            hue,
            color_step: 0,
            score: 0,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
        }
    }

    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn rows(&self) -> u16 {
        self.grid.rows()
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols()
    }

    /// Adds a drop if it is inside the grid and its column is free.
    #[cfg(test)]
    pub fn place_drop(&mut self, drop: Droplet) -> bool {
        if drop.row >= self.rows() || drop.col >= self.cols() {
            return false;
        }
        if self.drops.iter().any(|d| d.col == drop.col) {
            return false;
        }
        self.drops.push(drop);
        true
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Runs one step and returns the next state plus the number of drops spawned.
    ///
    /// The grid is rebuilt from scratch: every cell starts as background and only
    /// the trails of drops that survive the advance are painted. Columns are
    /// checked for occupancy after the advance, so a drop that falls off the
    /// bottom frees its column for a spawn in the same step. New drops sit at
    /// row 0 unpainted until the next step moves them.
    pub fn tick<R: RainRng + ?Sized>(&self, rng: &mut R) -> (SimulationState, u32) {
        let rows = self.rows();
        let cols = self.cols();
        let mut grid = Grid::new(rows, cols);

        let mut drops: Vec<Droplet> = self
            .drops
            .iter()
            .filter_map(|d| d.advanced(rows))
            .collect();

        let mut occupied = vec![false; cols as usize];
        for d in &drops {
            paint_trail(&mut grid, *d, self.hue);
            if let Some(o) = occupied.get_mut(d.col as usize) {
                *o = true;
            }
        }

        let mut spawned = 0u32;
        for col in 0..cols {
            if occupied[col as usize] {
                continue;
            }
            if rng.chance() < self.spawn_chance {
                drops.push(Droplet { col, row: 0 });
                spawned += 1;
            }
        }

        let mut color_step = self.color_step + 1;
        let mut hue = self.hue;
        if color_step >= HUE_PERIOD {
            color_step = 0;
            hue = Hue::PALETTE[rng.pick(Hue::PALETTE.len())];
        }

        let next = SimulationState {
            grid,
            drops,
            hue,
            color_step,
            score: self.score + spawned as u64,
            spawn_chance: self.spawn_chance,
        };
        (next, spawned)
    }
}

fn paint_trail(grid: &mut Grid, head: Droplet, hue: Hue) {
    for i in 0..TRAIL_LEN {
        let Some(row) = head.row.checked_sub(i) else {
            break;
        };
        grid.set(row, head.col, Shade::lit(hue, trail_alpha(i)));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    /// Replays fixed chance values (cycling) and always picks `pick`.
    struct Scripted {
        chances: Vec<f32>,
        at: usize,
        pick: usize,
        picks: usize,
    }

    impl Scripted {
        fn new(chances: Vec<f32>) -> Self {
            Self {
                chances,
                at: 0,
                pick: 0,
                picks: 0,
            }
        }

        fn never() -> Self {
            Self::new(vec![1.0])
        }
    }

    impl RainRng for Scripted {
        fn chance(&mut self) -> f32 {
            let v = self.chances[self.at % self.chances.len()];
            self.at += 1;
            v
        }

        fn pick(&mut self, len: usize) -> usize {
            self.picks += 1;
            self.pick % len
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn forced_spawn_in_one_column() {
        let state = SimulationState::new(10, 5, Hue(280));
        let mut rng = Scripted::new(vec![0.9, 0.9, 0.0, 0.9, 0.9]);

        let (next, spawned) = state.tick(&mut rng);

        assert_eq!(spawned, 1);
        assert_eq!(next.drops, vec![Droplet { col: 2, row: 0 }]);
        assert_eq!(next.score, state.score + 1);
        assert_eq!(next.grid.lit_count(), 0);
    }

    #[test]
    fn drop_on_last_row_leaves_the_grid() {
        let mut state = SimulationState::new(10, 5, Hue(280));
        state.score = 7;
        assert!(state.place_drop(Droplet { col: 0, row: 9 }));

        let (next, spawned) = state.tick(&mut Scripted::never());

        assert_eq!(spawned, 0);
        assert!(next.drops.is_empty());
        assert_eq!(next.score, 7);
        for row in 0..10 {
            assert!(next.grid.get(row, 0).is_background());
        }
    }

    #[test]
    fn trail_fades_behind_the_head() {
        let mut state = SimulationState::new(10, 5, Hue(300));
        state.place_drop(Droplet { col: 1, row: 3 });

        let (next, _) = state.tick(&mut Scripted::never());

        assert_eq!(next.drops, vec![Droplet { col: 1, row: 4 }]);
        let expected = [(4, 1.0), (3, 0.8), (2, 0.6), (1, 0.4), (0, 0.2)];
        for (row, alpha) in expected {
            match next.grid.get(row, 1) {
                Shade::Lit { hue, alpha: a } => {
                    assert_eq!(hue, Hue(300));
                    assert_close(a, alpha);
                }
                Shade::Background => panic!("row {row} not painted"),
            }
        }
        assert_eq!(next.grid.lit_count(), 5);
    }

    #[test]
    fn trail_is_cut_at_the_top_edge() {
        let mut state = SimulationState::new(10, 3, Hue(280));
        state.place_drop(Droplet { col: 2, row: 0 });

        let (next, _) = state.tick(&mut Scripted::never());

        assert_eq!(next.grid.lit_count(), 2);
        assert_close(next.grid.get(1, 2).alpha(), 1.0);
        assert_close(next.grid.get(0, 2).alpha(), 0.8);
    }

    #[test]
    fn vacated_column_can_respawn_in_the_same_tick() {
        let mut state = SimulationState::new(4, 2, Hue(280));
        state.place_drop(Droplet { col: 0, row: 3 });
        state.place_drop(Droplet { col: 1, row: 1 });

        // only column 0 is free after the advance, so exactly one draw happens
        let mut rng = Scripted::new(vec![0.0]);
        let (next, spawned) = state.tick(&mut rng);

        assert_eq!(spawned, 1);
        assert_eq!(rng.at, 1);
        assert_eq!(
            next.drops,
            vec![Droplet { col: 1, row: 2 }, Droplet { col: 0, row: 0 }]
        );
    }

    #[test]
    fn occupied_columns_are_never_sampled() {
        let mut state = SimulationState::new(10, 3, Hue(280));
        state.place_drop(Droplet { col: 1, row: 0 });

        let mut rng = Scripted::new(vec![0.0]);
        let (next, spawned) = state.tick(&mut rng);

        assert_eq!(spawned, 2);
        assert_eq!(rng.at, 2);
        let cols: HashSet<u16> = next.drops.iter().map(|d| d.col).collect();
        assert_eq!(cols.len(), 3);
    }

    #[test]
    fn place_drop_rejects_duplicates_and_out_of_range() {
        let mut state = SimulationState::new(4, 4, Hue(280));
        assert!(state.place_drop(Droplet { col: 1, row: 1 }));
        assert!(!state.place_drop(Droplet { col: 1, row: 2 }));
        assert!(!state.place_drop(Droplet { col: 4, row: 0 }));
        assert!(!state.place_drop(Droplet { col: 0, row: 4 }));
        assert_eq!(state.drops.len(), 1);
    }

    #[test]
    fn hue_is_resampled_every_twenty_ticks() {
        let mut state = SimulationState::new(5, 5, Hue(280));
        let mut rng = Scripted::never();
        rng.pick = 2;

        for _ in 0..HUE_PERIOD - 1 {
            state = state.tick(&mut rng).0;
        }
        assert_eq!(rng.picks, 0);
        assert_eq!(state.color_step, HUE_PERIOD - 1);
        assert_eq!(state.hue, Hue(280));

        state = state.tick(&mut rng).0;
        assert_eq!(rng.picks, 1);
        assert_eq!(state.color_step, 0);
        assert_eq!(state.hue, Hue::PALETTE[2]);

        for _ in 0..HUE_PERIOD * 3 {
            state = state.tick(&mut rng).0;
        }
        assert_eq!(rng.picks, 4);
    }

    #[test]
    fn reset_score_keeps_grid_and_drops() {
        let mut state = SimulationState::new(6, 6, Hue(240));
        state.place_drop(Droplet { col: 3, row: 2 });
        let (mut next, _) = state.tick(&mut Scripted::never());
        next.score = 42;
        let before = next.clone();

        next.reset_score();

        assert_eq!(next.score, 0);
        assert_eq!(next.grid, before.grid);
        assert_eq!(next.drops, before.drops);
    }

    #[test]
    fn zero_spawn_chance_never_spawns() {
        let mut state = SimulationState::new(8, 8, Hue(280)).with_spawn_chance(0.0);
        let mut rng = SeededRng::from_seed(9);
        for _ in 0..100 {
            let (next, spawned) = state.tick(&mut rng);
            assert_eq!(spawned, 0);
            state = next;
        }
        assert!(state.drops.is_empty());
    }

    proptest! {
        #[test]
        fn invariants_hold_for_random_runs(
            seed in any::<u64>(),
            rows in 1u16..24,
            cols in 1u16..24,
            chance in 0.0f32..1.0,
            ticks in 1usize..80,
        ) {
            let mut rng = SeededRng::from_seed(seed);
            let mut state = SimulationState::new(rows, cols, Hue(280)).with_spawn_chance(chance);

            for _ in 0..ticks {
                let (next, spawned) = state.tick(&mut rng);

                prop_assert_eq!(next.score, state.score + spawned as u64);
                prop_assert!(Hue::PALETTE.contains(&next.hue));

                let mut seen = HashSet::new();
                for d in &next.drops {
                    prop_assert!(d.row < rows);
                    prop_assert!(d.col < cols);
                    prop_assert!(seen.insert(d.col));
                }

                for col in 0..cols {
                    let head = state
                        .drops
                        .iter()
                        .find(|d| d.col == col)
                        .and_then(|d| d.advanced(rows));
                    for row in 0..rows {
                        let shade = next.grid.get(row, col);
                        match head {
                            Some(h) if row <= h.row && h.row - row < TRAIL_LEN => {
                                prop_assert!(!shade.is_background());
                            }
                            _ => {
                                prop_assert!(shade.is_background());
                            }
                        }
                    }
                }

                state = next;
            }
        }
    }
}
