// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::grid::{Grid, Hue};
use crate::rain::{RainRng, SeededRng, SimulationState};
use crate::runtime::SpeedMode;

/// Owns the simulation and drives it from a single loop: start/stop,
/// speed selection, score reset and tick scheduling.
pub struct Controller<R: RainRng> {
    state: SimulationState,
    rng: R,
    running: bool,
    speed: SpeedMode,
    next_tick: Option<Instant>,
    ticks: u64,
}

impl<R: RainRng> Controller<R> {
    pub fn new(state: SimulationState, rng: R, speed: SpeedMode) -> Self {
        Self {
            state,
            rng,
            running: false,
            speed,
            next_tick: None,
            ticks: 0,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> SpeedMode {
        self.speed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns `false` when already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.next_tick = Some(now + self.speed.interval());
        log::info!("rain started ({} ms per tick)", self.speed.interval().as_millis());
        true
    }

    /// Returns `false` when already stopped. Grid, drops and score are kept.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.next_tick = None;
        log::info!("rain stopped after {} ticks, score {}", self.ticks, self.score());
        true
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.running {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn reset_score(&mut self) {
        log::info!("score reset (was {})", self.state.score);
        self.state.reset_score();
    }

    /// Changing speed while running reschedules the next tick from `now`.
    pub fn set_speed(&mut self, speed: SpeedMode, now: Instant) {
        if speed == self.speed {
            return;
        }
        self.speed = speed;
        if self.running {
            self.next_tick = Some(now + speed.interval());
        }
        log::info!("speed set to {} ({} ms)", speed.label(), speed.interval().as_millis());
    }

    /// How long until the next tick is due; `None` while stopped.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|next| next.saturating_duration_since(now))
    }

    /// Ticks once if running and due. Returns the spawn count of that tick.
    pub fn poll_tick(&mut self, now: Instant) -> Option<u32> {
        let next = self.next_tick?;
        if now < next {
            return None;
        }
        let spawned = self.tick();

        let mut following = next + self.speed.interval();
        if following <= now {
            following = now + self.speed.interval();
        }
        self.next_tick = Some(following);
        Some(spawned)
    }

    /// Runs a single tick regardless of the schedule.
    pub fn tick(&mut self) -> u32 {
        let (next, spawned) = self.state.tick(&mut self.rng);
        if next.hue != self.state.hue {
            log::debug!("hue rotated {} -> {}", self.state.hue, next.hue);
        }
        if spawned > 0 {
            log::trace!("tick {}: {} spawned, score {}", self.ticks + 1, spawned, next.score);
        }
        self.state = next;
        self.ticks += 1;
        spawned
    }

    /// One line of headless output for the tick that just ran.
    pub fn headless_line(&self, spawned: u32) -> String {
        format!(
            "tick={} spawned={} score={} drops={} lit={} hue={}",
            self.ticks,
            spawned,
            self.state.score,
            self.state.drops.len(),
            self.state.grid.lit_count(),
            self.state.hue
        )
    }
}

impl Controller<SeededRng> {
    /// Seeds the RNG from `--seed` (or the OS) and picks the starting hue
    /// from it unless `--hue` was given.
    pub fn from_config(config: &Config) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SeededRng::from_seed(seed),
            None => SeededRng::from_os(),
        };
        let hue = config
            .hue
            .unwrap_or_else(|| Hue::PALETTE[rng.pick(Hue::PALETTE.len())]);
        let state = SimulationState::new(config.rows, config.cols, hue)
            .with_spawn_chance(config.spawn_chance);
        log::info!(
            "grid {}x{}, hue {}, spawn chance {:.3}, seed {:?}",
            config.rows,
            config.cols,
            hue,
            config.spawn_chance,
            config.seed
        );
        Controller::new(state, rng, config.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use crate::rain::Droplet;
    use clap::Parser;

    struct Always(f32);

    impl RainRng for Always {
        fn chance(&mut self) -> f32 {
            self.0
        }

        fn pick(&mut self, _len: usize) -> usize {
            0
        }
    }

    fn controller(chance: f32) -> Controller<Always> {
        let state = SimulationState::new(6, 4, Hue(280));
        Controller::new(state, Always(chance), SpeedMode::Medium)
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let now = Instant::now();
        let mut c = controller(1.0);
        assert!(!c.stop());
        assert!(c.start(now));
        assert!(!c.start(now));
        assert!(c.is_running());
        assert!(c.stop());
        assert!(!c.stop());
        assert!(!c.is_running());
    }

    #[test]
    fn ticks_only_when_running_and_due() {
        let t0 = Instant::now();
        let mut c = controller(0.0);
        assert_eq!(c.poll_tick(t0 + Duration::from_secs(5)), None);

        c.start(t0);
        assert_eq!(c.time_until_tick(t0), Some(Duration::from_millis(100)));
        assert_eq!(c.poll_tick(t0 + Duration::from_millis(99)), None);
        assert_eq!(c.poll_tick(t0 + Duration::from_millis(100)), Some(4));
        assert_eq!(c.score(), 4);
        assert_eq!(c.ticks(), 1);
        assert_eq!(
            c.time_until_tick(t0 + Duration::from_millis(100)),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn late_loop_reanchors_instead_of_bursting() {
        let t0 = Instant::now();
        let mut c = controller(1.0);
        c.start(t0);
        let late = t0 + Duration::from_secs(1);
        assert!(c.poll_tick(late).is_some());
        assert!(c.poll_tick(late).is_none());
        assert_eq!(c.time_until_tick(late), Some(Duration::from_millis(100)));
    }

    #[test]
    fn stop_preserves_state_and_reset_only_touches_score() {
        let t0 = Instant::now();
        let mut c = controller(0.0);
        c.start(t0);
        c.poll_tick(t0 + Duration::from_millis(100));
        c.poll_tick(t0 + Duration::from_millis(200));
        c.stop();

        let drops = c.state().drops.clone();
        let grid = c.grid().clone();
        assert!(c.score() > 0);
        assert!(drops.contains(&Droplet { col: 0, row: 1 }));

        c.reset_score();
        assert_eq!(c.score(), 0);
        assert_eq!(c.state().drops, drops);
        assert_eq!(c.grid(), &grid);
    }

    #[test]
    fn speed_change_reschedules_running_loop() {
        let t0 = Instant::now();
        let mut c = controller(1.0);
        c.set_speed(SpeedMode::Fast, t0);
        assert_eq!(c.time_until_tick(t0), None);

        c.start(t0);
        assert_eq!(c.time_until_tick(t0), Some(Duration::from_millis(50)));
        let later = t0 + Duration::from_millis(10);
        c.set_speed(SpeedMode::Slow, later);
        assert_eq!(c.speed(), SpeedMode::Slow);
        assert_eq!(c.time_until_tick(later), Some(Duration::from_millis(200)));
    }

    fn seeded_config(extra: &[&str]) -> Config {
        let mut argv = vec![
            "violetfall",
            "--rows",
            "12",
            "--cols",
            "9",
            "--spawnpct",
            "30",
            "--colormode",
            "0",
        ];
        argv.extend_from_slice(extra);
        let args = Args::try_parse_from(argv).unwrap();
        Config::from_args(&args).unwrap()
    }

    #[test]
    fn same_seed_gives_identical_runs() {
        let config = seeded_config(&["--seed", "42"]);
        assert_eq!(config.seed, Some(42));

        let mut a = Controller::from_config(&config);
        let mut b = Controller::from_config(&config);
        assert_eq!(a.state().hue, b.state().hue);

        for _ in 0..60 {
            assert_eq!(a.tick(), b.tick());
            assert_eq!(a.state().drops, b.state().drops);
            assert_eq!(a.score(), b.score());
            assert_eq!(a.state().hue, b.state().hue);
            assert_eq!(a.grid(), b.grid());
        }
        assert!(a.score() > 0);
    }

    #[test]
    fn explicit_hue_overrides_the_random_pick() {
        let config = seeded_config(&["--seed", "7", "--hue", "240"]);
        let ctl = Controller::from_config(&config);
        assert_eq!(ctl.state().hue, Hue(240));
        assert_eq!(ctl.state().rows(), 12);
        assert_eq!(ctl.state().cols(), 9);
    }

    #[test]
    fn headless_line_reports_tick_fields() {
        let mut ctl = controller(1.0);
        let spawned = ctl.tick();
        assert_eq!(spawned, 4);
        assert_eq!(
            ctl.headless_line(spawned),
            "tick=1 spawned=4 score=4 drops=4 lit=0 hue=hsl(280, 100%, 60%)"
        );

        let spawned = ctl.tick();
        assert_eq!(spawned, 0);
        assert_eq!(
            ctl.headless_line(spawned),
            "tick=2 spawned=0 score=4 drops=4 lit=8 hue=hsl(280, 100%, 60%)"
        );
    }
}
