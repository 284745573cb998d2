// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

/// Tick interval presets offered by the speed buttons.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[value(name = "slow")]
    Slow,
    #[default]
    #[value(name = "medium")]
    Medium,
    #[value(name = "fast")]
    Fast,
}

impl SpeedMode {
    pub const ALL: [SpeedMode; 3] = [SpeedMode::Slow, SpeedMode::Medium, SpeedMode::Fast];

    pub fn interval(self) -> Duration {
        Duration::from_millis(match self {
            SpeedMode::Slow => 200,
            SpeedMode::Medium => 100,
            SpeedMode::Fast => 50,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedMode::Slow => "Slow",
            SpeedMode::Medium => "Medium",
            SpeedMode::Fast => "Fast",
        }
    }

    pub fn faster(self) -> Self {
        match self {
            SpeedMode::Slow => SpeedMode::Medium,
            _ => SpeedMode::Fast,
        }
    }

    pub fn slower(self) -> Self {
        match self {
            SpeedMode::Fast => SpeedMode::Medium,
            _ => SpeedMode::Slow,
        }
    }
}
