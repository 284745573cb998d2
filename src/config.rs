// Copyright (c) 2026 rezky_nightky

use std::env;
use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::grid::Hue;
use crate::runtime::{ColorMode, SpeedMode};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  violetfall --rows 20 --cols 30 --speed medium --spawnpct 5";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },
    #[error("invalid --colormode: {0} (allowed: 0,16,256,24)")]
    ColorMode(u16),
    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn require_range<T>(name: &'static str, v: T, min: T, max: T) -> Result<T, ConfigError>
where
    T: PartialOrd + ToString + Copy,
{
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(v)
}

fn require_finite(name: &'static str, v: f64) -> Result<f64, ConfigError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConfigError::NotFinite { name, value: v })
    }
}

pub fn color_enabled_stdout() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        DEFAULT_PARAMS_USAGE.replacen(
            "DEFAULT PARAMS USAGE:",
            "\x1b[1;36mDEFAULT PARAMS USAGE:\x1b[0m",
            1,
        )
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    ColorMode::Color16
}

pub fn color_mode_from_flag(v: u16) -> Result<ColorMode, ConfigError> {
    match v {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        other => Err(ConfigError::ColorMode(other)),
    }
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "violetfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "rows",
        default_value_t = 20,
        help_heading = "GRID",
        help = "Grid rows (min 1 max 200)"
    )]
    pub rows: u16,

    #[arg(
        short = 'c',
        long = "cols",
        default_value_t = 30,
        help_heading = "GRID",
        help = "Grid columns (min 1 max 200)"
    )]
    pub cols: u16,

    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = SpeedMode::Medium,
        value_enum,
        help_heading = "RAIN",
        help = "Tick speed: slow=200ms, medium=100ms, fast=50ms"
    )]
    pub speed: SpeedMode,

    #[arg(
        short = 'p',
        long = "spawnpct",
        default_value_t = 5.0,
        help_heading = "RAIN",
        help = "Chance per free column per tick to start a drop, in percent (min 0 max 100)"
    )]
    pub spawn_pct: f64,

    #[arg(
        long = "hue",
        help_heading = "RAIN",
        help = "Starting hue, one of 280, 300, 240, 200 (or \"hsl(300, 100%, 60%)\"); anything else means 280. Default: random"
    )]
    pub hue: Option<String>,

    #[arg(
        long = "seed",
        help_heading = "RAIN",
        help = "Seed for the random source (reproducible runs)"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'a',
        long = "autostart",
        help_heading = "GENERAL",
        help = "Start raining immediately"
    )]
    pub autostart: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Quit after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "headless",
        value_name = "TICKS",
        help_heading = "GENERAL",
        help = "Run N ticks without a terminal UI and print a line per tick (min 1 max 1000000)"
    )]
    pub headless: Option<u32>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help_heading = "GENERAL",
        help = "Write logs to PATH (filter with RUST_LOG, default info)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if COLORTERM says so, else 256 if TERM=...256color, else 16"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub rows: u16,
    pub cols: u16,
    pub speed: SpeedMode,
    pub spawn_chance: f32,
    pub hue: Option<Hue>,
    pub seed: Option<u64>,
    pub autostart: bool,
    pub duration: Option<Duration>,
    pub headless: Option<u32>,
    pub log_file: Option<PathBuf>,
    pub color_mode: ColorMode,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let rows = require_range("--rows", args.rows, 1, 200)?;
        let cols = require_range("--cols", args.cols, 1, 200)?;
        let spawn_pct = require_range(
            "--spawnpct",
            require_finite("--spawnpct", args.spawn_pct)?,
            0.0,
            100.0,
        )?;

        let duration = match args.duration {
            None => None,
            Some(s) => {
                let s = require_finite("--duration", s)?;
                if s > 0.0 {
                    let s = require_range("--duration", s, 0.1, 86400.0)?;
                    Some(Duration::from_secs_f64(s))
                } else {
                    None
                }
            }
        };

        let headless = args
            .headless
            .map(|n| require_range("--headless", n, 1, 1_000_000))
            .transpose()?;

        let color_mode = match args.colormode {
            Some(v) => color_mode_from_flag(v)?,
            None => detect_color_mode_auto(),
        };

        Ok(Self {
            rows,
            cols,
            speed: args.speed,
            spawn_chance: (spawn_pct / 100.0) as f32,
            hue: args.hue.as_deref().map(Hue::from_css),
            seed: args.seed,
            autostart: args.autostart,
            duration,
            headless,
            log_file: args.log_file.clone(),
            color_mode,
        })
    }
}

/// Sets up `env_logger`. Interactive runs only log when a file is given,
/// since stderr shares the screen with the UI.
pub fn init_logging(config: &Config) -> Result<(), ConfigError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match &config.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| ConfigError::LogFile {
                path: path.clone(),
                source,
            })?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if config.headless.is_some() => {
            builder.target(env_logger::Target::Stderr);
        }
        None => return Ok(()),
    }

    // a logger installed earlier (tests) is fine to keep
    let _ = builder.try_init();
    Ok(())
}
