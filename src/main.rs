// Copyright (c) 2026 rezky_nightky

mod cell;
mod config;
mod controller;
mod frame;
mod grid;
mod palette;
mod rain;
mod runtime;
mod terminal;
mod view;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, color_mode_label, default_params_usage_for_help,
    detect_color_mode_auto, init_logging, Args, Config,
};
use crate::controller::Controller;
use crate::frame::Frame;
use crate::rain::RainRng;
use crate::runtime::SpeedMode;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::view::{Snapshot, View};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

/// Longest wait between input polls while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Blue))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))))
}

fn install_exit_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn parse_args() -> Args {
    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches_from(env::args_os());
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn run_headless<R: RainRng>(ctl: &mut Controller<R>, ticks: u32) {
    for _ in 0..ticks {
        let spawned = ctl.tick();
        println!("{}", ctl.headless_line(spawned));
    }
    println!("final score: {}", ctl.score());
}

fn run_interactive<R: RainRng>(
    ctl: &mut Controller<R>,
    config: &Config,
) -> std::io::Result<()> {
    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h);
    let view = View::new(config.color_mode);

    let start_time = Instant::now();
    let end_time = config.duration.map(|d| start_time + d);
    if config.autostart {
        ctl.start(start_time);
    }

    let mut quit = false;
    let mut needs_render = true;

    while !quit {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        if needs_render {
            let snap = Snapshot {
                grid: ctl.grid(),
                score: ctl.score(),
                running: ctl.is_running(),
                speed: ctl.speed(),
            };
            view.render(&mut frame, &snap);
            if frame.has_changes() {
                term.draw(&mut frame)?;
            }
            needs_render = false;
        }

        let now = Instant::now();
        let mut timeout = ctl.time_until_tick(now).unwrap_or(IDLE_POLL);
        if let Some(end) = end_time {
            timeout = timeout.min(end.saturating_duration_since(now));
        }

        if Terminal::poll_event(timeout)? {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let now = Instant::now();
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        frame = Frame::new(nw, nh);
                        needs_render = true;
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        needs_render = true;
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => quit = true,
                            KeyCode::Char('s') | KeyCode::Enter => {
                                ctl.start(now);
                            }
                            KeyCode::Char('x') => {
                                ctl.stop();
                            }
                            KeyCode::Char(' ') => ctl.toggle(now),
                            KeyCode::Char('r') => ctl.reset_score(),
                            KeyCode::Char('1') => ctl.set_speed(SpeedMode::Slow, now),
                            KeyCode::Char('2') => ctl.set_speed(SpeedMode::Medium, now),
                            KeyCode::Char('3') => ctl.set_speed(SpeedMode::Fast, now),
                            KeyCode::Up => ctl.set_speed(ctl.speed().faster(), now),
                            KeyCode::Down => ctl.set_speed(ctl.speed().slower(), now),
                            _ => needs_render = false,
                        }
                    }
                    _ => {}
                }
                if quit {
                    break;
                }
            }
        }

        if ctl.poll_tick(Instant::now()).is_some() {
            needs_render = true;
        }
    }

    log::info!(
        "exiting after {:.1}s, {} ticks, score {}",
        start_time.elapsed().as_secs_f64(),
        ctl.ticks(),
        ctl.score()
    );
    Ok(())
}

fn main() -> std::io::Result<()> {
    install_exit_handlers();
    let args = parse_args();

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        let sha = env!("VIOLETFALL_GIT_SHA");
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        if sha.is_empty() {
            println!("Build: {}", env!("VIOLETFALL_BUILD"));
        } else {
            println!("Build: {} ({})", env!("VIOLETFALL_BUILD"), sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let config = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() { "(unset)" } else { &colorterm }
        );
        println!("  TERM: {}", if term.is_empty() { "(unset)" } else { &term });
        println!("  auto_detected: {}", color_mode_label(detect_color_mode_auto()));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(config.color_mode));
        }
        println!("  effective: {}", color_mode_label(config.color_mode));
        return Ok(());
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let mut ctl = Controller::from_config(&config);

    if let Some(ticks) = config.headless {
        ctl.start(Instant::now());
        run_headless(&mut ctl, ticks);
        return Ok(());
    }

    run_interactive(&mut ctl, &config)
}
