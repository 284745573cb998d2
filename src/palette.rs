// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::grid::{Hue, Shade};
use crate::runtime::ColorMode;

pub type Rgb = (u8, u8, u8);

/// `#111`, the empty cell color.
pub const GRID_BG: Rgb = (0x11, 0x11, 0x11);
pub const GRID_FRAME: Rgb = (0x22, 0x22, 0x22);

pub const START_ON: Rgb = (0x9b, 0x59, 0xb6);
pub const STOP_ON: Rgb = (0x34, 0x98, 0xdb);
pub const RESET: Rgb = (0xe7, 0x4c, 0x3c);
pub const DISABLED: Rgb = (0x44, 0x44, 0x44);
pub const SPEED_ACTIVE: Rgb = (0x2e, 0xcc, 0x71);
pub const SPEED_IDLE: Rgb = (0x66, 0x66, 0x66);
pub const TEXT: Rgb = (0xff, 0xff, 0xff);

/// HSL to RGB with `h` in degrees and `s`, `l` in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 / 60 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}

pub fn hue_rgb(hue: Hue) -> Rgb {
    hsl_to_rgb(hue.degrees() as f32, 1.0, 0.6)
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

/// Composites `fg` at `alpha` over `bg`.
pub fn blend(fg: Rgb, bg: Rgb, alpha: f32) -> Rgb {
    let t = alpha.clamp(0.0, 1.0);
    (
        lerp_u8(bg.0, fg.0, t),
        lerp_u8(bg.1, fg.1, t),
        lerp_u8(bg.2, fg.2, t),
    )
}

pub fn shade_rgb(shade: Shade) -> Rgb {
    match shade {
        Shade::Background => GRID_BG,
        Shade::Lit { hue, alpha } => blend(hue_rgb(hue), GRID_BG, alpha),
    }
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let step = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;

    let (r6, g6, b6) = (step(c.0), step(c.1), step(c.2));
    let cube = (
        LEVELS[r6 as usize],
        LEVELS[g6 as usize],
        LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((c.0 as u16 + c.1 as u16 + c.2 as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, (255, 255, 255)),
        _ => {
            let idx = 232 + (avg - 8) / 10;
            let v = 8 + 10 * (idx - 232);
            (idx, (v, v, v))
        }
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Terminal color for `c`; `None` in mono mode, where the terminal default is used.
pub fn term_color(mode: ColorMode, c: Rgb) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.0,
            g: c.1,
            b: c.2,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

/// Glyph standing in for a cell's brightness when no colors are available.
pub fn mono_glyph(shade: Shade) -> char {
    if shade.is_background() {
        return ' ';
    }
    match shade.alpha() {
        a if a > 0.9 => '█',
        a if a > 0.5 => '▓',
        a if a > 0.3 => '▒',
        _ => '░',
    }
}
