//! Conversion of color strings to terminal colors

use ratatui::style::Color;

/// Error type for color parsing failures
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Invalid hex color format: {0}")]
    InvalidHex(String),
    #[error("Unknown color name: {0}")]
    UnknownName(String),
    #[error("Invalid RGB values: {0}")]
    InvalidRgb(String),
}

/// Parse a color from the formats a color string is usually given in:
/// `#RRGGBB`, `#RGB`, `rgb(r, g, b)` or a color name (case-insensitive).
pub fn parse_color(input: &str) -> Result<Color, ColorParseError> {
    let input = input.trim();

    if input.starts_with('#') {
        return parse_hex_color(input);
    }

    let lower = input.to_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_color(input, args);
    }

    parse_named_color(&lower)
}

/// Parse hex color in format #RRGGBB or #RGB
fn parse_hex_color(hex: &str) -> Result<Color, ColorParseError> {
    let invalid = || ColorParseError::InvalidHex(hex.to_string());
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let digit = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };
    match hex.len() {
        7 => Ok(Color::Rgb(digit(1..3)?, digit(3..5)?, digit(5..7)?)),
        // #RGB expands to #RRGGBB, 17 = 255/15
        4 => Ok(Color::Rgb(
            digit(1..2)? * 17,
            digit(2..3)? * 17,
            digit(3..4)? * 17,
        )),
        _ => Err(invalid()),
    }
}

/// Parse the arguments of `rgb(r, g, b)`
fn parse_rgb_color(input: &str, args: &str) -> Result<Color, ColorParseError> {
    let values = args
        .split(',')
        .map(|v| v.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ColorParseError::InvalidRgb(input.to_string()))?;
    match values.as_slice() {
        [r, g, b] => Ok(Color::Rgb(*r, *g, *b)),
        _ => Err(ColorParseError::InvalidRgb(input.to_string())),
    }
}

/// Parse named color, `name` is already lowercase
fn parse_named_color(name: &str) -> Result<Color, ColorParseError> {
    match name {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" | "fuchsia" => Ok(Color::Magenta),
        "cyan" | "aqua" => Ok(Color::Cyan),
        "gray" | "grey" | "silver" => Ok(Color::Gray),
        "white" => Ok(Color::White),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" | "bright_black" => {
            Ok(Color::DarkGray)
        }
        "light_red" | "lightred" | "bright_red" => Ok(Color::LightRed),
        "light_green" | "lightgreen" | "bright_green" | "lime" => Ok(Color::LightGreen),
        "light_yellow" | "lightyellow" | "bright_yellow" => Ok(Color::LightYellow),
        "light_blue" | "lightblue" | "bright_blue" => Ok(Color::LightBlue),
        "light_magenta" | "bright_magenta" => Ok(Color::LightMagenta),
        "light_cyan" | "lightcyan" | "bright_cyan" => Ok(Color::LightCyan),
        "reset" | "transparent" => Ok(Color::Reset),
        _ => Err(ColorParseError::UnknownName(name.to_string())),
    }
}
