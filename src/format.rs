//! Pure text-formatting helpers: size humanization and ANSI painting.

/// Units stepped through by [`human_size`]; the last one is terminal.
static UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// ANSI sequence that homes the cursor and clears the screen.
pub static CLEAR_SCREEN: &str = "\x1b[H\x1b[J";

static RESET: &str = "\x1b[0m";

/// Format a byte count with 1024-based steps and one decimal place.
///
/// Stops at the first unit where the scaled value drops below 1024; values
/// past the GB range keep the TB unit.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} {}", UNITS[UNITS.len() - 1])
}

/// Colors understood by the renderer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Color {
    Blue,
    Green,
    Yellow,
    Cyan,
    Gray,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Blue => "\x1b[94m",
            Color::Green => "\x1b[92m",
            Color::Yellow => "\x1b[93m",
            Color::Cyan => "\x1b[96m",
            Color::Gray => "\x1b[90m",
        }
    }
}

/// Wrap `text` in `color` when `enabled`, pass it through untouched otherwise.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color.code(), text, RESET)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size_unit_stepping() {
        // Arrange
        let inputs = [0u64, 500, 1023, 1024, 1536, 2048, 1024 * 1024, 5_368_709_120];
        let outputs = [
            "0.0 B", "500.0 B", "1023.0 B", "1.0 KB", "1.5 KB", "2.0 KB", "1.0 MB", "5.0 GB",
        ];

        // Act / Assert
        for (input, output) in inputs.iter().zip(outputs.iter()) {
            assert_eq!(human_size(*input), *output);
        }
    }

    #[test]
    fn test_human_size_stops_at_terabytes() {
        // 2 PiB still renders in TB
        let two_pib = 2u64 * 1024 * 1024 * 1024 * 1024 * 1024;
        assert_eq!(human_size(two_pib), "2048.0 TB");
    }

    #[test]
    fn test_paint_respects_toggle() {
        assert_eq!(paint("x", Color::Blue, false), "x");
        assert_eq!(paint("x", Color::Blue, true), "\x1b[94mx\x1b[0m");
    }
}
