//! Terminal styling for CLI output.
//!
//! Status words use fixed semantic colors: green for a completed import or a
//! healthy store, red for failures, yellow for partial imports and cyan for
//! file names. Graph elements are drawn in their palette color through 24-bit
//! escapes.
//!
//! Every helper returns the text unchanged when colors are off.

use crate::domain::Color;
use colored::{ColoredString, Colorize};

use super::OutputConfig;

fn styled(text: &str, config: &OutputConfig, style: fn(&str) -> ColoredString) -> String {
    if config.use_colors {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Green, for completed work.
pub fn success(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.green())
}

/// Red, for failed relationship kinds, impacted counts and unreachable stores.
pub fn error(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.red())
}

/// Yellow, for partial results.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.yellow())
}

/// Cyan, for file names.
pub fn info(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.cyan())
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.bold())
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.dimmed())
}

/// Draw text in a palette color. Malformed hex falls back to plain text.
pub(crate) fn paint(text: &str, color: Color, config: &OutputConfig) -> String {
    match color.rgb() {
        Some((r, g, b)) if config.use_colors => text.truecolor(r, g, b).to_string(),
        _ => text.to_string(),
    }
}

/// A one-character color swatch, or the hex code when colors are off.
pub(crate) fn swatch(color: Color, config: &OutputConfig) -> String {
    if !config.use_colors {
        return format!("[{color}]");
    }
    let glyph = if config.use_ascii { "#" } else { "●" };
    paint(glyph, color, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::{set_override, unset_override};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    // `colored` keeps its override in process-wide state.
    static OVERRIDE_LOCK: Mutex<()> = Mutex::new(());

    struct ForcedColors<'a> {
        _lock: MutexGuard<'a, ()>,
    }

    fn force_colors() -> ForcedColors<'static> {
        let lock = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        set_override(true);
        ForcedColors { _lock: lock }
    }

    impl Drop for ForcedColors<'_> {
        fn drop(&mut self) {
            unset_override();
        }
    }

    #[test]
    fn plain_text_when_colors_are_off() {
        let config = OutputConfig::new(false, false);
        for text in [
            success("done", &config),
            error("done", &config),
            warning("done", &config),
            info("done", &config),
            bold("done", &config),
        ] {
            assert_eq!(text, "done");
        }
    }

    #[test]
    fn paint_uses_truecolor_escape() {
        let _colors = force_colors();
        let config = OutputConfig::new(false, true);

        let painted = paint("DC1", Color("#f47535"), &config);

        assert!(painted.contains("38;2;244;117;53"));
        assert!(painted.contains("DC1"));
    }

    #[test]
    fn paint_ignores_malformed_hex() {
        let _colors = force_colors();
        let config = OutputConfig::new(false, true);

        assert_eq!(paint("x", Color("pink"), &config), "x");
    }

    #[test]
    fn swatch_shows_hex_without_colors_and_ascii_glyph_with_them() {
        assert_eq!(
            swatch(Color("#ff0000"), &OutputConfig::new(false, false)),
            "[#ff0000]"
        );

        let _colors = force_colors();
        let ascii = swatch(Color("#ff0000"), &OutputConfig::new(true, true));
        assert!(ascii.contains('#'));
        assert!(!ascii.contains('●'));
    }
}
