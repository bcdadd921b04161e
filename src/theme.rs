//! Theme colors, optionally read from a kitty.conf colour file and
//! overridden by hex values from the `[theme]` table of the config

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,       // Active borders, focused field, key hints
    pub success: Color,      // Success banner
    pub danger: Color,       // Error banner, failed loads
    pub warning: Color,      // Status messages, countdown
    pub text: Color,         // Primary text (foreground)
    pub text_dim: Color,     // Placeholders, hints
    pub bg_selected: Color,  // Selection background
    pub inactive: Color,     // Inactive borders
    pub header: Color,       // Section headings
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback
        Self {
            accent: Color::Rgb(137, 180, 250),
            success: Color::Rgb(166, 218, 149),
            danger: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(203, 166, 247),
        }
    }
}

impl Theme {
    pub fn load(config: &ThemeConfig) -> Self {
        let mut theme = config
            .kitty_conf
            .as_deref()
            .and_then(Self::load_kitty_theme)
            .unwrap_or_default();

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.success, &mut theme.success),
            (&config.danger, &mut theme.danger),
            (&config.text, &mut theme.text),
        ];
        for (value, slot) in overrides {
            match value.as_deref().map(|v| (v, Self::parse_hex_color(v))) {
                Some((_, Some(color))) => *slot = color,
                Some((raw, None)) => tracing::warn!("Ignoring invalid theme colour: {}", raw),
                None => {}
            }
        }

        theme
    }

    fn load_kitty_theme(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not read theme {}: {}", path.display(), e);
                return None;
            }
        };
        Self::from_kitty_colors(&Self::parse_kitty_conf(&content))
    }

    /// Map kitty's 16-colour palette onto UI roles
    fn from_kitty_colors(colors: &HashMap<String, Color>) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }

        let fallback = Self::default();
        let pick = |keys: &[&str], default: Color| {
            keys.iter().find_map(|k| colors.get(*k)).copied().unwrap_or(default)
        };

        Some(Self {
            accent: pick(&["color4", "color12"], fallback.accent),
            success: pick(&["color2", "color10"], fallback.success),
            danger: pick(&["color1", "color9"], fallback.danger),
            warning: pick(&["color3", "color11"], fallback.warning),
            text: pick(&["foreground"], fallback.text),
            text_dim: pick(&["color8"], fallback.text_dim),
            bg_selected: pick(&["selection_background", "color0"], fallback.bg_selected),
            inactive: pick(&["inactive_border_color", "color8"], fallback.inactive),
            header: pick(&["color5", "color13"], fallback.header),
        })
    }

    /// Parse kitty.conf format: `key value` or `key #hexcolor`
    fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
        let mut colors = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(char::is_whitespace) {
                if let Some(color) = Self::parse_hex_color(value) {
                    colors.insert(key.trim().to_string(), color);
                }
            }
        }

        colors
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
