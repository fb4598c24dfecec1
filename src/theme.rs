//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use donutswap::TileKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Doughnut colours indexed by `TileKind::color_index`: blue, golden, vanilla, rainbow.
    pub tiles: [Color; 4],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and matched tiles awaiting removal.
    pub inactive_fg: Color,
    /// Cursor and selection frame.
    pub selected: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark defaults, hex values from onedark.theme.
    pub const fn onedark_default() -> Self {
        Self {
            tiles: [
                rgb(0x61AFEF), // cpu_box / blue
                rgb(0xE5C07B), // title / yellow
                rgb(0xE8DCC8), // vanilla cream
                rgb(0xC678DD), // net_box / magenta
            ],
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
            selected: rgb(0x56B6C2),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.tiles = [rgb(0x0088FF), rgb(0xFFFF00), rgb(0xFFFFFF), rgb(0xFF00FF)];
            }
            Palette::Colorblind => {
                self.tiles = [rgb(0x0077BB), rgb(0xEE7733), rgb(0xBBBBBB), rgb(0xEE3377)];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let d = Self::onedark_default();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        Self {
            tiles: [
                get("cpu_box", d.tiles[0]),
                get("cpu_mid", d.tiles[1]),
                get("hi_fg", d.tiles[2]),
                get("net_box", d.tiles[3]),
            ],
            bg: get("meter_bg", d.bg),
            div_line: get("div_line", d.div_line),
            main_fg: get("main_fg", d.main_fg),
            title: get("title", d.title),
            inactive_fg: get("inactive_fg", d.inactive_fg),
            selected: get("selected_bg", d.selected),
        }
    }

    #[inline]
    pub fn tile_color(&self, kind: TileKind) -> Color {
        self.tiles[usize::from(kind.color_index())]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let value = u32::from_str_radix(s, 16).map_err(|_| invalid())?;
    match s.len() {
        6 => Ok(rgb(value)),
        3 => {
            let r = ((value >> 8) & 0xF) as u8 * 17;
            let g = ((value >> 4) & 0xF) as u8 * 17;
            let b = (value & 0xF) as u8 * 17;
            Ok(Color::Rgb(r, g, b))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("glaze").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_keys_map_to_tiles() {
        let map = parse_theme_file("theme[cpu_box]=\"#010203\"\ntheme[title]='#FFF'\n");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.tile_color(TileKind::Blue), Color::Rgb(1, 2, 3));
        assert_eq!(theme.title, Color::Rgb(255, 255, 255));
        assert_eq!(
            theme.tile_color(TileKind::Rainbow),
            Theme::onedark_default().tiles[3]
        );
    }

    #[test]
    fn test_palette_overrides_tiles_only() {
        let mut theme = Theme::default();
        theme.apply_palette(Palette::Colorblind);
        assert_eq!(theme.tiles[0], rgb(0x0077BB));
        assert_eq!(theme.bg, Theme::onedark_default().bg);
    }
}
