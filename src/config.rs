use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xdg::BaseDirectories;

use crate::diff::Sides;
use crate::side_by_side::DiffTheme;

/// Width used when neither the config nor the terminal gives one
const FALLBACK_WIDTH: u16 = 160;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub diff: DiffConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub line_numbers: bool,
    pub tab_width: usize,
    /// Output width; the terminal width when unset
    pub width: Option<u16>,
}

/// Colors in ratatui syntax: names, `#rrggbb` or a palette index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub file_line: String,
    pub chunk_line: String,
    pub span_line: String,
    pub removed_line: String,
    pub added_line: String,
    /// Background of changed chars on the left
    pub removed_char: String,
    /// Background of changed chars on the right
    pub added_char: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            tab_width: 4,
            width: None,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            file_line: "yellow".to_owned(),
            chunk_line: "cyan".to_owned(),
            span_line: "darkgray".to_owned(),
            removed_line: "red".to_owned(),
            added_line: "green".to_owned(),
            removed_char: "red".to_owned(),
            added_char: "green".to_owned(),
        }
    }
}

impl DiffConfig {
    /// Configured width, else the terminal width, else 160 columns
    pub fn resolved_width(&self) -> u16 {
        self.width
            .or_else(|| crossterm::terminal::size().ok().map(|(cols, _)| cols))
            .filter(|&cols| cols > 0)
            .unwrap_or(FALLBACK_WIDTH)
    }
}

fn parse_color(key: &str, value: &str) -> Result<Color> {
    Color::from_str(value).map_err(|_| anyhow!("Invalid color for theme.{}: {:?}", key, value))
}

impl ThemeConfig {
    /// Build the assembly theme, failing on the first invalid color
    pub fn theme(&self) -> Result<DiffTheme> {
        let char_style = |key: &str, value: &str| -> Result<Style> {
            Ok(Style::default()
                .fg(Color::Black)
                .bg(parse_color(key, value)?)
                .add_modifier(Modifier::BOLD))
        };

        Ok(DiffTheme {
            file_line: Style::default()
                .fg(parse_color("file_line", &self.file_line)?)
                .add_modifier(Modifier::BOLD),
            chunk_line: Style::default().fg(parse_color("chunk_line", &self.chunk_line)?),
            span_line: Style::default().fg(parse_color("span_line", &self.span_line)?),
            line: Sides::new(
                Style::default().fg(parse_color("removed_line", &self.removed_line)?),
                Style::default().fg(parse_color("added_line", &self.added_line)?),
            ),
            char: Sides::new(
                char_style("removed_char", &self.removed_char)?,
                char_style("added_char", &self.added_char)?,
            ),
        })
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// ~/.config/sidediff/config.toml
    fn config_path() -> Option<PathBuf> {
        BaseDirectories::with_prefix("sidediff")
            .ok()
            .map(|dirs| dirs.get_config_home().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_theme_matches_assembly_default() {
        let theme = ThemeConfig::default().theme().unwrap();
        assert_eq!(theme, DiffTheme::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r##"
            [diff]
            tab_width = 8

            [theme]
            added_line = "#00ff00"
            "##,
        )
        .unwrap();
        assert_eq!(config.diff.tab_width, 8);
        assert!(config.diff.line_numbers);
        assert_eq!(config.diff.width, None);

        let theme = config.theme.theme().unwrap();
        assert_eq!(theme.line.right.fg, Some(Color::Rgb(0, 255, 0)));
        assert_eq!(theme.line.left.fg, Some(Color::Red));
    }

    #[test]
    fn test_invalid_color_is_error() {
        let config = ThemeConfig {
            chunk_line: "not-a-color".to_owned(),
            ..ThemeConfig::default()
        };
        let err = config.theme().unwrap_err();
        assert!(err.to_string().contains("theme.chunk_line"));
    }

    #[test]
    fn test_configured_width_wins() {
        let config = DiffConfig {
            width: Some(100),
            ..DiffConfig::default()
        };
        assert_eq!(config.resolved_width(), 100);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff]\nline_numbers = false\nwidth = 120").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert!(!config.diff.line_numbers);
        assert_eq!(config.diff.width, Some(120));
    }

    #[test]
    fn test_load_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff\n").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
