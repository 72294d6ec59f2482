//! Light/dark theme controls
//!
//! Each control sets one fixed theme. Persisting the choice is left to the
//! provider script in the page layout.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// An explicit color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    Light,
    Dark,
}

impl ThemeChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeChoice::Light => "light",
            ThemeChoice::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeChoice::Light),
            "dark" => Ok(ThemeChoice::Dark),
            other => anyhow::bail!("Unknown theme: {}. Available: light, dark", other),
        }
    }
}

/// A navbar button that sets one theme
#[derive(Debug, Clone, Serialize)]
pub struct ThemeControl {
    /// Button `name`, e.g. `dark-mode`
    pub name: String,
    pub label: String,
    /// Theme applied when pressed
    pub sets: ThemeChoice,
}

impl ThemeControl {
    fn new(sets: ThemeChoice) -> Self {
        let label = match sets {
            ThemeChoice::Dark => "Dark",
            ThemeChoice::Light => "Light",
        };
        Self {
            name: format!("{}-mode", sets),
            label: label.to_string(),
            sets,
        }
    }

    /// The intent this control dispatches when pressed
    pub fn press(&self) -> ThemeChoice {
        self.sets
    }
}

/// The pair of theme controls shown in the navbar
pub struct ThemeToggle;

impl ThemeToggle {
    /// Controls in navbar order: dark, then light
    pub fn controls() -> Vec<ThemeControl> {
        vec![
            ThemeControl::new(ThemeChoice::Dark),
            ThemeControl::new(ThemeChoice::Light),
        ]
    }
}

/// Normalize the configured provider default to `light`, `dark` or `system`
pub fn default_theme(configured: &str) -> &'static str {
    match configured.parse::<ThemeChoice>() {
        Ok(choice) => choice.as_str(),
        Err(_) => {
            if !configured.eq_ignore_ascii_case("system") {
                tracing::warn!("Unknown default_theme {:?}, using system", configured);
            }
            "system"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_control_sets_a_fixed_theme() {
        let controls = ThemeToggle::controls();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].name, "dark-mode");
        assert_eq!(controls[1].name, "light-mode");
        // Pressing twice never toggles
        assert_eq!(controls[0].press(), ThemeChoice::Dark);
        assert_eq!(controls[0].press(), ThemeChoice::Dark);
        assert_eq!(controls[1].press(), ThemeChoice::Light);
    }

    #[test]
    fn test_parse_theme_choice() {
        assert_eq!("Dark".parse::<ThemeChoice>().unwrap(), ThemeChoice::Dark);
        assert_eq!(" light ".parse::<ThemeChoice>().unwrap(), ThemeChoice::Light);
        assert!("system".parse::<ThemeChoice>().is_err());
    }

    #[test]
    fn test_default_theme() {
        assert_eq!(default_theme("dark"), "dark");
        assert_eq!(default_theme("system"), "system");
        assert_eq!(default_theme("sepia"), "system");
    }
}
