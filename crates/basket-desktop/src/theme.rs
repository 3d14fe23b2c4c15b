//! Colors for the desktop app

/// Resolved theme (light or dark)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    /// `BASKET_THEME=dark|light`, falling back to the GTK theme name.
    pub fn detect() -> Self {
        let from_env = |name: &str| std::env::var(name).ok().and_then(|value| Self::parse(&value));
        from_env("BASKET_THEME")
            .or_else(|| from_env("GTK_THEME"))
            .unwrap_or_default()
    }

    fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value.is_empty() {
            None
        } else if value.contains("dark") {
            Some(Self::Dark)
        } else {
            Some(Self::Light)
        }
    }

    #[must_use]
    pub const fn palette(self) -> &'static ColorPalette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub error: &'static str,
}

pub const LIGHT_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#ffffff",
    bg_secondary: "#f4f7f2",
    text_primary: "#1c2419",
    text_secondary: "#4d5a48",
    text_muted: "#95a08f",
    border: "#dde3d8",
    accent: "#2f7d32",
    accent_text: "#ffffff",
    error: "#c62828",
};

pub const DARK_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#171a16",
    bg_secondary: "#21261f",
    text_primary: "#e6ebe3",
    text_secondary: "#a9b3a4",
    text_muted: "#677063",
    border: "#343b31",
    accent: "#81c784",
    accent_text: "#13200f",
    error: "#ef9a9a",
};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_recognizes_dark_variants() {
        assert_eq!(ResolvedTheme::parse("dark"), Some(ResolvedTheme::Dark));
        assert_eq!(ResolvedTheme::parse("Adwaita:dark"), Some(ResolvedTheme::Dark));
        assert_eq!(ResolvedTheme::parse("light"), Some(ResolvedTheme::Light));
        assert_eq!(ResolvedTheme::parse("  "), None);
    }
}
