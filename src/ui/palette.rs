use keyfall::celebration::BurstKind;
use keyfall::config::{Settings, Theme};
use ratatui::style::{Color, Modifier, Style};

/// Colours for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub item: Color,
    pub matched: Color,
    pub wrong: Color,
    pub combo: Color,
    pub background: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                text: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                item: Color::White,
                matched: Color::Green,
                wrong: Color::Red,
                combo: Color::Yellow,
                background: Color::Reset,
            },
            Theme::Light => Self {
                text: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                item: Color::Black,
                matched: Color::Rgb(0, 128, 0),
                wrong: Color::Red,
                combo: Color::Magenta,
                background: Color::Rgb(245, 245, 245),
            },
            Theme::Neon => Self {
                text: Color::Rgb(0, 255, 255),
                dim: Color::Rgb(90, 60, 140),
                accent: Color::Rgb(255, 0, 255),
                item: Color::Rgb(0, 255, 255),
                matched: Color::Rgb(57, 255, 20),
                wrong: Color::Rgb(255, 20, 80),
                combo: Color::Rgb(255, 240, 0),
                background: Color::Rgb(10, 0, 20),
            },
            Theme::Retro => Self {
                text: Color::Rgb(51, 255, 51),
                dim: Color::Rgb(20, 110, 20),
                accent: Color::Rgb(255, 176, 0),
                item: Color::Rgb(51, 255, 51),
                matched: Color::Rgb(255, 176, 0),
                wrong: Color::Rgb(255, 80, 80),
                combo: Color::Rgb(255, 176, 0),
                background: Color::Black,
            },
        }
    }

    /// Maximum contrast, whatever the theme
    pub fn high_contrast() -> Self {
        Self {
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Yellow,
            item: Color::White,
            matched: Color::LightGreen,
            wrong: Color::LightRed,
            combo: Color::Yellow,
            background: Color::Black,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        if settings.accessibility.high_contrast {
            Self::high_contrast()
        } else {
            Self::for_theme(settings.theme)
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn dim_style(&self) -> Style {
        self.base().fg(self.dim)
    }

    pub fn accent_bold(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn burst(&self, kind: BurstKind) -> Color {
        match kind {
            BurstKind::Success => self.matched,
            BurstKind::Combo => self.combo,
            BurstKind::LevelUp => self.accent,
            BurstKind::Achievement => Color::Yellow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_themes_differ() {
        let dark = Palette::for_theme(Theme::Dark);
        let retro = Palette::for_theme(Theme::Retro);
        assert_ne!(dark, retro);
        assert_eq!(dark.background, Color::Reset);
    }

    #[test]
    fn test_high_contrast_overrides_theme() {
        let mut settings = Settings {
            theme: Theme::Neon,
            ..Settings::default()
        };
        assert_eq!(Palette::from_settings(&settings), Palette::for_theme(Theme::Neon));
        settings.accessibility.high_contrast = true;
        assert_eq!(Palette::from_settings(&settings), Palette::high_contrast());
    }
}
