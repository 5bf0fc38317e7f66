//! Cardio-themed color palette and styles.
//!
//! Colors chosen for:
//! - Professional healthcare appearance
//! - High contrast for accessibility
//! - Clear signed-direction cues in the attribution chart

use ratatui::style::{Color, Modifier, Style};

/// Cardio theme color palette.
pub struct CardioTheme;

impl CardioTheme {
    // === Primary Colors ===

    /// Deep rose - Primary color (cardio identity)
    pub const PRIMARY: Color = Color::Rgb(225, 29, 72); // #E11D48

    /// Lighter rose for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(251, 113, 133); // #FB7185

    // === Secondary Colors ===

    /// Slate blue - Secondary (professionalism)
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    /// Emerald - Success / low risk / risk-decreasing attribution
    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981

    /// Amber - Warnings
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24

    /// Rose - Error / high risk / risk-increasing attribution
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E

    /// Blue - Info
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Background ===

    /// Near-black with blue tint
    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    // === Text Colors ===

    /// Primary text (white)
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    /// Secondary text (gray)
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    /// Muted text
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Style for titles
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for subtitles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for normal text
    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    /// Style for secondary text
    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for muted text
    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    /// Style for success messages
    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    /// Style for warning messages
    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    /// Style for danger/error messages
    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for info messages
    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for borders
    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    /// Style for focused borders
    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Style for key hints
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for the field cursor
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    /// Get the style for a risk label
    #[must_use]
    pub fn risk_label(label: crate::domain::RiskLabel) -> Style {
        match label {
            crate::domain::RiskLabel::Low => Self::success(),
            crate::domain::RiskLabel::High => Self::danger(),
        }
    }

    /// Style for one signed attribution bar.
    ///
    /// Positive values push the prediction toward high risk, negative away.
    #[must_use]
    pub fn attribution(value: f64) -> Style {
        if value >= 0.0 {
            Self::danger()
        } else {
            Self::success()
        }
    }
}

/// ASCII art logo for CardioWise
#[allow(dead_code)]
pub const LOGO: &str = r#"
╔═╗┌─┐┬─┐┌┬┐┬┌─┐╦ ╦┬┌─┐┌─┐
║  ├─┤├┬┘ ││││ │║║║│└─┐├┤
╚═╝┴ ┴┴└──┴┘┴└─┘╚╩╝┴└─┘└─┘
"#;
