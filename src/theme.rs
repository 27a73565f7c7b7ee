use crate::catalog::DbKind;
use crate::json_view::JsonKind;
use ratatui::style::{Color, Modifier, Style};

/// Theme data structure containing all colors used in the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub active_border: Color,
    pub inactive_border: Color,

    // Rows
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub match_fg: Color,
    pub context_fg: Color,
    pub marker_fg: Color,

    // Database objects
    pub database: Color,
    pub schema: Color,
    pub group: Color,
    pub relation: Color,
    pub routine: Color,
    pub column: Color,
    pub error: Color,
    pub placeholder: Color,

    // JSON values
    pub json_key: Color,
    pub json_string: Color,
    pub json_number: Color,
    pub json_literal: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_help_text: Color,
    pub search_prompt: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            active_border: Color::Yellow,
            inactive_border: Color::DarkGray,

            selected_bg: Color::White,
            selected_fg: Color::Black,
            match_fg: Color::Yellow,
            context_fg: Color::DarkGray,
            marker_fg: Color::Gray,

            database: Color::Magenta,
            schema: Color::Blue,
            group: Color::Gray,
            relation: Color::Green,
            routine: Color::Cyan,
            column: Color::Reset,
            error: Color::Red,
            placeholder: Color::DarkGray,

            json_key: Color::Blue,
            json_string: Color::Green,
            json_number: Color::Cyan,
            json_literal: Color::Magenta,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_help_text: Color::Gray,
            search_prompt: Color::Yellow,
        }
    }
}

/// Get the current theme
pub fn get_theme() -> Theme {
    Theme::default()
}

/// Per-kind row styling. Lives here so the engine never deals in colors.
pub trait KindStyle {
    fn style(&self, theme: &Theme) -> Style;
}

impl KindStyle for DbKind {
    fn style(&self, theme: &Theme) -> Style {
        let base = Style::default();
        match self {
            DbKind::Root | DbKind::Database => {
                base.fg(theme.database).add_modifier(Modifier::BOLD)
            }
            DbKind::Schema => base.fg(theme.schema).add_modifier(Modifier::BOLD),
            DbKind::Group(_) => base.fg(theme.group),
            DbKind::Table | DbKind::View | DbKind::MaterializedView => base.fg(theme.relation),
            DbKind::Function | DbKind::Sequence | DbKind::Extension => base.fg(theme.routine),
            DbKind::Column | DbKind::Index => base.fg(theme.column),
            DbKind::Error => base.fg(theme.error),
            DbKind::Empty => base.fg(theme.placeholder).add_modifier(Modifier::ITALIC),
        }
    }
}

impl KindStyle for JsonKind {
    fn style(&self, theme: &Theme) -> Style {
        let base = Style::default();
        match self {
            JsonKind::Root | JsonKind::Object | JsonKind::Array => {
                base.fg(theme.json_key).add_modifier(Modifier::BOLD)
            }
            JsonKind::String => base.fg(theme.json_string),
            JsonKind::Number => base.fg(theme.json_number),
            JsonKind::Bool | JsonKind::Null => base.fg(theme.json_literal),
            JsonKind::Error => base.fg(theme.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectClass;

    #[test]
    fn test_get_theme_returns_valid_theme() {
        let theme = get_theme();
        assert_eq!(theme.active_border, Color::Yellow);
        assert_eq!(theme.inactive_border, Color::DarkGray);
        assert_eq!(theme.status_bar_bg, Color::DarkGray);
    }

    #[test]
    fn test_db_kinds_share_colors_by_family() {
        let theme = get_theme();
        assert_eq!(DbKind::Table.style(&theme), DbKind::View.style(&theme));
        assert_eq!(
            DbKind::Group(ObjectClass::Tables).style(&theme),
            DbKind::Group(ObjectClass::Functions).style(&theme)
        );
        assert_eq!(DbKind::Error.style(&theme).fg, Some(theme.error));
    }

    #[test]
    fn test_json_scalars() {
        let theme = get_theme();
        assert_eq!(JsonKind::String.style(&theme).fg, Some(Color::Green));
        assert_eq!(JsonKind::Null.style(&theme), JsonKind::Bool.style(&theme));
    }
}
