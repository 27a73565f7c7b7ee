use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, PanelFocus};
use crate::navigator::{Navigator, RenderRow};
use crate::theme::{get_theme, KindStyle, Theme};
use crate::tree::NodeKind;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let theme = get_theme();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let left = app.config.layout.left_panel_width.min(100);
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(left), Constraint::Percentage(100 - left)])
        .split(rows[0]);

    let show_context = app.config.layout.show_context;
    let browser_title = if app.is_loading() {
        "Browser (loading)"
    } else {
        "Browser"
    };
    draw_navigator(
        frame,
        &mut app.browser,
        panels[0],
        browser_title,
        app.active_panel == PanelFocus::Browser,
        show_context,
        &theme,
    );
    draw_navigator(
        frame,
        &mut app.inspector,
        panels[1],
        "Inspector",
        app.active_panel == PanelFocus::Inspector,
        show_context,
        &theme,
    );
    draw_status_bar(frame, app, rows[1], &theme);
}

fn draw_navigator<K: NodeKind + KindStyle>(
    frame: &mut Frame,
    navigator: &mut Navigator<K>,
    area: Rect,
    title: &str,
    is_active: bool,
    show_context: bool,
    theme: &Theme,
) {
    let border_style = if is_active {
        Style::default().fg(theme.active_border)
    } else {
        Style::default().fg(theme.inactive_border)
    };

    let status = navigator.search_status();
    let title = if status.is_empty() {
        format!(" {} ", title)
    } else {
        format!(" {} [{}] ", title, status)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    // Account for borders
    let height = area.height.saturating_sub(2) as usize;
    let rows = navigator.render(height);

    if rows.is_empty() {
        let message = if navigator.search().is_filtering() {
            "No matches"
        } else if navigator.tree().get(navigator.tree().root()).map_or(false, |r| r.loaded) {
            "(empty)"
        } else {
            "Loading..."
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(theme.status_help_text));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(row_line(row, show_context, theme)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn row_line<K: NodeKind + KindStyle>(row: &RenderRow<K>, show_context: bool, theme: &Theme) -> Line<'static> {
    let marker = if row.leaf {
        "  "
    } else if row.expanded {
        "▼ "
    } else {
        "▶ "
    };

    let mut spans = vec![
        Span::raw("  ".repeat(row.depth)),
        Span::styled(marker, Style::default().fg(theme.marker_fg)),
    ];
    let base = row.kind.style(theme);
    let matched = base.fg(theme.match_fg).add_modifier(Modifier::BOLD);
    spans.extend(highlight_spans(&row.label, row.positions.as_deref(), base, matched));

    if show_context {
        if let Some(context) = row.context.as_ref().filter(|c| !c.is_empty()) {
            spans.push(Span::styled(
                format!("  in {}", context),
                Style::default().fg(theme.context_fg),
            ));
        }
    }

    let line = Line::from(spans);
    if row.is_selected {
        line.style(
            Style::default()
                .bg(theme.selected_bg)
                .fg(theme.selected_fg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        line
    }
}

/// Split `label` into runs, styling the chars at `positions` with
/// `matched`. Positions are char offsets.
pub fn highlight_spans(
    label: &str,
    positions: Option<&[usize]>,
    base: Style,
    matched: Style,
) -> Vec<Span<'static>> {
    let positions = match positions {
        Some(p) if !p.is_empty() => p,
        _ => return vec![Span::styled(label.to_string(), base)],
    };

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;
    for (i, c) in label.chars().enumerate() {
        let is_match = positions.contains(&i);
        if is_match != run_matched && !run.is_empty() {
            let style = if run_matched { matched } else { base };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_matched = is_match;
        run.push(c);
    }
    if !run.is_empty() {
        let style = if run_matched { matched } else { base };
        spans.push(Span::styled(run, style));
    }
    spans
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status_text = if app.is_loading() {
        format!("Loading... | {}", app.status_line())
    } else {
        app.status_line()
    };

    let help_text = if app.is_composing() {
        "Enter: Apply | Esc: Cancel | ↑↓: Move"
    } else {
        match app.active_panel {
            PanelFocus::Browser => {
                "Tab: Inspector | /: Search | →←: Expand/Collapse | p J K t T: Jump | m ': Marks | q: Quit"
            }
            PanelFocus::Inspector => "Tab: Browser | /: Search | →←: Expand/Collapse | f: Quick jump | q: Quit",
        }
    };

    let prompt_style = if app.is_composing() {
        Style::default().fg(theme.search_prompt)
    } else {
        Style::default().fg(theme.status_bar_fg)
    };

    let status_line = Line::from(vec![
        Span::styled(status_text, prompt_style),
        Span::raw(" | "),
        Span::styled(help_text, Style::default().fg(theme.status_help_text)),
    ]);

    let paragraph = Paragraph::new(status_line).style(Style::default().bg(theme.status_bar_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn texts(spans: &[Span]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_runs() {
        let base = Style::default();
        let hit = Style::default().fg(Color::Yellow);
        let spans = highlight_spans("plan_check_run", Some(&[0, 5, 11][..]), base, hit);
        assert_eq!(
            texts(&spans),
            vec!["p", "lan_", "c", "heck_", "r", "un"]
        );
        assert_eq!(spans[0].style, hit);
        assert_eq!(spans[1].style, base);
    }

    #[test]
    fn test_highlight_beyond_raw_label_is_plain() {
        let base = Style::default();
        let hit = Style::default().fg(Color::Yellow);
        // decorated suffix after the raw label is never highlighted
        let spans = highlight_spans("users (~3)", Some(&[0, 1][..]), base, hit);
        assert_eq!(texts(&spans), vec!["us", "ers (~3)"]);
    }

    #[test]
    fn test_no_positions_is_one_span() {
        let spans = highlight_spans("été", None, Style::default(), Style::default());
        assert_eq!(texts(&spans), vec!["été"]);
        let spans = highlight_spans("été", Some(&[][..]), Style::default(), Style::default());
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_multibyte_positions_are_chars() {
        let hit = Style::default().fg(Color::Yellow);
        let spans = highlight_spans("żółw", Some(&[1][..]), Style::default(), hit);
        assert_eq!(texts(&spans), vec!["ż", "ó", "łw"]);
    }
}
