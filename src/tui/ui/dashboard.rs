//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::application::EngineInfo;
use crate::tui::styles::CardioTheme;

/// Dashboard state for rendering.
pub struct DashboardState {
    pub info: EngineInfo,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_main_content(f, chunks[1], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CardioTheme::text()),
        Span::styled("CardioWise", CardioTheme::title()),
        Span::styled(" │ ", CardioTheme::text_muted()),
        Span::styled(
            "Interpretable Heart Risk Prediction",
            CardioTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_main_content(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Engine status
            Constraint::Percentage(55), // About / actions
        ])
        .split(area);

    render_status_panel(f, chunks[0], state);
    render_about_panel(f, chunks[1]);
}

fn render_status_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let info = &state.info;

    let status_items = vec![
        status_line("Model Loaded", true),
        Line::from(vec![
            Span::styled("  Trees: ", CardioTheme::text_secondary()),
            Span::styled(info.num_trees.to_string(), CardioTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Features: ", CardioTheme::text_secondary()),
            Span::styled(info.n_features.to_string(), CardioTheme::text()),
        ]),
        status_line("Explainer Bound", true),
        Line::from(vec![
            Span::styled("  Background Rows: ", CardioTheme::text_secondary()),
            Span::styled(info.background_rows.to_string(), CardioTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Base Value: ", CardioTheme::text_secondary()),
            Span::styled(format!("{:.4}", info.base_value), CardioTheme::text()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Engine Status ", CardioTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CardioTheme::border());

    f.render_widget(Paragraph::new(status_items).block(block), area);
}

fn status_line(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("●", CardioTheme::success())
    } else {
        ("○", CardioTheme::danger())
    };
    Line::from(vec![
        Span::styled(format!(" {icon} "), style),
        Span::styled(label.to_string(), CardioTheme::text()),
    ])
}

fn render_about_panel(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Estimate your 10-year heart disease risk from medical data.",
            CardioTheme::text(),
        )),
        Line::from(Span::styled(
            " Every prediction comes with a Shapley-value explanation of",
            CardioTheme::text(),
        )),
        Line::from(Span::styled(
            " the factors pushing the estimate up or down.",
            CardioTheme::text(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [N] ", CardioTheme::key_hint()),
            Span::styled("New Assessment", CardioTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled(" [Q] ", CardioTheme::key_hint()),
            Span::styled("Quit", CardioTheme::key_desc()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" CardioWise ", CardioTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CardioTheme::border());

    f.render_widget(Paragraph::new(text).block(block), area);
}
