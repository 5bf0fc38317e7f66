//! Prediction result and explanation view.
//!
//! Shows the probability, the model's discrete risk label, and a signed,
//! magnitude-ranked bar chart of per-feature attributions.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::RiskReport;
use crate::tui::styles::CardioTheme;

/// Width of one side of the attribution bar axis, in cells.
const BAR_HALF_WIDTH: usize = 20;

/// Results screen state
#[derive(Debug, Clone, Default)]
pub enum ResultsState {
    /// Not started
    #[default]
    Idle,
    /// Pipeline running in the background worker
    Running,
    /// Completed with a report
    Complete { report: RiskReport },
    /// Error occurred
    Error { message: String },
}

/// Render the results view
pub fn render_results(f: &mut Frame, area: Rect, state: &ResultsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_results_header(f, chunks[0]);
    render_results_content(f, chunks[1], state);
    render_results_footer(f, chunks[2], state);
}

fn render_results_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CardioTheme::text()),
        Span::styled("Prediction Result", CardioTheme::title()),
        Span::styled(" │ 10-Year CHD Risk", CardioTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_results_content(f: &mut Frame, area: Rect, state: &ResultsState) {
    match state {
        ResultsState::Idle => render_idle(f, area),
        ResultsState::Running => render_running(f, area),
        ResultsState::Complete { report } => render_report(f, area, report),
        ResultsState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Ready to estimate CHD risk",
            CardioTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter medical details to begin",
            CardioTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_running(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Scoring and computing attributions...",
            CardioTheme::info(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_report(f: &mut Frame, area: Rect, report: &RiskReport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Probability + label
            Constraint::Min(0),    // Attribution chart
        ])
        .split(area);

    render_assessment(f, chunks[0], report);
    render_attributions(f, chunks[1], report);
}

fn render_assessment(f: &mut Frame, area: Rect, report: &RiskReport) {
    let block = Block::default()
        .title(Span::styled(" Assessment ", CardioTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(CardioTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3)])
        .split(inner);

    // Risk label from the model's own decision rule (shown alongside the
    // probability, never derived from it).
    let label = report.assessment.label();
    let label_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{label}"),
            CardioTheme::risk_label(label).add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            label.description(),
            CardioTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(label_display, chunks[0]);

    let probability = report.assessment.probability;
    let prob_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Predicted 10-Year CHD Risk ",
                    CardioTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(CardioTheme::border()),
        )
        .gauge_style(CardioTheme::risk_label(label))
        .percent((probability * 100.0) as u16)
        .label(format!("{:.2}%", probability * 100.0));
    f.render_widget(prob_gauge, chunks[1]);
}

/// Render the signed attribution ranking.
///
/// Each row: field name, a bar left (risk-decreasing) or right
/// (risk-increasing) of a central axis, and the signed value. Bars are
/// scaled to the largest magnitude.
fn render_attributions(f: &mut Frame, area: Rect, report: &RiskReport) {
    let block = Block::default()
        .title(Span::styled(
            " What influenced this prediction? ",
            CardioTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(CardioTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let explanation = &report.explanation;
    let max_magnitude = explanation.max_magnitude().max(f64::EPSILON);

    let mut lines = vec![Line::from(vec![
        Span::styled("  base value ", CardioTheme::text_secondary()),
        Span::styled(
            format!("{:+.4}", explanation.base_value),
            CardioTheme::text(),
        ),
        Span::styled("  (expected risk before features)", CardioTheme::text_muted()),
    ])];

    let visible = inner.height.saturating_sub(2) as usize;
    for attr in explanation.ranked().into_iter().take(visible) {
        let filled = ((attr.value.abs() / max_magnitude) * BAR_HALF_WIDTH as f64)
            .round() as usize;
        let filled = filled.min(BAR_HALF_WIDTH);

        let (left, right) = if attr.value < 0.0 {
            (
                format!("{:>pad$}{}", "", "▆".repeat(filled), pad = BAR_HALF_WIDTH - filled),
                " ".repeat(BAR_HALF_WIDTH),
            )
        } else {
            (
                " ".repeat(BAR_HALF_WIDTH),
                format!("{:<pad$}", "▆".repeat(filled), pad = BAR_HALF_WIDTH),
            )
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:>15} ", attr.field),
                CardioTheme::text_secondary(),
            ),
            Span::styled(left, CardioTheme::attribution(attr.value)),
            Span::styled("│", CardioTheme::text_muted()),
            Span::styled(right, CardioTheme::attribution(attr.value)),
            Span::styled(format!(" {:+.4}", attr.value), CardioTheme::text()),
        ]));
    }

    let chart = Paragraph::new(lines);
    f.render_widget(chart, inner);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", CardioTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, CardioTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CardioTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_results_footer(f: &mut Frame, area: Rect, state: &ResultsState) {
    let content = match state {
        ResultsState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", CardioTheme::key_hint()),
            Span::styled("Dashboard ", CardioTheme::key_desc()),
            Span::styled("[N] ", CardioTheme::key_hint()),
            Span::styled("New Assessment", CardioTheme::key_desc()),
        ]),
        ResultsState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", CardioTheme::key_hint()),
            Span::styled("Back to Form ", CardioTheme::key_desc()),
            Span::styled("[Esc] ", CardioTheme::key_hint()),
            Span::styled("Dashboard", CardioTheme::key_desc()),
        ]),
        _ => Line::from(vec![Span::styled(
            "Processing...",
            CardioTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(footer, area);
}
