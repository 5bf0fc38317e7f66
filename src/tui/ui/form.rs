//! Medical attribute input form.
//!
//! One control per schema field: two-way/ordinal toggles for categorical
//! fields, bounded numeric text entry for measurements. The form owns range
//! enforcement; category-to-number mapping is the record builder's job.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    FeatureRecord, FieldKind, FieldSpec, RecordBuilder, Sex, YesNo, FIELDS,
};
use crate::tui::styles::CardioTheme;

/// Editable state of one form field.
#[derive(Debug, Clone)]
pub enum FieldInput {
    /// Free numeric entry with the field's domain as bounds
    Text(String),
    /// Index into the field's option list
    Choice(usize),
}

/// One field row: static spec plus current input.
#[derive(Debug, Clone)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub input: FieldInput,
}

impl FormField {
    fn new(spec: &'static FieldSpec) -> Self {
        let input = match spec.kind {
            FieldKind::Binary | FieldKind::Ordinal { .. } => FieldInput::Choice(0),
            _ => FieldInput::Text(String::new()),
        };
        Self { spec, input }
    }

    /// Option labels for toggle fields.
    fn options(&self) -> Vec<String> {
        match self.spec.kind {
            FieldKind::Binary => {
                if self.spec.name == "male" {
                    vec!["Female".to_string(), "Male".to_string()]
                } else {
                    vec!["No".to_string(), "Yes".to_string()]
                }
            }
            FieldKind::Ordinal { min, max } => {
                (min..=max).map(|v| v.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    fn display_value(&self) -> String {
        match &self.input {
            FieldInput::Text(text) => text.clone(),
            FieldInput::Choice(idx) => {
                let options = self.options();
                let label = options.get(*idx).cloned().unwrap_or_default();
                format!("◂ {label} ▸")
            }
        }
    }
}

/// Assessment form state.
pub struct FormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            fields: FIELDS.iter().map(FormField::new).collect(),
            selected_field: 0,
            error_message: None,
        }
    }
}

impl FormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle a toggle field left/right.
    pub fn cycle_choice(&mut self, forward: bool) {
        let field = &mut self.fields[self.selected_field];
        let n = field.options().len();
        if let FieldInput::Choice(idx) = &mut field.input {
            if n > 0 {
                *idx = if forward {
                    (*idx + 1) % n
                } else {
                    (*idx + n - 1) % n
                };
                self.error_message = None;
            }
        }
    }

    /// Add a character to the current field (numeric entry only)
    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Text(text) = &mut self.fields[self.selected_field].input {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldInput::Text(text) = &mut self.fields[self.selected_field].input {
            text.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let FieldInput::Text(text) = &mut self.fields[self.selected_field].input {
            text.clear();
        }
    }

    /// Wipe all field buffers and reset the form.
    ///
    /// Called immediately after an assessment starts so raw inputs do not
    /// persist in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            match &mut field.input {
                FieldInput::Text(text) => text.zeroize(),
                FieldInput::Choice(idx) => *idx = 0,
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Validate the form and build a feature record.
    ///
    /// Range checks happen here (the form's domain knowledge); the shape and
    /// category mapping happen in the record builder.
    pub fn to_record(&self) -> Result<FeatureRecord, String> {
        let mut builder = RecordBuilder::new();

        for field in &self.fields {
            let spec = field.spec;
            builder = match (&field.input, spec.kind) {
                (FieldInput::Choice(idx), FieldKind::Binary) => {
                    if spec.name == "male" {
                        let sex = if *idx == 1 { Sex::Male } else { Sex::Female };
                        builder.sex(sex)
                    } else {
                        let choice = if *idx == 1 { YesNo::Yes } else { YesNo::No };
                        builder.flag(spec.name, choice)
                    }
                }
                (FieldInput::Choice(idx), FieldKind::Ordinal { min, .. }) => {
                    builder.set(spec.name, f64::from(min) + *idx as f64)
                }
                (FieldInput::Text(text), kind) => {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| format!("{}: Invalid number", spec.label))?;

                    let (min, max) = match kind {
                        FieldKind::Integer { min, max } => (min as f64, max as f64),
                        FieldKind::Float { min, max } => (min, max),
                        _ => (f64::MIN, f64::MAX),
                    };
                    if value < min || value > max {
                        return Err(format!(
                            "{}: Value must be between {} and {}",
                            spec.label, min, max
                        ));
                    }

                    builder.set(spec.name, value)
                }
                (FieldInput::Choice(_), _) => builder,
            };
        }

        builder.build().map_err(|e| e.to_string())
    }

    /// Load sample data (typical elevated-risk profile).
    pub fn load_sample_data(&mut self) {
        let sample: [(&str, FieldInput); 15] = [
            ("male", FieldInput::Choice(1)),
            ("age", FieldInput::Text("61".into())),
            ("education", FieldInput::Choice(1)),
            ("currentSmoker", FieldInput::Choice(1)),
            ("cigsPerDay", FieldInput::Text("20".into())),
            ("BPMeds", FieldInput::Choice(0)),
            ("prevalentStroke", FieldInput::Choice(0)),
            ("prevalentHyp", FieldInput::Choice(1)),
            ("diabetes", FieldInput::Choice(0)),
            ("totChol", FieldInput::Text("250".into())),
            ("sysBP", FieldInput::Text("150".into())),
            ("diaBP", FieldInput::Text("90".into())),
            ("BMI", FieldInput::Text("29.5".into())),
            ("heartRate", FieldInput::Text("80".into())),
            ("glucose", FieldInput::Text("95".into())),
        ];
        for (field, (name, input)) in self.fields.iter_mut().zip(sample) {
            debug_assert_eq!(field.spec.name, name);
            field.input = input;
        }
        self.error_message = None;
    }
}

/// Render the medical attribute input form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CardioTheme::text()),
        Span::styled("Medical Details", CardioTheme::title()),
        Span::styled(
            " │ Framingham Risk Attributes",
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

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    // Three columns keep all 15 fields visible at once.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .margin(1)
        .split(area);

    let per_column = state.fields.len().div_ceil(3);

    for (col, chunk) in columns.iter().enumerate() {
        let start = col * per_column;
        let end = (start + per_column).min(state.fields.len());
        if start < end {
            render_field_column(
                f,
                *chunk,
                &state.fields[start..end],
                start,
                state.selected_field,
            );
        }
    }
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            CardioTheme::border_focused()
        } else {
            CardioTheme::border()
        };

        let title_style = if is_selected {
            CardioTheme::focused()
        } else {
            CardioTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = field.display_value();
        let value_display = if value.is_empty() {
            Span::styled(field.spec.hint, CardioTheme::text_muted())
        } else {
            Span::styled(value, CardioTheme::text())
        };

        let is_text = matches!(field.input, FieldInput::Text(_));
        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected && is_text {
                Span::styled("▌", CardioTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", CardioTheme::danger()),
            Span::styled(err.clone(), CardioTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", CardioTheme::key_hint()),
            Span::styled("Navigate ", CardioTheme::key_desc()),
            Span::styled("[◂▸] ", CardioTheme::key_hint()),
            Span::styled("Toggle ", CardioTheme::key_desc()),
            Span::styled("[Enter] ", CardioTheme::key_hint()),
            Span::styled("Predict ", CardioTheme::key_desc()),
            Span::styled("[S] ", CardioTheme::key_hint()),
            Span::styled("Sample Data ", CardioTheme::key_desc()),
            Span::styled("[Esc] ", CardioTheme::key_hint()),
            Span::styled("Cancel", CardioTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CardioTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FIELD_COUNT;

    #[test]
    fn test_sample_data_builds_scenario_record() {
        let mut form = FormState::default();
        form.load_sample_data();

        let record = form.to_record().expect("Should build");
        let v = record.to_vec();
        assert_eq!(v.len(), FIELD_COUNT);
        assert!((v[0] - 1.0).abs() < f64::EPSILON); // male
        assert!((v[1] - 61.0).abs() < f64::EPSILON); // age
        assert!((v[2] - 2.0).abs() < f64::EPSILON); // education (choice 1 -> level 2)
        assert!((v[3] - 1.0).abs() < f64::EPSILON); // currentSmoker
        assert!((v[12] - 29.5).abs() < f64::EPSILON); // BMI
    }

    #[test]
    fn test_empty_numeric_field_rejected() {
        let form = FormState::default();
        let err = form.to_record().expect_err("Should reject");
        assert!(err.contains("Age"));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut form = FormState::default();
        form.load_sample_data();
        // Age above its declared domain.
        form.fields[1].input = FieldInput::Text("97".into());
        let err = form.to_record().expect_err("Should reject");
        assert!(err.contains("Age"));
    }

    #[test]
    fn test_toggle_cycles_wrap() {
        let mut form = FormState::default();
        // Field 0 is the two-option sex toggle.
        assert!(matches!(form.fields[0].input, FieldInput::Choice(0)));
        form.cycle_choice(true);
        assert!(matches!(form.fields[0].input, FieldInput::Choice(1)));
        form.cycle_choice(true);
        assert!(matches!(form.fields[0].input, FieldInput::Choice(0)));
        form.cycle_choice(false);
        assert!(matches!(form.fields[0].input, FieldInput::Choice(1)));
    }

    #[test]
    fn test_clear_sensitive_wipes_buffers() {
        let mut form = FormState::default();
        form.load_sample_data();
        form.clear_sensitive();

        for field in &form.fields {
            match &field.input {
                FieldInput::Text(text) => assert!(text.is_empty()),
                FieldInput::Choice(idx) => assert_eq!(*idx, 0),
            }
        }
    }
}
