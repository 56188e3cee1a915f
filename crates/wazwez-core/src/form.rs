use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LimitSection;
use crate::datetime::{format_input_date, parse_input_date};

pub const NAME_REQUIRED: &str = "Task name is required";
pub const INVALID_DATE: &str = "Invalid date format";

/// In-progress form contents, persisted while the form is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Date,
}

/// Form contents that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub name: String,
    pub description: String,
    pub date: Option<NaiveDate>,
}

/// Collects every problem instead of stopping at the first one.
pub fn validate(draft: &FormDraft, limits: &LimitSection) -> Result<ValidTask, Vec<String>> {
    let name = draft.name.trim();
    let description = draft.description.trim();
    let date = draft.date.trim();
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(NAME_REQUIRED.to_string());
    }
    if name.chars().count() > limits.title_max_chars {
        errors.push(format!(
            "Task name is too long (max {} characters)",
            limits.title_max_chars
        ));
    }
    if description.chars().count() > limits.description_max_chars {
        errors.push(format!(
            "Description is too long (max {} characters)",
            limits.description_max_chars
        ));
    }

    let parsed_date = if date.is_empty() {
        None
    } else {
        match parse_input_date(date) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(INVALID_DATE.to_string());
                None
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidTask {
        name: name.to_string(),
        description: description.to_string(),
        date: parsed_date,
    })
}

/// The add-task form. Description and date inputs start collapsed behind
/// their labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    visible: bool,
    draft: FormDraft,
    description_expanded: bool,
    date_expanded: bool,
    errors: Vec<String>,
}

impl TaskForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            visible: false,
            draft: FormDraft {
                date: format_input_date(today),
                ..FormDraft::default()
            },
            description_expanded: false,
            date_expanded: false,
            errors: vec![],
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn description_expanded(&self) -> bool {
        self.description_expanded
    }

    pub fn date_expanded(&self) -> bool {
        self.date_expanded
    }

    pub fn show(&mut self, today: NaiveDate) {
        if self.visible {
            return;
        }
        if self.draft.date.trim().is_empty() {
            self.draft.date = format_input_date(today);
        }
        self.visible = true;
    }

    /// Hiding also clears the inputs and collapses the optional fields.
    pub fn hide(&mut self, today: NaiveDate) {
        if !self.visible {
            return;
        }
        self.draft = FormDraft {
            date: format_input_date(today),
            ..FormDraft::default()
        };
        self.description_expanded = false;
        self.date_expanded = false;
        self.errors.clear();
        self.visible = false;
    }

    pub fn toggle(&mut self, today: NaiveDate) {
        if self.visible {
            self.hide(today);
        } else {
            self.show(today);
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        let slot = match field {
            FormField::Name => &mut self.draft.name,
            FormField::Description => &mut self.draft.description,
            FormField::Date => &mut self.draft.date,
        };
        *slot = value.to_string();
    }

    pub fn expand_description(&mut self) {
        self.description_expanded = true;
    }

    pub fn expand_date(&mut self) {
        self.date_expanded = true;
    }

    /// Loads a restored draft. Only fields that carry text overwrite the
    /// current ones.
    pub fn apply_draft(&mut self, draft: FormDraft) {
        if !draft.name.is_empty() {
            self.draft.name = draft.name;
        }
        if !draft.description.is_empty() {
            self.draft.description = draft.description;
            self.description_expanded = true;
        }
        if !draft.date.is_empty() {
            self.draft.date = draft.date;
        }
    }

    pub fn validate(&self, limits: &LimitSection) -> Result<ValidTask, Vec<String>> {
        validate(&self.draft, limits)
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn draft(name: &str, description: &str, date: &str) -> FormDraft {
        FormDraft {
            name: name.into(),
            description: description.into(),
            date: date.into(),
        }
    }

    #[test]
    fn collects_every_message() {
        let limits = LimitSection::default();
        let long_description = "d".repeat(501);
        let errors = validate(&draft("   ", &long_description, "16-10-2026"), &limits)
            .expect_err("invalid form");
        assert_eq!(
            errors,
            vec![
                "Task name is required".to_string(),
                "Description is too long (max 500 characters)".to_string(),
                "Invalid date format".to_string(),
            ]
        );

        let errors =
            validate(&draft(&"n".repeat(101), "", ""), &limits).expect_err("name too long");
        assert_eq!(errors, vec!["Task name is too long (max 100 characters)".to_string()]);
    }

    #[test]
    fn accepts_limits_exactly_and_trims() {
        let limits = LimitSection::default();
        let valid = validate(
            &draft(&format!(" {} ", "n".repeat(100)), "  notes ", "2026-10-20"),
            &limits,
        )
        .expect("valid form");
        assert_eq!(valid.name.len(), 100);
        assert_eq!(valid.description, "notes");
        assert_eq!(valid.date, Some(day(2026, 10, 20)));

        let valid = validate(&draft("Buy milk", "", ""), &limits).expect("valid form");
        assert_eq!(valid.date, None);
    }

    #[test]
    fn hiding_resets_inputs_to_today() {
        let today = day(2026, 10, 16);
        let mut form = TaskForm::new(today);
        form.show(today);
        form.set_field(FormField::Name, "Buy milk");
        form.set_field(FormField::Date, "2026-12-01");
        form.expand_description();
        form.set_errors(vec![NAME_REQUIRED.to_string()]);

        form.hide(today);
        assert!(!form.is_visible());
        assert_eq!(form.draft(), &draft("", "", "2026-10-16"));
        assert!(!form.description_expanded());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn restored_description_expands_its_input() {
        let today = day(2026, 10, 16);
        let mut form = TaskForm::new(today);
        form.apply_draft(draft("Call mom", "", ""));
        assert!(!form.description_expanded());
        assert_eq!(form.draft().date, "2026-10-16");

        form.apply_draft(draft("", "about sunday", "2026-10-18"));
        assert!(form.description_expanded());
        assert_eq!(form.draft(), &draft("Call mom", "about sunday", "2026-10-18"));
    }
}
