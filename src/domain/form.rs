//! Application form schema and the values the user has entered so far.
//!
//! Fields are declared up front in a [`FormSchema`] rather than discovered
//! from the view, so validation and answer collection work without a UI.

use super::errors::{DomainError, DomainResult};
use serde_json::{Map, Value};

/// Answers sent to the server, keyed by field name.
pub type FormAnswers = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Free-form text that may span several lines
    Multiline,
    Checkbox,
}

/// How a field takes part in the completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Must be non-blank after trimming
    Required,
    Optional,
    /// At least one checkbox of the group must be checked
    ChoiceGroup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub role: FieldRole,
    /// Maximum number of characters; ignored for checkboxes.
    pub max_len: usize,
}

impl FieldSpec {
    pub fn is_checkbox(&self) -> bool {
        self.kind == FieldKind::Checkbox
    }
}

/// Ordered list of form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::application()
    }
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The membership application form.
    pub fn application() -> Self {
        Self::new(vec![
            FieldSpec {
                name: "name",
                label: "Имя",
                kind: FieldKind::Text,
                role: FieldRole::Required,
                max_len: 64,
            },
            FieldSpec {
                name: "age",
                label: "Возраст",
                kind: FieldKind::Text,
                role: FieldRole::Required,
                max_len: 3,
            },
            FieldSpec {
                name: "about",
                label: "О себе",
                kind: FieldKind::Multiline,
                role: FieldRole::Required,
                max_len: 500,
            },
            FieldSpec {
                name: "mc_nick",
                label: "Ник в Minecraft",
                kind: FieldKind::Text,
                role: FieldRole::Required,
                max_len: 32,
            },
            FieldSpec {
                name: "with_cam",
                label: "Готов(а) к созвону с камерой",
                kind: FieldKind::Checkbox,
                role: FieldRole::ChoiceGroup,
                max_len: 0,
            },
            FieldSpec {
                name: "with_voice",
                label: "Готов(а) к голосовому созвону",
                kind: FieldKind::Checkbox,
                role: FieldRole::ChoiceGroup,
                max_len: 0,
            },
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
}

/// Current contents of every field in a schema.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: FormSchema,
    values: Vec<FieldValue>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(FormSchema::default())
    }
}

impl FormState {
    pub fn new(schema: FormSchema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| match field.kind {
                FieldKind::Checkbox => FieldValue::Checked(false),
                _ => FieldValue::Text(String::new()),
            })
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn value_at(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        let index = self.schema.index_of(name)?;
        match &self.values[index] {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::Checked(_) => None,
        }
    }

    pub fn is_checked(&self, name: &str) -> bool {
        self.schema
            .index_of(name)
            .is_some_and(|index| self.values[index] == FieldValue::Checked(true))
    }

    /// Replaces a text field's contents, cut to the field's maximum length.
    pub fn set_text(&mut self, name: &str, value: &str) -> DomainResult<()> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| DomainError::UnknownField(name.to_string()))?;
        let spec = &self.schema.fields()[index];
        match &mut self.values[index] {
            FieldValue::Text(text) => {
                *text = value.chars().take(spec.max_len).collect();
                Ok(())
            }
            FieldValue::Checked(_) => Err(DomainError::NotText(name.to_string())),
        }
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) -> DomainResult<()> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| DomainError::UnknownField(name.to_string()))?;
        match &mut self.values[index] {
            FieldValue::Checked(value) => {
                *value = checked;
                Ok(())
            }
            FieldValue::Text(_) => Err(DomainError::NotCheckbox(name.to_string())),
        }
    }

    /// Appends a character to the text field at `index`.
    ///
    /// Returns `false` when the field is full or not a text field.
    pub fn push_char(&mut self, index: usize, ch: char) -> bool {
        let Some(spec) = self.schema.fields().get(index) else {
            return false;
        };
        if ch == '\n' && spec.kind != FieldKind::Multiline {
            return false;
        }
        match &mut self.values[index] {
            FieldValue::Text(text) if text.chars().count() < spec.max_len => {
                text.push(ch);
                true
            }
            _ => false,
        }
    }

    pub fn pop_char(&mut self, index: usize) -> bool {
        match self.values.get_mut(index) {
            Some(FieldValue::Text(text)) => text.pop().is_some(),
            _ => false,
        }
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        match self.values.get_mut(index) {
            Some(FieldValue::Checked(value)) => {
                *value = !*value;
                true
            }
            _ => false,
        }
    }

    /// `(current, max)` character counts for a text field.
    pub fn char_count(&self, index: usize) -> Option<(usize, usize)> {
        let spec = self.schema.fields().get(index)?;
        match self.values.get(index)? {
            FieldValue::Text(text) => Some((text.chars().count(), spec.max_len)),
            FieldValue::Checked(_) => None,
        }
    }

    /// Every required field is non-blank and at least one choice is checked.
    pub fn is_complete(&self) -> bool {
        let mut filled = true;
        let mut any_choice = false;
        for (spec, value) in self.schema.fields().iter().zip(&self.values) {
            match (spec.role, value) {
                (FieldRole::Required, FieldValue::Text(text)) => filled &= !text.trim().is_empty(),
                (FieldRole::Required, FieldValue::Checked(checked)) => filled &= *checked,
                (FieldRole::ChoiceGroup, FieldValue::Checked(checked)) => any_choice |= *checked,
                _ => {}
            }
        }
        filled && any_choice
    }

    /// Snapshot of all fields: checkboxes as booleans, text trimmed.
    pub fn answers(&self) -> FormAnswers {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| {
                let json = match value {
                    FieldValue::Text(text) => Value::String(text.trim().to_string()),
                    FieldValue::Checked(checked) => Value::Bool(*checked),
                };
                (spec.name.to_string(), json)
            })
            .collect()
    }
}
