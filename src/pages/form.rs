//! Small text-entry form model shared by the input pages.

use zeroize::Zeroizing;

#[derive(Debug, Clone)]
pub struct TextField {
    pub label: &'static str,
    pub placeholder: &'static str,
    value: Zeroizing<String>,
    /// Rendered as bullets (passwords)
    pub masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            placeholder: "",
            value: Zeroizing::new(String::new()),
            masked: false,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Zeroizing::new(value.to_string());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// What the terminal shows for this field
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: Vec<TextField>,
    pub focus: usize,
}

impl FormState {
    pub fn new(fields: Vec<TextField>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(TextField::value).unwrap_or_default()
    }

    pub fn set_value(&mut self, idx: usize, value: &str) {
        if let Some(field) = self.fields.get_mut(idx) {
            field.value = Zeroizing::new(value.to_string());
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value = Zeroizing::new(String::new());
        }
        self.focus = 0;
    }
}
