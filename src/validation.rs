//! Request Validation - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Only `Error` violations reject a request; the rest are logged.

use serde::{Deserialize, Serialize};

use crate::pipeline::RenderRequest;
use crate::templates::Template;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<RequestViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// Error messages joined for a single-line response.
    pub fn error_message(&self) -> String {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub trait RequestRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, request: &RenderRequest, template: Option<&Template>) -> Vec<RequestViolation>;
}

// --- Concrete Rules ---

pub struct TemplateIdRequired;

impl RequestRule for TemplateIdRequired {
    fn name(&self) -> &'static str { "template_id_required" }

    fn validate(&self, request: &RenderRequest, _template: Option<&Template>) -> Vec<RequestViolation> {
        if request.template_id.trim().is_empty() {
            vec![RequestViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "template_id is required".to_string(),
            }]
        } else {
            vec![]
        }
    }
}

/// Flags additional text the template has no room for. Not an error: the
/// extra entries are simply not drawn.
pub struct AdditionalTextOverflow;

impl RequestRule for AdditionalTextOverflow {
    fn name(&self) -> &'static str { "additional_text_overflow" }

    fn validate(&self, request: &RenderRequest, template: Option<&Template>) -> Vec<RequestViolation> {
        let Some(template) = template else {
            return vec![];
        };
        let capacity = template.additional_capacity();
        if request.additional_text.len() > capacity {
            vec![RequestViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Info,
                message: format!(
                    "template '{}' draws {} additional field(s); {} will be ignored",
                    template.id,
                    capacity,
                    request.additional_text.len() - capacity
                ),
            }]
        } else {
            vec![]
        }
    }
}

pub struct Validator {
    rules: Vec<Box<dyn RequestRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(TemplateIdRequired),
                Box::new(AdditionalTextOverflow),
            ],
        }
    }

    /// `template` is the resolved template, if the id is known.
    pub fn validate(&self, request: &RenderRequest, template: Option<&Template>) -> ValidationResult {
        let mut result = ValidationResult {
            valid: true,
            violations: self
                .rules
                .iter()
                .flat_map(|rule| rule.validate(request, template))
                .collect(),
        };
        result.valid = !result.has_errors();
        result
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
