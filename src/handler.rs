//! Request Handler
//!
//! Transport-facing front of a `MemeService`: validates, logs, delegates.

use crate::pipeline::{MemeService, RenderError, RenderRequest, RenderResult};
use crate::templates::TemplateSummary;
use crate::validation::{ValidationResult, Validator, ViolationSeverity};

pub struct MemeHandler<S> {
    service: S,
    validator: Validator,
}

impl<S: MemeService> MemeHandler<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            validator: Validator::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn generate_meme(&self, request: RenderRequest) -> RenderResult {
        tracing::info!(template_id = %request.template_id, "received meme generation request");

        let validation = self.validate(&request);
        if !validation.valid {
            let err = RenderError::InvalidRequest(validation.error_message());
            tracing::warn!(error = %err, "rejecting request");
            return RenderResult::failure(err.to_string());
        }

        self.service.generate(request)
    }

    pub fn list_templates(&self, category: Option<&str>) -> Vec<TemplateSummary> {
        tracing::info!(category = category.unwrap_or(""), "received list templates request");
        self.service.list_templates(category)
    }

    fn validate(&self, request: &RenderRequest) -> ValidationResult {
        let template = self.service.template(&request.template_id);
        let result = self.validator.validate(request, template.as_ref());
        for v in &result.violations {
            match v.severity {
                ViolationSeverity::Error => tracing::warn!(rule = %v.rule, message = %v.message, "violation"),
                ViolationSeverity::Warning => tracing::info!(rule = %v.rule, message = %v.message, "violation"),
                ViolationSeverity::Info => tracing::debug!(rule = %v.rule, message = %v.message, "violation"),
            }
        }
        result
    }
}
