// File: src/render.rs
// Purpose: HTML projection of controller state (errors, validity, overlay)

use maud::{html, Markup};

use crate::controller::FormController;
use crate::field::FieldState;

/// Classes for a field wrapper given its state
pub fn field_class(state: Option<&FieldState>) -> String {
    match state.and_then(|s| s.validity.css_class()) {
        Some(class) => format!("form-group {}", class),
        None => "form-group".to_string(),
    }
}

/// Feedback markup for a form: general error banner, per-field error
/// messages with validity classes, and the success overlay.
///
/// Pure function of the controller's state.
pub fn render_feedback(controller: &FormController) -> Markup {
    html! {
        div.form-feedback data-form=(controller.form_id()) {
            @if let Some(message) = controller.general_error() {
                div.form-error.general-error role="alert" { (message) }
            }
            @for field in controller.form().tracked() {
                @let state = controller.field_state(&field.id);
                div class=(field_class(state)) data-field=(field.id) {
                    @if let Some(error) = state.and_then(|s| s.error.as_deref()) {
                        span.error-message { (error) }
                    }
                }
            }
            @if let Some(overlay) = controller.overlay() {
                div class=(if overlay.visible { "success-overlay show" } else { "success-overlay" }) {
                    div.success-message { (overlay.message) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::FormOptions;
    use crate::field::Field;
    use crate::form::FormElement;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;
    use std::time::Duration;

    fn contact() -> FormController {
        let form = FormElement::new("contact")
            .field(Field::text("name").required())
            .field(Field::email("email"));
        FormController::new(form, FormOptions::new(), Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_untouched_form() {
        let html = render_feedback(&contact()).into_string();
        assert_eq!(
            html,
            r#"<div class="form-feedback" data-form="contact"><div class="form-group" data-field="name"></div><div class="form-group" data-field="email"></div></div>"#
        );
    }

    #[test]
    fn test_errors_and_general_banner() {
        let mut c = contact();
        c.handle_input("email", "<b>@nope");
        c.submit();

        let html = render_feedback(&c).into_string();
        assert!(html.contains(r#"<div class="form-error general-error" role="alert">"#));
        assert!(html.contains(r#"<div class="form-group is-invalid" data-field="name"><span class="error-message">This field is required</span></div>"#));
        assert!(html.contains("Please enter a valid email address"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_overlay_reveal_then_dismiss() {
        let mut c = contact();
        c.handle_input("name", "Ada");
        c.submit();

        let html = render_feedback(&c).into_string();
        assert!(html.contains(r#"<div class="success-overlay">"#));
        assert!(html.contains(r#"<div class="form-group is-valid" data-field="name">"#));

        c.advance(Duration::ZERO);
        assert!(render_feedback(&c).into_string().contains("success-overlay show"));

        c.advance(Duration::from_secs(3));
        assert!(!render_feedback(&c).into_string().contains("success-overlay"));
    }
}
