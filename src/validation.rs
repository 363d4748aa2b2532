// Validation utilities module
// Custom field rules and flattening of validator errors into field messages

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::error::FieldMessage;

/// Validates that a required text field is not blank
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Field is required".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Largest price a NUMERIC(12,2) column holds
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Validates that price is strictly positive, fits the stored precision
/// and has at most two decimal places
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    let (code, message) = if price.is_sign_negative() || price.is_zero() {
        ("price_must_be_positive", "Price must be positive")
    } else if *price > max_price() {
        ("price_too_large", "Price must not exceed 9999999999.99")
    } else if price.normalize().scale() > 2 {
        ("price_scale", "Price must have at most 2 decimal places")
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    Err(err)
}

/// Flattens validator errors into one message per failed rule,
/// ordered by field name so responses are deterministic
pub fn field_messages(errors: &ValidationErrors) -> Vec<FieldMessage> {
    let mut messages: Vec<FieldMessage> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                FieldMessage::new(field, message)
            })
        })
        .collect();

    messages.sort_by(|a, b| a.field_name.cmp(&b.field_name).then(a.message.cmp(&b.message)));
    messages
}
