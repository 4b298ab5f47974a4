use rust_decimal::Decimal;

/// Input rejected before any write was attempted. Always names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn non_negative_amount(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(super::money::normalize(value))
}

pub(crate) fn positive_amount(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, ValidationError> {
    let normalized = super::money::normalize(value);
    if normalized <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("name", "  Ana ").expect("valid"), "Ana");
        let err = required_text("name", "   ").expect_err("blank rejected");
        assert_eq!(err.field, "name");
        assert_eq!(err.to_string(), "name: is required");
    }

    #[test]
    fn positive_amount_rejects_values_that_round_to_zero() {
        let err = positive_amount("amount", Decimal::new(4, 3)).expect_err("0.004 rounds to 0");
        assert_eq!(err.field, "amount");
        assert_eq!(
            positive_amount("amount", Decimal::new(12345, 3)).expect("valid"),
            Decimal::new(1235, 2)
        );
    }

    #[test]
    fn non_negative_amount_accepts_zero() {
        assert_eq!(
            non_negative_amount("deposit", Decimal::ZERO).expect("zero ok"),
            Decimal::ZERO
        );
        assert!(non_negative_amount("deposit", Decimal::new(-1, 2)).is_err());
    }
}
