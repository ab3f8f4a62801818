//! Input validation helpers shared by the ledger and the API layer.

use validator::Validate;

use crate::error::CoreError;
use crate::types::Points;

/// Default stock for a newly created reward when none is supplied.
pub const DEFAULT_REWARD_STOCK: i32 = 999;

/// Largest number of points a single award, deduction, achievement or
/// reward may move.
pub const MAX_AWARD: Points = 1_000_000;

/// Run `validator` derive rules and flatten any failures into a
/// [`CoreError::Validation`] message.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                format!("{field}: {}", codes.join(", "))
            })
            .collect();
        fields.sort();
        CoreError::Validation(fields.join("; "))
    })
}

/// Validate a manual point award or deduction.
///
/// The amount must be non-zero, at most [`MAX_AWARD`] in either direction,
/// and the reason must not be blank.
pub fn validate_award(amount: Points, description: &str) -> Result<(), CoreError> {
    if amount == 0 {
        return Err(CoreError::Validation("amount must not be zero".into()));
    }
    if !(-MAX_AWARD..=MAX_AWARD).contains(&amount) {
        return Err(CoreError::Validation(format!(
            "amount must be between -{MAX_AWARD} and {MAX_AWARD}, got {amount}"
        )));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation("description must not be empty".into()));
    }
    Ok(())
}

/// Validate a reward stock level.
pub fn validate_stock(stock: i32) -> Result<(), CoreError> {
    if stock < 0 {
        return Err(CoreError::Validation(format!(
            "stock must be non-negative, got {stock}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1))]
        title: String,
        #[validate(range(min = 0))]
        points: i64,
    }

    #[test]
    fn valid_input_passes() {
        let s = Sample {
            title: "ok".into(),
            points: 5,
        };
        assert!(validate_input(&s).is_ok());
    }

    #[test]
    fn invalid_fields_are_listed() {
        let s = Sample {
            title: String::new(),
            points: -1,
        };
        assert_matches!(
            validate_input(&s),
            Err(CoreError::Validation(msg)) if msg.contains("points") && msg.contains("title")
        );
    }

    #[test]
    fn zero_award_rejected() {
        assert_matches!(validate_award(0, "nothing"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_description_rejected() {
        assert_matches!(validate_award(10, "   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn award_outside_bound_rejected() {
        assert!(validate_award(MAX_AWARD, "quarterly bonus").is_ok());
        assert!(validate_award(-MAX_AWARD, "clawback").is_ok());
        assert_matches!(
            validate_award(MAX_AWARD + 1, "too generous"),
            Err(CoreError::Validation(msg)) if msg.contains("amount")
        );
        assert_matches!(validate_award(i64::MIN, "overdraft"), Err(CoreError::Validation(_)));
        assert_matches!(validate_award(i64::MAX, "overflow"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn deduction_with_reason_is_valid() {
        assert!(validate_award(-50, "policy violation").is_ok());
    }

    #[test]
    fn negative_stock_rejected() {
        assert!(validate_stock(0).is_ok());
        assert_matches!(validate_stock(-1), Err(CoreError::Validation(_)));
    }
}
