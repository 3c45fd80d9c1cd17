use crate::models::FieldValue;

/// Coerce free text into a typed value.
///
/// Blank text becomes `0`, integers become `Int`, other finite numbers go
/// through `FieldValue::from_number`, anything else is kept as trimmed text.
pub fn coerce_text(text: &str) -> FieldValue {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return FieldValue::ZERO;
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return FieldValue::Int(value);
    }

    // f64 parsing accepts "inf" and "NaN"; those stay text.
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => FieldValue::from_number(value),
        _ => FieldValue::Text(trimmed.to_string()),
    }
}

/// Strict integer coercion for vote counts: anything that is not an integer is `0`.
pub fn coerce_count(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}
