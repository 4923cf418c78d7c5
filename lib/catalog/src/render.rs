//! Text template for catalog records
//!
//! The rendered text is the only thing the embedder sees, and it feeds the
//! cache fingerprint. Any change here changes every fingerprint and forces a
//! recompute on the next start.

use crate::record::CarRecord;

const MISSING: &str = "n/a";

/// Render a record into its descriptive text
pub fn render_text(record: &CarRecord) -> String {
    format!(
        "{} is from year {} with an estimated current cost of {}. \
         It is estimated that in 2027 the cost will be {}. \
         It has {} seats. \
         It is a {} type of car. \
         This is a {} {} {}. \
         It has a {} engine with {} cylinders, {} horsepower, and gets {} MPG combined. \
         The MSRP is {}.",
        record.hack_id,
        record.year,
        currency(record.estimated_current_cost),
        currency(record.expected_value_2027),
        number(record.seats),
        record.body_type,
        record.make,
        record.model,
        record.trim,
        record.engine_type,
        number(record.cylinders),
        number(record.horsepower_hp),
        number(record.combined_mpg),
        currency(Some(record.msrp)),
    )
}

fn currency(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${:.2}", v),
        _ => MISSING.to_string(),
    }
}

/// Integral values print without a fractional part
fn number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
            format!("{}", v as i64)
        }
        Some(v) if v.is_finite() => format!("{}", v),
        _ => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camry() -> CarRecord {
        CarRecord {
            hack_id: "2025-toyota-camry-le".to_string(),
            year: 2025,
            estimated_current_cost: Some(28400.0),
            expected_value_2027: Some(20448.0),
            msrp: 28400.0,
            seats: Some(5.0),
            body_type: "sedan".to_string(),
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            trim: "LE".to_string(),
            engine_type: "hybrid".to_string(),
            cylinders: Some(4.0),
            horsepower_hp: Some(225.0),
            combined_mpg: Some(51.5),
        }
    }

    #[test]
    fn test_render_template() {
        let text = render_text(&camry());
        assert_eq!(
            text,
            "2025-toyota-camry-le is from year 2025 with an estimated current cost of $28400.00. \
             It is estimated that in 2027 the cost will be $20448.00. It has 5 seats. \
             It is a sedan type of car. This is a Toyota Camry LE. \
             It has a hybrid engine with 4 cylinders, 225 horsepower, and gets 51.5 MPG combined. \
             The MSRP is $28400.00."
        );
    }

    #[test]
    fn test_currency_two_decimals() {
        assert_eq!(currency(Some(23856.123)), "$23856.12");
        assert_eq!(currency(Some(0.5)), "$0.50");
        assert_eq!(currency(None), "n/a");
    }

    #[test]
    fn test_missing_estimates() {
        let mut record = camry();
        record.estimated_current_cost = None;
        record.cylinders = None;
        let text = render_text(&record);
        assert!(text.contains("estimated current cost of n/a."));
        assert!(text.contains("engine with n/a cylinders"));
    }

    #[test]
    fn test_render_is_stable() {
        assert_eq!(render_text(&camry()), render_text(&camry()));
    }
}
