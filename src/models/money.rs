//! Amount helpers
//!
//! Balances and amounts are stored as `f64`. Every amount is rounded to two
//! decimals before it takes part in arithmetic, and every balance is rounded
//! after each adjustment, so applying and undoing an adjustment is exact.

/// Round an amount to two decimal places (half away from zero)
pub fn round_amount(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an amount with thousands separators and two decimals (`1,234.50`)
pub fn format_amount(value: f64) -> String {
    let rounded = round_amount(value);
    let negative = rounded < 0.0;
    let cents = (rounded.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{:02}", if negative { "-" } else { "" }, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_amount() {
        assert_eq!(round_amount(10.006), 10.01);
        assert_eq!(round_amount(10.004), 10.0);
        assert_eq!(round_amount(-3.456), -3.46);
        assert_eq!(round_amount(0.1 + 0.2), 0.3);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(5.5), "5.50");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-987654.0), "-987,654.00");
    }
}
