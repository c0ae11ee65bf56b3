/// Insert thousands separators into a whole-dollar amount
fn group_thousands(dollars: u64) -> String {
    let digits = dollars.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a currency value
pub fn format_currency(value: f64) -> String {
    let cents_total = (value.abs() * 100.0).round() as u64;
    let dollars = group_thousands(cents_total / 100);
    let cents = cents_total % 100;

    if value >= 0.0 || cents_total == 0 {
        format!("${dollars}.{cents:02}")
    } else {
        format!("-${dollars}.{cents:02}")
    }
}

/// Format a currency value without cents (shorter format for tight columns)
pub fn format_currency_short(value: f64) -> String {
    let dollars = value.abs().round() as u64;
    let formatted = group_thousands(dollars);

    if value >= 0.0 || dollars == 0 {
        format!("${formatted}")
    } else {
        format!("-${formatted}")
    }
}

/// Format a fraction as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Histogram bucket label: leading group plus two truncated digits and a
/// scale suffix ($950, $12.34K, $1.24M, $1.33B)
pub fn format_bucket_label(value: f64) -> String {
    const SCALES: [&str; 5] = ["", "K", "M", "B", "T"];

    let dollars = value.abs().round() as u64;
    let sign = if value < 0.0 && dollars > 0 { "-" } else { "" };
    let grouped = group_thousands(dollars);
    let groups: Vec<&str> = grouped.split(',').collect();

    let mut label = format!("{sign}${}", groups[0]);
    if let Some(next) = groups.get(1) {
        label.push('.');
        label.push_str(&next[..2]);
    }
    label.push_str(SCALES[(groups.len() - 1).min(SCALES.len() - 1)]);
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-42.5), "-$42.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_currency_short() {
        assert_eq!(format_currency_short(1_500.4), "$1,500");
        assert_eq!(format_currency_short(-2_000_000.0), "-$2,000,000");
        assert_eq!(format_currency_short(-0.2), "$0");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.05), "5.00%");
        assert_eq!(format_percentage(0.1234), "12.34%");
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(format_bucket_label(950.0), "$950");
        assert_eq!(format_bucket_label(12_345.0), "$12.34K");
        assert_eq!(format_bucket_label(1_249_999.0), "$1.24M");
        assert_eq!(format_bucket_label(1_330_000_000.0), "$1.33B");
        assert_eq!(format_bucket_label(-5_678.0), "-$5.67K");
        assert_eq!(format_bucket_label(0.0), "$0");
    }
}
