use chrono::{DateTime, Utc};

/// Format a rupee amount with Indian digit grouping: ₹1,29,999.50
pub fn format_price(amount: f64) -> String {
    let negative = amount < 0.0;
    let paise = (amount.abs() * 100.0).round() as u64;
    let formatted = format!("₹{}.{:02}", group_indian(paise / 100), paise % 100);
    if negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format a gateway amount given in paise
pub fn format_paise(paise: u64) -> String {
    format!("₹{}.{:02}", group_indian(paise / 100), paise % 100)
}

/// Last three digits, then groups of two.
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Format a phone number for display
/// Normalizes Indian mobile numbers to +91 XXXXX XXXXX
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!("+91 {} {}", &digits[0..5], &digits[5..10]),
        12 if digits.starts_with("91") => format!("+91 {} {}", &digits[2..7], &digits[7..12]),
        _ => phone.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional timestamp, "-" when absent
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "₹0.00");
        assert_eq!(format_price(999.5), "₹999.50");
        assert_eq!(format_price(1299.0), "₹1,299.00");
        assert_eq!(format_price(129999.99), "₹1,29,999.99");
        assert_eq!(format_price(12345678.0), "₹1,23,45,678.00");
        assert_eq!(format_price(-50.0), "-₹50.00");
    }

    #[test]
    fn test_format_paise() {
        assert_eq!(format_paise(99900), "₹999.00");
        assert_eq!(format_paise(12999950), "₹1,29,999.50");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("9876543210"), "+91 98765 43210");
        assert_eq!(format_phone("+91-98765-43210"), "+91 98765 43210");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("चाय की पत्ती", 6), "चाय...");
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(format_date(Some(&dt)), "Jun 01, 2024");
        assert_eq!(format_date(None), "-");
    }
}
