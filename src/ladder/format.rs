/// Prices are whole cents on a binary contract, e.g. 63 -> "63¢".
pub fn price(cents: i64) -> String {
    format!("{cents}¢")
}

/// Thousands-separated contract count, e.g. 1234567 -> "1,234,567".
pub fn quantity(qty: u64) -> String {
    let digits = qty.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_render_as_cents() {
        assert_eq!(price(63), "63¢");
        assert_eq!(price(1), "1¢");
    }

    #[test]
    fn quantities_get_thousands_separators() {
        assert_eq!(quantity(0), "0");
        assert_eq!(quantity(999), "999");
        assert_eq!(quantity(1_000), "1,000");
        assert_eq!(quantity(1_234_567), "1,234,567");
    }
}
