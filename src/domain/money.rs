use std::fmt;

/// Money is stored as whole currency units (the default currency, IQD, has no
/// minor unit in practice). Balances are signed, recorded amounts are not.
pub type Amount = i64;

/// Format an amount with thousands separators.
/// Example: 1500000 -> "1,500,000", -1234 -> "-1,234"
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}

/// Parse a whole-unit amount. Grouping characters (`,` and `_`) are ignored.
/// Example: "1,500" -> 1500, "-200" -> -200
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let digits: String = digits.chars().filter(|c| *c != ',' && *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }

    let value: Amount = digits.parse().map_err(|_| ParseAmountError::OutOfRange)?;
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
