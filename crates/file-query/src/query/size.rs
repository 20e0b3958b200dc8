//! Size literal parsing for `size:` and `bigger:` filters.

use crate::error::{FileQueryError, Result};

const KIB: u64 = 1024;

/// Parses a byte count such as `200`, `10kb` or `1.5M` into bytes.
///
/// Units are binary and case-insensitive. Values beyond `u64::MAX`
/// saturate.
pub fn parse_size_literal(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FileQueryError::QueryParse(
            "size: expected a number".to_string(),
        ));
    }

    let split = trimmed
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || *ch == '.'))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    let (number_part, unit_part) = trimmed.split_at(split);
    if number_part.is_empty() {
        return Err(FileQueryError::QueryParse(format!(
            "size: expected a numeric value in {raw:?}"
        )));
    }

    let multiplier = size_unit_multiplier(unit_part)?;

    // Whole numbers stay exact; decimals go through f64.
    if let Ok(whole) = number_part.parse::<u64>() {
        return Ok(whole.saturating_mul(multiplier));
    }

    let value: f64 = number_part.parse().map_err(|_| {
        FileQueryError::QueryParse(format!("size: failed to parse number in {raw:?}"))
    })?;
    let bytes = (value * multiplier as f64).round();
    if !bytes.is_finite() || bytes < 0.0 {
        return Err(FileQueryError::QueryParse(format!(
            "size: value {raw:?} is out of range"
        )));
    }

    if bytes >= u64::MAX as f64 {
        Ok(u64::MAX)
    } else {
        Ok(bytes as u64)
    }
}

fn size_unit_multiplier(unit: &str) -> Result<u64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" | "byte" | "bytes" => Ok(1),
        "k" | "kb" | "kib" => Ok(KIB),
        "m" | "mb" | "mib" => Ok(KIB.pow(2)),
        "g" | "gb" | "gib" => Ok(KIB.pow(3)),
        "t" | "tb" | "tib" => Ok(KIB.pow(4)),
        "p" | "pb" | "pib" => Ok(KIB.pow(5)),
        _ => Err(FileQueryError::QueryParse(format!(
            "unknown size unit: {unit}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_bytes() {
        assert_eq!(parse_size_literal("0").unwrap(), 0);
        assert_eq!(parse_size_literal("200").unwrap(), 200);
        assert_eq!(parse_size_literal(" 50b ").unwrap(), 50);
    }

    #[test]
    fn binary_units() {
        assert_eq!(parse_size_literal("1k").unwrap(), 1024);
        assert_eq!(parse_size_literal("10KB").unwrap(), 10 * 1024);
        assert_eq!(parse_size_literal("2mib").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_size_literal("1G").unwrap(), 1024 * 1024 * 1024);
    }

    #[test]
    fn decimal_values_round() {
        assert_eq!(parse_size_literal("1.5k").unwrap(), 1536);
        assert_eq!(parse_size_literal("0.5").unwrap(), 1);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_size_literal("99999999999p").unwrap(), u64::MAX);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_size_literal("").is_err());
        assert!(parse_size_literal("kb").is_err());
        assert!(parse_size_literal("10 parsecs").is_err());
        assert!(parse_size_literal("1.2.3").is_err());
    }
}
