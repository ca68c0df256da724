use anyhow::{Context, Result};
use eggcasino_game::numbers::u64_to_f64;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse seed tokens. Accepts decimal, `0x`-prefixed hex and `a..b` ranges (exclusive).
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start)?;
            let end = parse_seed(end)?;
            seeds.extend(start..end);
        } else {
            seeds.push(parse_seed(token)?);
        }
    }
    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed '{token}'"))
    } else {
        token
            .parse::<u64>()
            .with_context(|| format!("invalid seed '{token}'"))
    }
}

/// Convert a count to `f64` for rate arithmetic.
pub fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    u64_to_f64(numerator) / u64_to_f64(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" wheel, ,slots,  plinko ");
        assert_eq!(parts, vec!["wheel", "slots", "plinko"]);
    }

    #[test]
    fn seeds_accept_hex_and_ranges() {
        let tokens = split_csv("7,0x10,3..6");
        assert_eq!(parse_seeds(&tokens).unwrap(), vec![7, 16, 3, 4, 5]);
        assert!(parse_seeds(&["banana".to_string()]).is_err());
    }

    #[test]
    fn ratio_handles_empty_denominator() {
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
        assert!(ratio(3, 0).abs() < f64::EPSILON);
    }
}
