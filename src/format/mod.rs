// Numeric label formatting

pub mod decimal;
pub mod specifier;

use anyhow::{anyhow, bail, Result};
use specifier::{Align, FormatSpecifier, Sign, Symbol};
use std::str::FromStr;

const MINUS: &str = "\u{2212}";

/// Widest padded label a specifier may ask for
pub const MAX_WIDTH: usize = 1024;

/// A compiled format specifier, ready to turn numbers into labels
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    spec: FormatSpecifier,
    kind: char,
    precision: usize,
    prefix: String,
    suffix: String,
}

impl NumberFormat {
    pub fn parse(input: &str) -> Result<Self> {
        let (_, mut spec) =
            specifier::specifier(input).map_err(|_| anyhow!("invalid format: {}", input))?;
        if spec.width.is_some_and(|w| w > MAX_WIDTH) {
            bail!("invalid format: {} (width exceeds {})", input, MAX_WIDTH);
        }

        let mut kind = spec.kind.unwrap_or('g');
        match spec.kind {
            Some('n') => {
                spec.comma = true;
                kind = 'g';
            }
            Some(k) if "%bcdefgoprsXx".contains(k) => {}
            _ => {
                // No type, or an unknown one, means `.12~g`
                spec.precision.get_or_insert(12);
                spec.trim = true;
                kind = 'g';
            }
        }

        if spec.zero || (spec.fill == '0' && spec.align == Align::AfterSign) {
            spec.zero = true;
            spec.fill = '0';
            spec.align = Align::AfterSign;
        }

        let prefix = match spec.symbol {
            Some(Symbol::Currency) => "$".to_string(),
            Some(Symbol::Radix) if "boxX".contains(kind) => format!("0{}", kind.to_ascii_lowercase()),
            _ => String::new(),
        };
        let suffix = if spec.symbol != Some(Symbol::Currency) && (kind == '%' || kind == 'p') {
            "%".to_string()
        } else {
            String::new()
        };

        let precision = match spec.precision {
            None => 6,
            Some(p) if "gprs".contains(kind) => p.clamp(1, 21),
            Some(p) => p.min(20),
        };

        Ok(NumberFormat {
            spec,
            kind,
            precision,
            prefix,
            suffix,
        })
    }

    pub fn format(&self, value: f64) -> String {
        let spec = &self.spec;
        let mut value_prefix = self.prefix.clone();
        let mut value_suffix = self.suffix.clone();
        let mut body;

        if self.kind == 'c' {
            value_suffix = format!("{}{}", decimal::js_string(value), value_suffix);
            body = String::new();
        } else {
            let mut negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
            let mut si_prefix = "";
            body = if value.is_nan() {
                "NaN".to_string()
            } else {
                let (digits, prefix) = self.digits(value.abs());
                si_prefix = prefix;
                digits
            };
            if spec.trim {
                body = decimal::trim(&body);
            }
            if negative && spec.sign != Sign::Plus && body.parse::<f64>().is_ok_and(|v| v == 0.0) {
                negative = false;
            }

            let sign = if negative {
                if spec.sign == Sign::Paren { "(" } else { MINUS }
            } else {
                match spec.sign {
                    Sign::Plus => "+",
                    Sign::Space => " ",
                    Sign::Minus | Sign::Paren => "",
                }
            };
            value_prefix = format!("{}{}", sign, value_prefix);
            let close = if negative && spec.sign == Sign::Paren { ")" } else { "" };
            value_suffix = format!("{}{}{}", si_prefix, value_suffix, close);

            if "defgprs%".contains(self.kind) {
                if let Some(i) = body.find(|c: char| !c.is_ascii_digit()) {
                    value_suffix = format!("{}{}", &body[i..], value_suffix);
                    body.truncate(i);
                }
            }
        }

        if spec.comma && !spec.zero {
            body = decimal::group(&body, usize::MAX);
        }

        let width = spec.width.unwrap_or(0);
        let length =
            value_prefix.chars().count() + body.chars().count() + value_suffix.chars().count();
        let mut padding = if length < width {
            spec.fill.to_string().repeat(width - length)
        } else {
            String::new()
        };

        if spec.comma && spec.zero {
            let group_width = if padding.is_empty() {
                usize::MAX
            } else {
                width.saturating_sub(value_suffix.chars().count())
            };
            body = decimal::group(&format!("{}{}", padding, body), group_width);
            padding.clear();
        }

        match spec.align {
            Align::Left => format!("{}{}{}{}", value_prefix, body, value_suffix, padding),
            Align::AfterSign => format!("{}{}{}{}", value_prefix, padding, body, value_suffix),
            Align::Center => {
                let pad: Vec<char> = padding.chars().collect();
                let half = pad.len() / 2;
                let left: String = pad[..half].iter().collect();
                let right: String = pad[half..].iter().collect();
                format!("{}{}{}{}{}", left, value_prefix, body, value_suffix, right)
            }
            Align::Right => format!("{}{}{}{}", padding, value_prefix, body, value_suffix),
        }
    }

    /// Digits for a non-negative value, plus the SI prefix for `s`.
    fn digits(&self, x: f64) -> (String, &'static str) {
        let p = self.precision;
        let digits = match self.kind {
            '%' => decimal::to_fixed(x * 100.0, p),
            'b' => decimal::radix_integer(x, 2),
            'o' => decimal::radix_integer(x, 8),
            'x' => decimal::radix_integer(x, 16),
            'X' => decimal::radix_integer(x, 16).to_uppercase(),
            'd' => decimal::decimal_integer(x),
            'e' => decimal::to_exponential(x, Some(p)),
            'f' => decimal::to_fixed(x, p),
            'p' => decimal::rounded(x * 100.0, p),
            'r' => decimal::rounded(x, p),
            's' => return decimal::prefix_auto(x, p),
            _ => decimal::to_precision(x, p),
        };
        (digits, "")
    }
}

impl FromStr for NumberFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NumberFormat::parse(s)
    }
}

/// Default display of a number, as a browser would print it.
pub fn raw(value: f64) -> String {
    decimal::js_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, value: f64) -> String {
        NumberFormat::parse(spec).unwrap().format(value)
    }

    #[test]
    fn test_oversized_width_is_rejected() {
        assert!(NumberFormat::parse("9999999999999999999f").is_err());
        assert!(NumberFormat::parse("999999999999").is_err());
        assert!(NumberFormat::parse("1025d").is_err());
        assert_eq!(fmt("1024d", 7.0).chars().count(), 1024);
    }

    // Fixed and general tests (5 tests)

    #[test]
    fn test_fixed_precision() {
        assert_eq!(fmt(".1f", 42.0), "42.0");
        assert_eq!(fmt(".2f", 3.14159), "3.14");
        assert_eq!(fmt(".0f", 2.5), "3");
    }

    #[test]
    fn test_empty_specifier_is_trimmed_general() {
        assert_eq!(fmt("", 42.0), "42");
        assert_eq!(fmt("", 0.1 + 0.2), "0.3");
        assert_eq!(fmt("", 1234567.0), "1234567");
    }

    #[test]
    fn test_unknown_type_aliases_general() {
        assert_eq!(fmt("q", 1.5), "1.5");
    }

    #[test]
    fn test_negative_uses_unicode_minus() {
        assert_eq!(fmt(".1f", -3.0), "\u{2212}3.0");
        assert_eq!(fmt("(.1f", -3.0), "(3.0)");
        assert_eq!(fmt("+d", 5.0), "+5");
    }

    #[test]
    fn test_negative_zero_after_rounding() {
        assert_eq!(fmt(".1f", -0.01), "0.0");
        assert_eq!(fmt("+.1f", -0.01), "\u{2212}0.0");
    }

    // Grouping, padding and symbols (6 tests)

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(fmt(",.2f", 1234567.891), "1,234,567.89");
        assert_eq!(fmt(",d", 1000.0), "1,000");
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(fmt("08.2f", 3.14159), "00003.14");
        assert_eq!(fmt("08.2f", -3.14159), "\u{2212}0003.14");
        assert_eq!(fmt("08,d", 1234.0), "0,001,234");
    }

    #[test]
    fn test_alignment() {
        assert_eq!(fmt("^7d", 42.0), "  42   ");
        assert_eq!(fmt("<5d", 42.0), "42   ");
        assert_eq!(fmt("*>5d", 42.0), "***42");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(fmt("$.2f", 5.0), "$5.00");
        assert_eq!(fmt(".0%", 0.123), "12%");
        assert_eq!(fmt(".2p", 0.1234), "12%");
    }

    #[test]
    fn test_si_prefix() {
        assert_eq!(fmt("~s", 1500.0), "1.5k");
        assert_eq!(fmt(".2s", 42e6), "42M");
        assert_eq!(fmt("s", 0.0), "0.00000");
    }

    #[test]
    fn test_radix_types() {
        assert_eq!(fmt("#x", 255.0), "0xff");
        assert_eq!(fmt("X", 255.0), "FF");
        assert_eq!(fmt("b", 5.0), "101");
        assert_eq!(fmt("e", 1500.0), "1.500000e+3");
    }

    // Errors and raw display (3 tests)

    #[test]
    fn test_invalid_specifier() {
        let err = NumberFormat::parse("not-a-format").unwrap_err();
        assert_eq!(err.to_string(), "invalid format: not-a-format");
        assert!("1.2.3".parse::<NumberFormat>().is_err());
    }

    #[test]
    fn test_nan_and_infinity() {
        assert_eq!(fmt(".1f", f64::NAN), "NaN");
        assert_eq!(fmt(".1f", f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_raw() {
        assert_eq!(raw(42.0), "42");
        assert_eq!(raw(0.5), "0.5");
        assert_eq!(raw(-12.25), "-12.25");
    }
}
