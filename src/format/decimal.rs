// Decimal digit strings with JavaScript number-to-string semantics

/// A finite non-negative number as digits: `0.d1d2... * 10^point`. Zero has no digits.
#[derive(Debug, Clone, PartialEq)]
struct Digits {
    digits: Vec<u8>,
    point: i32,
}

impl Digits {
    /// Every digit of the binary value.
    fn exact(x: f64) -> Self {
        Digits::from_exponential(&format!("{:.800e}", x))
    }

    /// The fewest digits that still read back as `x`.
    fn shortest(x: f64) -> Self {
        Digits::from_exponential(&format!("{:e}", x))
    }

    fn from_exponential(text: &str) -> Self {
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text, "0"));
        let mut digits: Vec<u8> = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        while digits.last() == Some(&0) {
            digits.pop();
        }
        let exponent: i32 = exponent.parse().unwrap_or(0);
        if digits.is_empty() {
            return Digits {
                digits,
                point: 0,
            };
        }
        Digits {
            digits,
            point: exponent + 1,
        }
    }

    /// Keep `keep` leading digits, rounding half up. A carry may add one digit and bump `point`.
    fn round(&self, keep: i32) -> Self {
        if keep < 0 {
            return Digits {
                digits: Vec::new(),
                point: self.point,
            };
        }
        let keep = keep as usize;
        let mut digits: Vec<u8> = self.digits.iter().copied().take(keep).collect();
        digits.resize(keep, 0);
        let mut point = self.point;
        if self.digits.get(keep).is_some_and(|&d| d >= 5) {
            let mut i = keep;
            loop {
                if i == 0 {
                    digits.insert(0, 1);
                    point += 1;
                    break;
                }
                i -= 1;
                if digits[i] == 9 {
                    digits[i] = 0;
                } else {
                    digits[i] += 1;
                    break;
                }
            }
        }
        Digits { digits, point }
    }

    /// Round to `count` significant digits, keeping exactly `count`.
    fn significant(&self, count: usize) -> Self {
        let mut rounded = self.round(count as i32);
        rounded.digits.truncate(count);
        rounded
    }

    fn text(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + d)).collect()
    }
}

fn zeros(count: usize) -> String {
    "0".repeat(count)
}

fn exponent_suffix(exponent: i32) -> String {
    if exponent < 0 {
        format!("e-{}", -exponent)
    } else {
        format!("e+{}", exponent)
    }
}

fn special(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("NaN".to_string())
    } else if x.is_infinite() {
        Some(if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        None
    }
}

/// `String(x)` for a JavaScript number.
pub fn js_string(x: f64) -> String {
    if let Some(s) = special(x) {
        return s;
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x < 0.0 {
        return format!("-{}", js_string(-x));
    }
    let d = Digits::shortest(x);
    let digits = d.text();
    let k = digits.len() as i32;
    let n = d.point;
    if k <= n && n <= 21 {
        format!("{}{}", digits, zeros((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", zeros((-n) as usize), digits)
    } else {
        let mantissa = if k == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        format!("{}{}", mantissa, exponent_suffix(n - 1))
    }
}

/// `x.toFixed(precision)`
pub fn to_fixed(x: f64, precision: usize) -> String {
    if special(x).is_some() || x.abs() >= 1e21 {
        return js_string(x);
    }
    if x < 0.0 {
        return format!("-{}", to_fixed(-x, precision));
    }
    let rounded = if x == 0.0 {
        Digits {
            digits: Vec::new(),
            point: 0,
        }
    } else {
        let d = Digits::exact(x);
        d.round(d.point + precision as i32)
    };
    let mut integer = rounded.text();
    if integer.is_empty() {
        integer.push('0');
    }
    if precision == 0 {
        return integer;
    }
    if integer.len() <= precision {
        integer = format!("{}{}", zeros(precision + 1 - integer.len()), integer);
    }
    let split = integer.len() - precision;
    format!("{}.{}", &integer[..split], &integer[split..])
}

/// `x.toExponential(precision)`, or `x.toExponential()` when `precision` is `None`.
pub fn to_exponential(x: f64, precision: Option<usize>) -> String {
    if let Some(s) = special(x) {
        return s;
    }
    if x < 0.0 {
        return format!("-{}", to_exponential(-x, precision));
    }
    if x == 0.0 {
        let fraction = match precision {
            Some(p) if p > 0 => format!(".{}", zeros(p)),
            _ => String::new(),
        };
        return format!("0{}e+0", fraction);
    }
    let d = match precision {
        Some(p) => Digits::exact(x).significant(p + 1),
        None => Digits::shortest(x),
    };
    let digits = d.text();
    let mantissa = if digits.len() > 1 {
        format!("{}.{}", &digits[..1], &digits[1..])
    } else {
        digits
    };
    format!("{}{}", mantissa, exponent_suffix(d.point - 1))
}

/// `x.toPrecision(precision)`
pub fn to_precision(x: f64, precision: usize) -> String {
    if let Some(s) = special(x) {
        return s;
    }
    let precision = precision.max(1);
    if x < 0.0 {
        return format!("-{}", to_precision(-x, precision));
    }
    if x == 0.0 {
        return if precision > 1 {
            format!("0.{}", zeros(precision - 1))
        } else {
            "0".to_string()
        };
    }
    let d = Digits::exact(x).significant(precision);
    let digits = d.text();
    let e = d.point - 1;
    let p = precision as i32;
    if e < -6 || e >= p {
        let mantissa = if precision > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits
        };
        format!("{}{}", mantissa, exponent_suffix(e))
    } else if e == p - 1 {
        digits
    } else if e >= 0 {
        let split = (e + 1) as usize;
        format!("{}.{}", &digits[..split], &digits[split..])
    } else {
        format!("0.{}{}", zeros((-(e + 1)) as usize), digits)
    }
}

/// `Math.round(x)` printed in base 10, without exponent notation for huge values.
pub fn decimal_integer(x: f64) -> String {
    let r = (x + 0.5).floor();
    if special(r).is_some() || r.abs() < 1e21 {
        return js_string(r);
    }
    let d = Digits::exact(r.abs());
    let sign = if r < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, d.text(), zeros((d.point as usize).saturating_sub(d.digits.len())))
}

/// `Math.round(x).toString(radix)` for radix 2, 8 and 16.
pub fn radix_integer(x: f64, radix: u32) -> String {
    let r = (x + 0.5).floor();
    if let Some(s) = special(r) {
        return s;
    }
    let magnitude = r.abs() as u128;
    let body = match radix {
        2 => format!("{:b}", magnitude),
        8 => format!("{:o}", magnitude),
        _ => format!("{:x}", magnitude),
    };
    if r < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Significant digits and decimal exponent of `x`, as `toExponential` would print them.
///
/// `precision` counts significant digits; zero means as many as needed.
pub fn decimal_parts(x: f64, precision: usize) -> Option<(String, i32)> {
    if !x.is_finite() {
        return None;
    }
    let text = if precision > 0 {
        to_exponential(x, Some(precision - 1))
    } else {
        to_exponential(x, None)
    };
    let (coefficient, exponent) = text.split_once('e')?;
    let coefficient = coefficient.replacen('.', "", 1);
    Some((coefficient, exponent.parse().ok()?))
}

/// Round to `precision` significant digits, always in fixed notation.
pub fn rounded(x: f64, precision: usize) -> String {
    let Some((coefficient, exponent)) = decimal_parts(x, precision) else {
        return js_string(x);
    };
    let len = coefficient.len() as i32;
    if exponent < 0 {
        format!("0.{}{}", zeros((-exponent - 1) as usize), coefficient)
    } else if len > exponent + 1 {
        let split = (exponent + 1) as usize;
        format!("{}.{}", &coefficient[..split], &coefficient[split..])
    } else {
        format!("{}{}", coefficient, zeros((exponent - len + 1) as usize))
    }
}

pub const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Scale into the nearest SI unit, returning the digits and the chosen prefix.
pub fn prefix_auto(x: f64, precision: usize) -> (String, &'static str) {
    let Some((coefficient, exponent)) = decimal_parts(x, precision) else {
        return (js_string(x), "");
    };
    let group = (exponent as f64 / 3.0).floor().clamp(-8.0, 8.0) as i32;
    let prefix = SI_PREFIXES[(8 + group) as usize];
    let i = exponent - group * 3 + 1;
    let n = coefficient.len() as i32;
    let digits = if i == n {
        coefficient
    } else if i > n {
        format!("{}{}", coefficient, zeros((i - n) as usize))
    } else if i > 0 {
        let split = i as usize;
        format!("{}.{}", &coefficient[..split], &coefficient[split..])
    } else {
        let tail = decimal_parts(x, (precision as i32 + i - 1).max(0) as usize)
            .map(|(c, _)| c)
            .unwrap_or_default();
        format!("0.{}{}", zeros((-i) as usize), tail)
    };
    (digits, prefix)
}

/// Drop insignificant trailing zeros after the decimal point.
pub fn trim(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut i0: isize = -1;
    let mut i1: isize = 0;
    for (i, &c) in chars.iter().enumerate().skip(1) {
        match c {
            '.' => {
                i0 = i as isize;
                i1 = i as isize;
            }
            '0' => {
                if i0 == 0 {
                    i0 = i as isize;
                }
                i1 = i as isize;
            }
            '1'..='9' => {
                if i0 > 0 {
                    i0 = 0;
                }
            }
            _ => break,
        }
    }
    if i0 > 0 {
        let head: String = chars[..i0 as usize].iter().collect();
        let tail: String = chars[(i1 + 1) as usize..].iter().collect();
        format!("{}{}", head, tail)
    } else {
        s.to_string()
    }
}

/// Insert thousands separators, emitting at most `width` characters from the right.
pub fn group(value: &str, width: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut i = chars.len();
    let mut parts = Vec::new();
    let mut length = 0usize;
    while i > 0 {
        let mut g = 3;
        if width.saturating_sub(length) < g + 1 {
            g = width.saturating_sub(length).max(1);
        }
        let start = i.saturating_sub(g);
        parts.push(chars[start..i].iter().collect::<String>());
        i = start;
        length += g + 1;
        if length > width {
            break;
        }
    }
    parts.reverse();
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string() {
        assert_eq!(js_string(42.0), "42");
        assert_eq!(js_string(-1.5), "-1.5");
        assert_eq!(js_string(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(js_string(1e21), "1e+21");
        assert_eq!(js_string(123e-9), "1.23e-7");
        assert_eq!(js_string(0.000001), "0.000001");
        assert_eq!(js_string(-0.0), "0");
        assert_eq!(js_string(f64::NAN), "NaN");
        assert_eq!(js_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_to_fixed_rounds_half_up() {
        assert_eq!(to_fixed(42.0, 1), "42.0");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.25, 1), "0.3");
        // 1.005 is stored just below the half
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.0004, 2), "0.00");
        assert_eq!(to_fixed(9.99, 1), "10.0");
        assert_eq!(to_fixed(0.6, 0), "1");
        assert_eq!(to_fixed(-1.25, 1), "-1.3");
    }

    #[test]
    fn test_to_exponential() {
        assert_eq!(to_exponential(1500.0, None), "1.5e+3");
        assert_eq!(to_exponential(1500.0, Some(2)), "1.50e+3");
        assert_eq!(to_exponential(25000.0, Some(0)), "3e+4");
        assert_eq!(to_exponential(0.0, Some(1)), "0.0e+0");
        assert_eq!(to_exponential(9.96, Some(1)), "1.0e+1");
    }

    #[test]
    fn test_to_precision() {
        assert_eq!(to_precision(123.456, 4), "123.5");
        assert_eq!(to_precision(0.000123, 2), "0.00012");
        assert_eq!(to_precision(123456.0, 2), "1.2e+5");
        assert_eq!(to_precision(1e-7, 1), "1e-7");
        assert_eq!(to_precision(0.0, 3), "0.00");
        assert_eq!(to_precision(42.0, 12), "42.0000000000");
    }

    #[test]
    fn test_integers() {
        assert_eq!(decimal_integer(41.5), "42");
        assert_eq!(decimal_integer(1e22), "10000000000000000000000");
        assert_eq!(radix_integer(255.0, 16), "ff");
        assert_eq!(radix_integer(5.0, 2), "101");
        assert_eq!(radix_integer(8.0, 8), "10");
    }

    #[test]
    fn test_rounded() {
        assert_eq!(rounded(1234.5, 2), "1200");
        assert_eq!(rounded(0.01234, 2), "0.012");
        assert_eq!(rounded(12.345, 3), "12.3");
    }

    #[test]
    fn test_prefix_auto() {
        assert_eq!(prefix_auto(1500.0, 6), ("1.50000".to_string(), "k"));
        assert_eq!(prefix_auto(0.00042, 2), ("420".to_string(), "µ"));
        assert_eq!(prefix_auto(42.0, 2), ("42".to_string(), ""));
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim("1.500"), "1.5");
        assert_eq!(trim("1.000"), "1");
        assert_eq!(trim("1.50e+3"), "1.5e+3");
        assert_eq!(trim("100"), "100");
    }

    #[test]
    fn test_group() {
        assert_eq!(group("1234567", usize::MAX), "1,234,567");
        assert_eq!(group("123", usize::MAX), "123");
        assert_eq!(group("0001234", 7), "001,234");
    }
}
