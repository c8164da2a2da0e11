// Parser for [[fill]align][sign][symbol][0][width][,][.precision][~][type]

use nom::{
    branch::alt,
    character::complete::{anychar, char, digit1, one_of, satisfy},
    combinator::{eof, map, map_res, opt},
    sequence::{pair, preceded},
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Right,
    Center,
    /// Padding between the sign and the digits
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Self {
        match c {
            '<' => Align::Left,
            '^' => Align::Center,
            '=' => Align::AfterSign,
            _ => Align::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    /// Minus for negatives, nothing for positives
    #[default]
    Minus,
    Plus,
    /// Parentheses around negatives
    Paren,
    Space,
}

impl Sign {
    fn from_char(c: char) -> Self {
        match c {
            '+' => Sign::Plus,
            '(' => Sign::Paren,
            ' ' => Sign::Space,
            _ => Sign::Minus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Currency,
    /// `0b`, `0o` or `0x` for binary, octal and hex types
    Radix,
}

/// A parsed specifier, before type aliases and defaults are applied
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpecifier {
    pub fill: char,
    pub align: Align,
    pub sign: Sign,
    pub symbol: Option<Symbol>,
    pub zero: bool,
    pub width: Option<usize>,
    pub comma: bool,
    pub precision: Option<usize>,
    pub trim: bool,
    pub kind: Option<char>,
}

impl Default for FormatSpecifier {
    fn default() -> Self {
        FormatSpecifier {
            fill: ' ',
            align: Align::Right,
            sign: Sign::Minus,
            symbol: None,
            zero: false,
            width: None,
            comma: false,
            precision: None,
            trim: false,
            kind: None,
        }
    }
}

fn align(input: &str) -> IResult<&str, Align> {
    map(one_of("<>=^"), Align::from_char)(input)
}

fn fill_align(input: &str) -> IResult<&str, (Option<char>, Align)> {
    alt((
        map(pair(anychar, align), |(fill, a)| (Some(fill), a)),
        map(align, |a| (None, a)),
    ))(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>())(input)
}

pub fn specifier(input: &str) -> IResult<&str, FormatSpecifier> {
    let (input, fill_align) = opt(fill_align)(input)?;
    let (input, sign) = opt(map(one_of("+-( "), Sign::from_char))(input)?;
    let (input, symbol) = opt(one_of("$#"))(input)?;
    let (input, zero) = opt(char('0'))(input)?;
    let (input, width) = opt(number)(input)?;
    let (input, comma) = opt(char(','))(input)?;
    let (input, precision) = opt(preceded(char('.'), number))(input)?;
    let (input, trim) = opt(char('~'))(input)?;
    let (input, kind) = opt(satisfy(|c| c.is_ascii_alphabetic() || c == '%'))(input)?;
    let (input, _) = eof(input)?;

    let defaults = FormatSpecifier::default();
    let (fill, align) = match fill_align {
        Some((fill, align)) => (fill.unwrap_or(defaults.fill), align),
        None => (defaults.fill, defaults.align),
    };

    Ok((
        input,
        FormatSpecifier {
            fill,
            align,
            sign: sign.unwrap_or_default(),
            symbol: symbol.map(|c| if c == '$' { Symbol::Currency } else { Symbol::Radix }),
            zero: zero.is_some(),
            width,
            comma: comma.is_some(),
            precision,
            trim: trim.is_some(),
            kind,
        },
    ))
}
