//! printf-style value formatting for the drain.
//!
//! The format string is parsed once at setup into a [`ValueFormat`]: literal
//! text around exactly one conversion. Rendering follows C `printf`
//! semantics for the supported conversions (`d i u o x X f F e E g G c`),
//! including `inf`/`nan`, two-digit exponents and `%g` trailing-zero removal.
//! Length modifiers (`h`, `hh`, `l`, `ll`, `L`, `q`, `j`, `z`, `t`) are
//! accepted and ignored, since every value is widened before formatting.
//!
//! Integer conversions applied to float values truncate toward zero;
//! float conversions applied to integer values convert exactly. Unsigned
//! conversions of negative values use 32-bit two's complement, as a C `int`
//! argument would.

use crate::error::{LogResult, LoggerError};
use crate::kind::Scalar;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conv {
    Signed,
    Unsigned,
    Octal,
    Hex { upper: bool },
    Fixed { upper: bool },
    Exp { upper: bool },
    General { upper: bool },
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directive {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    conv: Conv,
}

/// A parsed single-value format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormat {
    source: String,
    prefix: String,
    suffix: String,
    directive: Directive,
}

impl ValueFormat {
    /// Parse a printf-style format string with exactly one value conversion.
    pub fn parse(source: &str) -> LogResult<Self> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut directive = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                if directive.is_some() {
                    suffix.push(c);
                } else {
                    prefix.push(c);
                }
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                if directive.is_some() {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }
            if directive.is_some() {
                return Err(LoggerError::config(format!(
                    "Format string {:?} must contain exactly one conversion",
                    source
                )));
            }
            directive = Some(parse_directive(source, &mut chars)?);
        }

        let directive = directive.ok_or_else(|| {
            LoggerError::config(format!(
                "Format string {:?} has no value conversion",
                source
            ))
        })?;
        Ok(Self {
            source: source.to_string(),
            prefix,
            suffix,
            directive,
        })
    }

    /// The format string as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the conversion prints a float (`f F e E g G`).
    pub fn is_float_conversion(&self) -> bool {
        matches!(
            self.directive.conv,
            Conv::Fixed { .. } | Conv::Exp { .. } | Conv::General { .. }
        )
    }

    /// Append one formatted token to `out`.
    ///
    /// Output is bytes: `%c` writes the value's low byte as is, like C.
    pub fn render(&self, value: Scalar, out: &mut Vec<u8>) {
        out.extend_from_slice(self.prefix.as_bytes());
        let directive = &self.directive;
        match directive.conv {
            Conv::Signed => render_signed(directive, value.as_i64(), out),
            Conv::Unsigned | Conv::Octal | Conv::Hex { .. } => {
                render_unsigned(directive, as_c_unsigned(value.as_i64()), out)
            }
            Conv::Fixed { .. } | Conv::Exp { .. } | Conv::General { .. } => {
                render_float(directive, value.as_f64(), out)
            }
            Conv::Char => {
                let byte = [value.as_i64() as u8];
                pad(out, directive, "", &byte, false);
            }
        }
        out.extend_from_slice(self.suffix.as_bytes());
    }

    /// Format one value into a new byte vector.
    pub fn render_to_vec(&self, value: Scalar) -> Vec<u8> {
        let mut out = Vec::new();
        self.render(value, &mut out);
        out
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_directive(
    source: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> LogResult<Directive> {
    let mut flags = Flags::default();
    while let Some(&c) = chars.peek() {
        match c {
            '-' => flags.left = true,
            '+' => flags.plus = true,
            ' ' => flags.space = true,
            '0' => flags.zero = true,
            '#' => flags.alt = true,
            _ => break,
        }
        chars.next();
    }

    let width = parse_number(chars).unwrap_or(0);
    let precision = if chars.peek() == Some(&'.') {
        chars.next();
        Some(parse_number(chars).unwrap_or(0))
    } else {
        None
    };

    while let Some(&c) = chars.peek() {
        if matches!(c, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't') {
            chars.next();
        } else {
            break;
        }
    }

    let conv = match chars.next() {
        Some('d') | Some('i') => Conv::Signed,
        Some('u') => Conv::Unsigned,
        Some('o') => Conv::Octal,
        Some('x') => Conv::Hex { upper: false },
        Some('X') => Conv::Hex { upper: true },
        Some('f') => Conv::Fixed { upper: false },
        Some('F') => Conv::Fixed { upper: true },
        Some('e') => Conv::Exp { upper: false },
        Some('E') => Conv::Exp { upper: true },
        Some('g') => Conv::General { upper: false },
        Some('G') => Conv::General { upper: true },
        Some('c') => Conv::Char,
        Some(other) => {
            return Err(LoggerError::config(format!(
                "Format string {:?} uses unsupported conversion '%{}'",
                source, other
            )))
        }
        None => {
            return Err(LoggerError::config(format!(
                "Format string {:?} ends inside a conversion",
                source
            )))
        }
    };

    Ok(Directive {
        flags,
        width,
        precision,
        conv,
    })
}

fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d as usize));
    }
    value
}

fn as_c_unsigned(v: i64) -> u64 {
    if v < 0 && v >= i32::MIN as i64 {
        v as i32 as u32 as u64
    } else {
        v as u64
    }
}

/// Write `sign + body` padded to the directive width.
///
/// With `zero_fill`, padding zeros go between the sign and the body.
/// Widths count bytes, as C does.
fn pad(out: &mut Vec<u8>, directive: &Directive, sign: &str, body: &[u8], zero_fill: bool) {
    let fill = directive.width.saturating_sub(sign.len() + body.len());
    if directive.flags.left {
        out.extend_from_slice(sign.as_bytes());
        out.extend_from_slice(body);
        out.resize(out.len() + fill, b' ');
    } else if zero_fill {
        out.extend_from_slice(sign.as_bytes());
        out.resize(out.len() + fill, b'0');
        out.extend_from_slice(body);
    } else {
        out.resize(out.len() + fill, b' ');
        out.extend_from_slice(sign.as_bytes());
        out.extend_from_slice(body);
    }
}

fn sign_of(directive: &Directive, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if directive.flags.plus {
        "+"
    } else if directive.flags.space {
        " "
    } else {
        ""
    }
}

fn with_min_digits(digits: String, precision: Option<usize>, zero: bool) -> String {
    match precision {
        Some(0) if zero => String::new(),
        Some(p) if digits.len() < p => {
            let mut padded = "0".repeat(p - digits.len());
            padded.push_str(&digits);
            padded
        }
        _ => digits,
    }
}

fn render_signed(directive: &Directive, v: i64, out: &mut Vec<u8>) {
    let digits = with_min_digits(v.unsigned_abs().to_string(), directive.precision, v == 0);
    let zero_fill = directive.flags.zero && !directive.flags.left && directive.precision.is_none();
    pad(out, directive, sign_of(directive, v < 0), digits.as_bytes(), zero_fill);
}

fn render_unsigned(directive: &Directive, v: u64, out: &mut Vec<u8>) {
    let (digits, prefix) = match directive.conv {
        Conv::Octal => (format!("{:o}", v), ""),
        Conv::Hex { upper: false } => (format!("{:x}", v), "0x"),
        Conv::Hex { upper: true } => (format!("{:X}", v), "0X"),
        _ => (v.to_string(), ""),
    };
    let mut digits = with_min_digits(digits, directive.precision, v == 0);
    let mut sign = "";
    if directive.flags.alt {
        match directive.conv {
            Conv::Octal if !digits.starts_with('0') => digits.insert(0, '0'),
            Conv::Hex { .. } if v != 0 => sign = prefix,
            _ => {}
        }
    }
    let zero_fill = directive.flags.zero && !directive.flags.left && directive.precision.is_none();
    pad(out, directive, sign, digits.as_bytes(), zero_fill);
}

fn render_float(directive: &Directive, v: f64, out: &mut Vec<u8>) {
    let upper = matches!(
        directive.conv,
        Conv::Fixed { upper: true } | Conv::Exp { upper: true } | Conv::General { upper: true }
    );
    let sign = sign_of(directive, v.is_sign_negative());
    let abs = v.abs();

    if !abs.is_finite() {
        let body = match (abs.is_nan(), upper) {
            (true, false) => "nan",
            (true, true) => "NAN",
            (false, false) => "inf",
            (false, true) => "INF",
        };
        pad(out, directive, sign, body.as_bytes(), false);
        return;
    }

    let precision = directive.precision.unwrap_or(6);
    let mut body = match directive.conv {
        Conv::Fixed { .. } => fixed(abs, precision, directive.flags.alt),
        Conv::Exp { .. } => exponential(abs, precision, directive.flags.alt),
        _ => general(abs, precision, directive.flags.alt),
    };
    if upper {
        body.make_ascii_uppercase();
    }
    let zero_fill = directive.flags.zero && !directive.flags.left;
    pad(out, directive, sign, body.as_bytes(), zero_fill);
}

fn fixed(abs: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{:.*}", precision, abs);
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

/// Split Rust's `1.5e3` form into mantissa and decimal exponent.
fn rust_exp(abs: f64, precision: usize) -> (String, i32) {
    let s = format!("{:.*e}", precision, abs);
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn exponential(abs: f64, precision: usize, alt: bool) -> String {
    let (mut mantissa, exp) = rust_exp(abs, precision);
    if alt && precision == 0 {
        mantissa.push('.');
    }
    with_c_exponent(mantissa, exp)
}

fn with_c_exponent(mut mantissa: String, exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    // Writing to a String cannot fail.
    let _ = write!(mantissa, "e{}{:02}", sign, exp.unsigned_abs());
    mantissa
}

fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
}

fn general(abs: f64, precision: usize, alt: bool) -> String {
    let p = precision.max(1);
    let x = if abs == 0.0 { 0 } else { rust_exp(abs, p - 1).1 };
    if (p as i32) > x && x >= -4 {
        let mut s = fixed(abs, (p as i32 - 1 - x) as usize, alt);
        if !alt {
            strip_trailing_zeros(&mut s);
        }
        s
    } else {
        let (mut mantissa, exp) = rust_exp(abs, p - 1);
        if alt {
            if !mantissa.contains('.') {
                mantissa.push('.');
            }
        } else {
            strip_trailing_zeros(&mut mantissa);
        }
        with_c_exponent(mantissa, exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn f(fmt: &str, v: f64) -> String {
        let bytes = ValueFormat::parse(fmt).unwrap().render_to_vec(Scalar::Float(v));
        String::from_utf8(bytes).unwrap()
    }

    fn i(fmt: &str, v: i64) -> String {
        let bytes = ValueFormat::parse(fmt).unwrap().render_to_vec(Scalar::Int(v));
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn fixed_matches_c() {
        assert_eq!(f("%f ", 1.0), "1.000000 ");
        assert_eq!(f("%.2f", 2.675), "2.67");
        assert_eq!(f("%8.3f", 3.14159), "   3.142");
        assert_eq!(f("%-8.3f|", 3.14159), "3.142   |");
        assert_eq!(f("%08.3f", -3.14159), "-003.142");
        assert_eq!(f("%+.1f", 2.0), "+2.0");
        assert_eq!(f("%f", -0.0), "-0.000000");
        assert_eq!(f("%#.0f", 3.0), "3.");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(f("%f", f64::INFINITY), "inf");
        assert_eq!(f("%f", f64::NEG_INFINITY), "-inf");
        assert_eq!(f("%5.1f", f64::NAN), "  nan");
        assert_eq!(f("%F", f64::INFINITY), "INF");
        assert_eq!(f("%05f", f64::INFINITY), "  inf");
    }

    #[test]
    fn exponent_matches_c() {
        assert_eq!(f("%e", 12345.678), "1.234568e+04");
        assert_eq!(f("%E", 0.0), "0.000000E+00");
        assert_eq!(f("%.2e", 1e-10), "1.00e-10");
        assert_eq!(f("%e", 1e100), "1.000000e+100");
        assert_eq!(f("%.0e", 5.0), "5e+00");
        assert_eq!(f("%#.0e", 5.0), "5.e+00");
    }

    #[test]
    fn general_matches_c() {
        assert_eq!(f("%g", 100000.0), "100000");
        assert_eq!(f("%g", 1000000.0), "1e+06");
        assert_eq!(f("%g", 0.0001), "0.0001");
        assert_eq!(f("%g", 0.00001), "1e-05");
        assert_eq!(f("%g", 3.14159), "3.14159");
        assert_eq!(f("%.3g", 3.14159), "3.14");
        assert_eq!(f("%g", 0.0), "0");
        assert_eq!(f("%#g", 1.0), "1.00000");
        assert_eq!(f("%g", 123456789.0), "1.23457e+08");
        assert_eq!(f("%G", 1e-10), "1E-10");
        assert_eq!(f("%.0g", 7.0), "7");
    }

    #[test]
    fn integers_match_c() {
        assert_eq!(i("%d", -42), "-42");
        assert_eq!(i("%5d", 42), "   42");
        assert_eq!(i("%-5d|", 42), "42   |");
        assert_eq!(i("%05d", -42), "-0042");
        assert_eq!(i("%+d", 5), "+5");
        assert_eq!(i("% d", 5), " 5");
        assert_eq!(i("%.3d", 7), "007");
        assert_eq!(i("%.0d", 0), "");
        assert_eq!(i("%05.3d", 7), "  007");
        assert_eq!(i("%ld", 1), "1");
        assert_eq!(i("%hhd", 3), "3");
    }

    #[test]
    fn unsigned_and_radix() {
        assert_eq!(i("%x", 255), "ff");
        assert_eq!(i("%#x", 255), "0xff");
        assert_eq!(i("%#X", 255), "0XFF");
        assert_eq!(i("%#x", 0), "0");
        assert_eq!(i("%o", 8), "10");
        assert_eq!(i("%#o", 8), "010");
        assert_eq!(i("%u", -1), "4294967295");
        assert_eq!(i("%u", 4_294_967_295), "4294967295");
        assert_eq!(i("%#06x", 255), "0x00ff");
    }

    #[test]
    fn cross_conversions() {
        assert_eq!(i("%f", 3), "3.000000");
        assert_eq!(f("%d", -2.9), "-2");
        assert_eq!(i("%c", 65), "A");
        assert_eq!(i("%3c", 66), "  B");
    }

    #[test]
    fn char_writes_one_raw_byte() {
        let format = ValueFormat::parse("%c").unwrap();
        assert_eq!(format.render_to_vec(Scalar::Int(200)), vec![200]);
        assert_eq!(format.render_to_vec(Scalar::Int(0x141)), vec![0x41]);
        let padded = ValueFormat::parse("[%-3c]").unwrap();
        assert_eq!(padded.render_to_vec(Scalar::Int(255)), b"[\xff  ]".to_vec());
    }

    #[test]
    fn literal_text_and_percent_escapes() {
        assert_eq!(i("%%%d%%", 5), "%5%");
        assert_eq!(i("[%d],", 5), "[5],");
        assert_eq!(f("\t%.1f", 0.5), "\t0.5");
    }

    #[test]
    fn bad_formats_are_configuration_errors() {
        for bad in ["%s", "%d %d", "abc", "", "%", "%*d", "%n", "%.2", "%p"] {
            let err = ValueFormat::parse(bad).unwrap_err();
            assert!(
                matches!(err, LoggerError::Configuration(_)),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn float_conversion_detection() {
        assert!(ValueFormat::parse("%g").unwrap().is_float_conversion());
        assert!(!ValueFormat::parse("%u").unwrap().is_float_conversion());
        assert_eq!(ValueFormat::parse("%f ").unwrap().to_string(), "%f ");
    }

    proptest! {
        #[test]
        fn fixed_round_trips_within_precision(v in -1.0e6f64..1.0e6, p in 0usize..10) {
            let text = f(&format!("%.{}f", p), v);
            let back: f64 = text.parse().unwrap();
            prop_assert!((back - v).abs() <= 0.5 * 10f64.powi(-(p as i32)) + 1e-9);
        }

        #[test]
        fn exponent_parses_back(v in -1.0e30f64..1.0e30) {
            let text = f("%.17e", v);
            let back: f64 = text.parse().unwrap();
            prop_assert_eq!(back, v);
        }

        #[test]
        fn signed_decimal_parses_back(v in any::<i32>()) {
            let text = i("%d", v as i64);
            prop_assert_eq!(text.parse::<i64>().unwrap(), v as i64);
        }
    }
}
