//! Element contract for runtime containers
//!
//! A container can hold any type that can be copied, freed, compared and
//! rendered as text. In Rust those map to `Clone`, `Drop`, `PartialEq` and
//! `Element::to_text`; the first three come from the type itself, so the
//! trait only adds the text rendering.
//!
//! Number rendering follows the runtime's numeric text rules: integers print
//! in decimal, floats print with six decimals and trailing zeros trimmed
//! (keeping one digit after the point), so `2.0` renders as `2.0` and
//! `0.1 + 0.2` as `0.3`.

/// Capability set required of container elements
pub trait Element: Clone + PartialEq {
    /// Text used by `join` and `str`
    fn to_text(&self) -> String;
}

macro_rules! impl_element_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_element_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char, String);

impl Element for f32 {
    fn to_text(&self) -> String {
        float_text(*self as f64)
    }
}

impl Element for f64 {
    fn to_text(&self) -> String {
        float_text(*self)
    }
}

/// Render a float with six decimals, trimming trailing zeros
pub fn float_text(value: f64) -> String {
    let mut s = format!("{:.6}", value);
    if !s.contains('.') {
        // inf / NaN
        return s;
    }
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_text() {
        assert_eq!(42i32.to_text(), "42");
        assert_eq!((-7i64).to_text(), "-7");
        assert_eq!(255u8.to_text(), "255");
    }

    #[test]
    fn test_bool_and_char_text() {
        assert_eq!(true.to_text(), "true");
        assert_eq!('x'.to_text(), "x");
    }

    #[test]
    fn test_string_text_is_verbatim() {
        assert_eq!("a b".to_string().to_text(), "a b");
    }

    #[test]
    fn test_float_text_trims_zeros() {
        assert_eq!(float_text(1.5), "1.5");
        assert_eq!(float_text(2.0), "2.0");
        assert_eq!(float_text(0.1 + 0.2), "0.3");
        assert_eq!(float_text(-3.25), "-3.25");
        assert_eq!(float_text(1.0 / 3.0), "0.333333");
        assert_eq!(2.5f32.to_text(), "2.5");
    }

    #[test]
    fn test_float_text_non_finite() {
        assert_eq!(float_text(f64::INFINITY), "inf");
        assert_eq!(float_text(f64::NEG_INFINITY), "-inf");
    }
}
