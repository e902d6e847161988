/// Convert a 0-indexed column number to letters (A=0, ..., Z=25, AA=26).
pub fn letters_from_col(mut col: usize) -> String {
    col += 1;
    let mut buf = Vec::new();
    while col > 0 {
        col -= 1;
        let rem = (col % 26) as u8;
        buf.push((b'A' + rem) as char);
        col /= 26;
    }
    buf.into_iter().rev().collect()
}

/// Format a value for display, honoring an optional fixed precision.
/// NaN renders as "NaN" in both modes.
pub fn fmt_value(value: f32, precision: Option<usize>) -> String {
    match precision {
        Some(p) if !value.is_nan() => format!("{:.*}", p, value),
        _ => format!("{}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_from_col() {
        assert_eq!(letters_from_col(0), "A");
        assert_eq!(letters_from_col(25), "Z");
        assert_eq!(letters_from_col(26), "AA");
        assert_eq!(letters_from_col(27), "AB");
        assert_eq!(letters_from_col(701), "ZZ");
        assert_eq!(letters_from_col(702), "AAA");
    }

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(1.0, None), "1");
        assert_eq!(fmt_value(1.5, None), "1.5");
        assert_eq!(fmt_value(1.0, Some(2)), "1.00");
        assert_eq!(fmt_value(f32::NAN, Some(2)), "NaN");
    }
}
