//! Formatting of values in artifact names.
//!
//! Artifact names are read by analysis scripts written against the
//! Python tooling of the simulator, so numbers and flags are rendered the way
//! Python's `str()` renders them.

/// Renders a float like Python's `repr(float)`.
///
/// ```
/// use real2sim_core::util::fmt_py_float;
///
/// assert_eq!(fmt_py_float(0.35), "0.35");
/// assert_eq!(fmt_py_float(1.0), "1.0");
/// assert_eq!(fmt_py_float(-0.2925), "-0.2925");
/// assert_eq!(fmt_py_float(1.5e-5), "1.5e-05");
/// ```
pub fn fmt_py_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{:e}", v);
        let (mantissa, exp) = s.split_at(s.find('e').unwrap_or(s.len()));
        let exp: i32 = exp.trim_start_matches('e').parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }

    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Renders a boolean like Python's `str(bool)`.
pub fn fmt_py_bool(v: bool) -> &'static str {
    if v {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_py_float() {
        assert_eq!(fmt_py_float(0.0), "0.0");
        assert_eq!(fmt_py_float(-0.12), "-0.12");
        assert_eq!(fmt_py_float(-0.1775), "-0.1775");
        assert_eq!(fmt_py_float(80.0), "80.0");
        assert_eq!(fmt_py_float(1e16), "1e+16");
        assert_eq!(fmt_py_float(-2.5e-7), "-2.5e-07");
        assert_eq!(fmt_py_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_fmt_py_bool() {
        assert_eq!(fmt_py_bool(true), "True");
        assert_eq!(fmt_py_bool(false), "False");
    }
}
