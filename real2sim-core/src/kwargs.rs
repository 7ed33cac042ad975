//! Additional keyword arguments for building environments.
//!
//! Arguments are given as `key=value` on the command line. A value is a scalar
//! (integer, float, boolean, `None` or string), a comma separated list, or a
//! bracketed list or tuple which may nest, e.g. `key="[(a,b),(c,d)]"`. Spaces are
//! removed and surrounding quotes are stripped, at every nesting level.
use crate::{
    error::Real2SimError,
    util::{fmt_py_bool, fmt_py_float},
};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// A parsed argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum KwargValue {
    /// `None`.
    None,

    /// `true` or `false`, case insensitive.
    Bool(bool),

    /// Integer.
    Int(i64),

    /// Float.
    Float(f64),

    /// Anything else.
    Str(String),

    /// `[a,b]` or `a,b`.
    List(Vec<KwargValue>),

    /// `(a,b)`.
    Tuple(Vec<KwargValue>),
}

impl KwargValue {
    /// Parses a value.
    pub fn parse(val: &str) -> Result<Self, Real2SimError> {
        Self::parse_iterable(val)
    }

    fn parse_scalar(val: &str) -> Self {
        if let Ok(v) = val.parse::<i64>() {
            return KwargValue::Int(v);
        }
        if let Ok(v) = val.parse::<f64>() {
            return KwargValue::Float(v);
        }
        match val.to_lowercase().as_str() {
            "true" => return KwargValue::Bool(true),
            "false" => return KwargValue::Bool(false),
            _ => {}
        }
        if val == "None" {
            return KwargValue::None;
        }
        KwargValue::Str(val.to_string())
    }

    fn parse_iterable(val: &str) -> Result<Self, Real2SimError> {
        // quotes and spaces are dropped at every nesting level
        let val = val.trim_matches(|c| c == '\'' || c == '"').replace(' ', "");
        let val = val.as_str();
        let (is_tuple, mut rest) = if val.starts_with('(') && val.ends_with(')') && val.len() >= 2 {
            (true, &val[1..val.len() - 1])
        } else if val.starts_with('[') && val.ends_with(']') && val.len() >= 2 {
            (false, &val[1..val.len() - 1])
        } else if !val.contains(',') {
            return Ok(Self::parse_scalar(val));
        } else {
            (false, val)
        };

        let mut values = vec![];
        while !rest.is_empty() {
            let comma = find_next_comma(rest)?;
            values.push(Self::parse_iterable(&rest[..comma])?);
            rest = if comma < rest.len() {
                &rest[comma + 1..]
            } else {
                ""
            };
        }

        Ok(if is_tuple {
            KwargValue::Tuple(values)
        } else {
            KwargValue::List(values)
        })
    }

    /// Text that parses back to the same value.
    pub fn to_source(&self) -> String {
        match self {
            KwargValue::Str(s) => s.clone(),
            KwargValue::List(v) => format!("[{}]", join(v, ",", KwargValue::to_source)),
            KwargValue::Tuple(v) => format!("({})", join(v, ",", KwargValue::to_source)),
            _ => self.to_string(),
        }
    }

    /// Python `repr()` of the value.
    fn repr(&self) -> String {
        match self {
            KwargValue::Str(s) => format!("'{}'", s),
            _ => self.to_string(),
        }
    }
}

fn join(values: &[KwargValue], sep: &str, f: fn(&KwargValue) -> String) -> String {
    values.iter().map(f).collect::<Vec<_>>().join(sep)
}

/// Index of the first comma outside brackets, or the length of `s`.
fn find_next_comma(s: &str) -> Result<usize, Real2SimError> {
    let count = |c: char| s.chars().filter(|&x| x == c).count();
    if count('(') != count(')') || count('[') != count(']') {
        return Err(Real2SimError::KwargsSyntax(
            s.to_string(),
            "imbalanced brackets".to_string(),
        ));
    }

    let mut depth_paren = 0i64;
    let mut depth_bracket = 0i64;
    for (ix, c) in s.char_indices() {
        match c {
            '(' => depth_paren += 1,
            ')' => depth_paren -= 1,
            '[' => depth_bracket += 1,
            ']' => depth_bracket -= 1,
            ',' if depth_paren == 0 && depth_bracket == 0 => return Ok(ix),
            _ => {}
        }
    }
    Ok(s.len())
}

/// Renders the value like Python's `str()`.
impl fmt::Display for KwargValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KwargValue::None => f.write_str("None"),
            KwargValue::Bool(b) => f.write_str(fmt_py_bool(*b)),
            KwargValue::Int(v) => write!(f, "{}", v),
            KwargValue::Float(v) => f.write_str(&fmt_py_float(*v)),
            KwargValue::Str(s) => f.write_str(s),
            KwargValue::List(v) => write!(f, "[{}]", join(v, ", ", KwargValue::repr)),
            KwargValue::Tuple(v) if v.len() == 1 => write!(f, "({},)", v[0].repr()),
            KwargValue::Tuple(v) => write!(f, "({})", join(v, ", ", KwargValue::repr)),
        }
    }
}

/// Ordered `key=value` arguments.
///
/// Keys keep the position of their first occurrence; a repeated key replaces
/// the value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct BuildKwargs(Vec<(String, KwargValue)>);

impl BuildKwargs {
    /// Parses `key=value` arguments.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, Real2SimError> {
        let mut kwargs = Self::default();
        for arg in args.iter() {
            let arg = arg.as_ref();
            let (key, val) = match arg.find('=') {
                Some(ix) => (&arg[..ix], &arg[ix + 1..]),
                None => {
                    return Err(Real2SimError::KwargsSyntax(
                        arg.to_string(),
                        "expected key=value".to_string(),
                    ))
                }
            };
            kwargs.insert(key, KwargValue::parse(val)?);
        }
        Ok(kwargs)
    }

    /// Inserts an argument.
    pub fn insert(&mut self, k: impl Into<String>, v: KwargValue) {
        let k = k.into();
        match self.0.iter_mut().find(|(key, _)| *key == k) {
            Some((_, value)) => *value = v,
            None => self.0.push((k, v)),
        }
    }

    /// Gets the value of an argument.
    pub fn get(&self, k: &str) -> Option<&KwargValue> {
        self.0.iter().find(|(key, _)| key == k).map(|(_, v)| v)
    }

    /// Iterates over arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KwargValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if there is no argument.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BuildKwargs> for Vec<String> {
    fn from(kwargs: BuildKwargs) -> Self {
        kwargs
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.to_source()))
            .collect()
    }
}

impl TryFrom<Vec<String>> for BuildKwargs {
    type Error = Real2SimError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        BuildKwargs::parse(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::KwargValue::*;
    use super::*;

    fn s(v: &str) -> KwargValue {
        Str(v.to_string())
    }

    #[test]
    fn test_parse_scalars() -> Result<(), Real2SimError> {
        assert_eq!(KwargValue::parse("3")?, Int(3));
        assert_eq!(KwargValue::parse("-0.5")?, Float(-0.5));
        assert_eq!(KwargValue::parse("1.0")?, Float(1.0));
        assert_eq!(KwargValue::parse("True")?, Bool(true));
        assert_eq!(KwargValue::parse("false")?, Bool(false));
        assert_eq!(KwargValue::parse("None")?, None);
        assert_eq!(KwargValue::parse("rt")?, s("rt"));
        assert_eq!(KwargValue::parse("'quoted'")?, s("quoted"));
        Ok(())
    }

    #[test]
    fn test_parse_lists() -> Result<(), Real2SimError> {
        assert_eq!(KwargValue::parse("a,b")?, List(vec![s("a"), s("b")]));
        assert_eq!(KwargValue::parse("[1,2]")?, List(vec![Int(1), Int(2)]));
        assert_eq!(KwargValue::parse("[]")?, List(vec![]));
        assert_eq!(KwargValue::parse("(1)")?, Tuple(vec![Int(1)]));
        assert_eq!(
            KwargValue::parse("\"[(a,b),(c,d)]\"")?,
            List(vec![Tuple(vec![s("a"), s("b")]), Tuple(vec![s("c"), s("d")])])
        );
        assert_eq!(
            KwargValue::parse("[1,[2,(3,4)]]")?,
            List(vec![Int(1), List(vec![Int(2), Tuple(vec![Int(3), Int(4)])])])
        );
        Ok(())
    }

    #[test]
    fn test_parse_strips_nested_quotes() -> Result<(), Real2SimError> {
        let v = KwargValue::parse("\"['a','b']\"")?;
        assert_eq!(v, List(vec![s("a"), s("b")]));
        assert_eq!(v.to_string(), "['a', 'b']");

        let v = KwargValue::parse("[('x',1)]")?;
        assert_eq!(v, List(vec![Tuple(vec![s("x"), Int(1)])]));
        assert_eq!(v.to_string(), "[('x', 1)]");

        assert_eq!(KwargValue::parse("[ 'a' , 2 ]")?, List(vec![s("a"), Int(2)]));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_imbalanced_brackets() {
        assert!(matches!(
            KwargValue::parse("[1,(2,3]"),
            Err(Real2SimError::KwargsSyntax(..))
        ));
    }

    #[test]
    fn test_display_like_python() -> Result<(), Real2SimError> {
        assert_eq!(KwargValue::parse("[1,2.5,x]")?.to_string(), "[1, 2.5, 'x']");
        assert_eq!(KwargValue::parse("(a)")?.to_string(), "('a',)");
        assert_eq!(KwargValue::parse("true")?.to_string(), "True");
        assert_eq!(KwargValue::parse("rt")?.to_string(), "rt");
        Ok(())
    }

    #[test]
    fn test_build_kwargs_keeps_order() -> Result<(), Real2SimError> {
        let kwargs = BuildKwargs::parse(&["urdf_version=recolor", "lr_switch=1", "urdf_version=None"])?;
        let keys: Vec<_> = kwargs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["urdf_version", "lr_switch"]);
        assert_eq!(kwargs.get("urdf_version"), Some(&None));
        assert!(BuildKwargs::parse(&["no_equal_sign"]).is_err());
        Ok(())
    }

    #[test]
    fn test_serde_build_kwargs() -> anyhow::Result<()> {
        let kwargs = BuildKwargs::parse(&[
            "station_name=mk_station",
            "light_mode=[(1,2),(3.0,x)]",
            "flag=false",
            "single=(a)",
        ])?;
        let yaml = serde_yaml::to_string(&kwargs)?;
        let kwargs_: BuildKwargs = serde_yaml::from_str(&yaml)?;
        assert_eq!(kwargs, kwargs_);
        Ok(())
    }
}
