//! crates/sd_core/src/keys.rs
//! Surrogate keys and explicit "parse or mark absent" coercion.

use core::fmt;

/// Integer surrogate key of a dimension row (and the matching fact column).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SurrogateKey(i64);

impl SurrogateKey {
    /// Key 0 is the "Unknown" member in every dimension.
    pub const UNKNOWN: SurrogateKey = SurrogateKey(0);

    #[inline]
    pub const fn new(v: i64) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SurrogateKey {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Outcome of coercing one raw cell into a key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyCoercion {
    Parsed(SurrogateKey),
    /// The cell was empty or not an integer; carries the raw text (if any).
    Absent(Option<String>),
}

impl KeyCoercion {
    pub fn key(&self) -> Option<SurrogateKey> {
        match self {
            KeyCoercion::Parsed(k) => Some(*k),
            KeyCoercion::Absent(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, KeyCoercion::Absent(_))
    }
}

/// Coerce cell text into a surrogate key.
///
/// Accepts an optionally signed integer, or a decimal whose fraction is all
/// zeros (`"7.0"`, as spreadsheets emit). Surrounding whitespace is ignored.
/// Anything else is `Absent`; this never fails.
pub fn coerce_key(cell: Option<&str>) -> KeyCoercion {
    let Some(raw) = cell else {
        return KeyCoercion::Absent(None);
    };
    let s = raw.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    let digits = int_part.strip_prefix(['-', '+']).unwrap_or(int_part);
    let shape_ok = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b == b'0');
    if !shape_ok {
        return KeyCoercion::Absent(Some(raw.to_string()));
    }
    match int_part.parse::<i64>() {
        Ok(v) => KeyCoercion::Parsed(SurrogateKey(v)),
        Err(_) => KeyCoercion::Absent(Some(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> Option<i64> {
        coerce_key(Some(s)).key().map(|k| k.get())
    }

    #[test]
    fn integers_and_integral_decimals_parse() {
        assert_eq!(k("7"), Some(7));
        assert_eq!(k(" 42 "), Some(42));
        assert_eq!(k("7.0"), Some(7));
        assert_eq!(k("7.000"), Some(7));
        assert_eq!(k("-3"), Some(-3));
        assert_eq!(k("+5"), Some(5));
        assert_eq!(k("0"), Some(0));
    }

    #[test]
    fn garbage_becomes_absent_with_raw_text() {
        assert_eq!(coerce_key(Some("Customer Key")), KeyCoercion::Absent(Some("Customer Key".into())));
        assert!(coerce_key(Some("7.5")).is_absent());
        assert!(coerce_key(Some("")).is_absent());
        assert!(coerce_key(Some("-")).is_absent());
        assert!(coerce_key(Some("1e3")).is_absent());
        assert!(coerce_key(Some("99999999999999999999")).is_absent());
        assert_eq!(coerce_key(None), KeyCoercion::Absent(None));
    }

    #[test]
    fn unknown_member_is_key_zero() {
        assert!(SurrogateKey::new(0).is_unknown());
        assert!(!SurrogateKey::new(7).is_unknown());
    }
}
