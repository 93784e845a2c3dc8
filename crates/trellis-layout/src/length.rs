//! Track lengths: fixed, auto, and proportional ("star").

use crate::error::GridError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The user-specified size of a row or column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLength {
    /// Fixed size in layout units
    Fixed(f64),
    /// Sized to the largest content placed in the track
    Auto,
    /// Proportional share of the remaining space, by weight
    Star(f64),
}

impl Default for GridLength {
    fn default() -> Self {
        Self::Star(1.0)
    }
}

impl GridLength {
    /// Create a fixed size.
    #[must_use]
    pub const fn px(value: f64) -> Self {
        Self::Fixed(value)
    }

    /// Create a weighted proportional size.
    #[must_use]
    pub const fn star(weight: f64) -> Self {
        Self::Star(weight)
    }

    /// Whether this is a proportional length.
    #[must_use]
    pub const fn is_star(&self) -> bool {
        matches!(self, Self::Star(_))
    }

    /// Whether this is an auto length.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Check the numeric part is usable.
    ///
    /// Fixed lengths must be finite and non-negative. Star weights must be
    /// non-negative; an infinite weight is allowed and takes all the space.
    pub fn validate(&self) -> Result<(), GridError> {
        let ok = match self {
            Self::Fixed(v) => v.is_finite() && *v >= 0.0,
            Self::Star(w) => !w.is_nan() && *w >= 0.0,
            Self::Auto => true,
        };
        if ok {
            Ok(())
        } else {
            Err(GridError::InvalidLength(self.to_string()))
        }
    }
}

impl fmt::Display for GridLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => write!(f, "{v}"),
            Self::Auto => f.write_str("Auto"),
            Self::Star(w) if *w == 1.0 => f.write_str("*"),
            Self::Star(w) => write!(f, "{w}*"),
        }
    }
}

impl FromStr for GridLength {
    type Err = GridError;

    /// Parses `Auto`, `*`, `2.5*`, `120` and `120px` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || GridError::InvalidLength(s.to_string());

        let length = if text.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else if let Some(weight) = text.strip_suffix('*') {
            let weight = weight.trim();
            if weight.is_empty() {
                Self::Star(1.0)
            } else {
                Self::Star(weight.parse().map_err(|_| invalid())?)
            }
        } else {
            let lower = text.to_ascii_lowercase();
            let number = lower.strip_suffix("px").unwrap_or(&lower).trim();
            Self::Fixed(number.parse().map_err(|_| invalid())?)
        };

        length.validate().map_err(|_| invalid())?;
        Ok(length)
    }
}

impl Serialize for GridLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fixed(v) => serializer.serialize_f64(*v),
            _ => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for GridLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LengthVisitor;

        impl Visitor<'_> for LengthVisitor {
            type Value = GridLength;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, \"Auto\", or a star length such as \"2*\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                let length = GridLength::Fixed(v);
                length.validate().map_err(E::custom)?;
                Ok(length)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(GridLength::Fixed(v as f64))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                self.visit_f64(v as f64)
            }
        }

        deserializer.deserialize_any(LengthVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn test_grid_length_default() {
        assert_eq!(GridLength::default(), GridLength::Star(1.0));
    }

    #[test]
    fn test_grid_length_constructors() {
        assert_eq!(GridLength::px(100.0), GridLength::Fixed(100.0));
        assert_eq!(GridLength::star(2.0), GridLength::Star(2.0));
        assert!(GridLength::Auto.is_auto());
        assert!(GridLength::star(0.0).is_star());
        assert!(!GridLength::px(0.0).is_star());
    }

    // =========================================================================
    // Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_keywords_and_stars() {
        assert_eq!("Auto".parse::<GridLength>(), Ok(GridLength::Auto));
        assert_eq!("auto".parse::<GridLength>(), Ok(GridLength::Auto));
        assert_eq!("*".parse::<GridLength>(), Ok(GridLength::Star(1.0)));
        assert_eq!("2.5*".parse::<GridLength>(), Ok(GridLength::Star(2.5)));
        assert_eq!(" 3 * ".parse::<GridLength>(), Ok(GridLength::Star(3.0)));
    }

    #[test]
    fn test_parse_fixed() {
        assert_eq!("120".parse::<GridLength>(), Ok(GridLength::Fixed(120.0)));
        assert_eq!("48px".parse::<GridLength>(), Ok(GridLength::Fixed(48.0)));
        assert_eq!("12.5PX".parse::<GridLength>(), Ok(GridLength::Fixed(12.5)));
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative() {
        assert!("wide".parse::<GridLength>().is_err());
        assert!("-4".parse::<GridLength>().is_err());
        assert!("-1*".parse::<GridLength>().is_err());
        assert!("NaN".parse::<GridLength>().is_err());
        assert!("inf".parse::<GridLength>().is_err());
    }

    #[test]
    fn test_parse_infinite_star_is_allowed() {
        assert_eq!(
            "inf*".parse::<GridLength>(),
            Ok(GridLength::Star(f64::INFINITY))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for length in [
            GridLength::Auto,
            GridLength::Star(1.0),
            GridLength::Star(0.5),
            GridLength::Fixed(64.0),
        ] {
            assert_eq!(length.to_string().parse::<GridLength>(), Ok(length));
        }
    }

    // =========================================================================
    // Serde Tests
    // =========================================================================

    #[test]
    fn test_serde_accepts_strings_and_numbers() {
        let lengths: Vec<GridLength> =
            serde_json::from_str(r#"["Auto", "2*", 100, 12.5, "30px"]"#).unwrap();
        assert_eq!(
            lengths,
            vec![
                GridLength::Auto,
                GridLength::Star(2.0),
                GridLength::Fixed(100.0),
                GridLength::Fixed(12.5),
                GridLength::Fixed(30.0),
            ]
        );
    }

    #[test]
    fn test_serde_writes_fixed_as_number() {
        let json = serde_json::to_string(&vec![GridLength::Fixed(10.0), GridLength::Star(1.0)])
            .unwrap();
        assert_eq!(json, r#"[10.0,"*"]"#);
    }

    #[test]
    fn test_serde_rejects_negative_number() {
        assert!(serde_json::from_str::<GridLength>("-5").is_err());
    }
}
