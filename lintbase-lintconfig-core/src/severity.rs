use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Rule severity normalized to ESLint's numeric levels; serialized as `0 | 1 | 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Off = 0,
    Warn = 1,
    Error = 2,
}

impl Severity {
    /// Parse a plain level: `"off" | "warn" | "error"` or `0 | 1 | 2`. Numeric
    /// strings are rejected, as ESLint does.
    pub fn from_level(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "off" => Some(Self::Off),
                "warn" => Some(Self::Warn),
                "error" => Some(Self::Error),
                _ => None,
            },
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(Self::from_i64),
            _ => None,
        }
    }

    /// Parse a full rule entry: a plain level or `[level, ...options]`.
    pub fn from_rule_entry(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.first().and_then(Self::from_level),
            other => Self::from_level(other),
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Warn),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::from_i64(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("severity out of range: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_numeric_levels_agree() {
        assert_eq!(Severity::from_level(&json!("off")), Some(Severity::Off));
        assert_eq!(Severity::from_level(&json!("WARN")), Some(Severity::Warn));
        assert_eq!(Severity::from_level(&json!(2)), Some(Severity::Error));
        assert_eq!(Severity::from_level(&json!(3)), None);
        assert_eq!(Severity::from_level(&json!(true)), None);
    }

    #[test]
    fn numeric_strings_are_not_levels() {
        for level in ["0", "1", "2"] {
            assert_eq!(Severity::from_level(&json!(level)), None, "{level}");
        }
        assert_eq!(Severity::from_rule_entry(&json!(["2", "always"])), None);
    }

    #[test]
    fn tuple_entries_use_the_first_element() {
        assert_eq!(
            Severity::from_rule_entry(&json!(["warn", { "max": 3 }])),
            Some(Severity::Warn)
        );
        assert_eq!(Severity::from_rule_entry(&json!([])), None);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "2");
        assert_eq!(serde_json::from_str::<Severity>("0").unwrap(), Severity::Off);
        assert!(serde_json::from_str::<Severity>("7").is_err());
    }
}
