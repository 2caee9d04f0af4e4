use serde_json::Value;

/// A single style value as authored in a cue sheet: a bare number
/// (`y: 16`) or a string (`ease: "power2.out"`, `color: "#fff"`).
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Num(f64),
    Str(String),
}

impl StyleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Num(n) => Some(*n),
            StyleValue::Str(s) => s.trim().parse().ok(),
        }
    }

    pub fn to_css_string(&self) -> String {
        match self {
            StyleValue::Num(n) => format!("{}", n),
            StyleValue::Str(s) => s.clone(),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Num(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

/// An ordered bag of style properties. Later writes replace earlier ones in
/// place, so overlaying keeps author order stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleVars {
    entries: Vec<(String, StyleValue)>,
}

impl StyleVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn set(&mut self, key: &str, value: impl Into<StyleValue>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Builder-style `set`, used by the preset table.
    pub fn with(mut self, key: &str, value: impl Into<StyleValue>) -> Self {
        self.set(key, value);
        self
    }

    /// A copy of `self` with every entry of `overlay` layered on top.
    pub fn merged_with(&self, overlay: &StyleVars) -> StyleVars {
        let mut out = self.clone();
        for (key, value) in &overlay.entries {
            out.set(key, value.clone());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert a parsed JSON object into style vars. Numbers and strings
    /// carry over; booleans stringify; anything else is skipped.
    pub fn from_json(value: &Value) -> Option<StyleVars> {
        let object = value.as_object()?;
        let mut vars = StyleVars::new();
        for (key, value) in object {
            match value {
                Value::Number(n) => {
                    if let Some(n) = n.as_f64() {
                        vars.set(key, n);
                    }
                }
                Value::String(s) => vars.set(key, s.clone()),
                Value::Bool(b) => vars.set(key, b.to_string()),
                _ => {}
            }
        }
        Some(vars)
    }
}
