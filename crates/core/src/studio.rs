use serde::Serialize;
use serde_json::Value;

/// A cue as the authoring surface sees it: the exact JSON shape consumed by
/// the runtime, with optional fields omitted when absent so an unedited
/// sheet serializes back byte-for-byte.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudioCue {
    pub at: f64,
    pub target: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl StudioCue {
    /// Parse one loosely-shaped record into an editable cue. Mirrors the
    /// runtime's tolerance (legacy `type`/`key`/`class` spellings) but
    /// keeps the canonical spelling for output.
    pub fn from_value(raw: &Value) -> Option<StudioCue> {
        if !raw.is_object() {
            return None;
        }

        let at = loose_f64(raw.get("at"))?;
        if !at.is_finite() || at < 0.0 {
            return None;
        }

        let action = normalize_cue_action(
            raw.get("action")
                .or_else(|| raw.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("in"),
        )?;

        let mut cue = StudioCue {
            at: round3(at),
            action: action.to_string(),
            target: trimmed(raw.get("target").or_else(|| raw.get("key"))).unwrap_or_default(),
            selector: trimmed(raw.get("selector")),
            preset: trimmed(raw.get("preset")),
            duration: loose_f64(raw.get("duration"))
                .filter(|d| *d >= 0.0)
                .map(round3),
            class_name: trimmed(raw.get("className").or_else(|| raw.get("class"))),
        };
        if cue.target.is_empty() && cue.selector.is_none() {
            return None;
        }
        if cue.action != "in" && cue.action != "out" {
            cue.preset = None;
        }
        Some(cue)
    }
}

/// Canonical spelling of an action, or `None` for unknown actions.
pub fn normalize_cue_action(action: &str) -> Option<&'static str> {
    match action.trim().to_lowercase().as_str() {
        "in" => Some("in"),
        "out" => Some("out"),
        "set" => Some("set"),
        "classadd" | "addclass" => Some("classAdd"),
        "classremove" | "removeclass" => Some("classRemove"),
        _ => None,
    }
}

/// The serialized document shape: what the runtime consumes and what the
/// studio writes back out.
#[derive(Debug, Serialize)]
struct SheetDocument<'a> {
    version: u32,
    #[serde(rename = "followVoiceover")]
    follow_voiceover: bool,
    cues: &'a [StudioCue],
}

/// Editing model behind the cue authoring tool: holds one slide's cue list,
/// keeps it sorted, and serializes it to the consumed JSON shape.
pub struct CueStudio {
    pub slide_id: String,
    /// File name the cues were loaded from, or "new".
    pub source: String,
    cues: Vec<StudioCue>,
}

impl CueStudio {
    pub fn new(slide_id: impl Into<String>) -> Self {
        Self {
            slide_id: slide_id.into(),
            source: "new".to_string(),
            cues: Vec::new(),
        }
    }

    pub fn cues(&self) -> &[StudioCue] {
        &self.cues
    }

    /// Replace the cue list from a fetched document. Invalid records are
    /// dropped; returns how many cues survived.
    pub fn load_document(&mut self, raw: &Value, source_name: &str) -> usize {
        self.cues = raw
            .get("cues")
            .and_then(Value::as_array)
            .map(|cues| cues.iter().filter_map(StudioCue::from_value).collect())
            .unwrap_or_default();
        self.sort_cues();
        self.source = source_name.to_string();
        self.cues.len()
    }

    /// Add a cue after validating it the way the editor form does.
    pub fn add_cue(&mut self, cue: StudioCue) -> Result<(), String> {
        if !cue.at.is_finite() || cue.at < 0.0 {
            return Err("Enter a valid time in seconds.".to_string());
        }
        if normalize_cue_action(&cue.action) != Some(cue.action.as_str()) {
            return Err("Action is required.".to_string());
        }
        if cue.target.trim().is_empty() && cue.selector.is_none() {
            return Err("Target is required.".to_string());
        }
        if (cue.action == "classAdd" || cue.action == "classRemove")
            && cue.class_name.as_deref().unwrap_or("").trim().is_empty()
        {
            return Err("Class name is required for class actions.".to_string());
        }

        let mut cue = cue;
        cue.at = round3(cue.at);
        cue.duration = cue.duration.filter(|d| *d >= 0.0).map(round3);
        if cue.action != "in" && cue.action != "out" {
            cue.preset = None;
        }
        self.cues.push(cue);
        self.sort_cues();
        Ok(())
    }

    pub fn remove_cue(&mut self, index: usize) -> Result<StudioCue, String> {
        if index < self.cues.len() {
            Ok(self.cues.remove(index))
        } else {
            Err("Cue index out of bounds".to_string())
        }
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }

    /// Ascending trigger time; ties break on the target label so the table
    /// is stable for the author.
    pub fn sort_cues(&mut self) {
        self.cues.sort_by(|a, b| {
            a.at.partial_cmp(&b.at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.target.cmp(&b.target))
        });
    }

    /// The full document as pretty-printed JSON, ready to save next to the
    /// slide's other assets.
    pub fn to_json_string(&self) -> String {
        let document = SheetDocument {
            version: 1,
            follow_voiceover: true,
            cues: &self.cues,
        };
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn loose_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn trimmed(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialized_sheet_round_trips_byte_identical() {
        let mut studio = CueStudio::new("slide-AB01_SLD_002");
        studio
            .add_cue(StudioCue {
                at: 0.5,
                target: "title".into(),
                action: "in".into(),
                selector: None,
                preset: Some("fade".into()),
                duration: Some(0.8),
                class_name: None,
            })
            .unwrap();
        studio
            .add_cue(StudioCue {
                at: 2.0,
                target: "title".into(),
                action: "out".into(),
                selector: None,
                preset: None,
                duration: None,
                class_name: None,
            })
            .unwrap();
        studio
            .add_cue(StudioCue {
                at: 3.25,
                target: "badge".into(),
                action: "classAdd".into(),
                selector: None,
                preset: None,
                duration: None,
                class_name: Some("lit".into()),
            })
            .unwrap();

        let saved = studio.to_json_string();
        let parsed: Value = serde_json::from_str(&saved).unwrap();

        let mut reloaded = CueStudio::new("slide-AB01_SLD_002");
        assert_eq!(reloaded.load_document(&parsed, "slide-AB01_SLD_002.json"), 3);
        assert_eq!(reloaded.to_json_string(), saved);
    }

    #[test]
    fn test_load_drops_invalid_and_sorts() {
        let mut studio = CueStudio::new("s");
        let count = studio.load_document(
            &json!({
                "cues": [
                    { "at": 2.0, "target": "b" },
                    { "at": -1.0, "target": "bad" },
                    { "at": 0.5, "target": "a" },
                    { "at": 1.0 }
                ]
            }),
            "s.json",
        );
        assert_eq!(count, 2);
        assert_eq!(studio.cues()[0].target, "a");
        assert_eq!(studio.source, "s.json");
    }

    #[test]
    fn test_add_cue_validation() {
        let mut studio = CueStudio::new("s");

        assert!(studio
            .add_cue(StudioCue {
                at: f64::NAN,
                target: "a".into(),
                action: "in".into(),
                selector: None,
                preset: None,
                duration: None,
                class_name: None,
            })
            .is_err());

        assert!(studio
            .add_cue(StudioCue {
                at: 1.0,
                target: "a".into(),
                action: "classAdd".into(),
                selector: None,
                preset: None,
                duration: None,
                class_name: None,
            })
            .is_err());

        assert!(studio
            .add_cue(StudioCue {
                at: 1.23456,
                target: "a".into(),
                action: "set".into(),
                selector: None,
                preset: Some("fade".into()),
                duration: None,
                class_name: None,
            })
            .is_ok());

        // rounded to 3 decimals, preset dropped for non-in/out actions
        assert_eq!(studio.cues()[0].at, 1.235);
        assert_eq!(studio.cues()[0].preset, None);
    }

    #[test]
    fn test_legacy_spellings_normalize() {
        let cue = StudioCue::from_value(&json!({
            "at": "1.5",
            "type": "removeClass",
            "key": "hero",
            "class": "active"
        }))
        .unwrap();
        assert_eq!(cue.action, "classRemove");
        assert_eq!(cue.target, "hero");
        assert_eq!(cue.class_name.as_deref(), Some("active"));
    }

    #[test]
    fn test_remove_cue() {
        let mut studio = CueStudio::new("s");
        studio.load_document(&json!({ "cues": [{ "at": 1.0, "target": "a" }] }), "s.json");
        assert!(studio.remove_cue(0).is_ok());
        assert!(studio.remove_cue(0).is_err());
    }
}
