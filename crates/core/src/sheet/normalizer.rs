use std::cmp::Ordering;

use serde_json::Value;

use super::cue::{Cue, CueAction, CueSheet, TargetRef, Timing};
use crate::style::vars::StyleVars;

const MIN_POLL_MS: u32 = 16;
const MAX_POLL_MS: u32 = 250;
const DEFAULT_POLL_MS: u32 = 33;

/// Parse a raw cue sheet (either a bare array of cue-like objects or an
/// object carrying a `cues` array plus sheet-level options) into the strict
/// internal form. Returns `None` when the input is not sheet-shaped.
///
/// Malformed cues are dropped individually; the surviving cues come back
/// stable-sorted by trigger time.
pub fn normalize_sheet(raw: &Value) -> Option<CueSheet> {
    let source = match raw {
        Value::Array(cues) => cues,
        Value::Object(map) => map.get("cues")?.as_array()?,
        _ => return None,
    };

    let mut cues = Vec::new();
    for raw_cue in source {
        match normalize_cue(raw_cue) {
            Some(cue) => cues.push(cue),
            None => log::debug!("dropping malformed cue: {}", raw_cue),
        }
    }
    cues.sort_by(|a, b| a.at.partial_cmp(&b.at).unwrap_or(Ordering::Equal));

    let follow_voiceover = raw.get("followVoiceover") != Some(&Value::Bool(false));
    let poll_ms = loose_f64(raw.get("pollMs"))
        .map(|n| (n.round() as i64).clamp(MIN_POLL_MS as i64, MAX_POLL_MS as i64) as u32)
        .unwrap_or(DEFAULT_POLL_MS);

    Some(CueSheet {
        follow_voiceover,
        poll_ms,
        cues,
    })
}

/// Parse one loosely-shaped cue record. Accepts the legacy `time`/`type`/
/// `key`/`class`/`animation` spellings; rejects records with a bad trigger
/// time, an unknown action, or no way to address a target.
pub fn normalize_cue(raw: &Value) -> Option<Cue> {
    if !raw.is_object() {
        return None;
    }

    let at = loose_f64(raw.get("at").or_else(|| raw.get("time")))?;
    if !at.is_finite() || at < 0.0 {
        return None;
    }

    let action_raw = loose_string(raw.get("action").or_else(|| raw.get("type")))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "in".to_string());
    let action_key = match action_raw.as_str() {
        "addclass" => "classadd",
        "removeclass" => "classremove",
        other => other,
    };

    let target = trimmed_string(raw.get("target").or_else(|| raw.get("key")));
    let selector = trimmed_string(raw.get("selector"));
    let target_ref = match (target, selector) {
        (_, Some(selector)) => TargetRef::Selector(selector),
        (Some(target), None) => TargetRef::Key(target),
        (None, None) => return None,
    };

    let preset = trimmed_string(raw.get("preset").or_else(|| raw.get("animation")));
    let timing = Timing {
        duration: loose_f64(raw.get("duration")),
        delay: loose_f64(raw.get("delay")),
        stagger: loose_f64(raw.get("stagger")),
        ease: trimmed_string(raw.get("ease")),
    };
    let class_name = trimmed_string(raw.get("className").or_else(|| raw.get("class")));
    let from = raw.get("from").and_then(StyleVars::from_json);
    let to = raw.get("to").and_then(StyleVars::from_json);
    let set = raw.get("set").and_then(StyleVars::from_json);

    let action = match action_key {
        "in" => CueAction::In {
            preset,
            from,
            to,
            timing,
        },
        "out" => CueAction::Out { preset, to, timing },
        "set" => CueAction::Set {
            vars: set.or(to).or(from),
        },
        "classadd" => CueAction::ClassAdd { class_name },
        "classremove" => CueAction::ClassRemove { class_name },
        _ => return None,
    };

    Some(Cue {
        at,
        target: target_ref,
        action,
    })
}

/// Numeric coercion in the spirit of the authoring surface: bare numbers
/// or numeric strings, anything else is absent.
fn loose_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn trimmed_string(value: Option<&Value>) -> Option<String> {
    loose_string(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
