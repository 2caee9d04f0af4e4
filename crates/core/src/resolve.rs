use segue_stage::{ElementId, Stage};

use crate::sheet::cue::{Cue, TargetRef};

/// Attribute carrying an element's stable logical key for cue addressing.
pub const ANIM_KEY_ATTR: &str = "data-anim-key";

/// Map a cue to the concrete elements it affects, scoped under `root`.
///
/// Selector cues run their query as written; key cues query for the
/// logical-key attribute. A malformed selector resolves to an empty set
/// rather than an error, since cues authored against elements that do not
/// exist on this slide variant are expected.
pub fn resolve_targets(stage: &Stage, root: ElementId, cue: &Cue) -> Vec<ElementId> {
    let query = match &cue.target {
        TargetRef::Selector(selector) => selector.clone(),
        TargetRef::Key(key) => format!("[{}=\"{}\"]", ANIM_KEY_ATTR, escape_attr_value(key)),
    };

    match stage.query(root, &query) {
        Ok(nodes) => nodes,
        Err(err) => {
            log::debug!("cue target query {:?} rejected: {}", query, err);
            Vec::new()
        }
    }
}

/// Escape a value for embedding inside a double-quoted attribute selector.
pub fn escape_attr_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use segue_stage::{Element, Stage};

    use super::*;
    use crate::sheet::cue::CueAction;

    fn cue_with(target: TargetRef) -> Cue {
        Cue {
            at: 0.0,
            target,
            action: CueAction::Set { vars: None },
        }
    }

    fn stage_with_keys() -> (Stage, ElementId) {
        let mut stage = Stage::new();
        let root = stage.insert(None, Element::new("section"));
        for key in ["title", "body", "title"] {
            stage.insert(Some(root), {
                let mut el = Element::new("div");
                el.set_attr(ANIM_KEY_ATTR, key);
                el
            });
        }
        (stage, root)
    }

    #[test]
    fn test_key_resolution() {
        let (stage, root) = stage_with_keys();
        let cue = cue_with(TargetRef::Key("title".to_string()));
        assert_eq!(resolve_targets(&stage, root, &cue).len(), 2);

        let missing = cue_with(TargetRef::Key("absent".to_string()));
        assert!(resolve_targets(&stage, root, &missing).is_empty());
    }

    #[test]
    fn test_selector_resolution() {
        let (stage, root) = stage_with_keys();
        let cue = cue_with(TargetRef::Selector("div".to_string()));
        assert_eq!(resolve_targets(&stage, root, &cue).len(), 3);
    }

    #[test]
    fn test_malformed_selector_resolves_empty() {
        let (stage, root) = stage_with_keys();
        let cue = cue_with(TargetRef::Selector("div[unclosed".to_string()));
        assert!(resolve_targets(&stage, root, &cue).is_empty());
    }

    #[test]
    fn test_key_values_are_escaped() {
        let mut stage = Stage::new();
        let root = stage.insert(None, Element::new("section"));
        stage.insert(Some(root), {
            let mut el = Element::new("div");
            el.set_attr(ANIM_KEY_ATTR, "he said \"hi\"");
            el
        });

        let cue = cue_with(TargetRef::Key("he said \"hi\"".to_string()));
        assert_eq!(resolve_targets(&stage, root, &cue).len(), 1);
    }
}
