use segue_stage::{ElementId, Stage};

use crate::preset::preset::PhaseKind;
use crate::preset::preset_library::PresetLibrary;
use crate::style::applicator::StyleApplicator;
use crate::style::vars::StyleVars;

/// Root attribute naming the default entrance preset for the slide.
pub const INTRO_PRESET_ATTR: &str = "data-intro-animation";
/// Marks an element as part of the one-shot entrance sequence.
pub const ANIM_ITEM_ATTR: &str = "data-anim-item";
/// Per-element preset override for the entrance sequence.
pub const ANIM_PRESET_ATTR: &str = "data-anim-preset";

/// The simpler one-shot entrance path used when a slide has no usable cue
/// sheet: group the marked elements by preset and animate each group in
/// with stagger defaults. Requires motion; with only the static fallback
/// on hand the slide simply renders in its authored state.
pub fn run_intro_animations(
    stage: &mut Stage,
    root: ElementId,
    presets: &PresetLibrary,
    applicator: &mut dyn StyleApplicator,
) {
    if !applicator.is_animated() {
        return;
    }

    let root_preset = stage.element(root).attr(INTRO_PRESET_ATTR);
    let mut targets = stage
        .query(root, &format!("[{}]", ANIM_ITEM_ATTR))
        .unwrap_or_default();
    if targets.is_empty() {
        targets = vec![root];
    }

    // group by preset name, preserving first-seen group order
    let mut groups: Vec<(String, Vec<ElementId>)> = Vec::new();
    for id in targets {
        let name = stage
            .element(id)
            .attr(ANIM_PRESET_ATTR)
            .or_else(|| root_preset.clone())
            .unwrap_or_else(|| "FadeIn".to_string());
        match groups.iter_mut().find(|(group, _)| group == &name) {
            Some((_, members)) => members.push(id),
            None => groups.push((name, vec![id])),
        }
    }

    for (name, members) in groups {
        let phase = presets.phase(&name, PhaseKind::In);
        let to = StyleVars::new()
            .with("stagger", 0.12)
            .with("delay", 0.08)
            .merged_with(&phase.to);
        applicator.animate_in(stage, &members, &phase.from, &to);
    }
}
