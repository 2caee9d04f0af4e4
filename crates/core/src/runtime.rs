use segue_stage::{ElementId, Stage};

use crate::engine::cue_engine::CueEngine;
use crate::intro::run_intro_animations;
use crate::loader::{load_cue_sheet, SheetSource};
use crate::preset::preset_library::PresetLibrary;
use crate::style::applicator::StyleApplicator;

/// Root attribute opting a slide into the timed cue engine.
pub const VO_CUES_ATTR: &str = "data-vo-cues";
/// Root attribute carrying the slide's id, from which cue sheet file names
/// are derived.
pub const SLIDE_ID_ATTR: &str = "data-slide-id";

/// How a slide ended up being animated.
pub enum SlideStart {
    /// The timed engine is live; the caller owns ticking and teardown.
    Engine(CueEngine),
    /// No usable cue sheet; the one-shot entrance path ran instead.
    Intro,
}

/// Bring one slide to life. Slides that opt in via `data-vo-cues` get the
/// cue engine when a usable sheet loads; everything else (no opt-in, no
/// sheet, an empty sheet, an engine that declines) falls back to the
/// entrance animations. No failure escapes this boundary.
pub async fn start_slide(
    stage: &mut Stage,
    root: ElementId,
    source: &dyn SheetSource,
    presets: &PresetLibrary,
    mut applicator: Box<dyn StyleApplicator>,
) -> SlideStart {
    if stage.element(root).has_attr(VO_CUES_ATTR) {
        let slide_id = stage
            .element(root)
            .attr(SLIDE_ID_ATTR)
            .unwrap_or_default()
            .trim()
            .to_string();

        if let Some(sheet) = load_cue_sheet(source, &slide_id).await {
            if !sheet.is_empty() {
                match CueEngine::start(stage, root, sheet, presets.clone(), applicator) {
                    Ok(engine) => return SlideStart::Engine(engine),
                    Err(returned) => applicator = returned,
                }
            } else {
                log::debug!("cue sheet for {} has no valid cues", slide_id);
            }
        }
    }

    run_intro_animations(stage, root, presets, applicator.as_mut());
    SlideStart::Intro
}
