pub use clock::{ClockSource, ManualClock, NullClock};
pub use engine::cue_engine::{CueEngine, CLOCK_EPSILON_SECS};
pub use engine::runner::CueRunner;
pub use intro::{run_intro_animations, ANIM_ITEM_ATTR, ANIM_PRESET_ATTR, INTRO_PRESET_ATTR};
pub use loader::{load_cue_sheet, sheet_candidates, FsSheetSource, SheetSource};
pub use preset::preset::{fallback_phase, PhaseKind, Preset, PresetPhase};
pub use preset::preset_library::PresetLibrary;
pub use resolve::{escape_attr_value, resolve_targets, ANIM_KEY_ATTR};
pub use runtime::{start_slide, SlideStart, SLIDE_ID_ATTR, VO_CUES_ATTR};
pub use settings::{PlayerSettings, SettingsError, SettingsFile, SettingsManager};
pub use sheet::cue::{Cue, CueAction, CueSheet, TargetRef, Timing};
pub use sheet::normalizer::{normalize_cue, normalize_sheet};
pub use studio::{normalize_cue_action, CueStudio, StudioCue};
pub use style::applicator::{
    apply_static_vars, StaticApplicator, StyleApplicator, TweenApplicator, TweenEngine,
};
pub use style::vars::{StyleValue, StyleVars};

mod clock;
mod engine;
mod intro;
mod loader;
mod preset;
mod resolve;
mod runtime;
mod settings;
mod sheet;
mod studio;
mod style;
