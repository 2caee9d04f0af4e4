use crate::style::vars::StyleVars;

/// Which half of a preset a cue wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseKind {
    In,
    Out,
}

/// One direction of a named transition: the styles an element starts from
/// and the styles (plus tween timing) it lands on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetPhase {
    pub from: StyleVars,
    pub to: StyleVars,
}

/// A named animation: an appear half and a disappear half, either of which
/// may be missing. Missing halves fall back to [`fallback_phase`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preset {
    pub enter: Option<PresetPhase>,
    pub exit: Option<PresetPhase>,
}

impl Preset {
    pub fn new(enter: PresetPhase, exit: PresetPhase) -> Self {
        Self {
            enter: Some(enter),
            exit: Some(exit),
        }
    }
}

/// The built-in minimal transition used when a preset lacks the requested
/// phase: fade to opaque on the way in, fade to transparent on the way out.
pub fn fallback_phase(kind: PhaseKind) -> PresetPhase {
    match kind {
        PhaseKind::In => PresetPhase {
            from: StyleVars::new().with("opacity", 0.0),
            to: StyleVars::new()
                .with("opacity", 1.0)
                .with("duration", 0.5)
                .with("ease", "power1.out"),
        },
        PhaseKind::Out => PresetPhase {
            from: StyleVars::new(),
            to: StyleVars::new()
                .with("opacity", 0.0)
                .with("duration", 0.35)
                .with("ease", "power1.in"),
        },
    }
}
