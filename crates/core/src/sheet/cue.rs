use crate::style::vars::StyleVars;

/// How a cue addresses its elements: a stable logical key matched via the
/// `data-anim-key` attribute, or a raw structural query. Exactly one of the
/// two; a selector wins when a cue authors both.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetRef {
    Key(String),
    Selector(String),
}

/// Per-cue tween timing overrides, layered onto the preset's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timing {
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub stagger: Option<f64>,
    pub ease: Option<String>,
}

impl Timing {
    pub fn is_empty(&self) -> bool {
        self.duration.is_none()
            && self.delay.is_none()
            && self.stagger.is_none()
            && self.ease.is_none()
    }

    /// Layer these overrides onto a bag of tween vars.
    pub fn overlay_onto(&self, vars: StyleVars) -> StyleVars {
        let mut out = vars;
        if let Some(duration) = self.duration {
            out.set("duration", duration);
        }
        if let Some(delay) = self.delay {
            out.set("delay", delay);
        }
        if let Some(stagger) = self.stagger {
            out.set("stagger", stagger);
        }
        if let Some(ease) = &self.ease {
            out.set("ease", ease.clone());
        }
        out
    }
}

/// What a cue does, decided once at normalization time. Each variant
/// carries only the fields its apply path reads.
#[derive(Clone, Debug, PartialEq)]
pub enum CueAction {
    In {
        preset: Option<String>,
        from: Option<StyleVars>,
        to: Option<StyleVars>,
        timing: Timing,
    },
    Out {
        preset: Option<String>,
        to: Option<StyleVars>,
        timing: Timing,
    },
    /// Instant style write. `vars` is the first of `set`/`to`/`from` the
    /// author supplied; a cue that supplied none applies as a no-op.
    Set { vars: Option<StyleVars> },
    /// Class toggles with a missing name apply as no-ops.
    ClassAdd { class_name: Option<String> },
    ClassRemove { class_name: Option<String> },
}

/// One scheduled instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    /// Seconds on the narration clock at which this cue becomes due.
    pub at: f64,
    pub target: TargetRef,
    pub action: CueAction,
}

/// The normalized configuration for one slide: sheet options plus cues
/// sorted ascending by trigger time.
#[derive(Clone, Debug, PartialEq)]
pub struct CueSheet {
    /// Follow the external narration clock; otherwise run off a local
    /// wall-clock started at engine activation.
    pub follow_voiceover: bool,
    /// Advisory tick granularity in milliseconds, clamped to [16, 250].
    pub poll_ms: u32,
    pub cues: Vec<Cue>,
}

impl CueSheet {
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
