use std::collections::HashSet;
use std::time::Instant;

use segue_stage::{ElementId, Stage};

use crate::clock::ClockSource;
use crate::preset::preset::PhaseKind;
use crate::preset::preset_library::PresetLibrary;
use crate::resolve::resolve_targets;
use crate::sheet::cue::{CueAction, CueSheet};
use crate::style::applicator::StyleApplicator;

/// Tolerance for clock comparisons. Forgives float/polling jitter when
/// firing cues, and doubles as the rewind guard band: only a jump of more
/// than this counts as a seek backwards.
pub const CLOCK_EPSILON_SECS: f64 = 0.02;

struct TrackedNode {
    id: ElementId,
    /// The element's inline style exactly as it was at first encounter.
    /// `None` means the element carried no style attribute.
    base_style: Option<String>,
}

/// The per-slide clock loop: binds cue targets once, snapshots every node
/// it will touch, then applies due cues in order on each tick, replaying
/// from zero whenever the externally-owned clock jumps backwards.
///
/// There is no paused state; a clock that stops advancing simply produces
/// ticks that do nothing. Scheduling is the caller's concern: embedders
/// call [`CueEngine::tick`] from their frame callback, or hand the engine
/// to a [`crate::CueRunner`].
pub struct CueEngine {
    sheet: CueSheet,
    root: ElementId,
    presets: PresetLibrary,
    applicator: Box<dyn StyleApplicator>,
    /// Resolved element sets, parallel to `sheet.cues`.
    bindings: Vec<Vec<ElementId>>,
    nodes: Vec<TrackedNode>,
    tracked: HashSet<ElementId>,
    next_cue: usize,
    last_clock_sec: f64,
    local_start: Instant,
}

impl CueEngine {
    /// Arm an engine for one slide: resolve every cue's targets, snapshot
    /// their pristine inline styles, apply initial states and replay to
    /// time zero.
    ///
    /// Declines when the sheet has no cues or no cue resolves any element,
    /// handing the applicator back for the caller's fallback path.
    pub fn start(
        stage: &mut Stage,
        root: ElementId,
        sheet: CueSheet,
        presets: PresetLibrary,
        applicator: Box<dyn StyleApplicator>,
    ) -> Result<CueEngine, Box<dyn StyleApplicator>> {
        if sheet.cues.is_empty() {
            log::debug!("cue sheet has no cues; declining to start");
            return Err(applicator);
        }

        let mut engine = CueEngine {
            sheet,
            root,
            presets,
            applicator,
            bindings: Vec::new(),
            nodes: Vec::new(),
            tracked: HashSet::new(),
            next_cue: 0,
            last_clock_sec: 0.0,
            local_start: Instant::now(),
        };

        engine.bind_targets(stage);
        if engine.nodes.is_empty() {
            log::debug!("cue sheet matched no elements; declining to start");
            return Err(engine.applicator);
        }

        engine.reset_to(stage, 0.0);
        log::info!(
            "cue engine armed: {} cues across {} nodes",
            engine.sheet.cues.len(),
            engine.nodes.len()
        );
        Ok(engine)
    }

    /// Advance the engine once. Reads the clock, detects forward progress
    /// vs. a backward jump, and applies exactly the cues that became due.
    pub fn tick(&mut self, stage: &mut Stage, clock: &dyn ClockSource) {
        let mut now = self.clock_time(clock);
        if !now.is_finite() || now < 0.0 {
            now = 0.0;
        }

        if now + CLOCK_EPSILON_SECS < self.last_clock_sec {
            log::debug!(
                "clock rewound {:.3}s -> {:.3}s, replaying",
                self.last_clock_sec,
                now
            );
            self.reset_to(stage, now);
        } else {
            self.process_until(stage, now);
        }
    }

    /// Full reset: restore every tracked node to its pristine inline style,
    /// re-apply initial states, rewind the cue index, then replay forward
    /// to `seek_to_secs`.
    pub fn reset_to(&mut self, stage: &mut Stage, seek_to_secs: f64) {
        self.restore_node_styles(stage);
        self.apply_initial_states(stage);
        self.next_cue = 0;
        self.last_clock_sec = 0.0;
        self.process_until(stage, seek_to_secs);
    }

    pub fn next_cue_index(&self) -> usize {
        self.next_cue
    }

    pub fn last_clock_sec(&self) -> f64 {
        self.last_clock_sec
    }

    pub fn sheet(&self) -> &CueSheet {
        &self.sheet
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Elements the engine has captured and therefore owns the styles of.
    pub fn tracked_nodes(&self) -> Vec<ElementId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn clock_time(&self, clock: &dyn ClockSource) -> f64 {
        if self.sheet.follow_voiceover {
            if let Some(t) = clock.current_time_secs() {
                if t.is_finite() && t >= 0.0 {
                    return t;
                }
            }
        }
        self.local_start.elapsed().as_secs_f64()
    }

    /// Resolution happens here and nowhere else: once at activation.
    /// Targets are assumed stable for the life of one slide instance.
    fn bind_targets(&mut self, stage: &Stage) {
        self.bindings = self
            .sheet
            .cues
            .iter()
            .map(|cue| resolve_targets(stage, self.root, cue))
            .collect();

        for binding in &self.bindings {
            for &id in binding {
                if self.tracked.insert(id) {
                    self.nodes.push(TrackedNode {
                        id,
                        base_style: stage.element(id).style_text(),
                    });
                }
            }
        }
    }

    fn restore_node_styles(&self, stage: &mut Stage) {
        for node in &self.nodes {
            stage
                .element_mut(node.id)
                .set_style_text(node.base_style.as_deref());
        }
    }

    /// Put every element into its first `in` cue's `from` state so nothing
    /// flashes fully-styled before its entrance fires.
    fn apply_initial_states(&mut self, stage: &mut Stage) {
        let mut assigned: HashSet<ElementId> = HashSet::new();
        let mut initial: Vec<(ElementId, usize)> = Vec::new();
        for (index, cue) in self.sheet.cues.iter().enumerate() {
            if !matches!(cue.action, CueAction::In { .. }) {
                continue;
            }
            for &id in &self.bindings[index] {
                if assigned.insert(id) {
                    initial.push((id, index));
                }
            }
        }

        for (id, index) in initial {
            let from = match &self.sheet.cues[index].action {
                CueAction::In { preset, from, .. } => {
                    let phase = self
                        .presets
                        .phase(preset.as_deref().unwrap_or(""), PhaseKind::In);
                    match from {
                        Some(overrides) => phase.from.merged_with(overrides),
                        None => phase.from,
                    }
                }
                _ => continue,
            };
            self.applicator.set(stage, &[id], &from);
        }
    }

    fn process_until(&mut self, stage: &mut Stage, clock_time_sec: f64) {
        while self.next_cue < self.sheet.cues.len()
            && self.sheet.cues[self.next_cue].at <= clock_time_sec + CLOCK_EPSILON_SECS
        {
            self.apply_cue(stage, self.next_cue);
            self.next_cue += 1;
        }
        self.last_clock_sec = clock_time_sec;
    }

    fn apply_cue(&mut self, stage: &mut Stage, index: usize) {
        if self.bindings[index].is_empty() {
            return;
        }

        match &self.sheet.cues[index].action {
            CueAction::ClassAdd { class_name } => {
                if let Some(class_name) = class_name {
                    for &id in &self.bindings[index] {
                        stage.element_mut(id).add_class(class_name);
                    }
                }
            }
            CueAction::ClassRemove { class_name } => {
                if let Some(class_name) = class_name {
                    for &id in &self.bindings[index] {
                        stage.element_mut(id).remove_class(class_name);
                    }
                }
            }
            CueAction::Set { vars } => {
                if let Some(vars) = vars.clone() {
                    self.applicator.set(stage, &self.bindings[index], &vars);
                }
            }
            CueAction::Out { preset, to, timing } => {
                let phase = self
                    .presets
                    .phase(preset.as_deref().unwrap_or(""), PhaseKind::Out);
                let mut vars = phase.to;
                if let Some(overrides) = to {
                    vars = vars.merged_with(overrides);
                }
                let vars = timing.overlay_onto(vars);
                self.applicator
                    .animate_out(stage, &self.bindings[index], &vars);
            }
            CueAction::In {
                preset,
                from,
                to,
                timing,
            } => {
                let phase = self
                    .presets
                    .phase(preset.as_deref().unwrap_or(""), PhaseKind::In);
                let from_vars = match from {
                    Some(overrides) => phase.from.merged_with(overrides),
                    None => phase.from,
                };
                let mut to_vars = phase.to;
                if let Some(overrides) = to {
                    to_vars = to_vars.merged_with(overrides);
                }
                let to_vars = timing.overlay_onto(to_vars);
                self.applicator
                    .animate_in(stage, &self.bindings[index], &from_vars, &to_vars);
            }
        }
    }
}
