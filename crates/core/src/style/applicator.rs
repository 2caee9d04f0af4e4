use segue_stage::{ElementId, Stage};

use super::vars::{StyleValue, StyleVars};

/// Keys that describe tween timing rather than a visual property. The
/// static fallback must not write these into inline styles.
const SKIP_STYLE_KEYS: [&str; 7] = [
    "duration",
    "ease",
    "delay",
    "stagger",
    "overwrite",
    "onComplete",
    "onStart",
];

const GEOMETRY_KEYS: [&str; 4] = ["x", "y", "scale", "rotate"];

/// The optional external tweening capability. Given style endpoints and
/// timing, it animates a set of elements; it is also responsible for
/// cancelling its own in-flight work when asked.
pub trait TweenEngine: Send {
    fn kill_tweens(&mut self, stage: &mut Stage, nodes: &[ElementId]);
    fn set(&mut self, stage: &mut Stage, nodes: &[ElementId], vars: &StyleVars);
    fn tween_from_to(
        &mut self,
        stage: &mut Stage,
        nodes: &[ElementId],
        from: &StyleVars,
        to: &StyleVars,
    );
    fn tween_to(&mut self, stage: &mut Stage, nodes: &[ElementId], to: &StyleVars);
}

/// How the engine writes styles. Selected once at startup: tween-backed
/// when a [`TweenEngine`] is on hand, static otherwise.
pub trait StyleApplicator: Send {
    fn set(&mut self, stage: &mut Stage, nodes: &[ElementId], vars: &StyleVars);
    fn animate_in(
        &mut self,
        stage: &mut Stage,
        nodes: &[ElementId],
        from: &StyleVars,
        to: &StyleVars,
    );
    fn animate_out(&mut self, stage: &mut Stage, nodes: &[ElementId], to: &StyleVars);

    /// Whether this applicator produces motion (as opposed to jumping
    /// straight to end states).
    fn is_animated(&self) -> bool;
}

/// Delegates to a tween engine, cancelling any in-flight tween on the same
/// nodes first so the latest instruction always wins.
pub struct TweenApplicator {
    engine: Box<dyn TweenEngine>,
}

impl TweenApplicator {
    pub fn new(engine: Box<dyn TweenEngine>) -> Self {
        Self { engine }
    }
}

impl StyleApplicator for TweenApplicator {
    fn set(&mut self, stage: &mut Stage, nodes: &[ElementId], vars: &StyleVars) {
        if nodes.is_empty() {
            return;
        }
        self.engine.set(stage, nodes, vars);
    }

    fn animate_in(
        &mut self,
        stage: &mut Stage,
        nodes: &[ElementId],
        from: &StyleVars,
        to: &StyleVars,
    ) {
        if nodes.is_empty() {
            return;
        }
        self.engine.kill_tweens(stage, nodes);
        self.engine.tween_from_to(stage, nodes, from, to);
    }

    fn animate_out(&mut self, stage: &mut Stage, nodes: &[ElementId], to: &StyleVars) {
        if nodes.is_empty() {
            return;
        }
        self.engine.kill_tweens(stage, nodes);
        self.engine.tween_to(stage, nodes, to);
    }

    fn is_animated(&self) -> bool {
        true
    }
}

/// Pure-styling fallback used when no tween engine is present: no motion,
/// but every instruction still lands on its end state.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticApplicator;

impl StaticApplicator {
    pub fn new() -> Self {
        Self
    }
}

impl StyleApplicator for StaticApplicator {
    fn set(&mut self, stage: &mut Stage, nodes: &[ElementId], vars: &StyleVars) {
        for &node in nodes {
            apply_static_vars(stage, node, vars);
        }
    }

    fn animate_in(
        &mut self,
        stage: &mut Stage,
        nodes: &[ElementId],
        _from: &StyleVars,
        to: &StyleVars,
    ) {
        for &node in nodes {
            apply_static_vars(stage, node, to);
        }
    }

    fn animate_out(&mut self, stage: &mut Stage, nodes: &[ElementId], to: &StyleVars) {
        for &node in nodes {
            apply_static_vars(stage, node, to);
        }
    }

    fn is_animated(&self) -> bool {
        false
    }
}

/// Write one bag of vars onto one element as plain inline styles.
/// `x`/`y`/`scale`/`rotate` fold into a single transform string in that
/// fixed order; `autoAlpha` drives opacity plus visibility; timing keys and
/// `clearProps` are skipped.
pub fn apply_static_vars(stage: &mut Stage, node: ElementId, vars: &StyleVars) {
    let element = stage.element_mut(node);

    let mut transforms = Vec::new();
    if let Some(x) = vars.get("x") {
        transforms.push(format!("translateX({}px)", x.to_css_string()));
    }
    if let Some(y) = vars.get("y") {
        transforms.push(format!("translateY({}px)", y.to_css_string()));
    }
    if let Some(scale) = vars.get("scale") {
        transforms.push(format!("scale({})", scale.to_css_string()));
    }
    if let Some(rotate) = vars.get("rotate") {
        transforms.push(format!("rotate({}deg)", rotate.to_css_string()));
    }
    if !transforms.is_empty() {
        element.set_style_property("transform", &transforms.join(" "));
    }

    for (key, value) in vars.iter() {
        if GEOMETRY_KEYS.contains(&key) || SKIP_STYLE_KEYS.contains(&key) {
            continue;
        }
        if key == "clearProps" {
            continue;
        }
        if key == "autoAlpha" {
            let alpha = value.as_f64().unwrap_or(0.0);
            element.set_style_property("opacity", &format!("{}", alpha));
            element.set_style_property(
                "visibility",
                if alpha <= 0.0 { "hidden" } else { "visible" },
            );
            continue;
        }
        element.set_style_property(key, &value.to_css_string());
    }
}

#[cfg(test)]
mod tests {
    use segue_stage::Element;

    use super::*;

    fn single_node_stage() -> (Stage, ElementId) {
        let mut stage = Stage::new();
        let root = stage.insert(None, Element::new("section"));
        let node = stage.insert(Some(root), Element::new("div"));
        (stage, node)
    }

    #[test]
    fn test_transform_composition_order() {
        let (mut stage, node) = single_node_stage();
        let vars = StyleVars::new()
            .with("rotate", 5.0)
            .with("x", 48.0)
            .with("scale", 0.94)
            .with("y", -10.0);
        apply_static_vars(&mut stage, node, &vars);
        assert_eq!(
            stage.element(node).style_property("transform"),
            Some("translateX(48px) translateY(-10px) scale(0.94) rotate(5deg)")
        );
    }

    #[test]
    fn test_timing_keys_are_not_styles() {
        let (mut stage, node) = single_node_stage();
        let vars = StyleVars::new()
            .with("opacity", 1.0)
            .with("duration", 0.6)
            .with("ease", "power2.out")
            .with("stagger", 0.12);
        apply_static_vars(&mut stage, node, &vars);

        let element = stage.element(node);
        assert_eq!(element.style_property("opacity"), Some("1"));
        assert_eq!(element.style_property("duration"), None);
        assert_eq!(element.style_property("ease"), None);
        assert_eq!(element.style_property("stagger"), None);
    }

    #[test]
    fn test_auto_alpha() {
        let (mut stage, node) = single_node_stage();
        apply_static_vars(&mut stage, node, &StyleVars::new().with("autoAlpha", 0.0));
        assert_eq!(stage.element(node).style_property("opacity"), Some("0"));
        assert_eq!(stage.element(node).style_property("visibility"), Some("hidden"));

        apply_static_vars(&mut stage, node, &StyleVars::new().with("autoAlpha", 0.8));
        assert_eq!(stage.element(node).style_property("opacity"), Some("0.8"));
        assert_eq!(stage.element(node).style_property("visibility"), Some("visible"));
    }

    #[test]
    fn test_static_animate_lands_on_end_state() {
        let (mut stage, node) = single_node_stage();
        let mut applicator = StaticApplicator::new();
        let from = StyleVars::new().with("opacity", 0.0).with("y", 16.0);
        let to = StyleVars::new().with("opacity", 1.0).with("y", 0.0);
        applicator.animate_in(&mut stage, &[node], &from, &to);

        let element = stage.element(node);
        assert_eq!(element.style_property("opacity"), Some("1"));
        assert_eq!(element.style_property("transform"), Some("translateY(0px)"));
    }
}
