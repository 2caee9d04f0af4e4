use std::collections::HashMap;

use super::preset::{fallback_phase, PhaseKind, Preset, PresetPhase};
use crate::style::vars::StyleVars;

/// Immutable lookup table from animation names (with aliases) to presets.
///
/// Constructed once and handed to the engine, so tests can run against a
/// custom table instead of a process-wide registry. Lookup never fails: an
/// unknown name degrades to the `fade` preset, and a missing phase degrades
/// to the built-in minimal fade.
#[derive(Clone, Debug, Default)]
pub struct PresetLibrary {
    presets: HashMap<String, Preset>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table shipped with the slide templates.
    pub fn builtin() -> Self {
        let mut library = Self::new();

        library.register(
            &["fade", "fadein", "FadeIn"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("y", 16.0),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("y", 0.0)
                        .with("duration", 0.6)
                        .with("ease", "power2.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("y", -10.0)
                        .with("duration", 0.35)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["fadeup", "slideup", "SlideUp"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("y", 32.0),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("y", 0.0)
                        .with("duration", 0.65)
                        .with("ease", "power2.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("y", -26.0)
                        .with("duration", 0.35)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["fadedown", "slidedown"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("y", -32.0),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("y", 0.0)
                        .with("duration", 0.65)
                        .with("ease", "power2.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("y", 26.0)
                        .with("duration", 0.35)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["slideleft"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("x", 48.0),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("x", 0.0)
                        .with("duration", 0.65)
                        .with("ease", "power2.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("x", -48.0)
                        .with("duration", 0.35)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["slideright"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("x", -48.0),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("x", 0.0)
                        .with("duration", 0.65)
                        .with("ease", "power2.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("x", 48.0)
                        .with("duration", 0.35)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["scalein", "ScaleIn"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("scale", 0.94),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("scale", 1.0)
                        .with("duration", 0.55)
                        .with("ease", "power1.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("scale", 0.97)
                        .with("duration", 0.3)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library.register(
            &["scaleout"],
            Preset::new(
                PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0).with("scale", 1.06),
                    to: StyleVars::new()
                        .with("opacity", 1.0)
                        .with("scale", 1.0)
                        .with("duration", 0.5)
                        .with("ease", "power1.out"),
                },
                PresetPhase {
                    from: StyleVars::new(),
                    to: StyleVars::new()
                        .with("opacity", 0.0)
                        .with("scale", 1.06)
                        .with("duration", 0.3)
                        .with("ease", "power1.in"),
                },
            ),
        );

        library
    }

    /// Register one preset under every listed name.
    pub fn register(&mut self, names: &[&str], preset: Preset) {
        for name in names {
            self.presets.insert(name.to_string(), preset.clone());
        }
    }

    /// Exact key first, then the normalized form, then `fade`.
    pub fn lookup(&self, name: &str) -> Option<&Preset> {
        let raw = name.trim();
        if !raw.is_empty() {
            if let Some(preset) = self.presets.get(raw) {
                return Some(preset);
            }
            if let Some(preset) = self.presets.get(&normalize_preset_key(raw)) {
                return Some(preset);
            }
        }
        self.presets.get("fade")
    }

    /// The requested phase of the named preset, with both lookup and phase
    /// fallbacks applied. Every `(name, kind)` pair yields a usable
    /// transition.
    pub fn phase(&self, name: &str, kind: PhaseKind) -> PresetPhase {
        let preset = self.lookup(name);
        let half = preset.and_then(|p| match kind {
            PhaseKind::In => p.enter.clone(),
            PhaseKind::Out => p.exit.clone(),
        });
        half.unwrap_or_else(|| fallback_phase(kind))
    }
}

/// Lower-cased with every non-alphanumeric character stripped, so
/// "Slide Up" and "slide-up" both reach "slideup".
fn normalize_preset_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::style::vars::StyleValue;

    use super::*;

    #[test]
    fn test_lookup_exact_and_normalized() {
        let library = PresetLibrary::builtin();
        assert!(library.lookup("fadeup").is_some());
        assert_eq!(library.lookup("Slide Up"), library.lookup("slideup"));
        assert_eq!(library.lookup("SCALE-IN"), library.lookup("scalein"));
    }

    #[test]
    fn test_unknown_name_degrades_to_fade() {
        let library = PresetLibrary::builtin();
        assert_eq!(library.lookup("wobble"), library.lookup("fade"));
        assert_eq!(library.lookup(""), library.lookup("fade"));

        let phase = library.phase("wobble", PhaseKind::In);
        assert_eq!(phase.from.get("y"), Some(&StyleValue::Num(16.0)));
    }

    #[test]
    fn test_missing_phase_gets_builtin_fallback() {
        let mut library = PresetLibrary::new();
        library.register(
            &["enter-only"],
            Preset {
                enter: Some(PresetPhase {
                    from: StyleVars::new().with("opacity", 0.0),
                    to: StyleVars::new().with("opacity", 1.0),
                }),
                exit: None,
            },
        );

        let out = library.phase("enter-only", PhaseKind::Out);
        assert_eq!(out.to.get("opacity"), Some(&StyleValue::Num(0.0)));
        assert_eq!(out.to.get("duration"), Some(&StyleValue::Num(0.35)));
    }

    #[test]
    fn test_empty_library_still_yields_transitions() {
        let library = PresetLibrary::new();
        let phase = library.phase("anything", PhaseKind::In);
        assert_eq!(phase.to.get("opacity"), Some(&StyleValue::Num(1.0)));
    }
}
