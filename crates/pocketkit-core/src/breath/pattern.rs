//! Breathing patterns and the phase lookup tables that drive them.
//!
//! Every pattern except bellows breath is a fixed cycle: the remaining
//! countdown modulo the cycle length selects a row of the pattern's table.
//! Rows are ordered by descending threshold; the first row whose threshold
//! is not above the position in the cycle is the active phase.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreathPattern {
    Diaphragmatic,
    FourSevenEight,
    BellowsBreath,
    BreathOfFire,
    BoxBreathing,
    AlternateNostril,
    FiveFiveFive,
    LengthenedExhale,
    DeepVisualization,
    CoherentBreathing,
    RhythmicRunning,
    PursedLip,
    SlowBodyScan,
    MindfulCounting,
}

/// One row of a cycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePhase {
    /// Position in the cycle (seconds, counted from the cycle's end) at
    /// which this phase begins.
    pub threshold: u32,
    pub label: &'static str,
    /// Whether the circles are expanded during this phase.
    pub expand: bool,
    /// Whether the phase shows a countdown.
    pub counts: bool,
}

/// How a pattern maps the countdown onto phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rhythm {
    Cycle {
        length: u32,
        phases: &'static [CyclePhase],
    },
    /// Rapid breathing in rounds separated by rests.
    Rounds {
        active_secs: u32,
        rest_secs: u32,
        rounds: u32,
    },
}

/// What the session screen shows for one second of the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFrame {
    pub label: String,
    /// Countdown shown above the label; 0 hides it.
    pub hold: u32,
    /// Animation target: expanded (inhale/hold-in) or contracted.
    pub expand: bool,
}

/// Scale targets for the outer, middle and inner circles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleScales {
    pub outer: f64,
    pub middle: f64,
    pub inner: f64,
}

impl PhaseFrame {
    /// Frame shown before the first tick of a session.
    pub fn initial() -> Self {
        Self {
            label: "Inhale".into(),
            hold: 0,
            expand: false,
        }
    }

    pub fn scales(&self) -> CircleScales {
        if self.expand {
            CircleScales {
                outer: 1.3,
                middle: 1.4,
                inner: 1.5,
            }
        } else {
            CircleScales {
                outer: 1.0,
                middle: 1.0,
                inner: 1.0,
            }
        }
    }
}

const fn phase(threshold: u32, label: &'static str, expand: bool) -> CyclePhase {
    CyclePhase {
        threshold,
        label,
        expand,
        counts: true,
    }
}

const fn uncounted(threshold: u32, label: &'static str, expand: bool) -> CyclePhase {
    CyclePhase {
        threshold,
        label,
        expand,
        counts: false,
    }
}

const DIAPHRAGMATIC: [CyclePhase; 2] = [uncounted(4, "Inhale", true), uncounted(0, "Exhale", false)];

const FOUR_SEVEN_EIGHT: [CyclePhase; 3] = [
    phase(15, "Inhale (4)", true),
    phase(8, "Hold (7)", true),
    phase(0, "Exhale (8)", false),
];

const BOX: [CyclePhase; 4] = [
    phase(12, "Inhale", true),
    phase(8, "Hold", true),
    phase(4, "Exhale", false),
    phase(0, "Hold", false),
];

const BREATH_OF_FIRE: [CyclePhase; 2] = [
    uncounted(1, "Passive In", true),
    uncounted(0, "Force Out", false),
];

const FIVE_FIVE_FIVE: [CyclePhase; 3] = [
    phase(10, "Inhale (5)", true),
    phase(5, "Hold (5)", true),
    phase(0, "Exhale (5)", false),
];

const COHERENT: [CyclePhase; 2] = [phase(5, "Inhale (5)", true), phase(0, "Exhale (5)", false)];

const ALTERNATE_NOSTRIL: [CyclePhase; 4] = [
    phase(15, "Right Nostril In", true),
    phase(10, "Left Nostril Out", false),
    phase(5, "Left Nostril In", true),
    phase(0, "Right Nostril Out", false),
];

const LENGTHENED_EXHALE: [CyclePhase; 2] = [
    phase(8, "Inhale (4)", true),
    phase(0, "Long Exhale (8)", false),
];

const DEEP_VISUALIZATION: [CyclePhase; 2] = [
    phase(5, "Inhale & Visualize Peace", true),
    phase(0, "Release Tension", false),
];

const RHYTHMIC_RUNNING: [CyclePhase; 2] = [
    phase(2, "Inhale (3 Steps)", true),
    phase(0, "Exhale (2 Steps)", false),
];

const PURSED_LIP: [CyclePhase; 2] = [
    phase(5, "Nose Inhale (3)", true),
    phase(0, "Pursed Exhale (5)", false),
];

const SLOW_BODY_SCAN: [CyclePhase; 2] = [
    phase(6, "Inhale & Scan Up", true),
    phase(0, "Exhale & Relax", false),
];

const MINDFUL_COUNTING: [CyclePhase; 2] = [
    phase(4, "In & Count Up", true),
    phase(0, "Out & Count Down", false),
];

impl BreathPattern {
    pub const ALL: [BreathPattern; 14] = [
        BreathPattern::Diaphragmatic,
        BreathPattern::FourSevenEight,
        BreathPattern::BellowsBreath,
        BreathPattern::BreathOfFire,
        BreathPattern::BoxBreathing,
        BreathPattern::AlternateNostril,
        BreathPattern::FiveFiveFive,
        BreathPattern::LengthenedExhale,
        BreathPattern::DeepVisualization,
        BreathPattern::CoherentBreathing,
        BreathPattern::RhythmicRunning,
        BreathPattern::PursedLip,
        BreathPattern::SlowBodyScan,
        BreathPattern::MindfulCounting,
    ];

    /// Stable kebab-case key used in storage and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            BreathPattern::Diaphragmatic => "diaphragmatic",
            BreathPattern::FourSevenEight => "four-seven-eight",
            BreathPattern::BellowsBreath => "bellows-breath",
            BreathPattern::BreathOfFire => "breath-of-fire",
            BreathPattern::BoxBreathing => "box-breathing",
            BreathPattern::AlternateNostril => "alternate-nostril",
            BreathPattern::FiveFiveFive => "five-five-five",
            BreathPattern::LengthenedExhale => "lengthened-exhale",
            BreathPattern::DeepVisualization => "deep-visualization",
            BreathPattern::CoherentBreathing => "coherent-breathing",
            BreathPattern::RhythmicRunning => "rhythmic-running",
            BreathPattern::PursedLip => "pursed-lip",
            BreathPattern::SlowBodyScan => "slow-body-scan",
            BreathPattern::MindfulCounting => "mindful-counting",
        }
    }

    pub fn rhythm(self) -> Rhythm {
        let cycle = |phases: &'static [CyclePhase]| Rhythm::Cycle {
            length: cycle_length(self),
            phases,
        };
        match self {
            BreathPattern::Diaphragmatic => cycle(&DIAPHRAGMATIC),
            BreathPattern::FourSevenEight => cycle(&FOUR_SEVEN_EIGHT),
            BreathPattern::BellowsBreath => Rhythm::Rounds {
                active_secs: 30,
                rest_secs: 15,
                rounds: 3,
            },
            BreathPattern::BreathOfFire => cycle(&BREATH_OF_FIRE),
            BreathPattern::BoxBreathing => cycle(&BOX),
            BreathPattern::AlternateNostril => cycle(&ALTERNATE_NOSTRIL),
            BreathPattern::FiveFiveFive => cycle(&FIVE_FIVE_FIVE),
            BreathPattern::LengthenedExhale => cycle(&LENGTHENED_EXHALE),
            BreathPattern::DeepVisualization => cycle(&DEEP_VISUALIZATION),
            BreathPattern::CoherentBreathing => cycle(&COHERENT),
            BreathPattern::RhythmicRunning => cycle(&RHYTHMIC_RUNNING),
            BreathPattern::PursedLip => cycle(&PURSED_LIP),
            BreathPattern::SlowBodyScan => cycle(&SLOW_BODY_SCAN),
            BreathPattern::MindfulCounting => cycle(&MINDFUL_COUNTING),
        }
    }

    /// Seconds per cycle (per round, including rest, for bellows breath).
    pub fn cycle_secs(self) -> u32 {
        match self.rhythm() {
            Rhythm::Cycle { length, .. } => length,
            Rhythm::Rounds {
                active_secs,
                rest_secs,
                ..
            } => active_secs + rest_secs,
        }
    }

    /// Duration of one circle animation, in seconds.
    pub fn animation_secs(self) -> f64 {
        match self {
            BreathPattern::Diaphragmatic => 4.0,
            BreathPattern::FourSevenEight => 4.0,
            BreathPattern::BellowsBreath => 1.0,
            BreathPattern::BreathOfFire => 1.0,
            BreathPattern::BoxBreathing => 4.0,
            BreathPattern::AlternateNostril => 5.0,
            BreathPattern::FiveFiveFive => 5.0,
            BreathPattern::LengthenedExhale => 6.0,
            BreathPattern::DeepVisualization => 5.0,
            BreathPattern::CoherentBreathing => 5.0,
            BreathPattern::RhythmicRunning => 3.0,
            BreathPattern::PursedLip => 4.0,
            BreathPattern::SlowBodyScan => 6.0,
            BreathPattern::MindfulCounting => 4.0,
        }
    }

    /// Session screen gradient as `[circle, accent]` hex colours.
    pub fn gradient(self) -> [&'static str; 2] {
        match self {
            BreathPattern::Diaphragmatic => ["#A5CAD2", "#FF7B89"],
            BreathPattern::FourSevenEight => ["#8A5082", "#A5CAD2"],
            BreathPattern::BellowsBreath => ["#438BD3", "#FF9DDA"],
            BreathPattern::BreathOfFire => ["#EE4392", "#004E99"],
            BreathPattern::BoxBreathing => ["#004E99", "#BCE6FF"],
            BreathPattern::AlternateNostril => ["#9FA5D5", "#E0F8F7"],
            BreathPattern::FiveFiveFive => ["#D9AAC7", "#3127A8"],
            BreathPattern::LengthenedExhale => ["#451E61", "#FB8E6A"],
            BreathPattern::DeepVisualization => ["#447A7A", "#F9E866"],
            BreathPattern::CoherentBreathing => ["#F1EAB9", "#FF8C8C"],
            BreathPattern::RhythmicRunning => ["#D8B5FF", "#1EAE98"],
            BreathPattern::PursedLip => ["#2B4C59", "#988080"],
            BreathPattern::SlowBodyScan => ["#F36A8F", "#5048FF"],
            BreathPattern::MindfulCounting => ["#FFA166", "#5048FF"],
        }
    }
}

fn cycle_length(pattern: BreathPattern) -> u32 {
    match pattern {
        BreathPattern::Diaphragmatic => 8,
        BreathPattern::FourSevenEight => 19,
        BreathPattern::BellowsBreath => 45,
        BreathPattern::BreathOfFire => 2,
        BreathPattern::BoxBreathing => 16,
        BreathPattern::AlternateNostril => 20,
        BreathPattern::FiveFiveFive => 15,
        BreathPattern::LengthenedExhale => 12,
        BreathPattern::DeepVisualization => 10,
        BreathPattern::CoherentBreathing => 10,
        BreathPattern::RhythmicRunning => 5,
        BreathPattern::PursedLip => 8,
        BreathPattern::SlowBodyScan => 12,
        BreathPattern::MindfulCounting => 8,
    }
}

/// Compute the frame for `pattern` with `remaining_secs` left on the clock.
pub fn phase_at(pattern: BreathPattern, remaining_secs: u32) -> PhaseFrame {
    match pattern.rhythm() {
        Rhythm::Cycle { length, phases } => {
            let position = remaining_secs % length;
            let row = phases
                .iter()
                .find(|p| position >= p.threshold)
                .or_else(|| phases.last())
                .copied()
                .unwrap_or(CyclePhase {
                    threshold: 0,
                    label: "Inhale",
                    expand: false,
                    counts: false,
                });
            PhaseFrame {
                label: row.label.to_string(),
                hold: if row.counts {
                    position - row.threshold
                } else {
                    0
                },
                expand: row.expand,
            }
        }
        Rhythm::Rounds {
            active_secs,
            rest_secs,
            rounds,
        } => {
            let round_len = active_secs + rest_secs;
            let round = remaining_secs / round_len + 1;
            if round > rounds {
                return PhaseFrame {
                    label: "Complete".into(),
                    hold: 0,
                    expand: false,
                };
            }

            let in_round = remaining_secs % round_len;
            if in_round > rest_secs {
                let (breath, expand) = if in_round % 2 >= 1 {
                    ("Quick Inhale", true)
                } else {
                    ("Quick Exhale", false)
                };
                PhaseFrame {
                    label: format!("{breath} (Round {round}/{rounds})"),
                    hold: 0,
                    expand,
                }
            } else {
                PhaseFrame {
                    label: format!("Rest ({in_round}s)"),
                    hold: in_round,
                    expand: false,
                }
            }
        }
    }
}

impl fmt::Display for BreathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BreathPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BreathPattern::ALL
            .into_iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| ValidationError::UnknownItem {
                kind: "breathing pattern",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(label: &str, hold: u32, expand: bool) -> PhaseFrame {
        PhaseFrame {
            label: label.into(),
            hold,
            expand,
        }
    }

    #[test]
    fn box_breathing_table() {
        let p = BreathPattern::BoxBreathing;
        // 299 % 16 = 11
        assert_eq!(phase_at(p, 299), frame("Hold", 3, true));
        assert_eq!(phase_at(p, 15), frame("Inhale", 3, true));
        assert_eq!(phase_at(p, 12), frame("Inhale", 0, true));
        assert_eq!(phase_at(p, 11), frame("Hold", 3, true));
        assert_eq!(phase_at(p, 7), frame("Exhale", 3, false));
        assert_eq!(phase_at(p, 3), frame("Hold", 3, false));
        assert_eq!(phase_at(p, 0), frame("Hold", 0, false));
    }

    #[test]
    fn four_seven_eight_table() {
        let p = BreathPattern::FourSevenEight;
        assert_eq!(phase_at(p, 18), frame("Inhale (4)", 3, true));
        assert_eq!(phase_at(p, 14), frame("Hold (7)", 6, true));
        assert_eq!(phase_at(p, 7), frame("Exhale (8)", 7, false));
        // 299 % 19 = 14
        assert_eq!(phase_at(p, 299), frame("Hold (7)", 6, true));
    }

    #[test]
    fn uncounted_patterns_never_show_a_hold() {
        for r in 0..40 {
            assert_eq!(phase_at(BreathPattern::Diaphragmatic, r).hold, 0);
            assert_eq!(phase_at(BreathPattern::BreathOfFire, r).hold, 0);
        }
        assert_eq!(phase_at(BreathPattern::Diaphragmatic, 5).label, "Inhale");
        assert_eq!(phase_at(BreathPattern::Diaphragmatic, 3).label, "Exhale");
        assert_eq!(phase_at(BreathPattern::BreathOfFire, 59).label, "Passive In");
        assert_eq!(phase_at(BreathPattern::BreathOfFire, 58).label, "Force Out");
    }

    #[test]
    fn alternate_nostril_switches_sides() {
        let p = BreathPattern::AlternateNostril;
        assert_eq!(phase_at(p, 19).label, "Right Nostril In");
        assert_eq!(phase_at(p, 14).label, "Left Nostril Out");
        assert_eq!(phase_at(p, 9).label, "Left Nostril In");
        assert_eq!(phase_at(p, 4).label, "Right Nostril Out");
    }

    #[test]
    fn bellows_rounds_and_rests() {
        let p = BreathPattern::BellowsBreath;
        // 89 is 44s into round 2: an even second breathes out.
        assert_eq!(phase_at(p, 89), frame("Quick Exhale (Round 2/3)", 0, false));
        assert_eq!(phase_at(p, 88), frame("Quick Inhale (Round 2/3)", 0, true));
        // 60 → round 2, 15s in: rest boundary.
        assert_eq!(phase_at(p, 60), frame("Rest (15s)", 15, false));
        assert_eq!(phase_at(p, 16), frame("Quick Exhale (Round 1/3)", 0, false));
        assert_eq!(phase_at(p, 0), frame("Rest (0s)", 0, false));
        // Past the third round the routine is over.
        assert_eq!(phase_at(p, 135), frame("Complete", 0, false));
    }

    #[test]
    fn every_pattern_round_trips_through_its_key() {
        for p in BreathPattern::ALL {
            assert_eq!(p.key().parse::<BreathPattern>().unwrap(), p);
        }
        assert_eq!(
            "BOX_BREATHING".parse::<BreathPattern>().unwrap(),
            BreathPattern::BoxBreathing
        );
        assert!("square".parse::<BreathPattern>().is_err());
    }

    #[test]
    fn serde_uses_keys() {
        let json = serde_json::to_string(&BreathPattern::FourSevenEight).unwrap();
        assert_eq!(json, "\"four-seven-eight\"");
    }

    #[test]
    fn cycle_tables_start_at_zero() {
        for p in BreathPattern::ALL {
            if let Rhythm::Cycle { length, phases } = p.rhythm() {
                assert_eq!(phases.last().unwrap().threshold, 0, "{p}");
                assert!(phases.first().unwrap().threshold < length, "{p}");
                assert!(phases.windows(2).all(|w| w[0].threshold > w[1].threshold), "{p}");
            }
        }
    }

    #[test]
    fn scales_follow_expansion() {
        let expanded = PhaseFrame { expand: true, ..PhaseFrame::initial() }.scales();
        assert_eq!(expanded.inner, 1.5);
        assert_eq!(PhaseFrame::initial().scales().outer, 1.0);
    }

    proptest! {
        #[test]
        fn cycle_patterns_repeat(idx in 0usize..14, r in 0u32..10_000) {
            let p = BreathPattern::ALL[idx];
            prop_assume!(p != BreathPattern::BellowsBreath);
            prop_assert_eq!(phase_at(p, r), phase_at(p, r + p.cycle_secs()));
        }

        #[test]
        fn hold_stays_inside_the_cycle(idx in 0usize..14, r in 0u32..10_000) {
            let p = BreathPattern::ALL[idx];
            prop_assert!(phase_at(p, r).hold < p.cycle_secs());
        }
    }
}
