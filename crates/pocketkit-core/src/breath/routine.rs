//! Built-in routine catalog and the quick-access picks.

use serde::Serialize;

use super::pattern::BreathPattern;
use crate::error::{Result, ValidationError};
use crate::storage::Database;

/// A guided routine: one pattern run for a fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreathRoutine {
    pub title: &'static str,
    pub description: &'static str,
    pub duration_secs: u64,
    pub pattern: BreathPattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreathCategory {
    pub title: &'static str,
    pub routines: &'static [BreathRoutine],
}

const RELAXATION: [BreathRoutine; 2] = [
    BreathRoutine {
        title: "Diaphragmatic (Abdominal) Breathing",
        description: "Sit or lie down comfortably, placing one hand on your chest and the other on your belly. Breathe in deeply through your nose, allowing your diaphragm to expand.",
        duration_secs: 600,
        pattern: BreathPattern::Diaphragmatic,
    },
    BreathRoutine {
        title: "4-7-8 Breathing (Relaxing Breath)",
        description: "Inhale through your nose for a count of 4, hold your breath for a count of 7, and exhale completely through your mouth for a count of 8.",
        duration_secs: 300,
        pattern: BreathPattern::FourSevenEight,
    },
];

const PERFORMANCE: [BreathRoutine; 2] = [
    BreathRoutine {
        title: "Rhythmic Running Breath",
        description: "Inhale for 3 steps and exhale for 2 steps while running. Adjust according to your pace and comfort level.",
        duration_secs: 300,
        pattern: BreathPattern::RhythmicRunning,
    },
    BreathRoutine {
        title: "Pursed-Lip Breathing",
        description: "Inhale through your nose and exhale through pursed lips, controlling the exhale to make it longer.",
        duration_secs: 300,
        pattern: BreathPattern::PursedLip,
    },
];

const ENERGY: [BreathRoutine; 3] = [
    BreathRoutine {
        title: "Bellows Breath (Bhastrika)",
        description: "Sit comfortably, inhale and exhale forcefully through the nose, keeping the mouth closed. Engage your diaphragm to create a quick, rhythmic breath.",
        duration_secs: 90,
        pattern: BreathPattern::BellowsBreath,
    },
    BreathRoutine {
        title: "Breath of Fire",
        description: "Take a deep breath in, and then forcefully exhale out of your nose by contracting your abdominal muscles. Inhale passively.",
        duration_secs: 60,
        pattern: BreathPattern::BreathOfFire,
    },
    BreathRoutine {
        title: "Box Breathing",
        description: "Inhale for a count of 4, hold for 4, exhale for 4, and hold again for 4.",
        duration_secs: 300,
        pattern: BreathPattern::BoxBreathing,
    },
];

const ANXIETY: [BreathRoutine; 3] = [
    BreathRoutine {
        title: "Alternate Nostril Breathing (Nadi Shodhana)",
        description: "Use thumb to close right nostril, inhale through left. Close left with ring finger, exhale through right. Inhale right, exhale left.",
        duration_secs: 600,
        pattern: BreathPattern::AlternateNostril,
    },
    BreathRoutine {
        title: "5-5-5 Breathing (Counted Breathing)",
        description: "Inhale through your nose for a count of 5, hold for 5, then exhale for 5.",
        duration_secs: 300,
        pattern: BreathPattern::FiveFiveFive,
    },
    BreathRoutine {
        title: "Lengthened Exhale Breathing",
        description: "Inhale slowly through your nose for a count of 4, then exhale through your mouth for a count of 6 or 8.",
        duration_secs: 300,
        pattern: BreathPattern::LengthenedExhale,
    },
];

const SLEEP: [BreathRoutine; 2] = [
    BreathRoutine {
        title: "Deep Breathing with Visualization",
        description: "Inhale deeply and visualize a calm, peaceful place. Exhale slowly, imagining stress and tension leaving your body.",
        duration_secs: 600,
        pattern: BreathPattern::DeepVisualization,
    },
    BreathRoutine {
        title: "Coherent Breathing",
        description: "Breathe in for 5 seconds and out for 5 seconds, maintaining a rhythmic pattern.",
        duration_secs: 600,
        pattern: BreathPattern::CoherentBreathing,
    },
];

const PAIN: [BreathRoutine; 2] = [
    BreathRoutine {
        title: "Slow Body Scan",
        description: "Inhale deeply and slowly, focusing on each part of your body, starting from your toes and working upward. Visualize relaxing each area with each breath.",
        duration_secs: 600,
        pattern: BreathPattern::SlowBodyScan,
    },
    BreathRoutine {
        title: "Mindful Counting",
        description: "Count as you breathe in and out, keeping your mind focused on the counting to distract from pain.",
        duration_secs: 600,
        pattern: BreathPattern::MindfulCounting,
    },
];

/// The built-in catalog, in display order.
pub const CATALOG: [BreathCategory; 6] = [
    BreathCategory {
        title: "Relaxation & Stress Relief",
        routines: &RELAXATION,
    },
    BreathCategory {
        title: "Physical Performance",
        routines: &PERFORMANCE,
    },
    BreathCategory {
        title: "Energy & Focus",
        routines: &ENERGY,
    },
    BreathCategory {
        title: "Anxiety & Panic Management",
        routines: &ANXIETY,
    },
    BreathCategory {
        title: "Sleep",
        routines: &SLEEP,
    },
    BreathCategory {
        title: "Pain Management",
        routines: &PAIN,
    },
];

pub fn catalog() -> &'static [BreathCategory] {
    &CATALOG
}

/// Every routine across all categories.
pub fn all_routines() -> impl Iterator<Item = &'static BreathRoutine> {
    CATALOG.iter().flat_map(|c| c.routines.iter())
}

impl BreathPattern {
    /// The catalog routine that uses this pattern.
    pub fn routine(self) -> &'static BreathRoutine {
        match self {
            BreathPattern::Diaphragmatic => &RELAXATION[0],
            BreathPattern::FourSevenEight => &RELAXATION[1],
            BreathPattern::RhythmicRunning => &PERFORMANCE[0],
            BreathPattern::PursedLip => &PERFORMANCE[1],
            BreathPattern::BellowsBreath => &ENERGY[0],
            BreathPattern::BreathOfFire => &ENERGY[1],
            BreathPattern::BoxBreathing => &ENERGY[2],
            BreathPattern::AlternateNostril => &ANXIETY[0],
            BreathPattern::FiveFiveFive => &ANXIETY[1],
            BreathPattern::LengthenedExhale => &ANXIETY[2],
            BreathPattern::DeepVisualization => &SLEEP[0],
            BreathPattern::CoherentBreathing => &SLEEP[1],
            BreathPattern::SlowBodyScan => &PAIN[0],
            BreathPattern::MindfulCounting => &PAIN[1],
        }
    }
}

/// Colour used for a routine in session history and charts.
pub fn history_color(title: &str) -> &'static str {
    match title {
        "Slow Body Scan" => "#FFA166",
        "Mindful Counting" => "#A2C374",
        other => all_routines()
            .find(|r| r.title == other)
            .map(|r| r.pattern.gradient()[0])
            .unwrap_or("#A5CAD2"),
    }
}

const QUICK_PICKS_KEY: &str = "quick_access_routines";

/// Quick-access picks shown at the top of the catalog.
pub struct QuickPicks;

impl QuickPicks {
    pub const LIMIT: usize = 3;

    pub fn load(db: &Database) -> Result<Vec<BreathPattern>> {
        Ok(db
            .kv_get_json::<Vec<BreathPattern>>(QUICK_PICKS_KEY)?
            .unwrap_or_default())
    }

    /// Append a pick. Adding one that is already present is a no-op.
    pub fn add(db: &Database, pattern: BreathPattern) -> Result<Vec<BreathPattern>> {
        let mut picks = Self::load(db)?;
        if picks.contains(&pattern) {
            return Ok(picks);
        }
        if picks.len() >= Self::LIMIT {
            return Err(ValidationError::LimitReached {
                collection: "quick picks",
                limit: Self::LIMIT,
            }
            .into());
        }
        picks.push(pattern);
        db.kv_set_json(QUICK_PICKS_KEY, &picks)?;
        Ok(picks)
    }

    pub fn remove(db: &Database, pattern: BreathPattern) -> Result<Vec<BreathPattern>> {
        let mut picks = Self::load(db)?;
        picks.retain(|p| *p != pattern);
        db.kv_set_json(QUICK_PICKS_KEY, &picks)?;
        Ok(picks)
    }
}
