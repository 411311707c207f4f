use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::rules::SynthesisRules;

static TIME_OR_TEMP_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // 12 minutes, 4 hrs, 180°C, 350 ° F, 200 degrees
    Regex::new(r"(?i)\b\d+\s*(?:(?:minutes?|mins?|hours?|hrs?|degrees)\b|°)").ok()
});

/// Coarse purpose of a cooking step. Declaration order is emission order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Prep,
    Mix,
    Rest,
    Cook,
    Finish,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [Phase::Prep, Phase::Mix, Phase::Rest, Phase::Cook, Phase::Finish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prep => "prep",
            Phase::Mix => "mix",
            Phase::Rest => "rest",
            Phase::Cook => "cook",
            Phase::Finish => "finish",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the text mentions a duration or a temperature with a number.
pub fn has_time_or_temp(text: &str) -> bool {
    TIME_OR_TEMP_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

/// Phase of a single step.
///
/// Phases are tried in priority order and the first whose keyword table has a
/// substring hit on the lower-cased text wins. With no keyword hit a numeric
/// time/temperature mention means `Cook`, anything else is `Mix`.
pub fn classify_phase(rules: &SynthesisRules, step: &str) -> Phase {
    let low = step.to_lowercase();
    for phase in Phase::ORDER {
        if rules
            .keywords_for(phase)
            .iter()
            .any(|kw| low.contains(kw.as_str()))
        {
            return phase;
        }
    }
    if has_time_or_temp(&low) {
        return Phase::Cook;
    }
    Phase::Mix
}

/// Stable partition of `steps` into phase order.
///
/// Steps sharing a phase keep their original relative order; nothing is
/// dropped or duplicated.
pub fn reorder_steps(rules: &SynthesisRules, steps: &[String]) -> Vec<String> {
    let mut tagged: Vec<(Phase, &String)> = steps
        .iter()
        .map(|s| (classify_phase(rules, s), s))
        .collect();
    // sort_by_key is stable
    tagged.sort_by_key(|(phase, _)| *phase);
    tagged.into_iter().map(|(_, s)| s.clone()).collect()
}
