//! Vocabulary tables driving canonicalization, phase classification, step
//! merging and prep generation.
//!
//! The defaults are tuned for South-Asian steamed and batter dishes (idli,
//! rava idli, khaman/dhokla). Every table can be replaced wholesale or
//! partially overridden from JSON, the algorithms in the sibling modules only
//! ever read from here.

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

use super::canonical::title_case;
use super::phases::Phase;

/// Words that can sit right before "flour" without naming a flour.
const FLOUR_QUALIFIER_STOPWORDS: &[&str] = &[
    "the", "a", "an", "some", "more", "remaining", "all", "your", "of", "and", "or", "with",
    "in", "into", "to", "add", "sift", "sifted",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRule {
    pub alias: String,
    pub canonical: String,
}

/// Ingredient mentioned in "add ..." steps, with the spelling used when it is
/// written back into the merged sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveTerm {
    pub term: String,
    pub display: String,
}

/// Prep sentences emitted when every `requires` group has at least one member
/// among the merged ingredient names (lower-cased, exact match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepRule {
    pub name: String,
    pub requires: Vec<Vec<String>>,
    pub lines: Vec<String>,
}

/// Leavening agents that do the same job. When the preferred one is present
/// the redundant ones are dropped from ingredients and step text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveningRule {
    pub preferred: String,
    pub redundant: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisRules {
    pub aliases: Vec<AliasRule>,
    pub phase_keywords: BTreeMap<Phase, Vec<String>>,
    pub flour_terms: Vec<String>,
    pub dairy_terms: Vec<String>,
    pub mix_verbs: Vec<String>,
    pub additives: Vec<AdditiveTerm>,
    pub leavening: LeaveningRule,
    pub prep_rules: Vec<PrepRule>,
    /// Used when the fallback path has no source steps at all.
    pub default_instruction: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SynthesisRules {
    fn default() -> Self {
        let aliases = [
            ("curd", "yogurt"),
            ("dahi", "yogurt"),
            ("yoghurt", "yogurt"),
            ("yogurt", "yogurt"),
        ]
        .iter()
        .map(|(alias, canonical)| AliasRule {
            alias: alias.to_string(),
            canonical: canonical.to_string(),
        })
        .collect();

        let mut phase_keywords = BTreeMap::new();
        phase_keywords.insert(
            Phase::Prep,
            strings(&[
                "chop", "slice", "dice", "peel", "grate", "measure", "prepare", "trim", "wash",
                "soak",
            ]),
        );
        phase_keywords.insert(
            Phase::Mix,
            strings(&["mix", "whisk", "combine", "stir", "fold", "beat", "blend", "whip"]),
        );
        phase_keywords.insert(
            Phase::Rest,
            strings(&["rest", "let sit", "prove", "proof", "stand", "marinate"]),
        );
        phase_keywords.insert(
            Phase::Cook,
            strings(&[
                "steam", "bake", "fry", "saute", "simmer", "cook", "boil", "roast", "grill",
                "heat", "pressure",
            ]),
        );
        phase_keywords.insert(
            Phase::Finish,
            strings(&["garnish", "serve", "drizzle", "sprinkle", "plate"]),
        );

        let additives = [
            ("water", "water"),
            ("eno", "Eno"),
            ("baking soda", "baking soda"),
            ("sugar", "sugar"),
            ("salt", "salt"),
        ]
        .iter()
        .map(|(term, display)| AdditiveTerm {
            term: term.to_string(),
            display: display.to_string(),
        })
        .collect();

        let prep_rules = vec![
            PrepRule {
                name: "rice-and-urad-dal".to_string(),
                requires: vec![
                    strings(&["rice", "idli rice", "parboiled rice", "idli rice (parboiled)"]),
                    strings(&["urad dal", "urad", "black gram", "black-gram"]),
                ],
                lines: strings(&[
                    "Soak rice and urad dal separately for 4–6 hours, then drain.",
                    "Grind soaked rice and urad dal to a smooth batter and combine; ferment if required.",
                ]),
            },
            PrepRule {
                name: "semolina".to_string(),
                requires: vec![strings(&["semolina", "rava"])],
                lines: strings(&[
                    "Mix semolina with yogurt and water to make a batter; let it rest for 10–15 minutes if using semolina.",
                ]),
            },
            PrepRule {
                name: "flour-and-yogurt".to_string(),
                requires: vec![
                    strings(&["gram flour", "besan", "maida", "atta", "flour"]),
                    strings(&["yogurt", "curd", "dahi", "yoghurt"]),
                ],
                lines: strings(&[
                    "Whisk the flour and yogurt together, adding water gradually to form a smooth batter.",
                ]),
            },
        ];

        Self {
            aliases,
            phase_keywords,
            flour_terms: strings(&[
                "gram flour",
                "rice flour",
                "wheat flour",
                "corn flour",
                "besan",
                "semolina",
                "suji",
                "rava",
                "maida",
                "atta",
                "rice",
                "flour",
            ]),
            dairy_terms: strings(&["yogurt", "yoghurt", "curd", "dahi"]),
            mix_verbs: strings(&["mix", "whisk", "combine", "stir"]),
            additives,
            leavening: LeaveningRule {
                preferred: "eno".to_string(),
                redundant: strings(&["baking soda", "soda"]),
            },
            prep_rules,
            default_instruction: "Combine ingredients and cook as directed.".to_string(),
        }
    }
}

impl SynthesisRules {
    /// Canonical form registered for `alias` (already lower-cased), if any.
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|rule| rule.alias == alias)
            .map(|rule| rule.canonical.as_str())
    }

    pub fn keywords_for(&self, phase: Phase) -> &[String] {
        self.phase_keywords
            .get(&phase)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Alternation over `terms`, longest first so "gram flour" beats "flour" at
/// the same position.
fn longest_first_alternation(terms: &[String]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    Some(
        sorted
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn term_pattern(terms: &[String]) -> Option<Regex> {
    let alternation = longest_first_alternation(terms)?;
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).ok()
}

fn word_pattern(term: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).ok()
}

/// A rule table together with the patterns derived from it.
///
/// Built once and read-only afterwards, so the patterns always describe the
/// table they were compiled from. Derefs to the underlying [`SynthesisRules`].
#[derive(Debug, Clone)]
pub struct CompiledRules {
    rules: SynthesisRules,
    aliases: Vec<(Regex, String)>,
    flour: Option<Regex>,
    qualified_flour: Option<Regex>,
    dairy: Option<Regex>,
    additives: Vec<(Regex, String)>,
    leavening_mention: Option<Regex>,
}

impl CompiledRules {
    pub fn new(rules: SynthesisRules) -> Self {
        let aliases = rules
            .aliases
            .iter()
            .filter_map(|rule| word_pattern(&rule.alias).map(|re| (re, title_case(&rule.canonical))))
            .collect();
        let additives = rules
            .additives
            .iter()
            .filter_map(|a| word_pattern(&a.term).map(|re| (re, a.display.clone())))
            .collect();
        // optional list separators on either side are captured so they can be folded
        let leavening_mention = longest_first_alternation(&rules.leavening.redundant).and_then(|alt| {
            Regex::new(&format!(
                r"(?i)(\s*,\s*|\s+and\s+)?\b(?:{})\b(\s*,\s*|\s+and\s+)?",
                alt
            ))
            .ok()
        });
        Self {
            flour: term_pattern(&rules.flour_terms),
            qualified_flour: Regex::new(r"(?i)\b([a-z]+)\s+flour\b").ok(),
            dairy: term_pattern(&rules.dairy_terms),
            aliases,
            additives,
            leavening_mention,
            rules,
        }
    }

    pub fn rules(&self) -> &SynthesisRules {
        &self.rules
    }

    /// Whole-word alias patterns with the title-cased canonical replacement.
    pub(crate) fn alias_patterns(&self) -> &[(Regex, String)] {
        &self.aliases
    }

    /// Whole-word additive patterns with their display spelling, in table order.
    pub(crate) fn additive_patterns(&self) -> &[(Regex, String)] {
        &self.additives
    }

    pub(crate) fn find_dairy<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.dairy.as_ref()?.find(text)
    }

    /// Leftmost flour-family term: a listed term or "<word> flour". Listed
    /// terms win when both start at the same position.
    pub(crate) fn find_flour<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let listed = self.flour.as_ref().and_then(|re| re.find(text));
        let qualified = self.qualified_flour.as_ref().and_then(|re| {
            re.captures_iter(text)
                .find(|caps| caps.get(1).is_some_and(|q| !self.is_flour_stopword(q.as_str())))
                .and_then(|caps| caps.get(0))
        });
        match (listed, qualified) {
            (Some(l), Some(q)) if q.start() < l.start() => Some(q),
            (Some(l), _) => Some(l),
            (None, q) => q,
        }
    }

    fn is_flour_stopword(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        FLOUR_QUALIFIER_STOPWORDS.contains(&word.as_str())
            || self.rules.mix_verbs.iter().any(|v| v.eq_ignore_ascii_case(&word))
    }

    /// Redundant leavening mention with the list separators around it
    /// captured in groups 1 and 2.
    pub(crate) fn leavening_mention(&self) -> Option<&Regex> {
        self.leavening_mention.as_ref()
    }
}

impl Default for CompiledRules {
    fn default() -> Self {
        Self::new(SynthesisRules::default())
    }
}

impl From<SynthesisRules> for CompiledRules {
    fn from(rules: SynthesisRules) -> Self {
        Self::new(rules)
    }
}

impl Deref for CompiledRules {
    type Target = SynthesisRules;

    fn deref(&self) -> &SynthesisRules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_every_phase() {
        let rules = SynthesisRules::default();
        for phase in Phase::ORDER {
            assert!(!rules.keywords_for(phase).is_empty(), "{:?} has no keywords", phase);
        }
        assert_eq!(rules.canonical_for("dahi"), Some("yogurt"));
        assert_eq!(rules.canonical_for("paneer"), None);
    }

    #[test]
    fn test_partial_json_override_keeps_other_defaults() {
        let json = r#"{
            "aliases": [{"alias": "chhena", "canonical": "paneer"}],
            "default_instruction": "Cook until done."
        }"#;
        let rules: SynthesisRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.canonical_for("chhena"), Some("paneer"));
        assert_eq!(rules.canonical_for("curd"), None);
        assert_eq!(rules.default_instruction, "Cook until done.");
        assert_eq!(rules.prep_rules.len(), 3);
        assert!(rules.keywords_for(Phase::Cook).contains(&"steam".to_string()));
    }

    #[test]
    fn test_phase_keywords_serialize_with_phase_names() {
        let rules = SynthesisRules::default();
        let value = serde_json::to_value(&rules).unwrap();
        assert!(value["phase_keywords"]["prep"].is_array());
        assert!(value["phase_keywords"]["finish"].is_array());
    }

    #[test]
    fn test_find_flour_prefers_leftmost_term() {
        let rules = CompiledRules::default();
        let found = |text: &str| rules.find_flour(text).map(|m| m.as_str().to_string());
        assert_eq!(found("mix chickpea flour and curd."), Some("chickpea flour".to_string()));
        assert_eq!(found("mix gram flour and curd."), Some("gram flour".to_string()));
        assert_eq!(found("mix the flour and curd."), Some("flour".to_string()));
        assert_eq!(found("whisk flour with curd."), Some("flour".to_string()));
        assert_eq!(found("mix besan, then some flour."), Some("besan".to_string()));
        assert_eq!(found("mix curd well."), None);
    }

    #[test]
    fn test_compiled_patterns_follow_table() {
        let mut table = SynthesisRules::default();
        table.additives.push(AdditiveTerm {
            term: "oil".to_string(),
            display: "oil".to_string(),
        });
        let rules = CompiledRules::new(table);
        assert_eq!(rules.additive_patterns().len(), 6);
        assert_eq!(rules.alias_patterns().len(), rules.aliases.len());
        assert!(rules.leavening_mention().is_some());
        assert!(rules.find_dairy("mix besan and dahi").is_some());
    }
}
