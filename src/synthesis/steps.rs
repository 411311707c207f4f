use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::canonical::{normalize_whitespace, title_case};
use super::ingredients::{has_preferred_leavening, has_redundant_leavening};
use super::rules::{CompiledRules, SynthesisRules};
use crate::recipe::Ingredient;

const ADD_MARKER: &str = "add";
const STEAM_MARKER: &str = "steam";

static STEAM_TIME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?)").ok());

static SPACE_BEFORE_PUNCT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\s+([.,;:!?])").ok());

/// Whitespace-normalizes and drops empty and case-insensitive duplicate
/// steps, keeping the first occurrence.
pub fn dedup_steps(steps: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for step in steps {
        let norm = normalize_whitespace(step);
        if norm.is_empty() {
            continue;
        }
        if seen.insert(norm.to_lowercase()) {
            out.push(norm);
        }
    }
    out
}

fn join_with_and(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Condenses steps into at most three canonical instructions (batter,
/// additions, steaming) when those patterns are recognised.
///
/// When none fires the deduplicated input comes back as is. Steps that match
/// none of the patterns are not carried over when at least one does.
pub fn merge_semantic_steps(rules: &CompiledRules, steps: &[String]) -> Vec<String> {
    let norm_steps = dedup_steps(steps);
    if norm_steps.is_empty() {
        return norm_steps;
    }

    let mut merged = Vec::new();
    if let Some(batter) = batter_step(rules, &norm_steps) {
        merged.push(batter);
    }
    if let Some(additions) = additive_step(rules, &norm_steps) {
        merged.push(additions);
    }
    if let Some(cook) = steam_step(&norm_steps) {
        merged.push(cook);
    }

    if merged.is_empty() {
        return norm_steps;
    }
    merged.iter().map(|s| normalize_whitespace(s)).collect()
}

fn batter_step(rules: &CompiledRules, steps: &[String]) -> Option<String> {
    steps.iter().find_map(|step| {
        let low = step.to_lowercase();
        if !rules.mix_verbs.iter().any(|v| low.contains(v.as_str())) {
            return None;
        }
        let flour = rules.find_flour(&low)?;
        let dairy = rules.find_dairy(&low)?;
        Some(format!(
            "Whisk the {} and {} together, adding water gradually to form a smooth batter.",
            title_case(flour.as_str().trim()),
            title_case(dairy.as_str().trim())
        ))
    })
}

fn additive_step(rules: &CompiledRules, steps: &[String]) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();
    for step in steps {
        if !step.to_lowercase().contains(ADD_MARKER) {
            continue;
        }
        for (term, display) in rules.additive_patterns() {
            if term.is_match(step) && !seen.contains(&display.as_str()) {
                seen.push(display.as_str());
            }
        }
    }
    if seen.is_empty() {
        return None;
    }
    let parts: Vec<String> = seen.iter().map(|s| s.to_string()).collect();
    Some(format!(
        "Add {}. Mix gently until just combined.",
        join_with_and(&parts)
    ))
}

fn steam_step(steps: &[String]) -> Option<String> {
    let step = steps
        .iter()
        .find(|s| s.to_lowercase().contains(STEAM_MARKER))?;
    let minutes = STEAM_TIME_PATTERN
        .as_ref()
        .and_then(|re| re.captures(step))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    Some(match minutes {
        Some(n) => format!("Steam for {} minutes.", n),
        None => "Steam until cooked through.".to_string(),
    })
}

/// Prep lines implied by the merged ingredient set (soaking staples and the
/// like). The first rule whose requirements are all met wins.
pub fn generate_prep_from_ingredients(
    rules: &SynthesisRules,
    ingredients: &[Ingredient],
) -> Vec<String> {
    let names: HashSet<String> = ingredients
        .iter()
        .map(|i| i.name.trim().to_lowercase())
        .collect();
    rules
        .prep_rules
        .iter()
        .find(|rule| {
            !rule.requires.is_empty()
                && rule
                    .requires
                    .iter()
                    .all(|group| group.iter().any(|t| names.contains(&t.to_lowercase())))
        })
        .map(|rule| rule.lines.clone())
        .unwrap_or_default()
}

/// Strips mentions of redundant leavening agents from step text once the
/// ingredient list holds only the preferred one.
///
/// A list separator next to the removed term is folded so that
/// "water, baking soda and Eno" reads "water and Eno". Steps reduced to a
/// single bare word are dropped, so the result can be empty.
pub fn remove_invalid_leavening_from_steps(
    rules: &CompiledRules,
    steps: Vec<String>,
    ingredients: &[Ingredient],
) -> Vec<String> {
    if !has_preferred_leavening(rules, ingredients) || has_redundant_leavening(rules, ingredients) {
        return steps;
    }
    let Some(mention) = rules.leavening_mention() else {
        return steps;
    };

    steps
        .into_iter()
        .filter_map(|step| {
            if !mention.is_match(&step) {
                return Some(step);
            }
            let stripped = mention.replace_all(&step, |caps: &Captures| {
                let lead = caps.get(1).map(|m| m.as_str());
                let trail = caps.get(2).map(|m| m.as_str());
                match (lead, trail) {
                    (Some(l), Some(t)) => {
                        if l.trim().eq_ignore_ascii_case("and") || t.trim().eq_ignore_ascii_case("and") {
                            " and ".to_string()
                        } else {
                            ", ".to_string()
                        }
                    }
                    (None, Some(t)) if t.contains(',') => " ".to_string(),
                    _ => String::new(),
                }
            });
            let mut cleaned = normalize_whitespace(&stripped);
            if let Some(re) = SPACE_BEFORE_PUNCT.as_ref() {
                cleaned = re.replace_all(&cleaned, "$1").into_owned();
            }
            let words = cleaned
                .split_whitespace()
                .filter(|w| w.chars().any(char::is_alphanumeric))
                .count();
            if words < 2 {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}

/// Puts back any prep line the later stages lost, at the front and in their
/// original order. A line counts as present when some step contains it
/// (case-insensitive).
pub fn backfill_prep_lines(steps: Vec<String>, prep_lines: &[String]) -> Vec<String> {
    let mut out = steps;
    for prep in prep_lines.iter().rev() {
        let prep = normalize_whitespace(prep);
        let needle = prep.to_lowercase();
        if !out.iter().any(|s| s.to_lowercase().contains(&needle)) {
            out.insert(0, prep);
        }
    }
    out
}
