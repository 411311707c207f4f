use regex::NoExpand;

use super::rules::{CompiledRules, SynthesisRules};

/// Canonical form of an ingredient name.
///
/// Known aliases resolve case-insensitively (a trailing plural "s" is dropped
/// when the singular is a known alias). Anything else comes back trimmed but
/// otherwise untouched.
pub fn canonical_name(rules: &SynthesisRules, name: &str) -> String {
    let trimmed = name.trim();
    let mut key = trimmed.to_lowercase();
    if let Some(singular) = key.strip_suffix('s') {
        if rules.canonical_for(singular).is_some() {
            key = singular.to_string();
        }
    }
    match rules.canonical_for(&key) {
        Some(canonical) => canonical.to_string(),
        None => trimmed.to_string(),
    }
}

/// Replaces every whole-word alias in free text with its title-cased
/// canonical form ("curd" becomes "Yogurt").
pub fn canonicalize_step_text(rules: &CompiledRules, text: &str) -> String {
    let mut out = text.to_string();
    for (alias, replacement) in rules.alias_patterns() {
        out = alias.replace_all(&out, NoExpand(replacement)).into_owned();
    }
    out
}

/// Trims and collapses internal runs of whitespace to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest ("urad dal" -> "Urad Dal", "idli rice (parboiled)" -> "Idli Rice (Parboiled)").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
