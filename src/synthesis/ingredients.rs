use std::collections::HashMap;
use tracing::debug;

use super::canonical::{canonical_name, title_case};
use super::round3;
use super::rules::SynthesisRules;
use crate::error::SynthesisError;
use crate::recipe::{Ingredient, Recipe};

struct IngredientGroup {
    name: String,
    per_serving: Vec<f64>,
    units: Vec<String>,
}

/// Aggregates ingredients across `recipes`, scaled to `target_servings`.
///
/// Each occurrence is converted to a per-serving quantity, occurrences are
/// grouped by canonical name and averaged (unweighted), then scaled and rounded
/// to three decimals. The unit is the most frequent one seen for the group,
/// ties going to the unit seen first. Groups keep first-encountered order.
pub fn merge_ingredients(
    rules: &SynthesisRules,
    recipes: &[Recipe],
    target_servings: u32,
) -> Result<Vec<Ingredient>, SynthesisError> {
    if target_servings == 0 {
        return Err(SynthesisError::InvalidInput(
            "requested servings must be positive".to_string(),
        ));
    }
    if let Some(bad) = recipes.iter().find(|r| r.servings == 0) {
        return Err(SynthesisError::InvalidInput(format!(
            "source recipe '{}' has invalid servings: {}",
            bad.id, bad.servings
        )));
    }

    let mut groups: Vec<IngredientGroup> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let cname = canonical_name(rules, &ingredient.name);
            let key = cname.to_lowercase();
            let idx = *index_by_key.entry(key).or_insert_with(|| {
                groups.push(IngredientGroup {
                    name: cname.clone(),
                    per_serving: Vec::new(),
                    units: Vec::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[idx];
            group
                .per_serving
                .push(ingredient.quantity / f64::from(recipe.servings));
            group.units.push(ingredient.unit.clone());
        }
    }

    let merged: Vec<Ingredient> = groups
        .into_iter()
        .map(|group| {
            let avg = group.per_serving.iter().sum::<f64>() / group.per_serving.len() as f64;
            Ingredient {
                name: title_case(&group.name),
                quantity: round3(avg * f64::from(target_servings)),
                unit: mode_unit(&group.units),
            }
        })
        .collect();

    debug!(
        sources = recipes.len(),
        merged = merged.len(),
        target_servings,
        "merged ingredients"
    );
    Ok(normalize_leavening(rules, merged))
}

/// Most frequent unit; on a tie the one encountered first wins.
fn mode_unit(units: &[String]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for unit in units {
        match counts.iter_mut().find(|(u, _)| *u == unit.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((unit.as_str(), 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (unit, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((unit, count));
        }
    }
    best.map(|(u, _)| u.to_string()).unwrap_or_default()
}

/// Drops the redundant leavening agents when the preferred one is present.
pub fn normalize_leavening(rules: &SynthesisRules, ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    if !has_preferred_leavening(rules, &ingredients) || !has_redundant_leavening(rules, &ingredients)
    {
        return ingredients;
    }
    ingredients
        .into_iter()
        .filter(|i| !is_redundant_leavening(rules, &i.name))
        .collect()
}

pub(crate) fn has_preferred_leavening(rules: &SynthesisRules, ingredients: &[Ingredient]) -> bool {
    let preferred = rules.leavening.preferred.to_lowercase();
    ingredients.iter().any(|i| i.name.to_lowercase() == preferred)
}

pub(crate) fn has_redundant_leavening(rules: &SynthesisRules, ingredients: &[Ingredient]) -> bool {
    ingredients
        .iter()
        .any(|i| is_redundant_leavening(rules, &i.name))
}

fn is_redundant_leavening(rules: &SynthesisRules, name: &str) -> bool {
    let lower = name.to_lowercase();
    rules
        .leavening
        .redundant
        .iter()
        .any(|r| r.to_lowercase() == lower)
}
