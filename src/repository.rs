use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::recipe::Recipe;

/// Where the pipeline looks up candidate recipes for a dish.
pub trait RecipeSource: Send + Sync {
    /// Recipes whose title contains `query`, ignoring case, in storage order.
    fn find_by_title(&self, query: &str) -> Vec<Recipe>;
}

/// Recipe store kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Vec<Recipe>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a recipe, replacing any stored recipe with the same id in place.
    pub fn add(&mut self, recipe: Recipe) {
        match self.recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => self.recipes.push(recipe),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn approved(&self) -> Vec<&Recipe> {
        self.recipes.iter().filter(|r| r.approved).collect()
    }

    pub fn pending(&self) -> Vec<&Recipe> {
        self.recipes.iter().filter(|r| !r.approved).collect()
    }
}

impl FromIterator<Recipe> for InMemoryRecipeRepository {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut repository = Self::new();
        for recipe in iter {
            repository.add(recipe);
        }
        repository
    }
}

impl RecipeSource for InMemoryRecipeRepository {
    fn find_by_title(&self, query: &str) -> Vec<Recipe> {
        let needle = query.trim().to_lowercase();
        self.recipes
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// Reads a JSON array of recipes.
pub fn load_recipes_from_json(path: &Path) -> Result<Vec<Recipe>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Recipe file not found at: {:?}", path));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe file at {:?}", path))?;
    let recipes: Vec<Recipe> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recipes from {:?}", path))?;

    if recipes.is_empty() {
        return Err(anyhow::anyhow!("No recipes loaded from {:?}", path));
    }

    debug!(count = recipes.len(), path = ?path, "loaded recipes");
    Ok(recipes)
}
