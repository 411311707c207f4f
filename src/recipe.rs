use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static MINUTES_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // 12 minutes, 5 min, 20mins
    Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?)\b").ok()
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// How a synthesized recipe's steps were produced.
///
/// Serialized as the label stored in recipe metadata: `fallback:no-llm` or
/// `llm:<model name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SynthesisMethod {
    Fallback,
    Llm(String),
}

impl fmt::Display for SynthesisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisMethod::Fallback => write!(f, "fallback:no-llm"),
            SynthesisMethod::Llm(model) => write!(f, "llm:{}", model),
        }
    }
}

impl From<SynthesisMethod> for String {
    fn from(method: SynthesisMethod) -> Self {
        method.to_string()
    }
}

impl TryFrom<String> for SynthesisMethod {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        if label == "fallback:no-llm" {
            return Ok(SynthesisMethod::Fallback);
        }
        match label.strip_prefix("llm:") {
            Some(model) if !model.is_empty() => Ok(SynthesisMethod::Llm(model.to_string())),
            _ => Err(format!("unknown synthesis method label: {}", label)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis_method: Option<SynthesisMethod>,
}

/// A recipe as seen by the scoring engine and the synthesizer.
///
/// Source recipes are read-only inputs; a synthesized recipe is always a new
/// value with a fresh id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub servings: u32,
    #[serde(default)]
    pub metadata: RecipeMetadata,
    #[serde(default)]
    pub validator_confidence: f64,
    #[serde(default)]
    pub approved: bool,
    /// User ratings on a 0-5 scale.
    #[serde(default)]
    pub ratings: Vec<f64>,
    #[serde(default)]
    pub popularity: u32,
}

impl Recipe {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ingredients: Vec<Ingredient>,
        steps: Vec<String>,
        servings: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ingredients,
            steps,
            servings,
            metadata: RecipeMetadata::default(),
            validator_confidence: 0.0,
            approved: false,
            ratings: Vec::new(),
            popularity: 0,
        }
    }

    pub fn avg_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        self.ratings.iter().sum::<f64>() / self.ratings.len() as f64
    }

    pub fn timed_steps(&self) -> Vec<RecipeStep> {
        self.steps
            .iter()
            .map(|s| RecipeStep::from_instruction(s.as_str()))
            .collect()
    }

    /// Sum of the durations that could be read out of the step text.
    pub fn total_minutes(&self) -> u32 {
        self.timed_steps().iter().filter_map(|s| s.minutes).sum()
    }
}

/// A step instruction with the duration mentioned in it, if any.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RecipeStep {
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
}

impl RecipeStep {
    pub fn from_instruction(instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        let minutes = extract_minutes(&instruction);
        Self {
            instruction,
            minutes,
        }
    }
}

/// First `<N> min`/`<N> minutes` value in the text.
pub fn extract_minutes(text: &str) -> Option<u32> {
    let pattern = MINUTES_PATTERN.as_ref()?;
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}
