use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthesize one recipe from the best-rated versions of a dish", long_about = None)]
pub struct Cli {
    /// Path to a JSON array of recipes
    #[arg(short, long)]
    pub recipes: PathBuf,

    /// Dish name to look up (case-insensitive substring of the title)
    #[arg(short, long)]
    pub dish: String,

    /// Servings of the synthesized recipe
    #[arg(short, long, default_value_t = 2)]
    pub servings: u32,

    /// How many ranked candidates feed the synthesis
    #[arg(short = 'k', long, default_value_t = 10)]
    pub top_k: usize,

    /// Keep step order as produced instead of sorting by cooking phase
    #[arg(long)]
    pub no_reorder: bool,

    /// Never call the text generator; always use the deterministic path
    #[arg(long)]
    pub offline: bool,

    /// JSON file overriding the synthesis rule tables
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// JSON file overriding the scoring weights
    #[arg(long)]
    pub weights: Option<PathBuf>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
