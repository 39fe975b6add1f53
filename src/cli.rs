use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::recommendation::RecommendationSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe substitutions, recommendations and assistant chat", long_about = None)]
pub struct Cli {
    /// Base url of the recipe API (overrides RECIPE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for authenticated endpoints (overrides RECIPE_API_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find substitutions for an ingredient
    Substitute {
        ingredient: String,
        /// Ask the backend's AI even when a rule-based answer exists
        #[arg(long)]
        ai: bool,
    },
    /// Fetch recipe recommendations
    Recommend {
        #[arg(long, value_enum, default_value_t = RecommendationSource::Personalized)]
        source: RecommendationSource,
        #[arg(long)]
        limit: Option<usize>,
        /// Preference filter entries for the preferences source, as key=value
        #[arg(long = "pref", value_parser = parse_key_value)]
        preferences: Vec<(String, String)>,
    },
    /// Render assistant text from a file, or stdin when no file is given
    Render { file: Option<PathBuf> },
    /// Ask the assistant a general cooking question
    Chat { message: String },
    /// Ask the assistant for recipes using the given ingredients
    Suggest {
        #[arg(long = "ingredient", required = true)]
        ingredients: Vec<String>,
        #[arg(long)]
        meal_type: Option<String>,
        #[arg(long)]
        dietary: Vec<String>,
        /// Use the lighter quick-suggestions endpoint
        #[arg(long)]
        quick: bool,
    },
    /// List the ingredients covered by the rule table
    Rules,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
