use anyhow::{Context, Result};
use recipe_assist::api_connection::endpoints::RecipeSuggestionRequest;
use recipe_assist::chat::AssistantReply;
use recipe_assist::cli::{parse_args, Command};
use recipe_assist::config::ClientConfig;
use recipe_assist::recommendation::{PreferenceFilter, RecommendationOutcome, RecommendationQuery};
use recipe_assist::substitution::{SubstitutionResult, SubstitutionRuleTable};
use recipe_assist::RecipeAssist;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_substitutions(ingredient: &str, result: &SubstitutionResult) {
    println!("Substitutions for {} ({}):", ingredient, result.origin);
    if let Some(notice) = result.notice {
        println!("  note: {}", notice.message());
    }
    if result.is_empty() {
        println!("  No substitutions found for this ingredient.");
    }
    for candidate in &result.candidates {
        println!("  - {}", candidate.substitute_name);
        if !candidate.ratio.is_empty() {
            println!("      Ratio: {}", candidate.ratio);
        }
        if !candidate.note.is_empty() {
            println!("      {}", candidate.note);
        }
    }
}

fn print_outcome(outcome: &RecommendationOutcome) {
    if let Some(message) = outcome.user_message() {
        println!("{}", message);
        return;
    }
    for recipe in outcome.items() {
        let id = recipe.id().unwrap_or_else(|| "?".to_string());
        let title = recipe.title().unwrap_or("(untitled)");
        match recipe.description() {
            Some(description) => println!("[{}] {} - {}", id, title, description),
            None => println!("[{}] {}", id, title),
        }
    }
}

fn print_reply(reply: &AssistantReply) {
    print!("{}", reply.document.to_plain_text());
    for suggestion in &reply.suggestions {
        println!();
        println!("* {}", suggestion.name);
        if !suggestion.description.is_empty() {
            println!("  {}", suggestion.description);
        }
        let details: Vec<&str> = [suggestion.cook_time.as_deref(), suggestion.difficulty.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !details.is_empty() {
            println!("  {}", details.join(" | "));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = parse_args();

    let mut config = ClientConfig::from_env().context("Failed to load client configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(token) = cli.token {
        config = config.with_auth_token(token);
    }

    // Built once and shared for the life of the process
    let rules = Arc::new(SubstitutionRuleTable::with_defaults());

    match cli.command {
        Command::Rules => {
            for key in rules.keys() {
                println!("{}", key);
            }
        }
        Command::Render { file } => {
            let text = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read chat text from '{}'", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buffer)
                        .await
                        .context("Failed to read chat text from stdin")?;
                    buffer
                }
            };
            print!("{}", recipe_assist::chat::render(&text).to_plain_text());
        }
        Command::Substitute { ingredient, ai } => {
            let assist = RecipeAssist::new(&config, rules).context("Failed to create API client")?;
            let result = assist.resolve_substitutions(&ingredient, ai).await;
            print_substitutions(&ingredient, &result);
        }
        Command::Recommend { source, limit, preferences } => {
            let assist = RecipeAssist::new(&config, rules).context("Failed to create API client")?;
            let filter = preferences
                .into_iter()
                .fold(PreferenceFilter::default(), |filter, (k, v)| filter.with(k, v));
            let query = RecommendationQuery::new(source, limit.unwrap_or(config.recommendation_limit))?
                .with_preferences(filter);
            info!(source = %source, limit = query.limit, "fetching {}", source.label());
            let outcome = assist.fetch_recommendations(&query).await;
            print_outcome(&outcome);
        }
        Command::Chat { message } => {
            let assist = RecipeAssist::new(&config, rules).context("Failed to create API client")?;
            let reply = assist
                .chat()
                .general_chat(&message)
                .await
                .context("The assistant could not answer right now, please try again")?;
            print_reply(&reply);
        }
        Command::Suggest { ingredients, meal_type, dietary, quick } => {
            let assist = RecipeAssist::new(&config, rules).context("Failed to create API client")?;
            if quick {
                let dietary = (!dietary.is_empty()).then(|| dietary.join(","));
                let reply = assist
                    .chat()
                    .quick_suggestions(&ingredients.join(","), meal_type.as_deref(), dietary.as_deref())
                    .await
                    .context("Could not get recipe suggestions, please try again")?;
                print_reply(&reply);
                return Ok(());
            }
            let mut request = RecipeSuggestionRequest::new(ingredients).with_dietary_restrictions(dietary);
            if let Some(meal_type) = meal_type {
                request = request.with_meal_type(meal_type);
            }
            let reply = assist
                .chat()
                .recipe_suggestions(&request)
                .await
                .context("Could not get recipe suggestions, please try again")?;
            print_reply(&reply);
        }
    }

    Ok(())
}
