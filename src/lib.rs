pub mod api_connection;
pub mod assist;
pub mod chat;
pub mod cli;
pub mod config;
pub mod recommendation;
pub mod substitution;

pub use assist::RecipeAssist;
