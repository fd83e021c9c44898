use crate::config::Config;

pub const TOKEN_ENV: &str = "NOTION_SCHOLAR_TOKEN";

/// Resolve the Notion integration token: environment variable first, then
/// the saved config. Empty values count as absent.
pub fn get_token() -> Option<String> {
    token_from_env().or_else(|| Config::load().ok().and_then(|config| config.token))
}

pub fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}
