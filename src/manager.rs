use crate::cli::Commands;
use crate::config::Config;
use crate::utils::coerce_to_absolute_path;
use crate::utils::error::AppResult;
use crate::utils::format::display_opt;
use crate::utils::output::{OutputStyle, print_warning};
use std::path::PathBuf;

/// Flag values supplied on the command line for this invocation only.
/// Anything the user did not type stays `None` and never reaches the
/// config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub file_path: Option<PathBuf>,
    pub bibtex: Option<String>,
    pub pdf_path: Option<PathBuf>,
    pub save: Option<bool>,
}

impl Overrides {
    pub fn from_command(command: &Commands) -> Self {
        match command {
            Commands::Run(args) => Self {
                token: args.token.clone(),
                database_id: args.database_id.clone(),
                file_path: args.file_path.clone(),
                bibtex: args.bibtex.clone(),
                pdf_path: args.pdf_path.clone(),
                save: None,
            },
            Commands::Download(args) => Self {
                token: args.token.clone(),
                database_id: args.database_id.clone(),
                file_path: args.file_path.clone(),
                ..Self::default()
            },
            Commands::SetConfig(args) => Self {
                token: args.token.clone(),
                database_id: args.database_id.clone(),
                file_path: args.file_path.clone(),
                save: args.save,
                ..Self::default()
            },
            Commands::ClearConfig | Commands::InspectConfig => Self::default(),
        }
    }
}

/// The merged view used by one invocation: command-line override first,
/// saved value second, `None` otherwise. Never written back except through
/// an explicit `setup()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub file_path: Option<PathBuf>,
    pub bibtex: Option<String>,
    pub pdf_path: Option<PathBuf>,
    pub save: Option<bool>,
}

/// Merges per-invocation overrides with the saved config and applies the
/// config-management operations.
pub struct ConfigManager {
    overrides: Overrides,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(overrides: Overrides) -> Self {
        Self::at_path(overrides, Config::config_file_path())
    }

    pub fn at_path(overrides: Overrides, config_path: impl Into<PathBuf>) -> Self {
        Self {
            overrides,
            config_path: config_path.into(),
        }
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Fresh read of the saved config. Every operation takes its own
    /// snapshot so nothing is cached across calls.
    fn snapshot(&self) -> AppResult<Config> {
        Config::load_from(&self.config_path)
    }

    /// Merge overrides over the saved config. Read-only.
    pub fn get(&self) -> AppResult<ResolvedConfig> {
        let saved = self.snapshot()?;
        Ok(ResolvedConfig {
            token: self.overrides.token.clone().or(saved.token),
            database_id: self.overrides.database_id.clone().or(saved.database_id),
            file_path: self.overrides.file_path.clone().or(saved.file_path),
            bibtex: self.overrides.bibtex.clone(),
            pdf_path: self.overrides.pdf_path.clone(),
            save: self.overrides.save.or(saved.save),
        })
    }

    /// Write the provided overrides into the saved config. Keys the user
    /// did not pass are left untouched, so a saved value is never replaced
    /// by `None`.
    pub fn setup(&self) -> AppResult<()> {
        let mut saved = self.snapshot()?;

        if let Some(token) = &self.overrides.token {
            saved.token = Some(token.clone());
        }

        if let Some(database_id) = &self.overrides.database_id {
            saved.database_id = Some(database_id.clone());
        }

        // A file path that does not exist is warned about and skipped
        // instead of being saved.
        if let Some(file_path) = &self.overrides.file_path {
            let absolute = coerce_to_absolute_path(file_path);
            if absolute.exists() {
                saved.file_path = Some(absolute);
            } else {
                print_warning(&format!(
                    "The file \"{}\" does not exist, it will not be added to the config file.",
                    absolute.display()
                ));
            }
        }

        if let Some(save) = self.overrides.save {
            saved.save = Some(save);
        }

        saved.save_to(&self.config_path)
    }

    /// Forget every saved preference.
    pub fn clear(&self) -> AppResult<()> {
        Config::clear_at(&self.config_path)
    }

    /// Print the saved config for the user. Read-only.
    pub fn inspect(&self) -> AppResult<()> {
        let saved = self.snapshot()?;
        let token = crate::token::token_from_env().or_else(|| saved.token.clone());

        println!("{}", OutputStyle::header("notion-scholar configuration"));
        println!(
            "{}: {}",
            OutputStyle::label("config_file_path"),
            self.config_path.display()
        );
        println!(
            "{}: {}",
            OutputStyle::label("config_file_exists"),
            self.config_path.is_file()
        );
        println!();
        println!("{}: {}", OutputStyle::label("token"), display_opt(token.as_ref()));
        println!(
            "{}: {}",
            OutputStyle::label("database_id"),
            display_opt(saved.database_id.as_ref())
        );
        println!(
            "{}: {}",
            OutputStyle::label("file_path"),
            display_opt(saved.file_path.map(|p| p.display().to_string()).as_ref())
        );
        println!("{}: {}", OutputStyle::label("save"), display_opt(saved.save.as_ref()));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_in(dir: &tempfile::TempDir, overrides: Overrides) -> ConfigManager {
        ConfigManager::at_path(overrides, dir.path().join("config.toml"))
    }

    fn seed(dir: &tempfile::TempDir, config: &Config) {
        config.save_to(&dir.path().join("config.toml")).unwrap();
    }

    #[test]
    fn test_override_wins_over_saved_value() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            &dir,
            &Config {
                token: Some("saved-token".to_string()),
                database_id: Some("saved-db".to_string()),
                ..Config::default()
            },
        );

        let manager = manager_in(
            &dir,
            Overrides {
                token: Some("cli-token".to_string()),
                ..Overrides::default()
            },
        );

        let resolved = manager.get().unwrap();
        assert_eq!(resolved.token, Some("cli-token".to_string()));
        assert_eq!(resolved.database_id, Some("saved-db".to_string()));
    }

    #[test]
    fn test_unset_keys_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir, Overrides::default());

        let resolved = manager.get().unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
    }

    #[test]
    fn test_get_does_not_mutate_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(
            &dir,
            Overrides {
                database_id: Some("abc123".to_string()),
                ..Overrides::default()
            },
        );

        manager.get().unwrap();
        assert!(!dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_setup_writes_only_provided_keys() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            &dir,
            &Config {
                token: Some("saved-token".to_string()),
                database_id: Some("saved-db".to_string()),
                ..Config::default()
            },
        );

        let manager = manager_in(
            &dir,
            Overrides {
                database_id: Some("new-db".to_string()),
                ..Overrides::default()
            },
        );
        manager.setup().unwrap();

        let saved = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.database_id, Some("new-db".to_string()));
        // Token was not mentioned, so the saved value survives.
        assert_eq!(saved.token, Some("saved-token".to_string()));
    }

    #[test]
    fn test_setup_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(
            &dir,
            Overrides {
                token: Some("tkn123".to_string()),
                database_id: Some("abc123".to_string()),
                save: Some(false),
                ..Overrides::default()
            },
        );

        manager.setup().unwrap();
        let first = Config::load_from(&dir.path().join("config.toml")).unwrap();
        manager.setup().unwrap();
        let second = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.save, Some(false));
    }

    #[test]
    fn test_setup_skips_nonexistent_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(
            &dir,
            Overrides {
                file_path: Some(dir.path().join("missing.bib")),
                database_id: Some("abc123".to_string()),
                ..Overrides::default()
            },
        );
        manager.setup().unwrap();

        let saved = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.file_path, None);
        assert_eq!(saved.database_id, Some("abc123".to_string()));
    }

    #[test]
    fn test_setup_saves_existing_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let bib_path = dir.path().join("library.bib");
        std::fs::write(&bib_path, "@article{key, title = {T}}\n").unwrap();

        let manager = manager_in(
            &dir,
            Overrides {
                file_path: Some(bib_path.clone()),
                ..Overrides::default()
            },
        );
        manager.setup().unwrap();

        let saved = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.file_path, Some(bib_path));
    }

    #[test]
    fn test_clear_then_get_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            &dir,
            &Config {
                token: Some("saved-token".to_string()),
                database_id: Some("saved-db".to_string()),
                file_path: Some(PathBuf::from("/tmp/library.bib")),
                save: Some(true),
            },
        );

        let manager = manager_in(&dir, Overrides::default());
        manager.clear().unwrap();

        assert_eq!(manager.get().unwrap(), ResolvedConfig::default());
    }

    #[test]
    fn test_string_and_pdf_only_come_from_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(
            &dir,
            Overrides {
                bibtex: Some("@article{key,}".to_string()),
                pdf_path: Some(PathBuf::from("paper.pdf")),
                ..Overrides::default()
            },
        );

        let resolved = manager.get().unwrap();
        assert_eq!(resolved.bibtex, Some("@article{key,}".to_string()));
        assert_eq!(resolved.pdf_path, Some(PathBuf::from("paper.pdf")));
    }
}
