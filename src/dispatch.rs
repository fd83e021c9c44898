use crate::cli::Commands;
use crate::commands::{download, run};
use crate::manager::ConfigManager;
use crate::utils::error::{AppError, AppResult};
use std::path::PathBuf;

const TOKEN_REQUIRED: &str = "The '--token' argument is required but not provided nor saved.";
const DATABASE_ID_REQUIRED: &str =
    "The '--database-id' argument is required but not provided nor saved.";

/// The action selected for one invocation. Chosen exactly once, before
/// anything with side effects runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Download,
    SetConfig,
    ClearConfig,
    InspectConfig,
}

impl Mode {
    pub fn of(command: &Commands) -> Self {
        match command {
            Commands::Run(_) => Mode::Run,
            Commands::Download(_) => Mode::Download,
            Commands::SetConfig(_) => Mode::SetConfig,
            Commands::ClearConfig => Mode::ClearConfig,
            Commands::InspectConfig => Mode::InspectConfig,
        }
    }

    fn needs_credentials(self) -> bool {
        matches!(self, Mode::Run | Mode::Download)
    }
}

/// The single external call a validated invocation performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RunSync {
        token: String,
        database_id: String,
        file_path: Option<PathBuf>,
        bibtex: Option<String>,
        pdf_path: Option<PathBuf>,
    },
    DownloadSync {
        file_path: Option<PathBuf>,
        token: String,
        database_id: String,
    },
    Setup,
    Clear,
    Inspect,
}

/// Validate the mode's preconditions and describe the one action to
/// perform. The token source is injected so the run mode's second token
/// resolution stays observable in tests.
pub fn plan<F>(mode: Mode, manager: &ConfigManager, token_source: F) -> AppResult<Action>
where
    F: Fn() -> Option<String>,
{
    let mut source_token = None;

    if mode.needs_credentials() {
        // An override on the command line always satisfies the requirement,
        // even when the token source itself comes up empty.
        source_token = token_source();
        if source_token.is_none() && manager.overrides().token.is_none() {
            return Err(AppError::Usage(TOKEN_REQUIRED.to_string()));
        }

        let resolved = manager.get()?;
        if resolved.database_id.is_none() && manager.overrides().database_id.is_none() {
            return Err(AppError::Usage(DATABASE_ID_REQUIRED.to_string()));
        }
    }

    match mode {
        Mode::Run => {
            let resolved = manager.get()?;

            // Token resolved a second time, independently of the shared
            // credential gate above: the source may have changed in
            // between, and an empty result must still fail the same way.
            let fresh_token = token_source();
            if fresh_token.is_none() && manager.overrides().token.is_none() {
                return Err(AppError::Usage(TOKEN_REQUIRED.to_string()));
            }

            let token = manager
                .overrides()
                .token
                .clone()
                .or(fresh_token)
                .ok_or_else(|| AppError::Usage(TOKEN_REQUIRED.to_string()))?;
            let database_id = resolved
                .database_id
                .ok_or_else(|| AppError::Usage(DATABASE_ID_REQUIRED.to_string()))?;

            Ok(Action::RunSync {
                token,
                database_id,
                file_path: resolved.file_path,
                bibtex: resolved.bibtex,
                pdf_path: resolved.pdf_path,
            })
        }
        Mode::Download => {
            let resolved = manager.get()?;

            let token = manager
                .overrides()
                .token
                .clone()
                .or(source_token)
                .ok_or_else(|| AppError::Usage(TOKEN_REQUIRED.to_string()))?;
            let database_id = resolved
                .database_id
                .ok_or_else(|| AppError::Usage(DATABASE_ID_REQUIRED.to_string()))?;

            Ok(Action::DownloadSync {
                file_path: resolved.file_path,
                token,
                database_id,
            })
        }
        Mode::SetConfig => Ok(Action::Setup),
        Mode::ClearConfig => Ok(Action::Clear),
        Mode::InspectConfig => Ok(Action::Inspect),
        // The subcommand set is fixed; reaching this arm means the dispatch
        // table and the CLI definition went out of sync.
        #[allow(unreachable_patterns)]
        _ => unreachable!("invalid mode"),
    }
}

/// Run the planned action and surface its exit code unchanged.
pub async fn execute(action: Action, manager: &ConfigManager) -> AppResult<i32> {
    match action {
        Action::RunSync {
            token,
            database_id,
            file_path,
            bibtex,
            pdf_path,
        } => {
            run::run_sync(
                &token,
                &database_id,
                file_path.as_deref(),
                bibtex.as_deref(),
                pdf_path.as_deref(),
            )
            .await
        }
        Action::DownloadSync {
            file_path,
            token,
            database_id,
        } => download::download_sync(file_path.as_deref(), &token, &database_id).await,
        Action::Setup => {
            manager.setup()?;
            Ok(0)
        }
        Action::Clear => {
            manager.clear()?;
            Ok(0)
        }
        Action::Inspect => {
            manager.inspect()?;
            Ok(0)
        }
    }
}
