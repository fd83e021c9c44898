use crate::config::Config;
use crate::utils::format::display_opt;
use clap::{Args, Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notion-scholar")]
#[command(bin_name = "ns")]
#[command(about = "Synchronise a bibtex bibliography with a Notion database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add the bib file (or a bibtex string) to the Notion database
    Run(RunArgs),

    /// Download the bibtex entries present in the Notion database
    Download(DownloadArgs),

    /// Save the provided preferences
    SetConfig(SetConfigArgs),

    /// Clear the saved configuration
    ClearConfig,

    /// Inspect the saved configuration
    InspectConfig,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Token used to connect to Notion
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Database that will be furnished
    #[arg(short = 'd', long, value_name = "ID")]
    pub database_id: Option<String>,

    /// Bibtex entries to add, passed inline instead of through a file
    #[arg(short = 's', long = "string", value_name = "BIBTEX")]
    pub bibtex: Option<String>,

    /// Path to the pdf file to attach to the added entries
    #[arg(long = "pdf_path", value_name = "PATH")]
    pub pdf_path: Option<PathBuf>,

    /// Bib file that will be used
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file_path: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct DownloadArgs {
    /// File in which the bibtex entries will be saved
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file_path: Option<PathBuf>,

    /// Token used to connect to Notion
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Database that will be downloaded
    #[arg(short = 'd', long, value_name = "ID")]
    pub database_id: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SetConfigArgs {
    /// Save the bib file that will be used when running without source arguments
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file_path: Option<PathBuf>,

    /// Save the Notion integration token
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Save the database-id
    #[arg(short = 'd', long, value_name = "ID")]
    pub database_id: Option<String>,

    /// Save whether an inline bibtex string is appended to the bib file
    #[arg(long, value_name = "BOOL")]
    pub save: Option<bool>,
}

/// Build the command with the current saved values folded in. The saved
/// config and the token are read by the caller *before* this runs: the help
/// text embeds them, and `run --file-path` flips to required when no file
/// path is saved.
pub fn build_command(config: &Config, token: Option<&str>) -> Command {
    let token_hint = display_opt(token.as_ref());
    let database_id_hint = display_opt(config.database_id.as_ref());
    let file_path_hint = match &config.file_path {
        Some(path) => path.display().to_string(),
        None => "None".to_string(),
    };
    let file_path_required = config.file_path.is_none();

    let mut cmd = Cli::command();

    cmd = cmd.mut_subcommand("run", |sub| {
        let mut sub = sub
            .mut_arg("token", |arg| {
                arg.help(format!(
                    "Token used to connect to Notion (default: {token_hint})"
                ))
            })
            .mut_arg("database_id", |arg| {
                arg.help(format!(
                    "Database that will be furnished. The database_id can be found in the \
                     url of the database (default: {database_id_hint})"
                ))
            })
            .mut_arg("file_path", |arg| {
                arg.help(format!(
                    "Bib file that will be used. Required when no bib file is saved in the \
                     config (default: {file_path_hint})"
                ))
            });
        if file_path_required {
            sub = sub.mut_arg("file_path", |arg| arg.required(true));
        }
        sub
    });

    cmd = cmd.mut_subcommand("download", |sub| {
        sub.mut_arg("token", |arg| {
            arg.help(format!(
                "Token used to connect to Notion (default: {token_hint})"
            ))
        })
        .mut_arg("database_id", |arg| {
            arg.help(format!(
                "Database that will be downloaded (default: {database_id_hint})"
            ))
        })
    });

    cmd = cmd.mut_subcommand("set-config", |sub| {
        sub.mut_arg("token", |arg| {
            arg.help(format!(
                "Save the Notion integration token (current: {token_hint})"
            ))
        })
        .mut_arg("database_id", |arg| {
            arg.help(format!(
                "Save the database-id in the user config (current: {database_id_hint})"
            ))
        })
        .mut_arg("file_path", |arg| {
            arg.help(format!(
                "Save the bib file that will be used when running without source \
                 arguments. The file needs to exist (current: {file_path_hint})"
            ))
        })
    });

    cmd
}

/// Parse the command line against the dynamically built command. Parser
/// errors print their own message and exit non-zero.
pub fn parse(config: &Config, token: Option<&str>) -> Cli {
    let matches = build_command(config, token).get_matches();
    match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    }
}
