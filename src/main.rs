use notion_scholar::cli;
use notion_scholar::config::Config;
use notion_scholar::dispatch::{self, Mode};
use notion_scholar::manager::{ConfigManager, Overrides};
use notion_scholar::token;
use notion_scholar::utils::error::{AppError, report_error};

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    // The saved config and the token are read before the parser is built:
    // the help text embeds them, and the requiredness of `run --file-path`
    // depends on what is saved.
    let saved = Config::load().unwrap_or_default();
    let current_token = token::get_token();

    if std::env::args_os().len() <= 1 {
        let mut cmd = cli::build_command(&saved, current_token.as_deref());
        eprint!("{}", cmd.render_help());
        return 1;
    }

    let cli = cli::parse(&saved, current_token.as_deref());
    let mode = Mode::of(&cli.command);
    let manager = ConfigManager::new(Overrides::from_command(&cli.command));

    let action = match dispatch::plan(mode, &manager, token::get_token) {
        Ok(action) => action,
        Err(err) => return exit_code_for(&err),
    };

    match dispatch::execute(action, &manager).await {
        Ok(code) => code,
        Err(err) => exit_code_for(&err),
    }
}

fn exit_code_for(err: &AppError) -> i32 {
    report_error(err);
    match err {
        AppError::Usage(_) => 2,
        _ => 1,
    }
}
