use clap::Parser;
use color_eyre::Result;
use momentum::cli::{self, Cli, Commands};
use momentum::encouragement::Nudges;
use momentum::{AppConfig, Database, Profile, utils};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // The config command changes where the database lives, so handle it
    // before opening anything
    let command = match cli.command {
        Commands::Config {
            db_path,
            sync,
            reset,
            show,
        } => {
            cli::handle_config(db_path, sync, reset, show, profile)?;
            return Ok(());
        }
        command => command,
    };

    // Load configuration and open the database at the resolved path
    let config = AppConfig::load(profile)?;
    let db_path = config.resolve_db_path(profile)?;
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    // Encouragement messages, optionally overridden from the data dir
    let nudges_path = utils::get_data_dir(profile).map(|dir| dir.join("ENCOURAGEMENTS.md"));
    let nudges = Nudges::load(nudges_path.as_deref());

    // Dispatch to appropriate command handler
    match command {
        Commands::Add { title } => cli::handle_add(title, &db)?,
        Commands::BreakDown { task_id, steps } => cli::handle_break_down(task_id, steps, &db)?,
        Commands::Done { task_id } => cli::handle_done(task_id, &db, &nudges)?,
        Commands::Undo { task_id } => cli::handle_undo(task_id, &db)?,
        Commands::Delete { task_id } => cli::handle_delete(task_id, &db)?,
        Commands::List { all } => cli::handle_list(all, &db)?,
        Commands::Focus { minutes, task } => cli::handle_focus(minutes, task, &db, &nudges)?,
        Commands::TakeBreak { minutes } => cli::handle_take_break(minutes)?,
        Commands::Status => cli::handle_status(&db)?,
        Commands::Nudge => cli::handle_nudge(&nudges)?,
        Commands::Test { stroop, trials } => cli::handle_test(stroop, trials, &db)?,
        Commands::TestResults { r#type, limit } => cli::handle_test_results(r#type, limit, &db)?,
        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}
