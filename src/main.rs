use clap::Parser;

use list_notifications::app::LogControl;
use list_notifications::cli::{commands, Cli, Commands};
use list_notifications::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.overrides.into());
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let logs = LogControl::init(&config.log_level);
            commands::serve(&config, logs).await?;
        }
        Commands::ShowConfig => {
            commands::show_config(&config)?;
        }
    }

    Ok(())
}
