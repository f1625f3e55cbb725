use asana_migrator::asana::Asana;
use asana_migrator::trello::Trello;
use asana_migrator::{apps, config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "asana_migrator", about = "Move project boards into and around Asana")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import Asana projects from Trello board export files
    Import {
        /// JSON files exported from Trello
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// List Trello and Asana members without creating anything
        #[arg(short = 'm', long)]
        only_members: bool,
    },
    /// Copy the tasks of one Asana project into another
    Copy {
        /// Origin project name or gid
        #[arg(long)]
        from: Option<String>,

        /// Target project name or gid
        #[arg(long)]
        to: Option<String>,

        /// Only copy tasks of this section (name or gid)
        #[arg(long)]
        section: Option<String>,

        /// Resume from this task gid, skipping everything before it
        #[arg(long)]
        start_at: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    let asana = Asana::new(&config.asana.personal_access_token);
    match cli.command {
        Command::Import {
            files,
            only_members,
        } => {
            let trello = config
                .trello_credentials()
                .map(|credentials| Trello::new(&credentials.key, &credentials.token));
            apps::import_boards(&asana, trello.as_ref(), &config, &files, only_members).await?;
        }
        Command::Copy {
            from,
            to,
            section,
            start_at,
        } => {
            apps::copy_tasks(
                &asana,
                &config,
                from.as_deref(),
                to.as_deref(),
                section.as_deref(),
                start_at.as_deref(),
            )
            .await?;
        }
    }
    Ok(())
}
