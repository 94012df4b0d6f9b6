use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use owo_colors::OwoColorize;

use civiclink::cli::{Cli, Commands, DraftCommands};
use civiclink::commands::{
    DraftFields, cmd_assign, cmd_catalog, cmd_comment, cmd_draft_clear, cmd_draft_save,
    cmd_draft_show, cmd_ls, cmd_pending, cmd_show, cmd_status, cmd_submit, cmd_sync, cmd_upvote,
};
use civiclink::{
    Actor, CivicClient, ComplaintGateway, Config, DurableStore, FileStore, HttpGateway, Result,
};

fn build_client(config: &Config) -> Result<CivicClient> {
    let gateway: Arc<dyn ComplaintGateway> = Arc::new(HttpGateway::new(
        config.require_api_url()?,
        config.token(),
        config.remote_timeout,
    )?);
    let storage: Arc<dyn DurableStore> = Arc::new(FileStore::open(config.data_dir())?);
    let actor = Actor::new(config.require_actor_id()?, config.role);
    CivicClient::new(gateway, storage, actor)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let client = build_client(&config)?;

    match cli.command {
        Commands::Submit { json } => cmd_submit(&client, json).await,
        Commands::Draft(action) => match action {
            DraftCommands::Save {
                title,
                description,
                category,
                sub_category,
                priority,
                address,
                landmark,
                images,
                anonymous,
            } => cmd_draft_save(
                &client,
                DraftFields {
                    title,
                    description,
                    category,
                    sub_category,
                    priority,
                    address,
                    landmark,
                    location: None,
                    images,
                    anonymous,
                },
            ),
            DraftCommands::Show { json } => cmd_draft_show(&client, json),
            DraftCommands::Clear => cmd_draft_clear(&client),
        },
        Commands::Ls {
            view,
            page,
            status,
            category,
            priority,
            json,
        } => cmd_ls(&client, view, page, status, category, priority, json).await,
        Commands::Show { id, json } => cmd_show(&client, &id, json).await,
        Commands::Status {
            id,
            status,
            notes,
            images,
        } => cmd_status(&client, &id, status, notes, images).await,
        Commands::Assign { id, employee_id } => cmd_assign(&client, &id, &employee_id).await,
        Commands::Upvote { id } => cmd_upvote(&client, &id).await,
        Commands::Comment {
            id,
            content,
            images,
        } => cmd_comment(&client, &id, content, images).await,
        Commands::Sync { json } => cmd_sync(&client, json).await,
        Commands::Pending { json } => cmd_pending(&client, json),
        Commands::Catalog { json } => cmd_catalog(&client, json).await,
    }
}
