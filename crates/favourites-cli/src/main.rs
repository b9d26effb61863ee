use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use favourites_api::SharePointClient;
use favourites_cache::{SessionStore, SqliteSessionStore};
use favourites_core::{
    Config, FavouriteItem, FavouritesService, FixedLocation, SharePointStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "favourites")]
#[command(version, about = "Manage your favourite pages on a site", long_about = None)]
struct Cli {
    /// Site URL, overrides site.web_url from the config file
    #[arg(long, global = true)]
    web_url: Option<String>,

    /// Your email or login, overrides site.user_login
    #[arg(long, global = true)]
    user: Option<String>,

    /// Session name in the session cache
    #[arg(long, global = true, env = "FAVOURITES_SESSION")]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List your favourites
    List {
        /// Skip the session cache and read from the site
        #[arg(long)]
        no_cache: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add the given page as a favourite
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Page being favourited
        #[arg(long)]
        page: String,
    },
    /// Change a favourite; its URL is set to the given page
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        page: String,
    },
    /// Remove a favourite
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Forget everything cached for this session
    EndSession,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "favourites=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(web_url) = cli.web_url {
        config.site.web_url = Some(web_url);
    }
    if let Some(user) = cli.user {
        config.site.user_login = Some(user);
    }
    if let Some(session) = cli.session {
        config.session.session_id = session;
    }

    let db_path = config.session_db_path()?;
    let session = Arc::new(
        SqliteSessionStore::open(&db_path.to_string_lossy(), config.session.session_id.clone())
            .context("Failed to open session cache")?,
    );

    match cli.command {
        Commands::List { no_cache, json } => {
            let service = build_service(&config, session, "")?;
            let items = service.try_get_favourites(!no_cache).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print_table(&items);
            }
        }
        Commands::Add {
            title,
            description,
            page,
        } => {
            let service = build_service(&config, session, &page)?;
            let added = service
                .try_save_favourite(&FavouriteItem::new(title, description))
                .await
                .context("Could not save favourite")?;
            match added.id {
                Some(id) => println!("Added favourite {}", id),
                None => println!("Added favourite"),
            }
        }
        Commands::Update {
            id,
            title,
            description,
            page,
        } => {
            let service = build_service(&config, session, &page)?;
            let item = FavouriteItem::new(title, description).with_id(id);
            if !service.update_favourite(&item).await {
                bail!("Could not update favourite {}", id);
            }
            println!("Updated favourite {}", id);
        }
        Commands::Delete { id } => {
            let service = build_service(&config, session, "")?;
            if !service.delete_favourite(id).await {
                bail!("Could not delete favourite {}", id);
            }
            println!("Deleted favourite {}", id);
        }
        Commands::EndSession => {
            session.clear()?;
            tracing::info!("Ended session {}", session.session_id());
        }
    }

    Ok(())
}

fn build_service(
    config: &Config,
    session: Arc<SqliteSessionStore>,
    page: &str,
) -> anyhow::Result<FavouritesService> {
    let site = config.site_context()?;

    let mut client = SharePointClient::new(&site.web_url, config.auth.access_token.clone())?;
    if let Some(root) = &config.site.root_web_url {
        client = client.with_root_web_url(root);
    }

    let service = FavouritesService::new(
        site,
        Box::new(SharePointStore::new(client)),
        session,
        Arc::new(FixedLocation::new(page)),
    )
    .with_list_name(config.site.list_name.clone());

    Ok(service)
}

/// Display width of the title column, counted in characters
fn title_width(items: &[FavouriteItem]) -> usize {
    items
        .iter()
        .map(|i| i.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("TITLE".len())
}

fn print_table(items: &[FavouriteItem]) {
    if items.is_empty() {
        println!("No favourites yet");
        return;
    }

    let title_width = title_width(items);
    println!("{:>6}  {:<width$}  URL", "ID", "TITLE", width = title_width);
    for item in items {
        let id = item.id.map(|id| id.to_string()).unwrap_or_default();
        println!(
            "{:>6}  {:<width$}  {}",
            id,
            item.title,
            item.item_url,
            width = title_width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_width_counts_characters() {
        let items = vec![
            FavouriteItem::new("Café résumé", ""),
            FavouriteItem::new("Home", ""),
        ];
        assert_eq!(title_width(&items), 11);
    }

    #[test]
    fn test_title_width_minimum() {
        assert_eq!(title_width(&[FavouriteItem::new("A", "")]), 5);
        assert_eq!(title_width(&[]), 5);
    }
}
