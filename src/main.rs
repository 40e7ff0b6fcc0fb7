use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use blogly::config::Config;

#[derive(Parser)]
#[command(name = "blogly", about = "Users, posts and tags, served as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Load users, posts and tags from a JSON file
    Seed {
        /// Path to the seed file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = blogly::db::init_pool(&config.database_url).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = blogly::build_app(pool, config.secure_cookies).await?;
            let listener = TcpListener::bind(config.bind_addr).await?;

            tracing::info!("listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::Seed { file } => {
            let summary = blogly::cli::seed_file(&pool, &file).await?;
            println!(
                "Seeded {} users, {} posts, {} tags",
                summary.users, summary.posts, summary.tags
            );
        }
    }

    Ok(())
}
