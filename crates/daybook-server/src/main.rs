use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use daybook_db::{Database, DbConfig, SqliteDatabase};
use daybook_server::auth;

#[derive(Parser)]
#[command(name = "daybook-server", about = "Personal task scheduler backend")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "DAYBOOK_BIND", default_value = "0.0.0.0", global = true)]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "DAYBOOK_PORT", default_value_t = 3720, global = true)]
    port: u16,

    /// SQLite database file (default: $XDG_DATA_HOME/daybook/daybook.db)
    #[arg(long, env = "DAYBOOK_DB", global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Create a user account
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "DAYBOOK_PASSWORD")]
        password: String,
    },
    /// List user accounts
    ListUsers,
    /// Issue a bearer token for a user and print it to stdout
    IssueToken {
        #[arg(long)]
        username: String,
    },
    /// Revoke every token issued to a user
    RevokeTokens {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = DbConfig { sqlite_path: cli.db };
    let db: Arc<dyn Database> =
        Arc::new(SqliteDatabase::open(&config).context("failed to open database")?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let addr = SocketAddr::new(cli.bind, cli.port);
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            info!("daybook-server listening on http://{addr}");
            daybook_server::serve(listener, db).await?;
        }
        Commands::AddUser { username, password } => {
            if let Err(msg) = auth::validate_credentials(&username, &password) {
                bail!(msg);
            }
            let user = auth::create_user(&*db, &username, &password).await?;
            eprintln!("Created user {} (id: {})", user.username, user.id);
        }
        Commands::ListUsers => {
            let users = db.list_users().await?;
            if users.is_empty() {
                eprintln!("No users found.");
            } else {
                println!("{:<38} {:<24} CREATED", "ID", "USERNAME");
                for user in users {
                    println!(
                        "{:<38} {:<24} {}",
                        user.id,
                        user.username,
                        user.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        Commands::IssueToken { username } => {
            let user = find_user(&*db, &username).await?;
            let token = auth::issue_token(&*db, &user.id).await?;
            // Print the raw token to stdout so it can be captured
            println!("{token}");
            eprintln!("\nSave this token. It cannot be retrieved again.");
        }
        Commands::RevokeTokens { username } => {
            let user = find_user(&*db, &username).await?;
            let revoked = db.delete_sessions_for_user(&user.id).await?;
            eprintln!("Revoked {revoked} token(s) for {}", user.username);
        }
    }

    Ok(())
}

async fn find_user(db: &dyn Database, username: &str) -> Result<daybook_core::User> {
    match db.get_user_by_username(username).await? {
        Some(user) => Ok(user),
        None => bail!("no such user: {username}"),
    }
}
