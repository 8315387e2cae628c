//! RentalHub CLI - session store and backend management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! rh-cli sessions migrate
//!
//! # Bootstrap a backend superuser
//! rh-cli admin create -u admin -e admin@example.com -n "Admin Name"
//!
//! # Check the catalog as a signed-in user
//! rh-cli products list --category tools --page 2
//! ```
//!
//! # Commands
//!
//! - `sessions migrate` - Create the tower-sessions table
//! - `admin create` - Create a superuser through the backend
//! - `products list` - Print one page of the product listing

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rh-cli")]
#[command(author, version, about = "RentalHub CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the storefront session store
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Manage backend superusers
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Create the session table
    Migrate,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a superuser (password from `RH_ADMIN_PASSWORD`)
    Create {
        /// Superuser username
        #[arg(short, long)]
        username: String,

        /// Superuser email address
        #[arg(short, long)]
        email: String,

        /// Superuser display name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Print one page of products
    List {
        /// Search term
        #[arg(short, long)]
        search: Option<String>,

        /// Category slug
        #[arg(short, long)]
        category: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sessions {
            action: SessionsAction::Migrate,
        } => commands::sessions::migrate().await?,
        Commands::Admin {
            action:
                AdminAction::Create {
                    username,
                    email,
                    name,
                },
        } => commands::admin::create_superuser(&username, &email, &name).await?,
        Commands::Products {
            action:
                ProductsAction::List {
                    search,
                    category,
                    page,
                },
        } => {
            commands::products::list(search.as_deref(), category.as_deref(), page).await?;
        }
    }
    Ok(())
}
