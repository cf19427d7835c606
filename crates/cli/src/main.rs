//! Cart CLI - Inspect and edit the locally persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart show
//!
//! # Add one unit of product 3
//! cart add 3
//!
//! # Remove product 3
//! cart remove 3
//!
//! # Set product 3 to 5 units
//! cart update 3 5
//! ```
//!
//! Configuration is read from the environment (see `cart_store::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use cart_store_core::ProductId;
use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Shopping cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (zero or below is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cart_store=info,cart_store_cli=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        if let CommandError::Cart(cart_error) = &e {
            #[allow(clippy::print_stdout)]
            {
                println!("warning: {}", cart_error.user_message());
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let store = commands::open_store()?;

    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => commands::add(&store, product_id).await?,
        Commands::Remove { product_id } => commands::remove(&store, product_id)?,
        Commands::Update { product_id, amount } => {
            commands::update(&store, product_id, amount).await?;
        }
    }

    #[allow(clippy::print_stdout)]
    {
        print!("{}", commands::render_cart(&store.cart()));
    }
    Ok(())
}
