use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use smart_recipe_ai::api::{HttpApi, RecipeApi};
use smart_recipe_ai::auth::FileAuth;
use smart_recipe_ai::commands::CommandHandler;
use smart_recipe_ai::config::AppConfig;
use smart_recipe_ai::picker::DialogPicker;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL, e.g. http://localhost:3000
    #[arg(long)]
    base_url: Option<String>,

    /// Access token for a non-interactive session (requires --email)
    #[arg(long, requires = "email")]
    token: Option<String>,

    /// Account email used together with --token
    #[arg(long, requires = "token")]
    email: Option<String>,

    /// Directory holding session data
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize colored output
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Loading Smart Recipe AI...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut auth = FileAuth::load(&config).context("failed to read the session store")?;
    if let (Some(token), Some(email)) = (args.token, args.email) {
        auth.use_session(token, email);
    }

    let api: Arc<dyn RecipeApi> = Arc::new(
        HttpApi::new(&config, auth.token_cell()).context("failed to set up the API client")?,
    );
    pb.finish_and_clear();

    let mut command_handler = CommandHandler::new(Box::new(auth), api, Box::new(DialogPicker));

    // Initialize rustyline editor
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    // Main input loop
    loop {
        command_handler.refresh().await;

        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
