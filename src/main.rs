use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Password;
use std::sync::Arc;

use fitness_session::auth::{AuthService, NewUser};
use fitness_session::config::{CliArgs, Command, Config};
use fitness_session::store::SqliteTokenStore;
use fitness_session::{ApiClient, ClientError, FitnessApi, NavigationState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = Config::from_args(&args)?;
    config.validate()?;

    init_logging(&config);

    tracing::debug!(
        base_url = %config.base_url,
        store = %config.token_store_file.display(),
        "Configuration loaded"
    );

    let store = Arc::new(SqliteTokenStore::open(&config.token_store_file)?);
    let navigation = Arc::new(NavigationState::new());
    let client = Arc::new(ApiClient::new(&config, store, navigation.clone())?);
    let auth = AuthService::new(client.clone(), &config.login_path, &config.register_path);
    let api = FitnessApi::new(client);

    let outcome = run(args.command, &auth, &api).await;

    // Where the app would be showing now, whatever happened
    tracing::debug!(route = %navigation.current(), "Final navigation state");

    match outcome {
        Ok(()) => Ok(()),
        Err(ClientError::AuthenticationFailed(_)) => {
            anyhow::bail!("Incorrect email or password")
        }
        Err(e) if e.is_unauthorized() => {
            anyhow::bail!("Session expired, please log in again ({})", navigation.current())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(command: Command, auth: &AuthService, api: &FitnessApi) -> fitness_session::Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = password_or_prompt(password)?;
            auth.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            auth.register(&NewUser {
                name,
                email: email.clone(),
                password,
            })
            .await?;
            println!("Account created for {}", email);
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Logged out");
        }
        Command::Bootstrap => {
            let route = auth.bootstrap().await?;
            println!("{}", route);
        }
        Command::Me => {
            let user = api.me().await?;
            print_json(&user)?;
        }
        Command::Search { query } => {
            let foods = api.search_foods(&query).await?;
            if foods.is_empty() {
                println!("No foods found for '{}'", query);
            }
            for food in foods {
                println!("{:>6}  {:<40} {:>7.1} kcal", food.id, food.name, food.calories);
            }
        }
        Command::Overview { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let summary = api.daily_overview(date).await?;
            println!("Overview for {}", date);
            println!(
                "  Calories: {} / {} ({}%)",
                summary.current_calories, summary.target_calories, summary.daily_calories_progress
            );
            println!("  Remaining: {}", summary.remaining_calories());
            println!(
                "  Carbs {}g  Protein {}g  Fat {}g",
                summary.carbohydrates, summary.proteins, summary.fats
            );
        }
        Command::Report { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let report = api.daily_report(date).await?;
            println!("{}", report.text().unwrap_or("No report available"));
        }
    }

    Ok(())
}

/// Initialize logging with the configured level; RUST_LOG takes precedence
fn init_logging(config: &Config) {
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn password_or_prompt(password: Option<String>) -> fitness_session::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")
            .map_err(ClientError::Internal),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> fitness_session::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .context("Failed to format response")
        .map_err(ClientError::Internal)?;
    println!("{}", text);
    Ok(())
}
