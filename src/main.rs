use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod domain;
mod application;
mod infrastructure;

use application::errors::BotError;
use application::services::{CommandService, WelcomeService};
use domain::entities::welcome::welcome_caption;
use domain::entities::{Composition, WelcomeImageSpec};
use domain::traits::ImageCompositor;
use infrastructure::adapters::discord::{self, Handler};
use infrastructure::compositor::WelcomeCompositor;
use infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "aisatsu-bot")]
#[command(about = "Discord bot that greets slash commands and welcomes new members", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and BOT_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and handle events
    Run,
    /// Register slash commands for the configured guild
    DeployCommands,
    /// Render a welcome image to a file
    Preview {
        /// Name shown on the card
        #[arg(long)]
        username: String,
        /// Avatar image URL
        #[arg(long)]
        avatar: String,
        /// Output PNG path
        #[arg(short, long, default_value = "welcome.png")]
        output: PathBuf,
    },
    /// Print the default config
    InitConfig,
    /// Show version
    Version,
}

fn main() {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(load_config(&cli.config, cli.token)),
        Commands::DeployCommands => deploy(load_config(&cli.config, cli.token)),
        Commands::Preview { username, avatar, output } => {
            preview(load_config(&cli.config, cli.token), &username, &avatar, &output)
        }
        Commands::InitConfig => init_config(),
        Commands::Version => {
            println!("aisatsu-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

/// Config file if present and valid, else defaults; environment and CLI override either
fn load_config(config_path: &str, token_override: Option<String>) -> Config {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };
    config.apply_env();

    if let Some(token) = token_override {
        config.discord.token = Some(token);
    }
    config
}

/// Dispatch table shared by the router and command registration
fn register_commands(config: &Config) -> CommandService {
    let greeting = &config.commands.greeting;
    let mut commands = CommandService::new().with_fallback_reply(&config.commands.fallback_reply);
    commands.register_greeting(&greeting.name, &greeting.description, &greeting.reply);
    commands
}

fn runtime() -> Result<tokio::runtime::Runtime, BotError> {
    tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))
}

fn run_bot(config: Config) -> Result<(), BotError> {
    let token = config.require_token()?.to_string();
    tracing::info!("Starting {}", config.bot.name);

    let compositor = WelcomeCompositor::detect(config.welcome.image_enabled);
    let welcome = WelcomeService::new(compositor, config.welcome_settings());
    let commands = register_commands(&config);
    tracing::info!("Command router ready with {} commands", commands.registry().len());

    runtime()?.block_on(discord::run(&token, Handler::new(welcome, commands)))
}

fn deploy(config: Config) -> Result<(), BotError> {
    let token = config.require_token()?.to_string();
    let (application_id, guild_id) = config.require_registration()?;
    let commands = register_commands(&config);

    let count = runtime()?.block_on(discord::commands::deploy_commands(
        &token,
        application_id,
        guild_id,
        commands.registry(),
    ))?;
    println!("Registered {} slash commands in guild {}", count, guild_id);
    Ok(())
}

fn preview(config: Config, username: &str, avatar: &str, output: &Path) -> Result<(), BotError> {
    let compositor = WelcomeCompositor::detect(true);
    let spec = WelcomeImageSpec::new(avatar, welcome_caption(username))
        .with_background(config.welcome.background.clone());

    match runtime()?.block_on(compositor.compose(&spec))? {
        Composition::Rendered(image) => {
            std::fs::write(output, &image.bytes)
                .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", output.display(), e)))?;
            println!("Wrote {} ({} bytes)", output.display(), image.bytes.len());
            Ok(())
        }
        Composition::Unavailable => Err(BotError::NotFound(
            "image rendering is unavailable on this system".to_string(),
        )),
    }
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
