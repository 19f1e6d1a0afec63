//! Prompt Optimizer CLI - compress prompts for fewer tokens

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use prompt_optimizer::{
    api::ApiAgent,
    client::{
        ClientController, Clipboard, CopyOutcome, MemoryClipboard, SubmitOutcome, SystemClipboard,
    },
    config::Config,
    metrics::ReductionReport,
    optimization::OptimizationService,
    server::{self, AppState},
    tui::{spinner::ThinkingSpinner, InteractiveShell},
    HttpBackend, OptimizerBackend,
};
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prompt-optimizer")]
#[command(about = "Compress prompts for fewer tokens using a hosted language model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP optimization service
    Serve {
        /// Address to bind (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Optimize one prompt and print the result
    Optimize {
        /// Prompt text, @FILE to read a file, or - for stdin
        #[arg(short, long)]
        input: String,

        /// Send through a running service instead of calling the model directly
        #[arg(long)]
        remote: bool,

        /// Service URL (implies --remote)
        #[arg(long)]
        server: Option<String>,

        /// Copy the result to the clipboard. On Linux the copy only outlives
        /// this command when a clipboard manager is running.
        #[arg(long)]
        copy: bool,
    },

    /// Full-screen interactive optimizer
    Interactive {
        /// Send through a running service instead of calling the model directly
        #[arg(long)]
        remote: bool,

        /// Service URL (implies --remote)
        #[arg(long)]
        server: Option<String>,

        /// Keep the input after a successful optimization
        #[arg(long)]
        no_auto_clear: bool,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., provider.model, client.auto_clear)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The full-screen shell owns the terminal; logs would corrupt it
    let interactive = matches!(cli.command, Commands::Interactive { .. });
    init_logging(&cli.log_level, interactive)?;

    match cli.command {
        Commands::Serve { bind } => run_serve(bind).await?,
        Commands::Optimize {
            input,
            remote,
            server,
            copy,
        } => run_optimize(input, remote, server, copy).await?,
        Commands::Interactive {
            remote,
            server,
            no_auto_clear,
        } => run_interactive(remote, server, no_auto_clear).await?,
        Commands::Config(cmd) => run_config_command(cmd)?,
    }

    Ok(())
}

fn init_logging(level: &str, quiet: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if quiet {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::sink).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn build_service(config: &Config) -> Result<OptimizationService> {
    let api_config = config.api_config()?;
    info!("Using {} model {}", api_config.provider, api_config.model);
    Ok(OptimizationService::new(Arc::new(ApiAgent::new(api_config))))
}

fn build_backend(
    config: &Config,
    remote: bool,
    server: Option<String>,
) -> Result<Arc<dyn OptimizerBackend>> {
    if remote || server.is_some() {
        let url = server.unwrap_or_else(|| config.client.server_url.clone());
        info!("Sending prompts to {}", url);
        Ok(Arc::new(HttpBackend::new(&url)))
    } else {
        Ok(Arc::new(build_service(config)?))
    }
}

async fn run_serve(bind: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let service = build_service(&config)?;
    let bind = bind.unwrap_or(config.server.bind);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    server::serve(listener, AppState::new(service)).await?;
    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else if let Some(path) = input.strip_prefix('@') {
        Ok(std::fs::read_to_string(path)?)
    } else {
        Ok(input.to_string())
    }
}

async fn run_optimize(input: String, remote: bool, server: Option<String>, copy: bool) -> Result<()> {
    let config = Config::load()?;
    let backend = build_backend(&config, remote, server)?;
    let prompt = read_input(&input)?;

    let clipboard: Box<dyn Clipboard> = if copy {
        Box::new(SystemClipboard::new())
    } else {
        Box::new(MemoryClipboard::new())
    };
    let controller = ClientController::new(backend, clipboard);
    controller.set_input(prompt.as_str());

    let mut spinner = ThinkingSpinner::new();
    spinner.start("Optimizing...");
    let outcome = controller.submit().await;
    spinner.stop();

    if outcome != SubmitOutcome::Succeeded {
        let message = controller
            .take_notices()
            .first()
            .map(|notice| notice.message())
            .unwrap_or("Failed to optimize prompt.");
        bail!("{}", message);
    }

    let session = controller.snapshot();
    println!("{}", session.output_text);
    println!();
    print!("{}", ReductionReport::new(&prompt, &session.output_text));

    if copy && controller.copy_output() == CopyOutcome::Copied {
        println!("Optimized prompt copied to clipboard.");
    } else if copy {
        println!("Failed to copy to clipboard.");
    }

    Ok(())
}

async fn run_interactive(remote: bool, server: Option<String>, no_auto_clear: bool) -> Result<()> {
    let config = Config::load()?;
    let backend = build_backend(&config, remote, server)?;

    let controller = ClientController::new(backend, Box::new(SystemClipboard::new()))
        .with_auto_clear(config.client.auto_clear && !no_auto_clear);

    InteractiveShell::new(controller).run().await
}

fn run_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save()?;

            println!("Configuration file created at: {}", path.display());
            println!();
            println!("Next steps:");
            println!("  1. Edit the config file to add your API key, or");
            println!("  2. Set an environment variable:");
            println!("     export OPENAI_API_KEY=your_key");
        }
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config.masked())?);

            match config.validate() {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => println!("Configuration is incomplete: {}", e),
            }
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_stored()?;
            config.set(&key, &value)?;
            config.save()?;
            println!(
                "Set {} = {}",
                key,
                if key.ends_with("api_key") { "***" } else { value.as_str() }
            );
        }
        ConfigCommands::Path => {
            let path = Config::default_path();
            println!("{}", path.display());

            if !path.exists() {
                println!("(file does not exist - run 'config init' to create)");
            }
        }
    }
    Ok(())
}
