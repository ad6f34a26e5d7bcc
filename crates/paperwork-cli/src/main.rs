use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;

use paperwork_cli::commands::{self, GenerateArgs};
use paperwork_cli::config::{self, CONFIG_ENV, PaperworkConfig};

#[derive(Parser)]
#[command(name = "paperwork")]
#[command(version)]
#[command(about = "Fill DOCX templates, issue reference numbers and export to PDF", long_about = None)]
struct Cli {
    /// Config file
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured templates
    Templates,

    /// Fill a template and save DOCX (and PDF)
    Generate(GenerateArgs),

    /// Issue reference numbers
    #[command(subcommand)]
    Reference(ReferenceCommand),

    /// Manage the serial counter file
    #[command(subcommand)]
    Serial(SerialCommand),

    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ReferenceCommand {
    /// Allocate the next serial and print a business reference
    Next {
        #[arg(long, default_value = "BKR")]
        prefix: String,
    },
    /// Print a timestamp reference (no serial consumed)
    Unique,
}

#[derive(Subcommand)]
enum SerialCommand {
    /// Create the counter file
    Init {
        #[arg(long)]
        base: u64,
    },
    /// Print the counter state
    Show,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write the default config
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.json);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    let load = || config::load_or_default(&config_path);

    match cli.command {
        Commands::Templates => commands::list_templates(&load()?),
        Commands::Generate(args) => commands::run_generate(&load()?, &args)?,
        Commands::Reference(ReferenceCommand::Next { prefix }) => {
            println!("{}", commands::next_reference(&load()?, &prefix)?);
        }
        Commands::Reference(ReferenceCommand::Unique) => {
            println!("{}", commands::unique_reference());
        }
        Commands::Serial(SerialCommand::Init { base }) => commands::serial_init(&load()?, base)?,
        Commands::Serial(SerialCommand::Show) => commands::serial_show(&load()?)?,
        Commands::Config(ConfigCommand::Show) => commands::config_show(&load()?)?,
        Commands::Config(ConfigCommand::Init { force }) => {
            let base = config_path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let defaults = PaperworkConfig::defaults_in(&base);
            commands::config_init(&config_path, &defaults, force)?;
        }
    }

    Ok(())
}
