//! pipshell CLI
//!
//! Runs pip as a child process and prints its results as typed records

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use eyre::WrapErr;
use pipshell_exec::{CommandExecutor, LocalExecutor};
use pipshell_pkg::{InstallOptions, PackageManager, Pip, PipConfig, SitePackages};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::{Config, LogFormat, LoggingConfig};

#[derive(Parser)]
#[command(name = "pipshell")]
#[command(about = "Typed wrapper around the pip command line", long_about = None)]
struct Cli {
    /// Configuration file (defaults to PIPSHELL_CONFIG or pipshell.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log line format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed packages
    List {
        /// Read site-packages directly instead of running `pip list`
        #[arg(long)]
        fast: bool,
    },
    /// Show metadata of an installed package
    Show { name: String },
    /// Search the package registry
    Search { name: String },
    /// Show the registry entry whose name matches exactly
    Get { name: String },
    /// Install packages that are not installed yet
    Install {
        #[arg(required = true)]
        names: Vec<String>,
        /// Let pip install dependencies too
        #[arg(long)]
        with_dependencies: bool,
        /// Upgrade packages that are already installed
        #[arg(long)]
        upgrade: bool,
    },
    /// Uninstall packages that are installed
    Uninstall {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Report whether a package is installed locally
    Installed { name: String },
}

impl Commands {
    /// Whether the command needs to look at site-packages
    fn needs_environment(&self) -> bool {
        matches!(
            self,
            Commands::List { fast: true }
                | Commands::Install { .. }
                | Commands::Uninstall { .. }
                | Commands::Installed { .. }
        )
    }
}

fn init_tracing(config: &LoggingConfig, format: Option<LogFormat>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format.unwrap_or(config.format) {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn site_packages(
    executor: &dyn CommandExecutor,
    config: &PipConfig,
) -> Result<SitePackages> {
    if !config.site_packages.is_empty() {
        return Ok(SitePackages::new(config.site_packages.clone()));
    }
    SitePackages::discover(executor, &config.python, config.timeout())
        .await
        .wrap_err_with(|| {
            format!(
                "could not discover site-packages with `{}`; set pip.site_packages",
                config.python
            )
        })
}

async fn run(pip: &Pip, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::List { fast } => {
            let packages = if fast {
                pip.installed()
            } else {
                pip.list().await.wrap_err("pip list failed")?
            };
            output::emit(&packages, json, || output::frozen_table(&packages))?;
        }
        Commands::Show { name } => match pip.show(&name).await? {
            Some(pkg) => output::emit(&pkg, json, || output::detail_block(&pkg))?,
            None => eyre::bail!("package not installed: {name}"),
        },
        Commands::Search { name } => {
            let results = pip.search(&name).await.wrap_err("pip search failed")?;
            output::emit(&results, json, || output::registry_table(&results))?;
        }
        Commands::Get { name } => match pip.get(&name).await? {
            Some(pkg) => {
                let found = [pkg];
                output::emit(&found[0], json, || output::registry_table(&found))?;
            }
            None => eyre::bail!("package not found in registry: {name}"),
        },
        Commands::Install {
            names,
            with_dependencies,
            upgrade,
        } => {
            let options = InstallOptions {
                no_dependencies: pip.config().no_dependencies && !with_dependencies,
                upgrade,
            };
            let installed = pip.install(&names, options).await?;
            output::emit(&installed, json, || output::package_lines(&installed))?;
        }
        Commands::Uninstall { names } => {
            let removed = pip.uninstall(&names).await?;
            output::emit(&removed, json, || output::frozen_table(&removed))?;
        }
        Commands::Installed { name } => {
            let pkg = pip.package(&name);
            output::emit(&pkg, json, || output::package_line(&pkg))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config_path = Config::locate(cli.config.as_deref());
    let config = match &config_path {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => Config::default(),
    };

    init_tracing(&config.logging, cli.log_format);
    match &config_path {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }
    config.pip.validate().wrap_err("invalid [pip] configuration")?;

    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());
    let environment = if cli.command.needs_environment() {
        site_packages(executor.as_ref(), &config.pip).await?
    } else {
        SitePackages::default()
    };

    let pip = Pip::new(executor, Arc::new(environment), config.pip);
    run(&pip, cli.command, cli.json).await
}
