/// Version injected at compile time via GCPREF_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GCPREF_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gcpref::config::{Config, CONFIG_KEYS};
use gcpref::gcloud::GcloudDefaults;
use gcpref::resource::{
    AttributeSpec, ParamValues, QualifiedName, Registry, ResolutionError, ResourceSpec,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Resolve GCP resource names into fully-qualified references
#[derive(Parser, Debug)]
#[command(name = "gcpref", version = VERSION, about, long_about = None)]
struct Args {
    /// Extra resource definition YAML files (extend or override built-ins)
    #[arg(long = "resources", value_name = "FILE", global = true)]
    resource_files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known resource types
    List,

    /// Show the flags and help text for a resource type
    Describe {
        /// Resource type, e.g. disk
        resource: String,
    },

    /// Resolve a resource name from flags and ambient defaults
    Resolve {
        /// Resource type, e.g. disk
        resource: String,

        /// Value of the resource's own identifying attribute
        name: Option<String>,

        /// GCP project
        #[arg(long)]
        project: Option<String>,

        /// GCP region
        #[arg(long)]
        region: Option<String>,

        /// GCP zone
        #[arg(long)]
        zone: Option<String>,

        /// Any other attribute, as NAME=VALUE
        #[arg(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Ignore configured and gcloud defaults
        #[arg(long)]
        no_defaults: bool,
    },

    /// Parse a relative name or self-link
    Parse {
        /// Relative name or URL
        reference: String,

        /// Restrict matching to a collection (e.g. compute.disks) or resource type
        #[arg(long)]
        collection: Option<String>,
    },

    /// Manage persisted defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show persisted and effective defaults
    Show,
    /// Set a default
    Set {
        #[arg(value_parser = clap::builder::PossibleValuesParser::new(["project", "region", "zone"]))]
        key: String,
        value: String,
    },
    /// Remove a default
    Unset {
        #[arg(value_parser = clap::builder::PossibleValuesParser::new(["project", "region", "zone"]))]
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Relative name
    Text,
    /// Full REST URL
    Url,
    /// JSON document
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty attribute name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcpref {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcpref").join("gcpref.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcpref").join("gcpref.log");
    }
    PathBuf::from("gcpref.log")
}

fn load_registry(files: &[PathBuf]) -> Result<Registry> {
    if files.is_empty() {
        return Ok(Registry::builtin().clone());
    }

    let docs = files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read resource file {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Loading {} extra resource files", docs.len());
    Registry::builtin_with(docs.as_slice()).context("Failed to load resource definitions")
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:?}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Already reported with per-attribute help
            if let Some(resolution) = err.downcast_ref::<ResolutionError>() {
                tracing::warn!("{}", resolution);
                return ExitCode::from(2);
            }
            tracing::error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let registry = load_registry(&args.resource_files)?;

    match &args.command {
        Command::List => {
            for spec in registry.iter() {
                println!("{:<12} {:<22} {}", spec.name(), spec.collection(), spec.path());
            }
        }
        Command::Describe { resource } => {
            let spec = registry.require(resource)?;
            println!("{} ({})", spec.name(), spec.collection());
            for attribute in spec.attributes() {
                println!(
                    "  {:<24} {}",
                    usage_for(spec, attribute),
                    attribute.help_for(spec.name())
                );
            }
        }
        Command::Resolve {
            resource,
            name,
            project,
            region,
            zone,
            params,
            no_defaults,
        } => {
            let spec = registry.require(resource)?;

            let mut provided: ParamValues = params.iter().cloned().collect();
            let flags = [("project", project), ("region", region), ("zone", zone)];
            for (key, value) in flags {
                if let Some(value) = value {
                    provided.insert(key.to_string(), value.clone());
                }
            }
            if let Some(name) = name {
                provided.insert(spec.terminal().parameter_name.clone(), name.clone());
            }

            let defaults = if *no_defaults {
                ParamValues::new()
            } else {
                Config::load().ambient_defaults(&GcloudDefaults::detect())
            };
            tracing::debug!("Resolving {} with defaults {:?}", spec.name(), defaults);

            let qualified = match spec.resolve(&provided, &defaults) {
                Ok(qualified) => qualified,
                Err(err) => {
                    eprint!("{}", render_missing(spec, &err));
                    return Err(err.into());
                }
            };
            print_name(&qualified, args.format)?;
        }
        Command::Parse {
            reference,
            collection,
        } => {
            let qualified = registry.parse(reference, collection.as_deref())?;
            print_name(&qualified, args.format)?;
        }
        Command::Config { action } => run_config(action)?,
    }

    Ok(())
}

fn run_config(action: &ConfigAction) -> Result<()> {
    let mut config = Config::load();

    match action {
        ConfigAction::Show => {
            let gcloud = GcloudDefaults::detect();
            let effective = config.ambient_defaults(&gcloud);
            for key in CONFIG_KEYS {
                let saved = config.get(key).unwrap_or("-");
                let active = effective.get(*key).map(String::as_str).unwrap_or("-");
                println!("{:<8} saved: {:<24} effective: {}", key, saved, active);
            }
        }
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            config.save()?;
        }
        ConfigAction::Unset { key } => {
            config.unset(key)?;
            config.save()?;
        }
    }

    Ok(())
}

fn print_name(name: &QualifiedName, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", name),
        OutputFormat::Url => println!("{}", name.self_link()),
        OutputFormat::Json => {
            let mut doc = serde_json::to_value(name)?;
            if let Some(obj) = doc.as_object_mut() {
                obj.insert("self_link".to_string(), name.self_link().into());
            }
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

/// How an attribute is supplied on the `resolve` command line
fn usage_for(spec: &ResourceSpec, attribute: &Arc<AttributeSpec>) -> String {
    if Arc::ptr_eq(attribute, spec.terminal()) {
        return attribute.parameter_name.to_uppercase();
    }
    match attribute.parameter_name.as_str() {
        "project" | "region" | "zone" => attribute.flag(),
        other => format!("--param {}=VALUE", other),
    }
}

/// User-facing report naming each missing parameter and its help text
fn render_missing(spec: &ResourceSpec, err: &ResolutionError) -> String {
    let mut out = format!("Error: {}\n", err);
    for attribute in err.missing() {
        out.push_str(&format!(
            "  {:<24} {}\n",
            usage_for(spec, attribute),
            attribute.help_for(err.resource())
        ));
    }
    out
}
