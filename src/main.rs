use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use waf_provider::cloud::client::{format_waf_error, WafClient};
use waf_provider::config::Config;
use waf_provider::error::WafError;
use waf_provider::provider::{self, Provider};
use waf_provider::resources::tamper_refresh;
use waf_provider::state::ResourceData;

/// Query Huawei Cloud WAF data sources and trigger WAF actions
#[derive(Parser, Debug)]
#[command(name = "waf-provider", version = waf_provider::VERSION, about, long_about = None)]
struct Args {
    /// Region to use, e.g. cn-north-4
    #[arg(short, long)]
    region: Option<String>,

    /// Project ID of the region
    #[arg(short, long)]
    project_id: Option<String>,

    /// WAF endpoint override
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List data sources and resources
    DataSources,
    /// Show the schema of a data source or resource
    Schema { name: String },
    /// Read a data source
    Read {
        name: String,
        /// Input attribute, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        inputs: Vec<(String, String)>,
    },
    /// Refresh the cache of a web tamper protection rule
    Refresh {
        #[arg(long)]
        policy_id: String,
        #[arg(long)]
        rule_id: String,
        #[arg(long)]
        enterprise_project_id: Option<String>,
    },
    /// Save region and project as defaults
    Configure,
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

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
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

    tracing::info!("waf-provider {} started with log level: {:?}", waf_provider::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("waf-provider").join("waf-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".waf-provider").join("waf-provider.log");
    }
    PathBuf::from("waf-provider.log")
}

fn print<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Config file, then environment, then flags
fn effective_config(args: &Args) -> Config {
    let mut config = Config::load();
    if let Some(region) = &args.region {
        config.region = Some(region.clone());
    }
    if let Some(project_id) = &args.project_id {
        config.project_id = Some(project_id.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    config
}

fn build_provider(config: &Config) -> Result<Provider> {
    let client = WafClient::new(config).map_err(|e| anyhow::anyhow!(format_waf_error(&e)))?;
    tracing::debug!("using endpoint {} for region {}", client.endpoint, client.region);
    Ok(Provider::new(client))
}

fn user_error(err: WafError) -> anyhow::Error {
    tracing::error!("{}", err);
    anyhow::anyhow!(format_waf_error(&err))
}

async fn run(args: Args) -> Result<()> {
    match &args.command {
        Command::DataSources => {
            let list = |defs: &[provider::Definition]| -> Vec<Value> {
                defs.iter()
                    .map(|d| json!({"name": d.name, "description": d.description}))
                    .collect()
            };
            print(
                args.output,
                &json!({
                    "data_sources": list(provider::data_sources()),
                    "resources": list(provider::resources()),
                }),
            )
        }
        Command::Schema { name } => {
            let schema = provider::data_source_schema(name)
                .or_else(|_| provider::resource_schema(name))
                .map_err(|_| anyhow::anyhow!("Unknown data source or resource: {}", name))?;
            print(args.output, &schema)
        }
        Command::Read { name, inputs } => {
            let schema = provider::data_source_schema(name).map_err(user_error)?;
            let mut data = ResourceData::from_raw_inputs(schema, inputs).map_err(user_error)?;

            let provider = build_provider(&effective_config(&args))?;
            provider
                .read_data_source(name, &mut data)
                .await
                .map_err(user_error)
                .with_context(|| format!("Failed to read {}", name))?;
            print(args.output, &data.to_json())
        }
        Command::Refresh {
            policy_id,
            rule_id,
            enterprise_project_id,
        } => {
            let mut inputs = vec![
                ("policy_id".to_string(), json!(policy_id)),
                ("rule_id".to_string(), json!(rule_id)),
            ];
            if let Some(eps) = enterprise_project_id {
                inputs.push(("enterprise_project_id".to_string(), json!(eps)));
            }
            let mut data =
                ResourceData::with_inputs(tamper_refresh::schema(), inputs).map_err(user_error)?;

            let provider = build_provider(&effective_config(&args))?;
            provider
                .create_resource(tamper_refresh::NAME, &mut data)
                .await
                .map_err(user_error)
                .context("Failed to refresh web tamper protection cache")?;
            print(args.output, &data.to_json())
        }
        Command::Configure => {
            let mut config = Config::config_path()
                .map(|path| Config::load_file(&path))
                .unwrap_or_default();
            if let Some(region) = &args.region {
                config.set_region(region)?;
            }
            if let Some(project_id) = &args.project_id {
                config.set_project(project_id)?;
            }
            print(args.output, &config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("name=cert=1").unwrap(),
            ("name".to_string(), "cert=1".to_string())
        );
        assert!(parse_key_value("name").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_args_parse_read() {
        let args = Args::try_parse_from([
            "waf-provider",
            "--region",
            "cn-north-4",
            "-o",
            "yaml",
            "read",
            "waf_policies",
            "--set",
            "name=p",
        ])
        .unwrap();

        assert_eq!(args.region.as_deref(), Some("cn-north-4"));
        assert!(matches!(args.output, OutputFormat::Yaml));
        match args.command {
            Command::Read { name, inputs } => {
                assert_eq!(name, "waf_policies");
                assert_eq!(inputs, vec![("name".to_string(), "p".to_string())]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
