use std::{
    fs::File,
    io::{Read, Write},
    path::PathBuf,
};

use clap::{Args, Parser, ValueEnum};
use manifest_provider::{Provider, logging, manifest, provider::UnknownDataSourceError};
use serde_json::Value;
use snafu::{ResultExt, Snafu};

const APP_NAME: &str = "manifest-render";
const LOG_ENV: &str = "MANIFEST_RENDER_LOG";

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to initialize logging"))]
    InitializeLogging { source: logging::Error },

    #[snafu(display("failed to look up data source"))]
    LookupDataSource { source: UnknownDataSourceError },

    #[snafu(display("failed to open configuration file {}", path.display()))]
    OpenConfig {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse configuration"))]
    ParseConfig { source: serde_yaml::Error },

    #[snafu(display("failed to read {type_name}"))]
    ReadDataSource {
        source: manifest::Error,
        type_name: String,
    },

    #[snafu(display("failed to serialize output"))]
    SerializeOutput { source: serde_json::Error },

    #[snafu(display("failed to write output"))]
    WriteOutput { source: std::io::Error },
}

#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about)]
enum Command {
    /// Lists the type names of all data sources.
    List,

    /// Prints the schema of a data source as JSON.
    Schema(DataSourceArgs),

    /// Validates a configuration and prints the rendered manifest.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct DataSourceArgs {
    /// The type name of the data source.
    #[arg(long, env = "MANIFEST_DATA_SOURCE")]
    data_source: String,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    data_source: DataSourceArgs,

    /// YAML or JSON configuration with snake_case attribute names. Reads stdin when omitted or `-`.
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t)]
    output: Output,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Output {
    /// Only the manifest.
    #[default]
    Yaml,

    /// The computed `id` and `yaml` attributes as JSON.
    State,
}

#[snafu::report]
fn main() -> Result<(), Error> {
    let command = Command::parse();
    logging::initialize_logging(LOG_ENV, APP_NAME).context(InitializeLoggingSnafu)?;

    let provider = Provider::new();

    let output = match command {
        Command::List => provider
            .type_names()
            .map(|name| format!("{name}\n"))
            .collect::<String>(),
        Command::Schema(args) => {
            let schema = provider
                .data_source(&args.data_source)
                .context(LookupDataSourceSnafu)?
                .schema();
            let mut output = serde_json::to_string_pretty(&schema).context(SerializeOutputSnafu)?;
            output.push('\n');
            output
        }
        Command::Render(args) => render(&provider, args)?,
    };

    std::io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context(WriteOutputSnafu)
}

fn render(provider: &Provider, args: RenderArgs) -> Result<String, Error> {
    let type_name = args.data_source.data_source;
    let data_source = provider
        .data_source(&type_name)
        .context(LookupDataSourceSnafu)?;

    let config = read_config(args.config)?;
    let response = match data_source.read(&config) {
        Ok(response) => response,
        Err(error) => {
            for diagnostic in &error.to_diagnostics() {
                tracing::error!(%diagnostic, "configuration rejected");
            }
            return Err(error).context(ReadDataSourceSnafu { type_name });
        }
    };

    tracing::info!(id = %response.id, type_name, "rendered manifest");

    match args.output {
        Output::Yaml => Ok(response.yaml),
        Output::State => {
            let mut output =
                serde_json::to_string_pretty(&response).context(SerializeOutputSnafu)?;
            output.push('\n');
            Ok(output)
        }
    }
}

/// Reads the configuration from `path`, or from stdin when `path` is omitted or `-`.
fn read_config(path: Option<PathBuf>) -> Result<Value, Error> {
    match config_file(path) {
        Some(path) => parse_config(File::open(&path).context(OpenConfigSnafu { path })?),
        None => parse_config(std::io::stdin().lock()),
    }
}

fn config_file(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|path| path.as_os_str() != "-")
}

/// Parses the configuration as YAML, which also accepts JSON.
fn parse_config(reader: impl Read) -> Result<Value, Error> {
    serde_yaml::from_reader(reader).context(ParseConfigSnafu)
}
