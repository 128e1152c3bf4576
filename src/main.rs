use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use demoizer::config::constants::{DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, DEFAULT_LINK_REPLACEMENT};
use demoizer::config::{load_jobs, Job};
use demoizer::core::run_all;
use demoizer::env::{generate_env_docs, EnvConfig};

#[derive(Parser, Debug)]
#[command(
    name = "demoizer",
    version,
    about = "Process HTML files: remove scripts, download resources, and replace links",
    long_about = None
)]
struct Cli {
    /// JSON configuration file listing the files to process
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Input HTML file to process
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output HTML file name
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// URL to replace all links with
    #[arg(short, long, default_value = DEFAULT_LINK_REPLACEMENT)]
    link_replacement: String,

    /// Base URL for resolving relative URLs
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory downloaded resources are saved into
    #[arg(short, long)]
    resources_dir: Option<PathBuf>,

    /// Set custom User-Agent string
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Adjust network request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Enforce custom charset for input and output documents
    #[arg(short = 'E', long)]
    encoding: Option<String>,

    /// Suppress progress output
    #[arg(short, long)]
    silent: bool,
}

fn init_logging(env_config: &EnvConfig, silent: bool) {
    let level: &str = if silent {
        "warn"
    } else {
        env_config.log_level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_ansi(!env_config.no_color && atty::is(atty::Stream::Stderr))
        .with_target(false)
        .without_time()
        .init();
}

/// 命令行指定了输入输出时只处理单个文件，否则读取配置文件
fn jobs_from(cli: &Cli) -> Result<Vec<Job>> {
    match (&cli.input, &cli.output) {
        (Some(input), Some(output)) => Ok(vec![Job::new(input, output)
            .with_link_replacement(&cli.link_replacement)
            .with_base_url(&cli.base_url)]),
        (None, None) => {
            load_jobs(&cli.config).context("No valid configuration found. Exiting.")
        }
        _ => bail!("Both --input and --output must be specified for command line mode"),
    }
}

fn main() -> Result<()> {
    let matches = Cli::command().after_help(generate_env_docs()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let env_config = EnvConfig::from_env()?;
    init_logging(&env_config, cli.silent);

    let jobs: Vec<Job> = jobs_from(&cli)?;

    // 命令行参数优先于环境变量
    let mut options = env_config.options();
    if let Some(resources_dir) = cli.resources_dir {
        options.resources_dir = resources_dir;
    }
    if let Some(user_agent) = cli.user_agent {
        options.user_agent = Some(user_agent);
    }
    if let Some(timeout) = cli.timeout {
        options.timeout = timeout;
    }
    options.encoding = cli.encoding;

    let summary = run_all(&jobs, &options).context("Unable to start processing")?;

    info!(
        "{} succeeded, {} failed, {} resources downloaded",
        summary.succeeded, summary.failed, summary.resources
    );

    Ok(())
}
