use clap::Parser;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch movie records from an HTTP endpoint and store the new ones in SQLite",
    long_about = "Runs a single sync: loads the YAML config, fetches the configured endpoint once and inserts every record whose id is not stored yet."
)]
pub struct Cli {
    #[arg(
        short = 'c',
        long = "config",
        env = "DATASYNC_CONFIG",
        default_value = "config.yaml",
        value_name = "PATH",
        help = "YAML configuration file"
    )]
    pub config: PathBuf,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
