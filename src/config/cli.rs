use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "library-catalog")]
#[command(about = "Interactive library catalog backed by flat text files")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the data files (overrides the config file)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
