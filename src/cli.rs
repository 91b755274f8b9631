use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(subcommand_negates_reqs(true))]
pub struct Cli {
    /// Calibration frame to transfer (absolute, or relative to the configured local dir)
    #[clap(default_value = "default", hide_default_value(true))]
    pub file: String,
    /// Literal "last" marks the final calibration file of the batch
    #[clap(default_value = "not", hide_default_value(true))]
    pub batch: String,
    #[clap(short, long, help = "Print verbose diagnostic logs for debugging")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn final_batch(&self) -> bool {
        self.batch == "last"
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(about = "Configure fitsync")]
    Set {
        #[clap(long, help = "Storage server hostname", display_order = 1)]
        host: Option<String>,
        #[clap(long, help = "Storage server SSH port", display_order = 2)]
        port: Option<u16>,
        #[clap(long, help = "Remote username", display_order = 3)]
        username: Option<String>,
        #[clap(short = 'k', long, help = "Private key path", display_order = 4)]
        key_path: Option<PathBuf>,
        #[clap(long, help = "Local acquisition directory", display_order = 5)]
        local_dir: Option<PathBuf>,
        #[clap(long, help = "Remote raw-data base directory", display_order = 6)]
        remote_base: Option<String>,
        #[clap(long, help = "Remote processing script path", display_order = 7)]
        process_script: Option<String>,
        #[clap(long, help = "Remote command timeout in seconds", display_order = 8)]
        command_timeout: Option<u64>,
    },
}
