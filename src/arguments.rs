use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about, bin_name = "cpv")]
pub struct Arguments {
    /// Root directory to search for .csproj files (defaults to the current directory)
    #[arg(long, short)]
    pub path: Option<PathBuf>,
    /// Prompt for the root directory before running
    #[arg(long, short, conflicts_with = "silent")]
    pub choose_dir: bool,
    /// Run without prompting; a valid version argument is then required
    #[arg(long, short)]
    pub silent: bool,
    /// Follow symbolic links while searching
    #[arg(long)]
    pub follow_links: bool,
    #[arg(long, short)]
    pub verbose: bool,
    /// Version to write, in the format X.X.X.X
    pub new_version: Option<String>,
}

impl Arguments {
    /// Root directory given on the command line, or the current directory
    pub fn root_or_current(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
