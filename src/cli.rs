use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tarstore")]
#[command(version)]
#[command(about = "Browse and extract tar archives as object storage", long_about = None)]
#[command(after_help = "Examples:\n  \
  tarstore data.tar -x '*.log'        extract everything except log files\n  \
  tarstore -p data.tar world.txt      send world.txt to stdout\n  \
  tarstore -s data.tar dir/           show metadata of dir/\n  \
  tarstore -l https://example.com/archive.tar   list a remote archive")]
pub struct Cli {
    /// Tar file path or HTTP URL
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Paths to act on (default: all)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// List objects (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Only list objects under this prefix
    #[arg(long, value_name = "PREFIX", default_value = "")]
    pub prefix: String,

    /// Show metadata of the given paths
    #[arg(short = 's')]
    pub stat: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "PATH", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.archive.starts_with("http://") || self.archive.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
