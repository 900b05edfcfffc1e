use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipsnip")]
#[command(version)]
#[command(about = "Extract single files from remote ZIP archives using HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipsnip https://example.com/big.zip docs/readme.txt   fetch one member of big.zip\n  \
  zipsnip -l https://example.com/big.zip                list members without downloading\n  \
  zipsnip https://example.com/big.zip                   list members, then prompt\n\n\
The output file is the member's raw local-header-plus-payload span, not a\n\
standalone archive; feed it to an external tool such as `7z x` to recover\n\
the file.")]
pub struct Cli {
    /// HTTP(S) URL of the remote ZIP archive
    #[arg(value_name = "URL")]
    pub url: String,

    /// Member file to extract (prompted interactively when omitted)
    #[arg(value_name = "MEMBER")]
    pub member: Option<String>,

    /// Directory to write the extracted member into
    #[arg(short = 'd', value_name = "DIR", default_value = "outputs")]
    pub output_dir: String,

    /// List members and exit
    #[arg(short = 'l')]
    pub list: bool,

    /// Dump parsed ZIP structures while resolving
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode, suppress progress messages
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}
