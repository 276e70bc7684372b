use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "hjson-sync",
    about = "Mirror the dependency bump of the last package.json commit into package.hjson",
    long_about = "Mirror the dependency bump of the last package.json commit into package.hjson, \
                  then commit and push it back to the CI branch.\n\n\
                  Reads OUTREACH_GITHUB_TOKEN and CIRCLE_BRANCH from the environment.",
    version
)]
pub struct Cli {
    /// Path to the repository root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Client package directory, relative to the repository root
    #[arg(long, value_name = "DIR", default_value = "api/clients/node")]
    pub client_dir: String,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
