use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "teragrab")]
#[command(author, version, about = "Telegram bot that resolves Terabox share links into direct video URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot
    Run {
        /// Use webhook mode instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Resolve a Terabox link from the terminal without Telegram
    Resolve {
        /// The share URL to resolve
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
