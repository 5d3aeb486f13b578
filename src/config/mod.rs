pub mod job;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::job::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "slack-sheet-sync")]
#[command(about = "Export Slack channels and users into spreadsheet sheets")]
pub struct CliConfig {
    /// Slack bot token; falls back to the SLACK_TOKEN environment variable.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every export defined in a TOML job file
    Export {
        #[arg(long)]
        config: PathBuf,
    },

    /// Export the channel list into one sheet
    Channels {
        #[arg(long, default_value = "Channels")]
        sheet: String,

        /// Comma-separated field list; inferred from the first record when
        /// omitted
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        #[arg(long, help = "Include archived channels")]
        include_archived: bool,

        #[arg(long, default_value = "public_channel,private_channel")]
        types: String,

        #[arg(long, default_value = "100")]
        limit: u32,

        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        /// Output directory (csv) or file path (xlsx)
        #[arg(long, default_value = "./slack-export")]
        out: String,
    },

    /// Export the member list into one sheet
    Users {
        #[arg(long, default_value = "Users")]
        sheet: String,

        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,

        #[arg(long, default_value = "./slack-export")]
        out: String,
    },

    /// Create a channel (private unless --public is given)
    CreateChannel {
        name: String,

        #[arg(long)]
        public: bool,
    },

    /// Invite users to a channel
    Invite {
        #[arg(long)]
        channel: String,

        /// User ids, comma-separated or repeated
        #[arg(required = true, value_delimiter = ',')]
        users: Vec<String>,
    },

    /// Open a direct message with one or more users
    OpenDm {
        #[arg(required = true, value_delimiter = ',')]
        users: Vec<String>,
    },

    /// Post a message to a channel id or #name
    PostMessage {
        #[arg(long)]
        channel: String,

        text: String,
    },
}
