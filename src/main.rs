use clap::Parser;
use serde_json::Value;

use slack_sheet_sync::config::job::OutputConfig;
use slack_sheet_sync::config::{CliConfig, Command};
use slack_sheet_sync::utils::error::{Result, SyncError};
use slack_sheet_sync::utils::{logger, validation};
use slack_sheet_sync::{
    export_channels, export_users, run_job, ChannelFilters, ExportParams, JobConfig, Record,
    SlackClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting slack-sheet-sync");

    if let Err(e) = run(cli).await {
        tracing::error!("Operation failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(cli: CliConfig) -> Result<()> {
    let CliConfig { token, command, .. } = cli;

    match command {
        Command::Export { config } => {
            let job = JobConfig::from_file(&config)?;
            let summary = run_job(&job).await?;
            for (sheet, rows) in &summary.sheets {
                println!("{}: {} rows", sheet, rows);
            }
            println!("✅ Export saved to: {}", summary.output.display());
        }

        Command::Channels {
            sheet,
            fields,
            include_archived,
            types,
            limit,
            format,
            out,
        } => {
            let client = build_client(token)?;
            let output = OutputConfig { format, path: out };
            let (path, mut sink) = output.build_sink();

            let filters = ChannelFilters {
                exclude_archived: !include_archived,
                types,
                limit,
            };
            let params = ExportParams {
                sheet,
                fields: optional_fields(fields),
            };

            let rows = export_channels(&client, sink.as_mut(), &filters, &params).await?;
            sink.finish().await?;
            println!("✅ Wrote {} channels to {}", rows, path.display());
        }

        Command::Users {
            sheet,
            fields,
            format,
            out,
        } => {
            let client = build_client(token)?;
            let output = OutputConfig { format, path: out };
            let (path, mut sink) = output.build_sink();

            let params = ExportParams {
                sheet,
                fields: optional_fields(fields),
            };

            let rows = export_users(&client, sink.as_mut(), &params).await?;
            sink.finish().await?;
            println!("✅ Wrote {} users to {}", rows, path.display());
        }

        Command::CreateChannel { name, public } => {
            validation::validate_channel_name("name", &name)?;
            let client = build_client(token)?;
            let channel = client.create_channel(&name, !public).await?;
            println!("✅ Created channel {}", field_text(&channel, "id"));
        }

        Command::Invite { channel, users } => {
            let client = build_client(token)?;
            client.invite_to_channel(&channel, &users).await?;
            println!("✅ Invited {} user(s) to {}", users.len(), channel);
        }

        Command::OpenDm { users } => {
            let client = build_client(token)?;
            let conversation = client.open_direct_message(&users).await?;
            println!("✅ Opened conversation {}", field_text(&conversation, "id"));
        }

        Command::PostMessage { channel, text } => {
            let client = build_client(token)?;
            let response = client.post_message(&channel, &text).await?;
            println!("✅ Posted message {}", field_text(&response, "ts"));
        }
    }

    Ok(())
}

fn build_client(token: Option<String>) -> Result<SlackClient> {
    let token = token
        .or_else(|| std::env::var("SLACK_TOKEN").ok())
        .ok_or_else(|| SyncError::MissingConfigError {
            field: "token (--token or SLACK_TOKEN)".to_string(),
        })?;
    validation::validate_non_empty_string("token", &token)?;
    Ok(SlackClient::new(token))
}

fn optional_fields(fields: Vec<String>) -> Option<Vec<String>> {
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn field_text(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("?")
        .to_string()
}
