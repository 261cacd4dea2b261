use clap::Subcommand;

use yakcat::dto::SendMessageDto;

use crate::client::YakCatClient;
use crate::output::{self, OutputConfig};

/// Direct message commands
#[derive(Subcommand, Debug)]
pub enum MessageCommands {
    /// Messages you received
    Inbox,
    /// Messages you sent
    Sent,
    /// Send a message to another user by email or account id
    Send {
        #[clap(long, required_unless_present = "to_id", conflicts_with = "to_id")]
        to: Option<String>,
        /// Recipient account id, e.g. the vendor of a listing
        #[clap(long)]
        to_id: Option<String>,
        #[clap(long)]
        subject: String,
        #[clap(long)]
        body: String,
    },
    /// Mark a received message as read
    Read { id: String },
}

pub async fn execute(
    client: &YakCatClient,
    cmd: MessageCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        MessageCommands::Inbox => {
            let messages = client.inbox().await?;
            output::print_messages(&messages, config);
        }
        MessageCommands::Sent => {
            let messages = client.sent_messages().await?;
            output::print_messages(&messages, config);
        }
        MessageCommands::Send { to, to_id, subject, body } => {
            let dto = SendMessageDto {
                recipient_email: to.unwrap_or_default(),
                recipient_id: to_id,
                subject,
                body,
            };
            let view = client.send_message(&dto).await?;
            output::print_message(&view, config);
        }
        MessageCommands::Read { id } => {
            client.mark_read(&id).await?;
            output::print_success(&format!("Marked message {} as read", id), config);
        }
    }
    Ok(())
}
