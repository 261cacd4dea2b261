use clap::Subcommand;

use yakcat::dto::{CreateItemDto, ItemQueryDto, UpdateItemDto};

use crate::client::YakCatClient;
use crate::output::{self, OutputConfig};

/// Catalogue commands
#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// List available items
    List {
        /// Search title and description
        #[clap(long, short)]
        query: Option<String>,
        /// Only items carrying this tag
        #[clap(long)]
        tag: Option<String>,
    },
    /// Show one item by ID, or by slug with `--slug`
    Show {
        id: String,
        /// Treat the argument as a slug (counts as a page view)
        #[clap(long)]
        slug: bool,
    },
    /// List a new item for sale
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        contact_info: Option<String>,
        /// Tag names, repeatable
        #[clap(long = "tag")]
        tags: Vec<String>,
    },
    /// Change fields of one of your items
    Update {
        id: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        /// Remove the price ("ask the vendor")
        #[clap(long, conflicts_with = "price")]
        clear_price: bool,
        /// AVAILABLE, PENDING, SOLD or REMOVED
        #[clap(long)]
        status: Option<String>,
    },
    /// Delete one of your items
    Delete { id: String },
    /// List your own items in every status
    Mine,
}

pub async fn execute(
    client: &YakCatClient,
    cmd: ItemCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ItemCommands::List { query, tag } => {
            let items = client.list_items(&ItemQueryDto { q: query, tag }).await?;
            output::print_items(&items, config);
        }
        ItemCommands::Show { id, slug } => {
            let detail = if slug {
                client.get_item_by_slug(&id).await?
            } else {
                client.get_item(&id).await?
            };
            output::print_item_detail(&detail, config);
        }
        ItemCommands::Create { title, description, price, location, contact_info, tags } => {
            let dto = CreateItemDto {
                title,
                description,
                price,
                location,
                contact_info,
                images: Vec::new(),
                tags,
            };
            let detail = client.create_item(&dto).await?;
            output::print_item_detail(&detail, config);
        }
        ItemCommands::Update { id, title, price, clear_price, status } => {
            let price = if clear_price { Some(None) } else { price.map(Some) };
            let dto = UpdateItemDto {
                title,
                price,
                status,
                ..UpdateItemDto::default()
            };
            let item = client.update_item(&id, &dto).await?;
            output::print_item(&item, config);
        }
        ItemCommands::Delete { id } => {
            client.delete_item(&id).await?;
            output::print_success(&format!("Deleted item {}", id), config);
        }
        ItemCommands::Mine => {
            let items = client.my_items().await?;
            output::print_items(&items, config);
        }
    }
    Ok(())
}
