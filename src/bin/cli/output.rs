use clap::ValueEnum;
use serde::Serialize;
use yakcat::dto::{AdminStats, AdminUserView, ItemDetail, ItemSummary, MessageView, UserSummary};
use yakcat::models::{Item, SiteSettings, User};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs)
    pub quiet: bool,
}

/// Prints `value` as pretty JSON, falling back to its debug form
fn print_json<T: Serialize + std::fmt::Debug>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{:?}", value),
    }
}

fn who(user: &Option<UserSummary>) -> String {
    match user {
        Some(u) => u.name.clone().unwrap_or_else(|| u.email.clone()),
        None => "-".to_string(),
    }
}

fn price(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("${:.2}", p),
        None => "-".to_string(),
    }
}

/// Header plus one aligned row per item
fn item_table(items: &[ItemSummary]) -> Vec<String> {
    let max_id = items.iter().map(|s| s.item.get_id().len()).max().unwrap_or(2).max(2);
    let max_title = items.iter().map(|s| s.item.get_title().len()).max().unwrap_or(5).max(5);
    let mut lines = vec![format!(
        "{:<id_w$}  {:<title_w$}  {:>10}  {:<9}  VENDOR",
        "ID",
        "TITLE",
        "PRICE",
        "STATUS",
        id_w = max_id,
        title_w = max_title,
    )];
    for summary in items {
        lines.push(format!(
            "{:<id_w$}  {:<title_w$}  {:>10}  {:<9}  {}",
            summary.item.get_id(),
            summary.item.get_title(),
            price(summary.item.get_price()),
            summary.item.get_status().as_str(),
            who(&summary.vendor),
            id_w = max_id,
            title_w = max_title,
        ));
    }
    lines
}

fn message_table(messages: &[MessageView]) -> Vec<String> {
    let max_id = messages.iter().map(|m| m.message.get_id().len()).max().unwrap_or(2).max(2);
    let mut lines = vec![format!("{:<id_w$}  {:<4}  {:<16}  {:<24}  SUBJECT", "ID", "READ", "SENT", "FROM", id_w = max_id)];
    for view in messages {
        lines.push(format!(
            "{:<id_w$}  {:<4}  {:<16}  {:<24}  {}",
            view.message.get_id(),
            if view.message.is_read() { "yes" } else { "no" },
            view.message.get_created_at().format("%Y-%m-%d %H:%M"),
            who(&view.sender),
            view.message.get_subject(),
            id_w = max_id,
        ));
    }
    lines
}

pub fn print_items(items: &[ItemSummary], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("No items found.");
                }
                return;
            }
            if config.quiet {
                for summary in items {
                    println!("{}", summary.item.get_id());
                }
                return;
            }
            for line in item_table(items) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Prints a bare item, as returned by an update
pub fn print_item(item: &Item, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", item.get_id());
                return;
            }
            println!("ID:       {}", item.get_id());
            println!("Title:    {}", item.get_title());
            println!("Slug:     {}", item.get_slug());
            println!("Price:    {}", price(item.get_price()));
            println!("Status:   {}", item.get_status());
            println!("Updated:  {}", item.get_updated_at());
        }
        OutputFormat::Json => print_json(item),
    }
}

pub fn print_item_detail(detail: &ItemDetail, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let item = &detail.item;
            if config.quiet {
                println!("{}", item.get_id());
                return;
            }
            println!("ID:          {}", item.get_id());
            println!("Title:       {}", item.get_title());
            println!("Slug:        {}", item.get_slug());
            println!("Price:       {}", price(item.get_price()));
            println!("Status:      {}", item.get_status());
            println!("Vendor:      {}", who(&detail.vendor));
            if let Some(description) = item.get_description() {
                println!("Description: {}", description);
            }
            if let Some(location) = item.get_location() {
                println!("Location:    {}", location);
            }
            if let Some(contact) = item.get_contact_info() {
                println!("Contact:     {}", contact);
            }
            let tags: Vec<String> = detail.tags.iter().map(|t| t.get_name()).collect();
            println!("Tags:        {}", if tags.is_empty() { "-".to_string() } else { tags.join(", ") });
            println!("Images:      {}", detail.images.len());
            println!("Views:       {}", item.get_view_count());
            println!("Listed:      {}", item.get_created_at());
        }
        OutputFormat::Json => print_json(detail),
    }
}

pub fn print_messages(messages: &[MessageView], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if messages.is_empty() {
                if !config.quiet {
                    println!("No messages.");
                }
                return;
            }
            if config.quiet {
                for view in messages {
                    println!("{}", view.message.get_id());
                }
                return;
            }
            for line in message_table(messages) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => print_json(&messages),
    }
}

pub fn print_message(view: &MessageView, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", view.message.get_id());
                return;
            }
            println!("ID:      {}", view.message.get_id());
            println!("From:    {}", who(&view.sender));
            println!("To:      {}", who(&view.recipient));
            println!("Subject: {}", view.message.get_subject());
            println!();
            println!("{}", view.message.get_body());
        }
        OutputFormat::Json => print_json(view),
    }
}

pub fn print_user(user: &User, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", user.get_id());
                return;
            }
            println!("ID:    {}", user.get_id());
            println!("Email: {}", user.get_email());
            println!("Name:  {}", user.get_name().unwrap_or_else(|| "-".to_string()));
            println!("Role:  {}", user.get_role());
        }
        OutputFormat::Json => print_json(user),
    }
}

pub fn print_admin_users(rows: &[AdminUserView], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                for row in rows {
                    println!("{}", row.user.get_id());
                }
                return;
            }
            let max_email = rows.iter().map(|r| r.user.get_email().len()).max().unwrap_or(5);
            println!("{:<36}  {:<email_w$}  {:<6}  {:>5}  {:>8}", "ID", "EMAIL", "ROLE", "ITEMS", "MESSAGES", email_w = max_email);
            for row in rows {
                println!(
                    "{:<36}  {:<email_w$}  {:<6}  {:>5}  {:>8}",
                    row.user.get_id(),
                    row.user.get_email(),
                    row.user.get_role().as_str(),
                    row.item_count,
                    row.message_count,
                    email_w = max_email,
                );
            }
        }
        OutputFormat::Json => print_json(&rows),
    }
}

pub fn print_stats(stats: &AdminStats, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("Users:    {}", stats.counts.total_users);
            println!("Items:    {}", stats.counts.total_items);
            println!("Messages: {}", stats.counts.total_messages);
            println!("Events:   {}", stats.counts.total_events);
            if config.quiet {
                return;
            }
            println!();
            println!("Recent items:");
            for summary in &stats.recent_items {
                println!("  {}  {}", summary.item.get_created_at().format("%Y-%m-%d"), summary.item.get_title());
            }
            println!("Recent users:");
            for user in &stats.recent_users {
                println!("  {}  {}", user.get_created_at().format("%Y-%m-%d"), user.get_email());
            }
        }
        OutputFormat::Json => print_json(stats),
    }
}

pub fn print_settings(settings: &SiteSettings, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("Site name:           {}", settings.site_name);
            println!("Description:         {}", settings.site_description);
            println!("Contact email:       {}", settings.contact_email);
            println!("Max images per item: {}", settings.max_images_per_item);
            println!("Require approval:    {}", settings.require_approval);
            println!("Maintenance mode:    {}", settings.maintenance_mode);
            println!("Allow registration:  {}", settings.allow_registration);
            println!("Email notifications: {}", settings.email_notifications);
        }
        OutputFormat::Json => print_json(settings),
    }
}

/// Prints a simple success message (for operations that don't return data)
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}
