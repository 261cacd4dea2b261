/// Data models module
///
/// This module defines the records stored in the marketplace database:
/// users, item listings with their images and tags, direct messages, forum
/// posts, events and the persisted site settings. Each model maps onto one
/// table in `schema.rs` and keeps its fields private behind accessors.

mod timestamp;

mod user;
pub use user::{normalize_email, Role, User};

mod item;
pub use item::{generate_slug, Item, ItemFields, ItemStatus};

mod image;
pub use image::Image;

mod tag;
pub use tag::Tag;

mod item_tag;
pub use item_tag::ItemTag;

mod message;
pub use message::Message;

mod forum_post;
pub use forum_post::ForumPost;

mod event;
pub use event::Event;

mod site_settings;
pub use site_settings::{SiteSettings, SiteSettingsRow};
