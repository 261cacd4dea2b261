//! Assembles response views from repository rows
//!
//! Related users and images are fetched in one query per kind rather than
//! one query per row.

use std::collections::HashMap;

use anyhow::Result;

use crate::db::DbPool;
use crate::dto::{EventView, ForumPostView, ItemDetail, ItemSummary, MessageView, UserSummary};
use crate::models::{Event, ForumPost, Item, Message};
use crate::repo;

fn user_summaries(pool: &DbPool, ids: impl IntoIterator<Item = String>) -> Result<HashMap<String, UserSummary>> {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();

    Ok(repo::get_users_by_ids(pool, &ids)?
        .iter()
        .map(|(id, user)| (id.clone(), UserSummary::from(user)))
        .collect())
}

/// Items with their first image and vendor
pub(crate) fn item_summaries(pool: &DbPool, items: Vec<Item>) -> Result<Vec<ItemSummary>> {
    let item_ids: Vec<String> = items.iter().map(Item::get_id).collect();
    let mut first_images = repo::get_first_images(pool, &item_ids)?;
    let vendors = user_summaries(pool, items.iter().map(Item::get_vendor_id))?;

    Ok(items
        .into_iter()
        .map(|item| ItemSummary {
            images: first_images.remove(&item.get_id()).into_iter().collect(),
            vendor: vendors.get(&item.get_vendor_id()).cloned(),
            item,
        })
        .collect())
}

/// An item with every image, its tags and its vendor
pub(crate) fn item_detail(pool: &DbPool, item: Item) -> Result<ItemDetail> {
    let images = repo::get_images_for_item(pool, &item.get_id())?;
    let tags = repo::get_tags_for_item(pool, &item.get_id())?;
    let vendor = repo::get_user(pool, &item.get_vendor_id())?.as_ref().map(UserSummary::from);

    Ok(ItemDetail { item, images, tags, vendor })
}

pub(crate) fn message_views(pool: &DbPool, messages: Vec<Message>) -> Result<Vec<MessageView>> {
    let people = user_summaries(
        pool,
        messages
            .iter()
            .flat_map(|m| [m.get_sender_id(), m.get_recipient_id()]),
    )?;

    Ok(messages
        .into_iter()
        .map(|message| MessageView {
            sender: people.get(&message.get_sender_id()).cloned(),
            recipient: people.get(&message.get_recipient_id()).cloned(),
            message,
        })
        .collect())
}

pub(crate) fn post_views(pool: &DbPool, posts: Vec<ForumPost>) -> Result<Vec<ForumPostView>> {
    let authors = user_summaries(pool, posts.iter().map(ForumPost::get_author_id))?;

    Ok(posts
        .into_iter()
        .map(|post| ForumPostView {
            author: authors.get(&post.get_author_id()).cloned(),
            post,
        })
        .collect())
}

pub(crate) fn event_views(pool: &DbPool, events: Vec<Event>) -> Result<Vec<EventView>> {
    let organizers = user_summaries(pool, events.iter().map(Event::get_organizer_id))?;

    Ok(events
        .into_iter()
        .map(|event| EventView {
            organizer: organizers.get(&event.get_organizer_id()).cloned(),
            event,
        })
        .collect())
}
