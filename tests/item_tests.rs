//! Integration tests for the catalogue: listing, browsing, editing and tags

use axum::http::{Method, StatusCode};
use serde_json::json;
use yakcat::models::Role;

mod common;
use common::*;

#[tokio::test]
async fn test_create_and_browse() {
    let (app, pool) = create_test_app();
    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;

    let item = list_item(
        &app,
        &vendor,
        json!({
            "title": "Oak Rocking Chair",
            "description": "Solid oak, 1960s",
            "price": 85.5,
            "contactInfo": "booth 12",
            "images": [{"url": "https://cdn.test/chair.jpg", "key": "chair"}],
            "tags": ["Furniture", "vintage"]
        }),
    )
    .await;
    assert_eq!(item["status"], "AVAILABLE");
    assert_eq!(item["viewCount"], 0);
    assert_eq!(item["images"].as_array().unwrap().len(), 1);
    assert_eq!(item["tags"].as_array().unwrap().len(), 2);
    assert_eq!(item["vendor"]["email"], "v@vendor.test");
    let slug = item["slug"].as_str().unwrap().to_string();
    assert!(slug.starts_with("oak-rocking-chair-"));

    // Public browsing needs no session
    let (status, listed) = call(&app, Method::GET, "/api/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["images"][0]["url"], "https://cdn.test/chair.jpg");

    let (status, by_id) = call(&app, Method::GET, &format!("/api/items/{}", item["id"].as_str().unwrap()), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["title"], "Oak Rocking Chair");
    assert_eq!(by_id["viewCount"], 0);

    // Opening the public page by slug counts a view
    let (_, first) = call(&app, Method::GET, &format!("/api/items/slug/{}", slug), None, None).await;
    let (_, second) = call(&app, Method::GET, &format!("/api/items/slug/{}", slug), None, None).await;
    assert_eq!(first["viewCount"], 1);
    assert_eq!(second["viewCount"], 2);

    let (status, _) = call(&app, Method::GET, "/api/items/slug/no-such-item", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_and_tag_filter() {
    let (app, pool) = create_test_app();
    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;
    list_item(&app, &vendor, json!({"title": "Brass Lamp", "tags": ["lighting"]})).await;
    list_item(&app, &vendor, json!({"title": "Desk", "description": "has a lamp hook"})).await;
    list_item(&app, &vendor, json!({"title": "Toolbox", "tags": ["tools"]})).await;

    let (_, found) = call(&app, Method::GET, "/api/items?q=lamp", None, None).await;
    assert_eq!(found.as_array().unwrap().len(), 2);

    let (_, tagged) = call(&app, Method::GET, "/api/items?tag=tools", None, None).await;
    assert_eq!(tagged.as_array().unwrap().len(), 1);
    assert_eq!(tagged[0]["title"], "Toolbox");

    let (_, both) = call(&app, Method::GET, "/api/items?q=lamp&tag=lighting", None, None).await;
    assert_eq!(both.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_requires_session_and_title() {
    let (app, pool) = create_test_app();

    let (status, _) = call(&app, Method::POST, "/api/items", None, Some(json!({"title": "Anon"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;
    let (status, _) = call(&app, Method::POST, "/api/items", Some(&vendor), Some(json!({"title": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/api/items", Some(&vendor), Some(json!({"title": "Cheap", "price": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_approval_hides_new_items() {
    let (app, pool) = create_test_app();
    let admin = signed_in(&app, &pool, "admin@mall.test", Role::Admin).await;
    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;

    call(&app, Method::POST, "/api/admin/settings", Some(&admin), Some(json!({"requireApproval": true}))).await;

    let item = list_item(&app, &vendor, json!({"title": "Awaiting review"})).await;
    assert_eq!(item["status"], "PENDING");

    let (_, listed) = call(&app, Method::GET, "/api/items", None, None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (_, mine) = call(&app, Method::GET, "/api/my-items", Some(&vendor), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // The vendor cannot approve their own listing
    let uri = format!("/api/items/{}", item["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&vendor), Some(json!({"status": "AVAILABLE"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&vendor), Some(json!({"status": "SOLD"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&vendor), Some(json!({"title": "Still waiting"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = call(&app, Method::GET, "/api/items", None, None).await;
    assert!(listed.as_array().unwrap().is_empty());

    // Staff approve it
    let (status, approved) = call(&app, Method::PATCH, &uri, Some(&admin), Some(json!({"status": "AVAILABLE"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "AVAILABLE");

    let (_, listed) = call(&app, Method::GET, "/api/items", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_and_delete_permissions() {
    let (app, pool) = create_test_app();
    let owner = signed_in(&app, &pool, "owner@vendor.test", Role::Vendor).await;
    let other = signed_in(&app, &pool, "other@vendor.test", Role::Vendor).await;
    let staff = signed_in(&app, &pool, "staff@mall.test", Role::Staff).await;

    let item = list_item(&app, &owner, json!({"title": "Mirror", "price": 40, "location": "Aisle 3"})).await;
    let uri = format!("/api/items/{}", item["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::PATCH, &uri, None, Some(json!({"title": "Hijack"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::PATCH, &uri, Some(&other), Some(json!({"title": "Hijack"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Missing beats forbidden
    let (status, _) = call(&app, Method::PATCH, "/api/items/missing", Some(&other), Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = call(&app, Method::PATCH, &uri, Some(&owner), Some(json!({"price": null, "status": "SOLD"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["price"].is_null());
    assert_eq!(updated["location"], "Aisle 3");
    assert_eq!(updated["status"], "SOLD");

    let (status, _) = call(&app, Method::PATCH, &uri, Some(&owner), Some(json!({"status": "GIVEN_AWAY"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::PATCH, &uri, Some(&staff), Some(json!({"title": "Wall Mirror"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = call(&app, Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, _) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tags() {
    let (app, pool) = create_test_app();
    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;
    let other = signed_in(&app, &pool, "other@vendor.test", Role::Vendor).await;
    let staff = signed_in(&app, &pool, "staff@mall.test", Role::Staff).await;

    let (status, _) = call(&app, Method::POST, "/api/tags", Some(&vendor), Some(json!({"name": "rare"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, tag) = call(&app, Method::POST, "/api/tags", Some(&staff), Some(json!({"name": "rare"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::POST, "/api/tags", Some(&staff), Some(json!({"name": "rare"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let item = list_item(&app, &vendor, json!({"title": "Coin"})).await;
    let tags_uri = format!("/api/items/{}/tags", item["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::POST, &tags_uri, Some(&other), Some(json!({"name": "rare"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::POST, &tags_uri, Some(&vendor), Some(json!({"name": "rare"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, tagged) = call(&app, Method::GET, "/api/items?tag=rare", None, None).await;
    assert_eq!(tagged.as_array().unwrap().len(), 1);

    let remove_uri = format!("{}/{}", tags_uri, tag["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::DELETE, &remove_uri, Some(&vendor), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, tagged) = call(&app, Method::GET, "/api/items?tag=rare", None, None).await;
    assert!(tagged.as_array().unwrap().is_empty());

    let (_, all_tags) = call(&app, Method::GET, "/api/tags", None, None).await;
    assert_eq!(all_tags.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_bodies_get_json_errors() {
    let (app, pool) = create_test_app();
    let vendor = signed_in(&app, &pool, "v@vendor.test", Role::Vendor).await;

    // A null where text is required
    let (status, body) = call(&app, Method::POST, "/api/items", Some(&vendor), Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Wrong type for the price
    let (status, body) = call(&app, Method::POST, "/api/items", Some(&vendor), Some(json!({"title": "Lamp", "price": "cheap"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Not JSON at all
    let response = send_raw(&app, Method::POST, "/api/auth/login", None, "{email: 'v@vendor.test'").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let response = send_raw(&app, Method::PATCH, "/api/profile", Some(&vendor), "[1, 2").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
