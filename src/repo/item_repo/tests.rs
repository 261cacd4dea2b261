use super::*;
use crate::models::{Role, User};
use crate::repo::tests::setup_test_db;
use crate::repo::{add_tag_to_item_by_name, create_user, delete_user, get_tags_for_item};

async fn vendor(pool: &DbPool, email: &str) -> User {
    create_user(pool, email, Some("Vendor".to_string()), "hash".to_string(), Role::Vendor).await.unwrap()
}

async fn plain_item(pool: &DbPool, vendor: &User, title: &str, status: ItemStatus) -> Item {
    create_item(pool, &vendor.get_id(), title.to_string(), ItemFields::default(), status, &[], &[])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_item_with_images_and_tags() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;

    let fields = ItemFields {
        description: Some("Solid oak, six drawers".to_string()),
        price: Some(120.5),
        location: Some("Booth 12".to_string()),
        contact_info: None,
    };
    let image_refs = vec![
        ("https://cdn.test/a.jpg".to_string(), "a".to_string()),
        ("https://cdn.test/b.jpg".to_string(), "b".to_string()),
    ];
    let tag_names = vec!["Furniture".to_string(), " ".to_string(), "vintage".to_string()];

    let item = create_item(&pool, &owner.get_id(), "Oak Dresser".to_string(), fields, ItemStatus::Available, &image_refs, &tag_names)
        .await
        .unwrap();

    assert_eq!(item.get_title(), "Oak Dresser");
    assert_eq!(item.get_price(), Some(120.5));
    assert!(item.get_slug().starts_with("oak-dresser-"));
    assert_eq!(item.get_view_count(), 0);

    let images = get_images_for_item(&pool, &item.get_id()).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].get_file_key(), "a");
    assert_eq!(images[0].get_sort_order(), 0);
    assert_eq!(images[1].get_sort_order(), 1);

    let tag_names: Vec<String> = get_tags_for_item(&pool, &item.get_id()).unwrap().iter().map(|t| t.get_name()).collect();
    assert_eq!(tag_names, vec!["furniture", "vintage"]);
}

#[tokio::test]
async fn test_same_title_gets_distinct_slugs() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;

    let mut slugs = std::collections::HashSet::new();
    for _ in 0..5 {
        let item = plain_item(&pool, &owner, "Lamp", ItemStatus::Available).await;
        assert!(slugs.insert(item.get_slug()));
    }
}

#[tokio::test]
async fn test_create_item_for_missing_vendor_fails() {
    let pool = setup_test_db();
    let result = create_item(&pool, "ghost", "Lamp".to_string(), ItemFields::default(), ItemStatus::Available, &[], &[]).await;
    assert!(result.is_err());
    assert!(list_all_items(&pool).unwrap().is_empty());
}

#[tokio::test]
async fn test_get_item_and_slug() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let item = plain_item(&pool, &owner, "Brass Lamp", ItemStatus::Available).await;

    assert_eq!(get_item(&pool, &item.get_id()).unwrap().unwrap(), item);
    assert_eq!(get_item_by_slug(&pool, &item.get_slug()).unwrap().unwrap(), item);
    assert!(get_item(&pool, "nonexistent-id").unwrap().is_none());
    assert!(get_item_by_slug(&pool, "no-such-slug").unwrap().is_none());
}

#[tokio::test]
async fn test_increment_view_count() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let item = plain_item(&pool, &owner, "Clock", ItemStatus::Available).await;

    increment_view_count(&pool, &item.get_id()).await.unwrap();
    increment_view_count(&pool, &item.get_id()).await.unwrap();

    assert_eq!(get_item(&pool, &item.get_id()).unwrap().unwrap().get_view_count(), 2);
}

#[tokio::test]
async fn test_list_available_filters_status() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let visible = plain_item(&pool, &owner, "Chair", ItemStatus::Available).await;
    plain_item(&pool, &owner, "Table", ItemStatus::Pending).await;
    plain_item(&pool, &owner, "Desk", ItemStatus::Sold).await;

    let listed = list_available_items(&pool, None, None, 50).unwrap();

    assert_eq!(listed, vec![visible]);
    assert_eq!(list_all_items(&pool).unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_available_search_is_case_insensitive() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    plain_item(&pool, &owner, "Vintage RADIO", ItemStatus::Available).await;
    let described = create_item(
        &pool,
        &owner.get_id(),
        "Cabinet".to_string(),
        ItemFields { description: Some("holds a radio".to_string()), ..Default::default() },
        ItemStatus::Available,
        &[],
        &[],
    )
    .await
    .unwrap();
    plain_item(&pool, &owner, "Teapot", ItemStatus::Available).await;

    let found = list_available_items(&pool, Some("Radio"), None, 50).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().any(|i| i.get_id() == described.get_id()));

    // Case folding is not limited to ASCII
    let apples = plain_item(&pool, &owner, "Äpfel crate", ItemStatus::Available).await;
    assert_eq!(list_available_items(&pool, Some("äPFEL"), None, 50).unwrap(), vec![apples.clone()]);
    assert_eq!(list_available_items(&pool, Some("ÄPFEL"), None, 50).unwrap(), vec![apples]);

    // LIKE wildcards in the query are matched literally
    assert!(list_available_items(&pool, Some("%"), None, 50).unwrap().is_empty());
    // A blank query is no filter
    assert_eq!(list_available_items(&pool, Some("  "), None, 50).unwrap().len(), 4);
}

#[tokio::test]
async fn test_list_available_by_tag() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let tagged = plain_item(&pool, &owner, "Record Player", ItemStatus::Available).await;
    plain_item(&pool, &owner, "Rug", ItemStatus::Available).await;
    add_tag_to_item_by_name(&pool, &tagged.get_id(), "electronics").await.unwrap();

    let found = list_available_items(&pool, None, Some("Electronics"), 50).unwrap();
    assert_eq!(found, vec![tagged.clone()]);

    let both = list_available_items(&pool, Some("record"), Some("electronics"), 50).unwrap();
    assert_eq!(both, vec![tagged]);

    assert!(list_available_items(&pool, None, Some("nothing"), 50).unwrap().is_empty());
}

#[tokio::test]
async fn test_list_available_newest_first_and_limited() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let mut created = Vec::new();
    for i in 0..4 {
        created.push(plain_item(&pool, &owner, &format!("Item {}", i), ItemStatus::Available).await);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed = list_available_items(&pool, None, None, 3).unwrap();

    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].get_id(), created[3].get_id());
    assert_eq!(listed[2].get_id(), created[1].get_id());
}

#[tokio::test]
async fn test_list_items_by_vendor() {
    let pool = setup_test_db();
    let a = vendor(&pool, "a@yakcat.test").await;
    let b = vendor(&pool, "b@yakcat.test").await;
    plain_item(&pool, &a, "One", ItemStatus::Available).await;
    plain_item(&pool, &a, "Two", ItemStatus::Removed).await;
    plain_item(&pool, &b, "Three", ItemStatus::Available).await;

    assert_eq!(list_items_by_vendor(&pool, &a.get_id()).unwrap().len(), 2);
    assert_eq!(list_items_by_vendor(&pool, &b.get_id()).unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_item_partial() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let item = create_item(
        &pool,
        &owner.get_id(),
        "Mirror".to_string(),
        ItemFields { price: Some(40.0), location: Some("Booth 3".to_string()), ..Default::default() },
        ItemStatus::Available,
        &[],
        &[],
    )
    .await
    .unwrap();

    let changes = ItemChanges {
        status: Some(ItemStatus::Sold),
        location: Some(None),
        ..Default::default()
    };
    let updated = update_item(&pool, &item.get_id(), changes).await.unwrap().unwrap();

    assert_eq!(updated.get_status(), ItemStatus::Sold);
    assert_eq!(updated.get_location(), None);
    assert_eq!(updated.get_price(), Some(40.0));
    assert_eq!(updated.get_title(), "Mirror");
    assert_eq!(updated.get_slug(), item.get_slug());
}

#[tokio::test]
async fn test_update_missing_item() {
    let pool = setup_test_db();
    let changes = ItemChanges { title: Some("x".to_string()), ..Default::default() };
    assert!(update_item(&pool, "missing", changes).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_item_cascades() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let image_refs = vec![("https://cdn.test/a.jpg".to_string(), "a".to_string())];
    let item = create_item(&pool, &owner.get_id(), "Vase".to_string(), ItemFields::default(), ItemStatus::Available, &image_refs, &["vintage".to_string()])
        .await
        .unwrap();

    assert!(delete_item(&pool, &item.get_id()).await.unwrap());
    assert!(!delete_item(&pool, &item.get_id()).await.unwrap());
    assert!(get_images_for_item(&pool, &item.get_id()).unwrap().is_empty());
    assert!(get_tags_for_item(&pool, &item.get_id()).unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_vendor_removes_items() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let item = plain_item(&pool, &owner, "Stool", ItemStatus::Available).await;

    delete_user(&pool, &owner.get_id()).await.unwrap();

    assert!(get_item(&pool, &item.get_id()).unwrap().is_none());
}

#[tokio::test]
async fn test_get_first_images() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let image_refs = vec![
        ("https://cdn.test/front.jpg".to_string(), "front".to_string()),
        ("https://cdn.test/back.jpg".to_string(), "back".to_string()),
    ];
    let with_images = create_item(&pool, &owner.get_id(), "Sofa".to_string(), ItemFields::default(), ItemStatus::Available, &image_refs, &[])
        .await
        .unwrap();
    let without = plain_item(&pool, &owner, "Ottoman", ItemStatus::Available).await;

    let first = get_first_images(&pool, &[with_images.get_id(), without.get_id()]).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first[&with_images.get_id()].get_file_key(), "front");
    assert!(get_first_images(&pool, &[]).unwrap().is_empty());
}

#[tokio::test]
async fn test_get_first_images_with_a_long_id_list() {
    let pool = setup_test_db();
    let owner = vendor(&pool, "v@yakcat.test").await;
    let image_refs = vec![("https://cdn.test/last.jpg".to_string(), "last".to_string())];
    let item = create_item(&pool, &owner.get_id(), "Armchair".to_string(), ItemFields::default(), ItemStatus::Available, &image_refs, &[])
        .await
        .unwrap();

    // More ids than SQLite binds in one statement, with the real one last
    let mut ids: Vec<String> = (0..40_000).map(|n| format!("missing-{}", n)).collect();
    ids.push(item.get_id());

    let first = get_first_images(&pool, &ids).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[&item.get_id()].get_file_key(), "last");
}
