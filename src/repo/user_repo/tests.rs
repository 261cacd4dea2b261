use super::*;
use crate::db::is_unique_violation;
use crate::repo::tests::setup_test_db;
use chrono::Duration;

#[tokio::test]
async fn test_create_and_get_user() {
    let pool = setup_test_db();

    let user = create_user(&pool, "Vendor@YakCat.test", Some("Vera".to_string()), "hash".to_string(), Role::Vendor)
        .await
        .unwrap();

    let by_id = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(by_id, user);
    assert_eq!(by_id.get_email(), "vendor@yakcat.test");

    let by_email = get_user_by_email(&pool, "  VENDOR@yakcat.TEST ").unwrap().unwrap();
    assert_eq!(by_email.get_id(), user.get_id());
}

#[tokio::test]
async fn test_get_missing_user() {
    let pool = setup_test_db();
    assert!(get_user(&pool, "nonexistent-id").unwrap().is_none());
    assert!(get_user_by_email(&pool, "nobody@yakcat.test").unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_unique_violation() {
    let pool = setup_test_db();
    create_user(&pool, "dup@yakcat.test", None, "hash".to_string(), Role::Vendor).await.unwrap();

    let err = create_user(&pool, "DUP@yakcat.test", None, "hash".to_string(), Role::Vendor)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn test_get_users_by_ids() {
    let pool = setup_test_db();
    let a = create_user(&pool, "a@yakcat.test", None, "hash".to_string(), Role::Vendor).await.unwrap();
    let b = create_user(&pool, "b@yakcat.test", None, "hash".to_string(), Role::Staff).await.unwrap();

    let found = get_users_by_ids(&pool, &[a.get_id(), b.get_id(), "missing".to_string()]).unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[&b.get_id()].get_role(), Role::Staff);
    assert!(get_users_by_ids(&pool, &[]).unwrap().is_empty());

    let mut many: Vec<String> = (0..40_000).map(|n| format!("missing-{}", n)).collect();
    many.push(a.get_id());
    let found = get_users_by_ids(&pool, &many).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found.contains_key(&a.get_id()));
}

#[tokio::test]
async fn test_update_profile_only_touches_given_fields() {
    let pool = setup_test_db();
    let user = create_user(&pool, "p@yakcat.test", Some("Pat".to_string()), "hash".to_string(), Role::Vendor)
        .await
        .unwrap();

    let changes = ProfileChanges {
        default_phone: Some("555-0100".to_string()),
        ..Default::default()
    };
    let updated = update_profile(&pool, &user.get_id(), changes).await.unwrap().unwrap();

    assert_eq!(updated.get_name(), Some("Pat".to_string()));
    assert_eq!(updated.get_default_phone(), Some("555-0100".to_string()));
    assert!(updated.get_updated_at() >= user.get_updated_at());
}

#[tokio::test]
async fn test_update_profile_missing_user() {
    let pool = setup_test_db();
    let result = update_profile(&pool, "missing", ProfileChanges::default()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_update_role_and_password() {
    let pool = setup_test_db();
    let user = create_user(&pool, "r@yakcat.test", None, "old".to_string(), Role::Vendor).await.unwrap();

    let promoted = update_user_role(&pool, &user.get_id(), Role::Staff).await.unwrap().unwrap();
    assert_eq!(promoted.get_role(), Role::Staff);
    assert!(update_user_role(&pool, "missing", Role::Staff).await.unwrap().is_none());

    update_password(&pool, &user.get_id(), "new").await.unwrap();
    let stored = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_password_hash(), "new");
}

#[tokio::test]
async fn test_delete_user() {
    let pool = setup_test_db();
    let user = create_user(&pool, "d@yakcat.test", None, "hash".to_string(), Role::Vendor).await.unwrap();

    assert!(delete_user(&pool, &user.get_id()).await.unwrap());
    assert!(!delete_user(&pool, &user.get_id()).await.unwrap());
    assert!(get_user(&pool, &user.get_id()).unwrap().is_none());
}

#[tokio::test]
async fn test_password_reset_roundtrip() {
    let pool = setup_test_db();
    let user = create_user(&pool, "reset@yakcat.test", None, "old".to_string(), Role::Vendor).await.unwrap();
    let now = Utc::now();

    set_reset_token(&pool, &user.get_id(), "tok", now + Duration::hours(1)).await.unwrap();
    let stored = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert!(stored.reset_token_valid_at(now));
    assert!(!stored.reset_token_valid_at(now + Duration::hours(2)));

    // Too late
    assert!(!complete_password_reset(&pool, "tok", "new", now + Duration::hours(2)).await.unwrap());
    // Wrong token
    assert!(!complete_password_reset(&pool, "other", "new", now).await.unwrap());

    assert!(complete_password_reset(&pool, "tok", "new", now).await.unwrap());
    let stored = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(stored.get_password_hash(), "new");
    assert!(stored.get_reset_token().is_none());
}

#[tokio::test]
async fn test_upsert_admin_creates_then_promotes() {
    let pool = setup_test_db();

    let created = upsert_admin(&pool, "boss@yakcat.test", Some("Boss".to_string()), "h1".to_string()).await.unwrap();
    assert_eq!(created.get_role(), Role::Admin);

    let vendor = create_user(&pool, "vendor@yakcat.test", None, "h".to_string(), Role::Vendor).await.unwrap();
    let promoted = upsert_admin(&pool, "vendor@yakcat.test", None, "h2".to_string()).await.unwrap();

    assert_eq!(promoted.get_id(), vendor.get_id());
    assert_eq!(promoted.get_role(), Role::Admin);
    assert_eq!(promoted.get_password_hash(), "h2");
    assert_eq!(list_recent_users(&pool, 100).unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_recent_users_limit() {
    let pool = setup_test_db();
    for i in 0..7 {
        create_user(&pool, &format!("u{}@yakcat.test", i), None, "h".to_string(), Role::Vendor).await.unwrap();
    }

    assert_eq!(list_recent_users(&pool, 5).unwrap().len(), 5);
    assert_eq!(list_recent_users(&pool, 100).unwrap().len(), 7);
}
