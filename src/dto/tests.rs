use super::*;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn test_login_dto_missing_fields_default_to_empty() {
    let dto: LoginDto = serde_json::from_value(json!({})).unwrap();
    assert!(dto.email.is_empty());
    assert!(dto.password.is_empty());
}

#[test]
fn test_create_item_dto_camel_case() {
    let dto: CreateItemDto = serde_json::from_value(json!({
        "title": "Oak dresser",
        "price": 120.5,
        "contactInfo": "call after 5",
        "images": [{"url": "https://cdn.test/a.jpg", "key": "a"}],
        "tags": ["furniture"]
    }))
    .unwrap();

    assert_eq!(dto.title, "Oak dresser");
    assert_eq!(dto.price, Some(120.5));
    assert_eq!(dto.contact_info.as_deref(), Some("call after 5"));
    assert_eq!(dto.images, vec![ImageRefDto { url: "https://cdn.test/a.jpg".into(), key: "a".into() }]);
    assert_eq!(dto.tags, vec!["furniture".to_string()]);
    assert!(dto.description.is_none());
}

#[test]
fn test_update_item_dto_absent_vs_null() {
    let dto: UpdateItemDto = serde_json::from_value(json!({
        "title": "New title",
        "price": null,
        "location": "Booth 7"
    }))
    .unwrap();

    assert_eq!(dto.title.as_deref(), Some("New title"));
    assert_eq!(dto.price, Some(None));
    assert_eq!(dto.location, Some(Some("Booth 7".to_string())));
    assert_eq!(dto.description, None);
    assert_eq!(dto.contact_info, None);
    assert_eq!(dto.status, None);
}

#[test]
fn test_update_item_dto_serializes_only_set_fields() {
    let dto = UpdateItemDto {
        status: Some("SOLD".to_string()),
        description: Some(None),
        ..Default::default()
    };
    let value = serde_json::to_value(&dto).unwrap();
    assert_eq!(value, json!({"status": "SOLD", "description": null}));
}

#[test]
fn test_pin_dto_requires_flag() {
    assert!(serde_json::from_value::<PinPostDto>(json!({})).is_err());
    assert!(serde_json::from_value::<PinPostDto>(json!({"pinned": true})).unwrap().pinned);
}

#[test]
fn test_parse_event_date_formats() {
    let expected = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
    assert_eq!(parse_event_date("2025-06-01T10:00:00Z"), Some(expected));
    assert_eq!(parse_event_date("2025-06-01T12:00:00+02:00"), Some(expected));
    assert_eq!(parse_event_date("2025-06-01T10:00"), Some(expected));
    assert_eq!(parse_event_date(" 2025-06-01 10:00:00 "), Some(expected));
    assert_eq!(
        parse_event_date("2025-06-01"),
        Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_parse_event_date_rejects_garbage() {
    assert_eq!(parse_event_date(""), None);
    assert_eq!(parse_event_date("next tuesday"), None);
    assert_eq!(parse_event_date("2025-13-01"), None);
}

#[test]
fn test_message_response_omits_reset_fields() {
    let value = serde_json::to_value(MessageResponse::new("Check your email")).unwrap();
    assert_eq!(value, json!({"message": "Check your email"}));

    let with_token = MessageResponse {
        reset_token: Some("abc".into()),
        reset_link: Some("http://x/reset-password?token=abc".into()),
        ..MessageResponse::new("Check your email")
    };
    let value = serde_json::to_value(with_token).unwrap();
    assert_eq!(value["resetToken"], "abc");
    assert_eq!(value["resetLink"], "http://x/reset-password?token=abc");
}

#[test]
fn test_session_user_hides_credentials() {
    let user = User::new("Ana@Yakcat.Test", Some("Ana".into()), "secret-hash".into(), Role::Staff);
    let value = serde_json::to_value(AuthResponse { user: SessionUser::from(&user), token: "t".into() }).unwrap();

    assert_eq!(value["user"]["email"], "ana@yakcat.test");
    assert_eq!(value["user"]["role"], "STAFF");
    assert!(!value.to_string().contains("secret-hash"));
}

#[test]
fn test_item_summary_flattens_item() {
    let item = Item::new(
        "vendor-1".into(),
        "Brass lamp".into(),
        crate::models::ItemFields { price: Some(15.0), ..Default::default() },
        crate::models::ItemStatus::Available,
    );
    let summary = ItemSummary {
        item: item.clone(),
        images: vec![],
        vendor: Some(UserSummary { id: "vendor-1".into(), name: None, email: "v@yakcat.test".into() }),
    };

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["title"], "Brass lamp");
    assert_eq!(value["vendorId"], "vendor-1");
    assert_eq!(value["status"], "AVAILABLE");
    assert_eq!(value["vendor"]["email"], "v@yakcat.test");

    let back: ItemSummary = serde_json::from_value(value).unwrap();
    assert_eq!(back.item.get_id(), item.get_id());
}

#[test]
fn test_admin_user_view_counts_are_camel_case() {
    let user = User::new("v@yakcat.test", None, "h".into(), Role::Vendor);
    let value = serde_json::to_value(AdminUserView { user, item_count: 3, message_count: 1 }).unwrap();
    assert_eq!(value["itemCount"], 3);
    assert_eq!(value["messageCount"], 1);
    assert_eq!(value["role"], "VENDOR");
    assert!(value.get("passwordHash").is_none());
}
