use readlater_core::Viewer;
use serde_json::json;

#[test]
fn viewer_serializes_with_account_field_names() {
    let viewer = Viewer::new("u1", "Ann", "ann")
        .with_profile_image_url("http://img")
        .with_intercom_hash("hash1");

    let value = serde_json::to_value(&viewer).unwrap();
    assert_eq!(
        value,
        json!({
            "userID": "u1",
            "name": "Ann",
            "username": "ann",
            "profileImageURL": "http://img",
            "intercomHash": "hash1"
        })
    );
}

#[test]
fn viewer_deserializes_without_optional_fields() {
    let viewer: Viewer =
        serde_json::from_str(r#"{"userID":"u2","name":"Bob","username":"bob"}"#).unwrap();

    assert_eq!(viewer, Viewer::new("u2", "Bob", "bob"));
}
