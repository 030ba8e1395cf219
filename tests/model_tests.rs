use chrono::NaiveDate;
use kith::model::*;
use serde_json::json;

// ==========================================================================
// ID TESTS
// ==========================================================================

#[test]
fn id_is_type_safe() {
    let friend_id = Id::<Friend>::generate();
    let category_id = Id::<Category>::generate();
    // Different types at compile time; the UUIDs differ too.
    assert_ne!(friend_id.value, category_id.value);
}

#[test]
fn id_deserializes_from_uuid_string() {
    let id = Id::<Friend>::generate();
    let parsed: Id<Friend> = serde_json::from_value(json!(id.to_db())).unwrap();
    assert_eq!(parsed, id);
}

// ==========================================================================
// USER TESTS
// ==========================================================================

#[test]
fn user_json_never_contains_password_hash() {
    let user = User::create("Ada".into(), "ada@example.org".into(), "$argon2id$secret".into());
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["email"], "ada@example.org");
    assert!(value.get("passwordHash").is_none());
    assert!(value.get("password_hash").is_none());
    assert!(!value.to_string().contains("argon2"));
}

// ==========================================================================
// FRIEND TESTS
// ==========================================================================

#[test]
fn friend_create_defaults() {
    let friend = Friend::create("Grace".into());
    assert_eq!(friend.level, RelationshipLevel::Friend);
    assert!(!friend.archived);
    assert!(friend.interests.is_empty());
    assert_eq!(friend.created_at, friend.updated_at);
}

#[test]
fn friend_matches_name_nickname_location_and_interests() {
    let mut friend = Friend::create("Grace Hopper".into());
    friend.nickname = Some("Amazing Grace".into());
    friend.location = Some("Arlington".into());
    friend.interests = vec!["COBOL".into()];

    assert!(friend.matches("hopper"));
    assert!(friend.matches("AMAZING"));
    assert!(friend.matches("arling"));
    assert!(friend.matches("cobol"));
    assert!(friend.matches("   "));
    assert!(!friend.matches("fortran"));
}

#[test]
fn friend_json_is_camel_case() {
    let mut friend = Friend::create("Grace".into());
    friend.birthday = NaiveDate::from_ymd_opt(1906, 12, 9);
    friend.level = RelationshipLevel::CloseFriend;
    friend.reminder_days = Some(30);
    let value = serde_json::to_value(&friend).unwrap();
    assert_eq!(value["birthday"], "1906-12-09");
    assert_eq!(value["level"], "CloseFriend");
    assert_eq!(value["reminderDays"], 30);
    assert!(value.get("howWeMet").is_some());
}

#[test]
fn relationship_level_db_strings_round_trip() {
    for level in RelationshipLevel::ALL {
        assert_eq!(RelationshipLevel::from_db_str(level.to_db_str()), Some(*level));
    }
    assert_eq!(RelationshipLevel::from_db_str("Nemesis"), None);
    assert_eq!(RelationshipLevel::CloseFriend.display_name(), "Close Friend");
}

#[test]
fn relationship_levels_order_by_closeness() {
    assert!(RelationshipLevel::Acquaintance < RelationshipLevel::Friend);
    assert!(RelationshipLevel::BestFriend < RelationshipLevel::Family);
}

// ==========================================================================
// CONTACT ENTRY TESTS
// ==========================================================================

#[test]
fn contact_entry_constructors_set_type() {
    let phone = ContactEntry::phone("555-1234".into(), Some("work".into()));
    assert_eq!(phone.contact_type, ContactType::Phone);
    assert_eq!(phone.value.as_text(), Some("555-1234"));

    let site = ContactEntry::website("https://example.org".into(), None);
    assert_eq!(site.contact_type, ContactType::Website);

    let addr = ContactEntry::address(Address::default(), None);
    assert_eq!(addr.contact_type, ContactType::PhysicalAddress);
    assert_eq!(addr.value.as_text(), None);
}

#[test]
fn address_one_line_skips_empty_parts() {
    let address = Address {
        street: "123 Main St".into(),
        city: "Putnam".into(),
        state: String::new(),
        zip: "06260".into(),
        country: String::new(),
    };
    assert_eq!(address.one_line(), "123 Main St, Putnam, 06260");
    assert_eq!(Address::default().one_line(), "");
}

#[test]
fn contact_value_json_is_tagged() {
    let entry = ContactEntry::email("a@b.co".into(), None);
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["contactType"], "Email");
    assert_eq!(value["value"], json!({"kind": "Text", "value": "a@b.co"}));
}

// ==========================================================================
// CATEGORY / RELATIONSHIP / ACTIVITY TESTS
// ==========================================================================

#[test]
fn default_categories() {
    let names: Vec<String> = Category::defaults().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["friend", "family", "coworker", "classmate", "neighbor", "mentor"]);
}

#[test]
fn relationship_other_end() {
    let a = Id::<Friend>::generate();
    let b = Id::<Friend>::generate();
    let rel = Relationship::create(a, b, RelationshipKind::Colleague, None);
    assert_eq!(rel.other_end(a), b);
    assert_eq!(rel.other_end(b), a);
}

#[test]
fn only_conversation_kinds_count_as_contact() {
    assert!(ActivityKind::InPerson.is_contact());
    assert!(ActivityKind::SocialMedia.is_contact());
    assert!(!ActivityKind::Note.is_contact());
    assert!(!ActivityKind::FriendAdded.is_contact());
    assert!(!ActivityKind::ShareAccepted.is_contact());
    for kind in ActivityKind::ALL {
        assert_eq!(ActivityKind::from_db_str(kind.to_db_str()), Some(*kind));
    }
}

// ==========================================================================
// SHARE TESTS
// ==========================================================================

#[test]
fn shared_card_leaves_private_fields_behind() {
    let mut friend = Friend::create("Grace".into());
    friend.notes = Some("owes me $20".into());
    friend.how_we_met = Some("conference".into());
    friend.instagram = Some("gracehopper".into());
    let card = SharedCard::snapshot(&friend, vec![ContactEntry::phone("555-0100".into(), None)]);

    let value = serde_json::to_value(&card).unwrap();
    assert_eq!(value["instagram"], "gracehopper");
    assert!(value.get("notes").is_none());
    assert!(value.get("howWeMet").is_none());
    assert_eq!(card.contacts.len(), 1);
}

#[test]
fn new_share_is_pending() {
    let card = SharedCard::snapshot(&Friend::create("Grace".into()), Vec::new());
    let share = ContactShare::create(Id::generate(), Id::generate(), card, None);
    assert_eq!(share.status, ShareStatus::Pending);
    assert!(share.responded_at.is_none());
    assert_eq!(ShareStatus::from_db_str("Cancelled"), Some(ShareStatus::Cancelled));
}
