use chrono::{Duration, NaiveDate, TimeZone, Utc};
use kith::db::*;
use kith::model::*;
use pretty_assertions::assert_eq;

fn setup() -> (rusqlite::Connection, User) {
    let conn = schema::test_connection();
    let user = User::create("Ada".into(), "ada@example.org".into(), "hash".into());
    user_repo::insert(&conn, &user).unwrap();
    (conn, user)
}

fn insert_friend(conn: &rusqlite::Connection, owner: &User, name: &str) -> Friend {
    let friend = Friend::create(name.into());
    friend_repo::insert(conn, owner.id, &friend).unwrap();
    friend
}

// ==========================================================================
// USER REPO TESTS
// ==========================================================================

#[test]
fn user_email_lookup_ignores_case() {
    let (conn, user) = setup();
    let found = user_repo::find_by_email(&conn, "ADA@Example.org").unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.password_hash, "hash");
}

#[test]
fn user_email_is_unique_regardless_of_case() {
    let (conn, _) = setup();
    let dup = User::create("Other".into(), "Ada@Example.ORG".into(), "hash".into());
    assert!(user_repo::insert(&conn, &dup).is_err());
}

#[test]
fn user_profile_and_password_update() {
    let (conn, mut user) = setup();
    user.bio = Some("Mathematician".into());
    user.location = Some("London".into());
    user_repo::update_profile(&conn, &user).unwrap();
    user_repo::update_password(&conn, user.id, "new-hash").unwrap();

    let found = user_repo::find_by_id(&conn, user.id).unwrap().unwrap();
    assert_eq!(found.bio.as_deref(), Some("Mathematician"));
    assert_eq!(found.location.as_deref(), Some("London"));
    assert_eq!(found.password_hash, "new-hash");
}

// ==========================================================================
// FRIEND REPO TESTS
// ==========================================================================

#[test]
fn friend_insert_and_find_owned() {
    let (conn, user) = setup();
    let mut friend = Friend::create("Grace".into());
    friend.birthday = NaiveDate::from_ymd_opt(1906, 12, 9);
    friend.interests = vec!["compilers".into(), "navy".into()];
    friend.level = RelationshipLevel::CloseFriend;
    friend_repo::insert(&conn, user.id, &friend).unwrap();

    let found = friend_repo::find_owned(&conn, user.id, friend.id).unwrap().unwrap();
    assert_eq!(found.name, "Grace");
    assert_eq!(found.birthday, friend.birthday);
    assert_eq!(found.interests, vec!["compilers".to_string(), "navy".to_string()]);
    assert_eq!(found.level, RelationshipLevel::CloseFriend);
}

#[test]
fn friend_is_invisible_to_other_owners() {
    let (conn, user) = setup();
    let other = User::create("Bob".into(), "bob@example.org".into(), "hash".into());
    user_repo::insert(&conn, &other).unwrap();
    let friend = insert_friend(&conn, &user, "Grace");

    assert!(friend_repo::find_owned(&conn, other.id, friend.id).unwrap().is_none());
    assert!(friend_repo::find_by_owner(&conn, other.id).unwrap().is_empty());
}

#[test]
fn friend_update_and_archive_lists() {
    let (conn, user) = setup();
    let mut alan = insert_friend(&conn, &user, "Alan");
    insert_friend(&conn, &user, "Barbara");

    alan.archived = true;
    alan.reminder_days = Some(14);
    friend_repo::update(&conn, &alan).unwrap();

    let active = friend_repo::find_active_by_owner(&conn, user.id).unwrap();
    let archived = friend_repo::find_archived_by_owner(&conn, user.id).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Barbara");
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].reminder_days, Some(14));
    assert_eq!(friend_repo::find_by_owner(&conn, user.id).unwrap().len(), 2);
}

#[test]
fn deleting_friend_cascades_to_contacts_and_activities() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    contact_repo::insert(&conn, friend.id, &ContactEntry::phone("555-0100".into(), None)).unwrap();
    let activity = Activity::create(Some(friend.id), ActivityKind::Text, "hi".into(), Utc::now());
    activity_repo::insert(&conn, user.id, &activity).unwrap();

    friend_repo::delete(&conn, friend.id).unwrap();

    assert!(contact_repo::find_by_friend(&conn, friend.id).unwrap().is_empty());
    assert!(activity_repo::find_owned(&conn, user.id, activity.id).unwrap().is_none());
}

// ==========================================================================
// CONTACT REPO TESTS
// ==========================================================================

#[test]
fn contact_entries_round_trip_addresses_and_labels() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    let address = Address {
        street: "1 Main St".into(),
        city: "Arlington".into(),
        ..Address::default()
    };
    contact_repo::insert(&conn, friend.id, &ContactEntry::email("g@navy.mil".into(), Some("work".into())))
        .unwrap();
    contact_repo::insert(&conn, friend.id, &ContactEntry::address(address.clone(), None)).unwrap();

    let entries = contact_repo::find_by_friend(&conn, friend.id).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].value, ContactValue::Text("g@navy.mil".into()));
    assert_eq!(entries[0].label.as_deref(), Some("work"));
    assert_eq!(entries[1].value, ContactValue::Address(address));
}

#[test]
fn contact_label_update_and_owned_lookup() {
    let (conn, user) = setup();
    let other = User::create("Bob".into(), "bob@example.org".into(), "hash".into());
    user_repo::insert(&conn, &other).unwrap();
    let friend = insert_friend(&conn, &user, "Grace");
    let entry = ContactEntry::phone("555-0100".into(), None);
    contact_repo::insert(&conn, friend.id, &entry).unwrap();

    contact_repo::update_label(&conn, entry.id, Some("mobile")).unwrap();
    let (friend_id, found) = contact_repo::find_owned(&conn, user.id, entry.id).unwrap().unwrap();
    assert_eq!(friend_id, friend.id);
    assert_eq!(found.label.as_deref(), Some("mobile"));
    assert!(contact_repo::find_owned(&conn, other.id, entry.id).unwrap().is_none());
}

#[test]
fn contact_values_by_owner_filters_by_type() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    contact_repo::insert(&conn, friend.id, &ContactEntry::phone("555-0100".into(), None)).unwrap();
    contact_repo::insert(&conn, friend.id, &ContactEntry::email("g@navy.mil".into(), None)).unwrap();

    let emails = contact_repo::find_values_by_owner(&conn, user.id, ContactType::Email).unwrap();
    assert_eq!(emails, vec![(friend.id, "g@navy.mil".to_string())]);
}

// ==========================================================================
// CATEGORY REPO TESTS
// ==========================================================================

#[test]
fn category_assignment_replaces_set() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    let navy = Category::create("navy".into());
    let tech = Category::create("tech".into());
    category_repo::insert(&conn, user.id, &navy).unwrap();
    category_repo::insert(&conn, user.id, &tech).unwrap();

    category_repo::set_for_friend(&conn, friend.id, &[navy.id, tech.id]).unwrap();
    category_repo::set_for_friend(&conn, friend.id, &[tech.id]).unwrap();

    let assigned = category_repo::find_for_friend(&conn, friend.id).unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].name, "tech");
    assert_eq!(category_repo::find_friend_ids(&conn, tech.id).unwrap(), vec![friend.id]);
}

#[test]
fn category_names_unique_per_owner_ignoring_case() {
    let (conn, user) = setup();
    category_repo::insert(&conn, user.id, &Category::create("Climbing".into())).unwrap();
    assert!(category_repo::insert(&conn, user.id, &Category::create("climbing".into())).is_err());
    assert!(category_repo::find_by_name(&conn, user.id, "CLIMBING").unwrap().is_some());
}

#[test]
fn category_archive_split() {
    let (conn, user) = setup();
    let mut old = Category::create("old job".into());
    category_repo::insert(&conn, user.id, &old).unwrap();
    category_repo::insert(&conn, user.id, &Category::create("family".into())).unwrap();
    old.archived = true;
    category_repo::update(&conn, &old).unwrap();

    assert_eq!(category_repo::find_active(&conn, user.id).unwrap().len(), 1);
    assert_eq!(category_repo::find_archived(&conn, user.id).unwrap()[0].name, "old job");
}

// ==========================================================================
// RELATIONSHIP REPO TESTS
// ==========================================================================

#[test]
fn relationship_exists_and_find_for_friend() {
    let (conn, user) = setup();
    let a = insert_friend(&conn, &user, "A");
    let b = insert_friend(&conn, &user, "B");
    let rel = Relationship::create(a.id, b.id, RelationshipKind::IntroducedBy, None);
    relationship_repo::insert(&conn, user.id, &rel).unwrap();

    assert!(relationship_repo::exists(&conn, a.id, b.id, RelationshipKind::IntroducedBy).unwrap());
    assert!(!relationship_repo::exists(&conn, b.id, a.id, RelationshipKind::IntroducedBy).unwrap());
    assert_eq!(relationship_repo::find_for_friend(&conn, b.id).unwrap().len(), 1);
    assert_eq!(relationship_repo::find_by_owner(&conn, user.id).unwrap().len(), 1);

    relationship_repo::delete(&conn, rel.id).unwrap();
    assert!(relationship_repo::find_owned(&conn, user.id, rel.id).unwrap().is_none());
}

// ==========================================================================
// ACTIVITY REPO TESTS
// ==========================================================================

#[test]
fn activity_topics_round_trip() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    let mut activity = Activity::create(Some(friend.id), ActivityKind::InPerson, "Lunch".into(), Utc::now());
    activity.location = Some("Cafe".into());
    activity.topics = vec!["cobol".into(), "travel".into()];
    activity_repo::insert(&conn, user.id, &activity).unwrap();

    let found = activity_repo::find_owned(&conn, user.id, activity.id).unwrap().unwrap();
    assert_eq!(found.location.as_deref(), Some("Cafe"));
    let mut topics = found.topics.clone();
    topics.sort();
    assert_eq!(topics, vec!["cobol".to_string(), "travel".to_string()]);
}

#[test]
fn activity_range_and_recent_are_newest_first() {
    let (conn, user) = setup();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for day in 0..5 {
        let a = Activity::create(None, ActivityKind::Note, format!("day {day}"), base + Duration::days(day));
        activity_repo::insert(&conn, user.id, &a).unwrap();
    }

    let range = activity_repo::find_in_range(&conn, user.id, base + Duration::days(1), base + Duration::days(3))
        .unwrap();
    let names: Vec<_> = range.iter().map(|a| a.description.as_str()).collect();
    assert_eq!(names, vec!["day 3", "day 2", "day 1"]);

    let recent = activity_repo::find_recent(&conn, user.id, 2).unwrap();
    assert_eq!(recent[0].description, "day 4");
    assert_eq!(recent.len(), 2);
    assert_eq!(activity_repo::count_by_owner(&conn, user.id).unwrap(), 5);
    assert_eq!(activity_repo::count_since(&conn, user.id, base + Duration::days(3)).unwrap(), 2);
}

#[test]
fn last_contact_ignores_notes_and_system_entries() {
    let (conn, user) = setup();
    let friend = insert_friend(&conn, &user, "Grace");
    let call_at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    let call = Activity::create(Some(friend.id), ActivityKind::PhoneCall, "call".into(), call_at);
    let note = Activity::create(Some(friend.id), ActivityKind::Note, "note".into(), call_at + Duration::days(5));
    let added = Activity::create(Some(friend.id), ActivityKind::FriendAdded, "added".into(), call_at + Duration::days(6));
    for a in [&call, &note, &added] {
        activity_repo::insert(&conn, user.id, a).unwrap();
    }

    assert_eq!(activity_repo::find_last_contact_at(&conn, friend.id).unwrap(), Some(call_at));
}

// ==========================================================================
// SHARE REPO TESTS
// ==========================================================================

#[test]
fn share_card_survives_storage_and_status_updates() {
    let (conn, user) = setup();
    let bob = User::create("Bob".into(), "bob@example.org".into(), "hash".into());
    user_repo::insert(&conn, &bob).unwrap();
    let friend = insert_friend(&conn, &user, "Grace");
    let card = SharedCard::snapshot(&friend, vec![ContactEntry::phone("555-0100".into(), None)]);
    let mut share = ContactShare::create(user.id, bob.id, card.clone(), Some("meet her".into()));
    share_repo::insert(&conn, &share).unwrap();

    assert_eq!(share_repo::count_pending_incoming(&conn, bob.id).unwrap(), 1);
    assert_eq!(share_repo::find_outgoing(&conn, user.id).unwrap().len(), 1);

    share.status = ShareStatus::Declined;
    share.responded_at = Some(Utc::now());
    share_repo::update_status(&conn, &share).unwrap();

    let found = share_repo::find_by_id(&conn, share.id).unwrap().unwrap();
    assert_eq!(found.card, card);
    assert_eq!(found.status, ShareStatus::Declined);
    assert!(found.responded_at.is_some());
    assert!(share_repo::find_pending_incoming(&conn, bob.id).unwrap().is_empty());
}

#[test]
fn open_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("kith.db");
    let conn = open(&path).unwrap();
    assert!(path.exists());
    // Opening twice is fine: the schema is idempotent.
    drop(conn);
    open(&path).unwrap();
}
