use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use kith::db::*;
use kith::model::*;
use kith::ops::friend_ops::NewFriend;
use kith::ops::*;
use kith::queries::*;
use kith::queries::reminder_queries::OverdueStatus;
use kith::queries::relationship_queries::Direction;
use pretty_assertions::assert_eq;

fn setup() -> (rusqlite::Connection, User) {
    let conn = schema::test_connection();
    let user = auth_ops::register(&conn, "Ada", "ada@example.org", "correct horse").unwrap();
    (conn, user)
}

fn add(conn: &rusqlite::Connection, owner: &User, input: NewFriend) -> Friend {
    friend_ops::add_friend(conn, owner.id, input).unwrap()
}

fn named(conn: &rusqlite::Connection, owner: &User, name: &str) -> Friend {
    add(conn, owner, NewFriend::named(name))
}

fn contacted(conn: &rusqlite::Connection, owner: &User, friend: &Friend, kind: ActivityKind, at: DateTime<Utc>) {
    let activity = Activity::create(Some(friend.id), kind, "caught up".into(), at);
    activity_repo::insert(conn, owner.id, &activity).unwrap();
}

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

// ==========================================================================
// FRIEND QUERIES
// ==========================================================================

#[test]
fn list_hides_archived_unless_asked() {
    let (conn, user) = setup();
    named(&conn, &user, "Alan");
    let bob = named(&conn, &user, "Barbara");
    friend_ops::archive_friend(&conn, user.id, bob.id).unwrap();

    let active = friend_queries::list_friends(&conn, user.id, &friend_queries::FriendFilter::default()).unwrap();
    assert_eq!(active.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Alan"]);

    let filter = friend_queries::FriendFilter {
        archived: Some(true),
        ..Default::default()
    };
    let archived = friend_queries::list_friends(&conn, user.id, &filter).unwrap();
    assert_eq!(archived.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Barbara"]);
}

#[test]
fn list_filters_by_query_level_and_category() {
    let (conn, user) = setup();
    let family = category_repo::find_by_name(&conn, user.id, "family").unwrap().unwrap();
    add(
        &conn,
        &user,
        NewFriend {
            level: Some(RelationshipLevel::Family),
            category_ids: vec![family.id],
            ..NewFriend::named("Mum")
        },
    );
    add(
        &conn,
        &user,
        NewFriend {
            interests: vec!["climbing".into()],
            ..NewFriend::named("Alex")
        },
    );

    let by_query = friend_queries::FriendFilter {
        q: Some("CLIMB".into()),
        ..Default::default()
    };
    assert_eq!(friend_queries::list_friends(&conn, user.id, &by_query).unwrap()[0].name, "Alex");

    let by_level = friend_queries::FriendFilter {
        level: Some(RelationshipLevel::Family),
        ..Default::default()
    };
    assert_eq!(friend_queries::list_friends(&conn, user.id, &by_level).unwrap()[0].name, "Mum");

    let by_category = friend_queries::FriendFilter {
        category: Some(family.id),
        ..Default::default()
    };
    let found = friend_queries::list_friends(&conn, user.id, &by_category).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Mum");
}

#[test]
fn friend_detail_collects_everything() {
    let (conn, user) = setup();
    let grace = named(&conn, &user, "Grace");
    let alan = named(&conn, &user, "Alan");
    contact_ops::add_phone(&conn, user.id, grace.id, "555-0100", None).unwrap();
    relationship_ops::add_relationship(&conn, user.id, grace.id, alan.id, RelationshipKind::IntroducedBy, None)
        .unwrap();
    contacted(&conn, &user, &grace, ActivityKind::VideoCall, as_of() - Duration::days(3));

    let detail = friend_queries::friend_detail(&conn, user.id, grace.id, as_of()).unwrap();
    assert_eq!(detail.contacts.len(), 1);
    assert_eq!(detail.relationships.len(), 1);
    assert_eq!(detail.relationships[0].other.name, "Alan");
    assert_eq!(detail.relationships[0].direction, Direction::Outgoing);
    assert_eq!(detail.days_since_contact, Some(3));
    // The call plus the FriendAdded entry.
    assert_eq!(detail.recent_activities.len(), 2);
}

#[test]
fn friends_with_interest_ignores_case() {
    let (conn, user) = setup();
    add(
        &conn,
        &user,
        NewFriend {
            interests: vec!["Chess".into()],
            ..NewFriend::named("Magnus")
        },
    );
    named(&conn, &user, "Grace");
    let found = friend_queries::friends_with_interest(&conn, user.id, " chess ").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Magnus");
}

#[test]
fn upcoming_birthdays_within_window_sorted() {
    let (conn, user) = setup();
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    for (name, birthday) in [
        ("Later", NaiveDate::from_ymd_opt(1990, 7, 1)),
        ("Today", NaiveDate::from_ymd_opt(2000, 6, 15)),
        ("Yesterday", NaiveDate::from_ymd_opt(1985, 6, 14)),
        ("Soon", NaiveDate::from_ymd_opt(1970, 6, 20)),
    ] {
        add(
            &conn,
            &user,
            NewFriend {
                birthday,
                ..NewFriend::named(name)
            },
        );
    }

    let upcoming = friend_queries::upcoming_birthdays(&conn, user.id, 30, today).unwrap();
    let names: Vec<&str> = upcoming.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Today", "Soon", "Later"]);
    assert_eq!(upcoming[0].days_until, 0);
    assert_eq!(upcoming[0].turning, 24);
    assert_eq!(upcoming[1].next_date, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
}

#[test]
fn leap_day_birthdays_fall_on_feb_28_in_common_years() {
    let birthday = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
    let as_of = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    assert_eq!(
        friend_queries::next_occurrence(birthday, as_of),
        NaiveDate::from_ymd_opt(2023, 2, 28)
    );
    let leap = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(
        friend_queries::next_occurrence(birthday, leap),
        NaiveDate::from_ymd_opt(2024, 2, 29)
    );
}

// ==========================================================================
// RELATIONSHIP QUERIES
// ==========================================================================

#[test]
fn introductions_in_both_directions() {
    let (conn, user) = setup();
    let grace = named(&conn, &user, "Grace");
    let alan = named(&conn, &user, "Alan");
    let barbara = named(&conn, &user, "Barbara");
    // Grace was introduced by Alan; Barbara was introduced by Grace.
    relationship_ops::add_relationship(&conn, user.id, grace.id, alan.id, RelationshipKind::IntroducedBy, None)
        .unwrap();
    relationship_ops::add_relationship(&conn, user.id, barbara.id, grace.id, RelationshipKind::IntroducedBy, None)
        .unwrap();
    relationship_ops::add_relationship(&conn, user.id, grace.id, barbara.id, RelationshipKind::Colleague, None)
        .unwrap();

    let by = relationship_queries::introduced_by(&conn, user.id, grace.id).unwrap();
    assert_eq!(by.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Alan"]);
    let to = relationship_queries::introductions_by(&conn, user.id, grace.id).unwrap();
    assert_eq!(to.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["Barbara"]);

    assert_eq!(relationship_queries::relationships_for(&conn, user.id, grace.id).unwrap().len(), 3);
    assert_eq!(relationship_queries::all_relationships(&conn, user.id).unwrap().len(), 3);
}

// ==========================================================================
// ACTIVITY QUERIES
// ==========================================================================

#[test]
fn range_query_names_friends_and_rejects_inverted_bounds() {
    let (conn, user) = setup();
    let grace = named(&conn, &user, "Grace");
    contacted(&conn, &user, &grace, ActivityKind::Text, as_of() - Duration::days(2));

    let entries =
        activity_queries::in_range(&conn, user.id, as_of() - Duration::days(5), as_of()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].friend_name.as_deref(), Some("Grace"));

    let err = activity_queries::in_range(&conn, user.id, as_of(), as_of() - Duration::days(1)).unwrap_err();
    assert_eq!(err.field(), Some("from"));
}

#[test]
fn recent_respects_limit() {
    let (conn, user) = setup();
    for name in ["A", "B", "C"] {
        named(&conn, &user, name);
    }
    assert_eq!(activity_queries::recent(&conn, user.id, 2).unwrap().len(), 2);
}

#[test]
fn days_since_contact_counts_only_contact_kinds() {
    let (conn, user) = setup();
    let grace = named(&conn, &user, "Grace");
    assert_eq!(activity_queries::days_since_contact(&conn, user.id, grace.id, as_of()).unwrap(), None);

    contacted(&conn, &user, &grace, ActivityKind::InPerson, as_of() - Duration::days(10));
    contacted(&conn, &user, &grace, ActivityKind::Note, as_of() - Duration::days(1));
    assert_eq!(activity_queries::days_since_contact(&conn, user.id, grace.id, as_of()).unwrap(), Some(10));
    assert_eq!(
        activity_queries::last_contact_at(&conn, user.id, grace.id).unwrap(),
        Some(as_of() - Duration::days(10))
    );
}

#[test]
fn not_contacted_in_lists_never_contacted_first() {
    let (conn, user) = setup();
    let recent = named(&conn, &user, "Recent");
    let stale = named(&conn, &user, "Stale");
    named(&conn, &user, "Never");
    contacted(&conn, &user, &recent, ActivityKind::Text, as_of() - Duration::days(2));
    contacted(&conn, &user, &stale, ActivityKind::Text, as_of() - Duration::days(40));

    let gaps = activity_queries::not_contacted_in(&conn, user.id, 30, as_of()).unwrap();
    let names: Vec<&str> = gaps.iter().map(|g| g.friend.name.as_str()).collect();
    assert_eq!(names, vec!["Never", "Stale"]);
    assert_eq!(gaps[1].days_since_contact, Some(40));
}

// ==========================================================================
// REMINDER QUERIES
// ==========================================================================

#[test]
fn reminders_due_sorted_never_contacted_then_most_overdue() {
    let (conn, user) = setup();
    let with_reminder = |name: &str, days: i32| {
        add(
            &conn,
            &user,
            NewFriend {
                reminder_days: Some(days),
                ..NewFriend::named(name)
            },
        )
    };
    let slightly = with_reminder("Slightly", 7);
    let very = with_reminder("Very", 7);
    let fine = with_reminder("Fine", 30);
    with_reminder("Never", 7);
    named(&conn, &user, "No reminder");
    contacted(&conn, &user, &slightly, ActivityKind::Text, as_of() - Duration::days(9));
    contacted(&conn, &user, &very, ActivityKind::Text, as_of() - Duration::days(20));
    contacted(&conn, &user, &fine, ActivityKind::Text, as_of() - Duration::days(3));

    let due = reminder_queries::due_reminders(&conn, user.id, as_of()).unwrap();
    let names: Vec<&str> = due.iter().map(|s| s.friend.name.as_str()).collect();
    assert_eq!(names, vec!["Never", "Very", "Slightly"]);
    assert_eq!(due[0].overdue, OverdueStatus::NeverContacted);
    assert_eq!(due[1].overdue, OverdueStatus::DaysOverdue(13));

    let all = reminder_queries::all_reminders(&conn, user.id, as_of()).unwrap();
    assert_eq!(all.len(), 4);
    let status = reminder_queries::reminder_status(&conn, user.id, fine.id, as_of()).unwrap().unwrap();
    assert_eq!(status.overdue, OverdueStatus::DaysOverdue(-27));
    assert!(!status.overdue.is_due());
}

#[test]
fn overdue_status_json_shape() {
    let value = serde_json::to_value(OverdueStatus::DaysOverdue(3)).unwrap();
    assert_eq!(value, serde_json::json!({"status": "daysOverdue", "days": 3}));
    let never = serde_json::to_value(OverdueStatus::NeverContacted).unwrap();
    assert_eq!(never, serde_json::json!({"status": "neverContacted"}));
}

// ==========================================================================
// CATEGORY, STATS AND SHARE QUERIES
// ==========================================================================

#[test]
fn friends_in_category_hides_archived_friends() {
    let (conn, user) = setup();
    let family = category_repo::find_by_name(&conn, user.id, "family").unwrap().unwrap();
    for name in ["Mum", "Dad"] {
        add(
            &conn,
            &user,
            NewFriend {
                category_ids: vec![family.id],
                ..NewFriend::named(name)
            },
        );
    }
    let dad = friend_repo::find_by_owner(&conn, user.id)
        .unwrap()
        .into_iter()
        .find(|f| f.name == "Dad")
        .unwrap();
    friend_ops::archive_friend(&conn, user.id, dad.id).unwrap();

    let members = category_queries::friends_in_category(&conn, user.id, family.id).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Mum");

    let bob = auth_ops::register(&conn, "Bob", "bob@example.org", "correct horse").unwrap();
    assert!(category_queries::friends_in_category(&conn, bob.id, family.id).is_err());
}

#[test]
fn network_stats_summarise_the_network() {
    let (conn, user) = setup();
    let grace = named(&conn, &user, "Grace");
    add(
        &conn,
        &user,
        NewFriend {
            reminder_days: Some(7),
            ..NewFriend::named("Alan")
        },
    );
    let gone = named(&conn, &user, "Gone");
    friend_ops::archive_friend(&conn, user.id, gone.id).unwrap();
    contacted(&conn, &user, &grace, ActivityKind::Text, as_of() - Duration::days(45));

    let stats = stats_queries::stats(&conn, user.id, as_of()).unwrap();
    assert_eq!(stats.total_friends, 3);
    assert_eq!(stats.active_friends, 2);
    assert_eq!(stats.archived_friends, 1);
    assert_eq!(stats.categories, 6);
    assert_eq!(stats.never_contacted, 1);
    assert_eq!(stats.reminders_due, 1);
    let gap = stats.longest_gap.unwrap();
    assert_eq!(gap.name, "Grace");
    assert_eq!(gap.days, 45);
    assert_eq!(stats.pending_shares, 0);
    let friend_level = stats
        .by_level
        .iter()
        .find(|c| c.level == RelationshipLevel::Friend)
        .unwrap();
    assert_eq!(friend_level.count, 2);
}

#[test]
fn share_inbox_names_the_other_party() {
    let (conn, ada) = setup();
    let bob = auth_ops::register(&conn, "Bob", "bob@example.org", "correct horse").unwrap();
    let grace = named(&conn, &ada, "Grace");
    share_ops::share_friend(&conn, ada.id, grace.id, "bob@example.org", None).unwrap();

    let bobs = share_queries::inbox(&conn, bob.id).unwrap();
    assert_eq!(bobs.incoming.len(), 1);
    assert_eq!(bobs.incoming[0].counterpart_name.as_deref(), Some("Ada"));
    assert!(bobs.outgoing.is_empty());

    let adas = share_queries::inbox(&conn, ada.id).unwrap();
    assert_eq!(adas.outgoing[0].counterpart_name.as_deref(), Some("Bob"));
    assert!(share_queries::incoming_shares(&conn, ada.id).unwrap().is_empty());
    assert_eq!(share_queries::outgoing_shares(&conn, ada.id).unwrap().len(), 1);
}
