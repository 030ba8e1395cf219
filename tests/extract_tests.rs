use chrono::NaiveDate;
use kith::db::schema;
use kith::extract::{parse_ocr_text, parse_vcards, select_face_region, PixelFormat};
use kith::ops::{auth_ops, import_ops};
use kith::queries::friend_queries::{self, FriendFilter};
use pretty_assertions::assert_eq;
use rusqlite::Connection;

fn setup() -> (Connection, kith::model::Id<kith::model::User>) {
    let conn = schema::test_connection();
    let user = auth_ops::register(&conn, "Ada", "ada@example.org", "correct horse").unwrap();
    (conn, user.id)
}

const ADDRESS_BOOK: &str = "BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Maria G.\r\n\
TEL;TYPE=cell:555-201-3344\r\n\
BDAY:1990-03-03\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Tom Baker\r\n\
EMAIL;TYPE=work:tom@example.org\r\n\
ORG:BBC\r\n\
END:VCARD\r\n";

const SCREENSHOT: &str = "\
Edit
Maria Gonzalez
mobile
(555) 201-3344
Email
maria.g@example.com
Lives in Austin, TX
";

#[test]
fn vcard_contacts_import_as_friends() {
    let (conn, owner) = setup();
    let cards = parse_vcards(ADDRESS_BOOK).unwrap();
    assert_eq!(cards.len(), 2);

    let report = import_ops::import_contacts(&conn, owner, cards, true).unwrap();
    assert_eq!(report.created.len(), 2);
    assert!(report.skipped.is_empty());

    let maria = &report.created[0];
    assert_eq!(maria.name, "Maria G.");
    assert_eq!(maria.birthday, NaiveDate::from_ymd_opt(1990, 3, 3));
    assert_eq!(report.created[1].notes.as_deref(), Some("BBC"));

    let names: Vec<String> = friend_queries::list_friends(&conn, owner, &FriendFilter::default())
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names.len(), 2);
}

#[test]
fn screenshot_of_a_known_phone_is_skipped() {
    let (conn, owner) = setup();
    import_ops::import_contacts(&conn, owner, parse_vcards(ADDRESS_BOOK).unwrap(), true).unwrap();

    let contact = parse_ocr_text(SCREENSHOT).unwrap();
    assert_eq!(contact.name.as_deref(), Some("Maria Gonzalez"));
    let report = import_ops::import_contacts(&conn, owner, vec![contact.clone()], true).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.skipped[0].name, "Maria Gonzalez");
    assert!(report.skipped[0].reason.contains("phone"));

    // The owner can insist.
    let report = import_ops::import_contacts(&conn, owner, vec![contact], false).unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].location.as_deref(), Some("Austin, TX"));
}

#[test]
fn extracted_contact_json_is_camel_case() {
    let contact = parse_ocr_text("@jamie.rivers\nJamie Rivers\nhttps://jamie.example.com").unwrap();
    let value = serde_json::to_value(&contact).unwrap();
    assert_eq!(value["instagram"], "jamie.rivers");
    assert_eq!(value["photoUrl"], serde_json::Value::Null);
    assert!(value["phones"].as_array().unwrap().is_empty());
}

#[test]
fn face_region_is_always_inside_the_image() {
    let (width, height) = (40u32, 30u32);
    let mut pixels = vec![20u8; (width * height * 3) as usize];
    for y in 5..15 {
        for x in 20..30 {
            let i = ((y * width + x) * 3) as usize;
            pixels[i..i + 3].copy_from_slice(&[224, 172, 140]);
        }
    }

    let region = select_face_region(&pixels, width, height, PixelFormat::Rgb).unwrap();
    assert!(region.confidence > 0.0);
    assert!(region.x + region.size <= width);
    assert!(region.y + region.size <= height);
    assert!(region.x <= 20 && region.x + region.size >= 30);

    let blank = vec![0u8; (width * height * 3) as usize];
    let fallback = select_face_region(&blank, width, height, PixelFormat::Rgb).unwrap();
    assert_eq!(fallback.confidence, 0.0);
    assert!(fallback.x + fallback.size <= width);
}
