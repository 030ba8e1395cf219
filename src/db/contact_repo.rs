use rusqlite::{params, Connection};

use crate::db::optional;
use crate::error::{KithError, KithResult};
use crate::model::{Address, ContactEntry, ContactType, ContactValue, Friend, Id, User};

pub fn insert(conn: &Connection, friend_id: Id<Friend>, entry: &ContactEntry) -> KithResult<()> {
    let (string_value, street, city, state, zip, country) = match &entry.value {
        ContactValue::Text(value) => (Some(value.as_str()), None, None, None, None, None),
        ContactValue::Address(value) => (
            None,
            Some(value.street.as_str()),
            Some(value.city.as_str()),
            Some(value.state.as_str()),
            Some(value.zip.as_str()),
            Some(value.country.as_str()),
        ),
    };

    conn.execute(
        "INSERT INTO contact_entries (id, friend_id, contact_type, string_value, street, city, state, zip, country, label, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                 (SELECT COALESCE(MAX(position), 0) + 1 FROM contact_entries WHERE friend_id = ?2))",
        params![
            entry.id.to_db(),
            friend_id.to_db(),
            entry.contact_type.to_db_str(),
            string_value,
            street,
            city,
            state,
            zip,
            country,
            entry.label,
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, entry_id: Id<ContactEntry>) -> KithResult<()> {
    conn.execute(
        "DELETE FROM contact_entries WHERE id = ?1",
        params![entry_id.to_db()],
    )?;
    Ok(())
}

pub fn update_label(
    conn: &Connection,
    entry_id: Id<ContactEntry>,
    label: Option<&str>,
) -> KithResult<()> {
    conn.execute(
        "UPDATE contact_entries SET label = ?1 WHERE id = ?2",
        params![label, entry_id.to_db()],
    )?;
    Ok(())
}

/// Finds an entry whose friend belongs to `owner_id`, together with that friend's id.
pub fn find_owned(
    conn: &Connection,
    owner_id: Id<User>,
    entry_id: Id<ContactEntry>,
) -> KithResult<Option<(Id<Friend>, ContactEntry)>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.contact_type, c.string_value, c.street, c.city, c.state, c.zip, c.country, c.label,
                c.friend_id
         FROM contact_entries c JOIN friends f ON c.friend_id = f.id
         WHERE c.id = ?1 AND f.owner_id = ?2",
    )?;
    optional(
        stmt.query_row(params![entry_id.to_db(), owner_id.to_db()], |row| {
            Ok(row_to_contact_entry(row).and_then(|entry| {
                let friend_id: String = row.get(9)?;
                Ok((Id::from_db(&friend_id)?, entry))
            }))
        }),
    )
}

pub fn find_by_friend(conn: &Connection, friend_id: Id<Friend>) -> KithResult<Vec<ContactEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, contact_type, string_value, street, city, state, zip, country, label
         FROM contact_entries WHERE friend_id = ?1 ORDER BY position",
    )?;

    let entries = stmt
        .query_map(params![friend_id.to_db()], |row| Ok(row_to_contact_entry(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// All text contact values of one type across the owner's friends, paired with the friend id.
pub fn find_values_by_owner(
    conn: &Connection,
    owner_id: Id<User>,
    contact_type: ContactType,
) -> KithResult<Vec<(Id<Friend>, String)>> {
    let mut stmt = conn.prepare(
        "SELECT c.friend_id, c.string_value
         FROM contact_entries c JOIN friends f ON c.friend_id = f.id
         WHERE f.owner_id = ?1 AND c.contact_type = ?2 AND c.string_value IS NOT NULL",
    )?;

    let rows: Vec<(String, String)> = stmt
        .query_map(params![owner_id.to_db(), contact_type.to_db_str()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(friend_id, value)| Ok((Id::from_db(&friend_id)?, value)))
        .collect()
}

fn row_to_contact_entry(row: &rusqlite::Row) -> KithResult<ContactEntry> {
    let id_str: String = row.get(0)?;
    let contact_type_str: String = row.get(1)?;
    let string_value: Option<String> = row.get(2)?;
    let street: Option<String> = row.get(3)?;
    let city: Option<String> = row.get(4)?;
    let state: Option<String> = row.get(5)?;
    let zip: Option<String> = row.get(6)?;
    let country: Option<String> = row.get(7)?;
    let label: Option<String> = row.get(8)?;

    let contact_type = ContactType::from_db_str(&contact_type_str)
        .ok_or_else(|| KithError::Other(format!("Unknown contact type: {}", contact_type_str)))?;

    let value = match contact_type {
        ContactType::PhysicalAddress => ContactValue::Address(Address {
            street: street.unwrap_or_default(),
            city: city.unwrap_or_default(),
            state: state.unwrap_or_default(),
            zip: zip.unwrap_or_default(),
            country: country.unwrap_or_default(),
        }),
        _ => ContactValue::Text(string_value.unwrap_or_default()),
    };

    Ok(ContactEntry {
        id: Id::from_db(&id_str)?,
        contact_type,
        value,
        label,
    })
}
