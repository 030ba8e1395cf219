use rusqlite::Connection;
use serde::Deserialize;

use crate::db::contact_repo;
use crate::error::{KithError, KithResult};
use crate::model::{Address, ContactEntry, Friend, Id, User};
use crate::ops::friend_ops::require_friend;
use crate::validation::{self, trim_optional};

const MIN_PHONE_DIGITS: usize = 3;

/// A contact entry as submitted by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NewContact {
    Phone { value: String, label: Option<String> },
    Email { value: String, label: Option<String> },
    Website { value: String, label: Option<String> },
    #[serde(rename_all = "camelCase")]
    Address {
        #[serde(default)]
        street: String,
        #[serde(default)]
        city: String,
        #[serde(default)]
        state: String,
        #[serde(default)]
        zip: String,
        #[serde(default)]
        country: String,
        label: Option<String>,
    },
}

pub fn add_contact(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    contact: NewContact,
) -> KithResult<ContactEntry> {
    match contact {
        NewContact::Phone { value, label } => add_phone(conn, owner_id, friend_id, &value, label.as_deref()),
        NewContact::Email { value, label } => add_email(conn, owner_id, friend_id, &value, label.as_deref()),
        NewContact::Website { value, label } => {
            add_website(conn, owner_id, friend_id, &value, label.as_deref())
        }
        NewContact::Address {
            street,
            city,
            state,
            zip,
            country,
            label,
        } => add_address(
            conn,
            owner_id,
            friend_id,
            Address {
                street,
                city,
                state,
                zip,
                country,
            },
            label.as_deref(),
        ),
    }
}

pub fn add_phone(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    number: &str,
    label: Option<&str>,
) -> KithResult<ContactEntry> {
    require_friend(conn, owner_id, friend_id)?;
    let entry = ContactEntry::phone(phone_number(number)?, trim_optional(label));
    contact_repo::insert(conn, friend_id, &entry)?;
    Ok(entry)
}

pub fn add_email(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    email: &str,
    label: Option<&str>,
) -> KithResult<ContactEntry> {
    require_friend(conn, owner_id, friend_id)?;
    let entry = ContactEntry::email(validation::email(email, "email")?, trim_optional(label));
    contact_repo::insert(conn, friend_id, &entry)?;
    Ok(entry)
}

pub fn add_website(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    url: &str,
    label: Option<&str>,
) -> KithResult<ContactEntry> {
    require_friend(conn, owner_id, friend_id)?;
    let valid_url = validation::non_blank(url, "website")?;
    let entry = ContactEntry::website(valid_url, trim_optional(label));
    contact_repo::insert(conn, friend_id, &entry)?;
    Ok(entry)
}

/// Addresses need at least one non-blank component; each component is trimmed.
pub fn add_address(
    conn: &Connection,
    owner_id: Id<User>,
    friend_id: Id<Friend>,
    address: Address,
    label: Option<&str>,
) -> KithResult<ContactEntry> {
    require_friend(conn, owner_id, friend_id)?;
    let address = Address {
        street: address.street.trim().to_string(),
        city: address.city.trim().to_string(),
        state: address.state.trim().to_string(),
        zip: address.zip.trim().to_string(),
        country: address.country.trim().to_string(),
    };
    if address.one_line().is_empty() {
        return Err(KithError::BlankField {
            field: "address".into(),
        });
    }
    let entry = ContactEntry::address(address, trim_optional(label));
    contact_repo::insert(conn, friend_id, &entry)?;
    Ok(entry)
}

pub fn remove_contact(conn: &Connection, owner_id: Id<User>, entry_id: Id<ContactEntry>) -> KithResult<()> {
    require_entry(conn, owner_id, entry_id)?;
    contact_repo::delete(conn, entry_id)
}

pub fn update_contact_label(
    conn: &Connection,
    owner_id: Id<User>,
    entry_id: Id<ContactEntry>,
    label: Option<&str>,
) -> KithResult<ContactEntry> {
    let mut entry = require_entry(conn, owner_id, entry_id)?;
    entry.label = trim_optional(label);
    contact_repo::update_label(conn, entry_id, entry.label.as_deref())?;
    Ok(entry)
}

/// Trims a phone number and requires a minimum number of digits.
pub fn phone_number(value: &str) -> KithResult<String> {
    let number = validation::non_blank(value, "phone")?;
    let digits = number.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(KithError::invalid("phone", "does not contain enough digits"));
    }
    Ok(number)
}

fn require_entry(conn: &Connection, owner_id: Id<User>, entry_id: Id<ContactEntry>) -> KithResult<ContactEntry> {
    contact_repo::find_owned(conn, owner_id, entry_id)?
        .map(|(_, entry)| entry)
        .ok_or_else(|| KithError::not_found("ContactEntry", entry_id))
}
