use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::{contact_repo, friend_repo};
use crate::error::KithResult;
use crate::extract::{digits_of, ExtractedContact};
use crate::model::{ActivityKind, Address, ContactEntry, ContactType, Friend, Id, User};
use crate::ops::friend_ops::{self, NewFriend};
use crate::ops::{activity_ops, contact_ops};
use crate::validation;

const MIN_MATCH_DIGITS: usize = 7;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedContact {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: Vec<Friend>,
    pub skipped: Vec<SkippedContact>,
}

/// What the owner already has, for duplicate checks.
struct Known {
    names: HashSet<String>,
    emails: HashSet<String>,
    phones: HashSet<String>,
}

impl Known {
    fn load(conn: &Connection, owner_id: Id<User>) -> KithResult<Self> {
        let names = friend_repo::find_by_owner(conn, owner_id)?
            .into_iter()
            .map(|f| f.name.to_lowercase())
            .collect();
        let emails = contact_repo::find_values_by_owner(conn, owner_id, ContactType::Email)?
            .into_iter()
            .map(|(_, email)| email.to_lowercase())
            .collect();
        let phones = contact_repo::find_values_by_owner(conn, owner_id, ContactType::Phone)?
            .into_iter()
            .map(|(_, phone)| digits_of(&phone))
            .filter(|digits| digits.len() >= MIN_MATCH_DIGITS)
            .collect();
        Ok(Self { names, emails, phones })
    }

    fn duplicate_reason(&self, name: &str, contact: &ExtractedContact) -> Option<String> {
        if self.names.contains(&name.to_lowercase()) {
            return Some(format!("a friend named {} already exists", name));
        }
        if let Some(email) = contact
            .emails
            .iter()
            .find(|e| self.emails.contains(&e.value.to_lowercase()))
        {
            return Some(format!("email {} is already saved", email.value));
        }
        if let Some(phone) = contact
            .phones
            .iter()
            .find(|p| self.phones.contains(&digits_of(&p.value)))
        {
            return Some(format!("phone {} is already saved", phone.value));
        }
        None
    }

    fn remember(&mut self, friend: &Friend, entries: &[ContactEntry]) {
        self.names.insert(friend.name.to_lowercase());
        for entry in entries {
            let Some(value) = entry.value.as_text() else {
                continue;
            };
            match entry.contact_type {
                ContactType::Email => {
                    self.emails.insert(value.to_lowercase());
                }
                ContactType::Phone => {
                    let digits = digits_of(value);
                    if digits.len() >= MIN_MATCH_DIGITS {
                        self.phones.insert(digits);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Creates friends from reviewed extraction results in one transaction.
/// Invalid individual fields (a malformed email, say) are dropped rather
/// than failing the whole import.
pub fn import_contacts(
    conn: &Connection,
    owner_id: Id<User>,
    contacts: Vec<ExtractedContact>,
    skip_duplicates: bool,
) -> KithResult<ImportReport> {
    validation::non_empty_set(&contacts, "contacts")?;
    let tx = conn.unchecked_transaction()?;
    let mut known = Known::load(&tx, owner_id)?;
    let mut report = ImportReport::default();

    for contact in contacts {
        let Some(name) = contact.display_name().map(str::trim).filter(|n| !n.is_empty()) else {
            report.skipped.push(SkippedContact {
                name: String::new(),
                reason: "no name".into(),
            });
            continue;
        };
        let name = name.to_string();

        if skip_duplicates {
            if let Some(reason) = known.duplicate_reason(&name, &contact) {
                report.skipped.push(SkippedContact { name, reason });
                continue;
            }
        }

        let friend = friend_ops::insert_friend(&tx, owner_id, new_friend(name, &contact))?;
        let entries = contact_entries(&contact);
        for entry in &entries {
            contact_repo::insert(&tx, friend.id, entry)?;
        }
        activity_ops::record(
            &tx,
            owner_id,
            friend.id,
            ActivityKind::ContactImported,
            format!("Imported {}", friend.name),
        )?;

        known.remember(&friend, &entries);
        report.created.push(friend);
    }

    tx.commit()?;
    info!(
        owner_id = %owner_id,
        created = report.created.len(),
        skipped = report.skipped.len(),
        "contacts imported"
    );
    Ok(report)
}

fn new_friend(name: String, contact: &ExtractedContact) -> NewFriend {
    let role = match (contact.title.as_deref(), contact.organization.as_deref()) {
        (Some(title), Some(org)) => Some(format!("{} at {}", title, org)),
        (Some(title), None) => Some(title.to_string()),
        (None, Some(org)) => Some(org.to_string()),
        (None, None) => None,
    };
    let notes = [role, contact.notes.clone()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n");

    NewFriend {
        nickname: contact.nickname.clone().filter(|n| *n != name),
        name,
        birthday: contact.birthday,
        notes: Some(notes),
        location: contact.location.clone(),
        photo_url: contact
            .photo_url
            .as_deref()
            .and_then(|url| validation::image_url(url, "photoUrl").ok()),
        instagram: contact
            .instagram
            .as_deref()
            .and_then(|handle| validation::instagram_handle(handle, "instagram").ok()),
        ..NewFriend::default()
    }
}

fn contact_entries(contact: &ExtractedContact) -> Vec<ContactEntry> {
    let phones = contact.phones.iter().filter_map(|p| {
        contact_ops::phone_number(&p.value)
            .ok()
            .map(|number| ContactEntry::phone(number, p.label.clone()))
    });
    let emails = contact.emails.iter().filter_map(|e| {
        validation::email(&e.value, "email")
            .ok()
            .map(|email| ContactEntry::email(email, e.label.clone()))
    });
    let websites = contact
        .websites
        .iter()
        .filter(|url| !url.trim().is_empty())
        .map(|url| ContactEntry::website(url.trim().to_string(), None));
    let addresses = contact
        .addresses
        .iter()
        .filter(|a| **a != Address::default())
        .map(|a| ContactEntry::address(a.clone(), None));

    phones.chain(emails).chain(websites).chain(addresses).collect()
}
