pub mod face_region;
pub mod ocr_text;
pub mod vcard;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Address;

pub use face_region::{select_face_region, FaceRegion, PixelFormat};
pub use ocr_text::parse_ocr_text;
pub use vcard::parse_vcards;

/// A phone number or email with its optional label ("mobile", "work").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledValue {
    pub value: String,
    pub label: Option<String>,
}

impl LabelledValue {
    pub fn new(value: impl Into<String>, label: Option<String>) -> Self {
        Self {
            value: value.into(),
            label,
        }
    }
}

/// Structured fields pulled out of one source. Clients review these before
/// committing them through `ops::import_ops`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedContact {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub phones: Vec<LabelledValue>,
    pub emails: Vec<LabelledValue>,
    pub addresses: Vec<Address>,
    pub websites: Vec<String>,
    pub birthday: Option<NaiveDate>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub instagram: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl ExtractedContact {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The name to file this contact under: the name, else the nickname,
    /// else the Instagram handle.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.nickname.as_deref())
            .or(self.instagram.as_deref())
    }

    pub(crate) fn push_phone(&mut self, value: &str, label: Option<String>) {
        let digits = digits_of(value);
        if !self.phones.iter().any(|p| digits_of(&p.value) == digits) {
            self.phones.push(LabelledValue::new(value.trim(), label));
        }
    }

    pub(crate) fn push_email(&mut self, value: &str, label: Option<String>) {
        let lower = value.trim().to_lowercase();
        if !self.emails.iter().any(|e| e.value == lower) {
            self.emails.push(LabelledValue::new(lower, label));
        }
    }

    pub(crate) fn push_website(&mut self, value: &str) {
        let url = value.trim().to_string();
        if !url.is_empty() && !self.websites.contains(&url) {
            self.websites.push(url);
        }
    }
}

/// Only the ASCII digits of a phone number, for comparisons.
pub fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Lower-cases a label and maps common synonyms.
pub(crate) fn normalize_label(raw: &str) -> Option<String> {
    let lower = raw.trim().trim_end_matches(':').trim().to_lowercase();
    let label = match lower.as_str() {
        "" | "voice" | "pref" | "internet" | "x400" => return None,
        "cell" | "mobile" | "iphone" | "mob" | "m" => "mobile",
        "home" | "h" => "home",
        "work" | "office" | "w" => "work",
        "fax" => "fax",
        other => other,
    };
    Some(label.to_string())
}
