use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{digits_of, normalize_label, ExtractedContact};
use crate::error::{KithError, KithResult};
use crate::validation;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;
const MAX_NAME_WORDS: usize = 4;

/// Words that appear as app chrome in screenshots and never belong to a name.
const UI_WORDS: &[&str] = &[
    "about", "add", "back", "birthday", "call", "cancel", "contact", "contacts", "done", "edit",
    "email", "facetime", "favorites", "follow", "followers", "following", "home", "info",
    "instagram", "mail", "message", "mobile", "more", "mutual", "notes", "phone", "photos",
    "posts", "profile", "reels", "search", "share", "tagged", "work",
];

const PHONE_LABELS: &[&str] = &[
    "mobile", "cell", "iphone", "home", "work", "office", "fax", "main", "phone", "tel",
];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|error| panic!("pattern {pattern} failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b")
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\b(?:https?://|www\.)[^\s<>()]+")
}

fn instagram_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)instagram\.com/([A-Za-z0-9._]{1,30})")
}

fn handle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?:^|[\s(])@([A-Za-z0-9._]{1,30})")
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\+?\(?\d[\d\s().-]{5,}\d")
}

/// "2014 - 2018" and friends: two years, not a number.
fn year_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^(?:19|20)\d{2}[\s.-]+(?:19|20)\d{2}$")
}

fn birthday_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)(?:\bbirthday\b|\bborn\b|\bbday\b|\bdob\b|date of birth|🎂)\s*(?:on)?[:\s-]*(.+)$")
}

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)^(?:📍\s*)?(?:lives in\b|based in\b|from\b|location\s*:)\s*:?\s*(.+)$")
}

fn city_state_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"^([A-Z][A-Za-z .'-]+),\s*([A-Z]{2})$")
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")
}

fn us_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b")
}

fn month_first_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
}

fn day_first_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]{3,9})\.?,?\s+(\d{4})\b")
}

struct Line<'a> {
    text: &'a str,
    used: bool,
}

/// Pulls whatever contact fields it can recognise out of `text`. Lines that
/// yield nothing and are not app chrome end up in `notes`.
pub fn parse_ocr_text(text: &str) -> KithResult<ExtractedContact> {
    if text.trim().is_empty() {
        return Err(KithError::invalid("text", "is empty"));
    }

    let mut lines: Vec<Line> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|text| Line { text, used: false })
        .collect();
    let mut contact = ExtractedContact::default();

    extract_birthday(&mut lines, &mut contact);
    extract_emails(&mut lines, &mut contact);
    extract_links(&mut lines, &mut contact);
    extract_phones(&mut lines, &mut contact);
    extract_location(&mut lines, &mut contact);
    extract_name(&mut lines, &mut contact);

    let leftover: Vec<&str> = lines
        .iter()
        .filter(|l| !l.used && !is_chrome(l.text))
        .map(|l| l.text)
        .collect();
    if !leftover.is_empty() {
        contact.notes = Some(leftover.join("\n"));
    }

    Ok(contact)
}

fn extract_birthday(lines: &mut [Line], contact: &mut ExtractedContact) {
    for line in lines.iter_mut() {
        let Some(caps) = birthday_label_regex().captures(line.text) else {
            continue;
        };
        if let Some(date) = parse_date(&caps[1]) {
            contact.birthday.get_or_insert(date);
            line.used = true;
        }
    }
}

fn extract_emails(lines: &mut [Line], contact: &mut ExtractedContact) {
    for line in lines.iter_mut() {
        for m in email_regex().find_iter(line.text) {
            contact.push_email(m.as_str(), None);
            line.used = true;
        }
    }
}

fn extract_links(lines: &mut [Line], contact: &mut ExtractedContact) {
    for line in lines.iter_mut() {
        if let Some(caps) = instagram_url_regex().captures(line.text) {
            if let Ok(handle) = validation::instagram_handle(&caps[1], "instagram") {
                contact.instagram.get_or_insert(handle);
                line.used = true;
            }
        }
        for m in url_regex().find_iter(line.text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ')']);
            if !url.to_lowercase().contains("instagram.com") {
                contact.push_website(url);
                line.used = true;
            }
        }
        if line.used || email_regex().is_match(line.text) {
            continue;
        }
        if let Some(caps) = handle_regex().captures(line.text) {
            if let Ok(handle) = validation::instagram_handle(&caps[1], "instagram") {
                contact.instagram.get_or_insert(handle);
                line.used = true;
            }
        }
    }
}

fn extract_phones(lines: &mut [Line], contact: &mut ExtractedContact) {
    for i in 0..lines.len() {
        if lines[i].used {
            continue;
        }
        let text = lines[i].text;
        let mut found = false;
        for m in phone_regex().find_iter(text) {
            let digits = digits_of(m.as_str()).len();
            if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
                || parse_date(m.as_str()).is_some()
                || year_range_regex().is_match(m.as_str().trim())
            {
                continue;
            }
            let label = phone_label(&text[..m.start()]).or_else(|| {
                i.checked_sub(1)
                    .filter(|&prev| !lines[prev].used)
                    .and_then(|prev| phone_label(lines[prev].text))
            });
            contact.push_phone(m.as_str().trim(), label.flatten());
            found = true;
        }
        if found {
            lines[i].used = true;
            // A label alone on the previous line belongs to this number.
            if let Some(prev) = i.checked_sub(1) {
                if phone_label(lines[prev].text).is_some() {
                    lines[prev].used = true;
                }
            }
        }
    }
}

/// `Some(label)` when `text` is only a phone label; the inner value is
/// `None` for generic labels like "phone".
fn phone_label(text: &str) -> Option<Option<String>> {
    let word = text.trim().trim_end_matches([':', '-']).trim().to_lowercase();
    if !PHONE_LABELS.contains(&word.as_str()) {
        return None;
    }
    Some(match word.as_str() {
        "phone" | "tel" => None,
        other => normalize_label(other),
    })
}

fn extract_location(lines: &mut [Line], contact: &mut ExtractedContact) {
    for line in lines.iter_mut().filter(|l| !l.used) {
        if let Some(caps) = location_regex().captures(line.text) {
            let place = caps[1].trim().trim_end_matches(['.', '!']).trim();
            if !place.is_empty() {
                contact.location = Some(place.to_string());
                line.used = true;
                return;
            }
        }
    }
    for line in lines.iter_mut().filter(|l| !l.used) {
        if city_state_regex().is_match(line.text) {
            contact.location = Some(line.text.to_string());
            line.used = true;
            return;
        }
    }
}

fn extract_name(lines: &mut [Line], contact: &mut ExtractedContact) {
    if let Some(line) = lines.iter_mut().find(|l| !l.used && looks_like_name(l.text)) {
        contact.name = Some(line.text.to_string());
        line.used = true;
    }
}

fn looks_like_name(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_NAME_WORDS {
        return false;
    }
    words.iter().all(|word| {
        word.chars().next().is_some_and(char::is_uppercase)
            && word.chars().all(|c| c.is_alphabetic() || matches!(c, '\'' | '-' | '.'))
            && !UI_WORDS.contains(&word.to_lowercase().trim_end_matches('.'))
    })
}

/// Lines made only of UI words and counters ("1,024 followers").
fn is_chrome(text: &str) -> bool {
    text.split_whitespace().all(|word| {
        let lower = word.to_lowercase();
        UI_WORDS.contains(&lower.as_str())
            || lower
                .trim_end_matches(['k', 'm'])
                .chars()
                .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let number = |s: &str| s.parse::<u32>().ok();
    if let Some(c) = iso_date_regex().captures(text) {
        return NaiveDate::from_ymd_opt(c[1].parse().ok()?, number(&c[2])?, number(&c[3])?);
    }
    if let Some(c) = us_date_regex().captures(text) {
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, number(&c[1])?, number(&c[2])?);
    }
    if let Some(c) = month_first_regex().captures(text) {
        if let Some(month) = month_number(&c[1]) {
            return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, number(&c[2])?);
        }
    }
    if let Some(c) = day_first_regex().captures(text) {
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month_number(&c[2])?, number(&c[1])?);
    }
    None
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn contact_card_screenshot() {
        let text = "\
Edit
Maria Gonzalez
mobile
(555) 201-3344
Work: +1 555 777 8899
Email
maria.g@example.com
Birthday: March 3, 1990
Lives in Austin, TX
";
        let contact = parse_ocr_text(text).unwrap();
        assert_eq!(contact.name.as_deref(), Some("Maria Gonzalez"));
        assert_eq!(contact.phones.len(), 2);
        assert_eq!(contact.phones[0].value, "(555) 201-3344");
        assert_eq!(contact.phones[0].label.as_deref(), Some("mobile"));
        assert_eq!(contact.phones[1].label.as_deref(), Some("work"));
        assert_eq!(contact.emails[0].value, "maria.g@example.com");
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1990, 3, 3));
        assert_eq!(contact.location.as_deref(), Some("Austin, TX"));
        assert_eq!(contact.notes, None);
    }

    #[test]
    fn instagram_profile_screenshot() {
        let text = "\
@jamie.rivers
Jamie Rivers
128 posts
2,048 followers
310 following
Climber, coffee snob, dog person
Portland, OR
jamie.example.com https://jamie.example.com
";
        let contact = parse_ocr_text(text).unwrap();
        assert_eq!(contact.instagram.as_deref(), Some("jamie.rivers"));
        assert_eq!(contact.name.as_deref(), Some("Jamie Rivers"));
        assert_eq!(contact.location.as_deref(), Some("Portland, OR"));
        assert_eq!(contact.websites, vec!["https://jamie.example.com".to_string()]);
        assert_eq!(contact.notes.as_deref(), Some("Climber, coffee snob, dog person"));
        assert!(contact.phones.is_empty());
    }

    #[test]
    fn dates_are_not_phone_numbers() {
        let contact = parse_ocr_text("DOB 1988-11-02\nborn 04/15/1992").unwrap();
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1988, 11, 2));
        assert!(contact.phones.is_empty());
    }

    #[test]
    fn phone_digit_bounds() {
        let contact = parse_ocr_text("call 555-010\nid 1234 5678 9012 3456 78").unwrap();
        assert!(contact.phones.is_empty());
        let contact = parse_ocr_text("555 0101 22").unwrap();
        assert_eq!(contact.phones.len(), 1);
    }

    #[test]
    fn year_ranges_are_not_phone_numbers() {
        let contact = parse_ocr_text("Jane Doe\nCoach 2014 - 2018\nAlumni 1999-2003").unwrap();
        assert!(contact.phones.is_empty());
        assert_eq!(contact.name.as_deref(), Some("Jane Doe"));

        let contact = parse_ocr_text("Coach 2014 - 2018\n555 201 3344").unwrap();
        assert_eq!(contact.phones.len(), 1);
        assert_eq!(contact.phones[0].value, "555 201 3344");
    }

    #[test]
    fn from_must_be_a_whole_word() {
        let contact = parse_ocr_text("Fromage lover\nJane Doe").unwrap();
        assert_eq!(contact.location, None);
        assert_eq!(contact.name.as_deref(), Some("Jane Doe"));
        assert_eq!(contact.notes.as_deref(), Some("Fromage lover"));

        let contact = parse_ocr_text("Fromm Jones\n555 201 3344").unwrap();
        assert_eq!(contact.location, None);
        assert_eq!(contact.name.as_deref(), Some("Fromm Jones"));

        let contact = parse_ocr_text("From Lisbon\nLives inside a van").unwrap();
        assert_eq!(contact.location.as_deref(), Some("Lisbon"));
    }

    #[test]
    fn instagram_links_and_day_first_dates() {
        let contact = parse_ocr_text("instagram.com/Some_One\nbirthday 3rd June 2001").unwrap();
        assert_eq!(contact.instagram.as_deref(), Some("some_one"));
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(2001, 6, 3));
    }

    #[test]
    fn nothing_recognisable_is_empty_not_an_error() {
        let contact = parse_ocr_text("Follow  Message\n12 posts").unwrap();
        assert!(contact.is_empty());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse_ocr_text("  \n ").is_err());
    }

    #[test]
    fn arbitrary_bytes_never_panic() {
        for text in ["@", "🎂", "born", "instagram.com/", "—\u{0}\u{fffd}", "from", "12/99/9999"] {
            let _ = parse_ocr_text(text);
        }
    }
}
