use chrono::{Datelike, NaiveDate};

use super::{normalize_label, ExtractedContact};
use crate::error::{KithError, KithResult};
use crate::model::Address;
use crate::validation;

/// One content line after unfolding, with its group stripped.
#[derive(Debug)]
struct Property {
    name: String,
    /// Upper-cased keys; bare 2.1 parameters are keyed as `TYPE`.
    params: Vec<(String, String)>,
    value: String,
}

impl Property {
    fn param_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn label(&self) -> Option<String> {
        self.param_values("TYPE").find_map(normalize_label)
    }

    fn mentions(&self, needle: &str) -> bool {
        self.params
            .iter()
            .any(|(_, v)| v.to_lowercase().contains(needle))
    }
}

/// Parses every card in `text`. Cards without a single usable field are dropped.
pub fn parse_vcards(text: &str) -> KithResult<Vec<ExtractedContact>> {
    if !text.to_uppercase().contains("BEGIN:VCARD") {
        return Err(KithError::invalid("vcard", "contains no BEGIN:VCARD"));
    }

    let mut cards = Vec::new();
    let mut current: Option<CardBuilder> = None;

    for line in unfold(text) {
        let Some(prop) = parse_line(&line) else {
            continue;
        };
        match prop.name.as_str() {
            "BEGIN" if prop.value.eq_ignore_ascii_case("VCARD") => {
                finish_card(current.replace(CardBuilder::default()), &mut cards);
            }
            "END" if prop.value.eq_ignore_ascii_case("VCARD") => {
                finish_card(current.take(), &mut cards);
            }
            _ => {
                if let Some(card) = current.as_mut() {
                    card.apply(prop);
                }
            }
        }
    }
    // A truncated export still yields its last card.
    finish_card(current, &mut cards);

    Ok(cards)
}

fn finish_card(builder: Option<CardBuilder>, cards: &mut Vec<ExtractedContact>) {
    if let Some(card) = builder.map(CardBuilder::finish) {
        if !card.is_empty() {
            cards.push(card);
        }
    }
}

#[derive(Default)]
struct CardBuilder {
    contact: ExtractedContact,
    structured_name: Option<String>,
}

impl CardBuilder {
    fn apply(&mut self, prop: Property) {
        let contact = &mut self.contact;
        match prop.name.as_str() {
            "FN" => contact.name = non_empty(unescape(&prop.value)),
            "N" => {
                let parts = split_unescaped(&prop.value, ';');
                let get = |i: usize| parts.get(i).map(|s| s.trim()).unwrap_or_default();
                // Prefix Given Additional Family Suffix
                let joined = [get(3), get(1), get(2), get(0), get(4)]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                self.structured_name = non_empty(joined);
            }
            "NICKNAME" => {
                contact.nickname = split_unescaped(&prop.value, ',')
                    .into_iter()
                    .find_map(non_empty);
            }
            "TEL" => {
                let number = prop.value.trim();
                let number = number.strip_prefix("tel:").unwrap_or(number);
                if number.chars().any(|c| c.is_ascii_digit()) {
                    contact.push_phone(number, prop.label());
                }
            }
            "EMAIL" => {
                let email = prop.value.trim();
                let email = email.strip_prefix("mailto:").unwrap_or(email);
                if let Ok(valid) = validation::email(email, "email") {
                    contact.push_email(&valid, prop.label());
                }
            }
            "ADR" => {
                let parts = split_unescaped(&prop.value, ';');
                let get = |i: usize| parts.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
                let street = [get(0), get(1), get(2)]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                let address = Address {
                    street,
                    city: get(3),
                    state: get(4),
                    zip: get(5),
                    country: get(6),
                };
                if address != Address::default() && !contact.addresses.contains(&address) {
                    contact.addresses.push(address);
                }
            }
            "BDAY" => {
                let omitted_year = prop
                    .param_values("X-APPLE-OMIT-YEAR")
                    .find_map(|y| y.parse::<i32>().ok());
                contact.birthday = parse_birthday(&prop.value)
                    .filter(|date| Some(date.year()) != omitted_year);
            }
            "ORG" => {
                contact.organization = split_unescaped(&prop.value, ';')
                    .into_iter()
                    .find_map(non_empty);
            }
            "TITLE" => contact.title = non_empty(unescape(&prop.value)),
            "NOTE" => contact.notes = non_empty(unescape(&prop.value)),
            "URL" => {
                let url = unescape(&prop.value);
                match instagram_from_url(&url) {
                    Some(handle) => contact.instagram = Some(handle),
                    None => contact.push_website(&url),
                }
            }
            "X-SOCIALPROFILE" | "IMPP" => {
                if let Some(handle) = instagram_from_profile(&prop) {
                    contact.instagram = Some(handle);
                }
            }
            "PHOTO" => {
                let value = prop.value.trim();
                let lower = value.to_lowercase();
                if lower.starts_with("http://") || lower.starts_with("https://") {
                    contact.photo_url = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> ExtractedContact {
        let mut contact = self.contact;
        if contact.name.is_none() {
            contact.name = self.structured_name;
        }
        contact
    }
}

/// Joins folded lines and quoted-printable soft breaks into logical lines.
fn unfold(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();
    for raw in normalized.split('\n') {
        match lines.last_mut() {
            Some(prev) if is_quoted_printable(prev) && prev.ends_with('=') && !is_card_boundary(raw) => {
                prev.pop();
                prev.push_str(raw.trim_start());
            }
            Some(prev) if raw.starts_with(' ') || raw.starts_with('\t') => {
                prev.push_str(&raw[1..]);
            }
            _ => {
                if !raw.trim().is_empty() {
                    lines.push(raw.to_string());
                }
            }
        }
    }
    lines
}

/// A soft break never swallows the line that opens or closes a card.
fn is_card_boundary(raw: &str) -> bool {
    let upper = raw.trim().to_uppercase();
    upper == "BEGIN:VCARD" || upper == "END:VCARD"
}

fn is_quoted_printable(line: &str) -> bool {
    line.split(':')
        .next()
        .is_some_and(|head| head.to_uppercase().contains("QUOTED-PRINTABLE"))
}

fn parse_line(line: &str) -> Option<Property> {
    let colon = value_separator(line)?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut segments = head.split(';');
    let name_with_group = segments.next()?.trim();
    let name = name_with_group
        .rsplit('.')
        .next()
        .unwrap_or(name_with_group)
        .to_uppercase();
    if name.is_empty() {
        return None;
    }

    let mut params = Vec::new();
    let mut quoted_printable = false;
    for segment in segments {
        let (key, values) = match segment.split_once('=') {
            Some((k, v)) => (k.trim().to_uppercase(), v),
            None => ("TYPE".to_string(), segment),
        };
        for v in values.split(',') {
            let v = v.trim().trim_matches('"').to_string();
            if v.eq_ignore_ascii_case("QUOTED-PRINTABLE") {
                quoted_printable = true;
            }
            if !v.is_empty() {
                params.push((key.clone(), v));
            }
        }
    }

    let value = if quoted_printable {
        decode_quoted_printable(value)
    } else {
        value.to_string()
    };
    Some(Property { name, params, value })
}

/// First colon outside a quoted parameter value.
fn value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn decode_quoted_printable(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        // A trailing `=` is a soft break with nothing after it.
        if bytes[i] == b'=' && i + 1 == bytes.len() {
            break;
        }
        if bytes[i] == b'=' && i + 2 < bytes.len() {
            let (hi, lo) = (bytes[i + 1], bytes[i + 2]);
            if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() {
                out.push(hex_value(hi) << 4 | hex_value(lo));
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit.to_ascii_uppercase() - b'A' + 10,
    }
}

/// Splits on `sep` where it is not backslash-escaped, unescaping each part.
fn split_unescaped(value: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == sep {
            parts.push(unescape(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    parts.push(unescape(&current));
    parts
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `YYYY-MM-DD`, `YYYYMMDD`, or either followed by a time. `--MMDD` has no
/// year and is ignored.
fn parse_birthday(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.starts_with("--") {
        return None;
    }
    let date = value.split(['T', 't', ' ']).next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y%m%d"))
        .ok()
}

fn instagram_from_url(url: &str) -> Option<String> {
    if !url.to_lowercase().contains("instagram.com/") {
        return None;
    }
    validation::instagram_handle(url, "instagram").ok()
}

fn instagram_from_profile(prop: &Property) -> Option<String> {
    if let Some(handle) = instagram_from_url(&prop.value) {
        return Some(handle);
    }
    if !prop.mentions("instagram") {
        return None;
    }
    if let Some(user) = prop.param_values("X-USER").next() {
        return validation::instagram_handle(user, "instagram").ok();
    }
    let value = prop.value.trim();
    let value = value
        .split_once(':')
        .map(|(_, rest)| rest)
        .filter(|_| !value.contains("//"))
        .unwrap_or(value);
    validation::instagram_handle(value, "instagram").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_a_3_0_card() {
        let text = "BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Ada Lovelace\r\n\
N:Lovelace;Ada;;;\r\n\
NICKNAME:Countess,Ada\r\n\
TEL;TYPE=cell,voice:+44 20 7946 0018\r\n\
item1.EMAIL;TYPE=INTERNET:Ada@Example.org\r\n\
ADR;TYPE=home:;;12 St James\\, Square;London;;SW1Y 4JH;UK\r\n\
BDAY:1815-12-10\r\n\
ORG:Analytical Engines;Research\r\n\
TITLE:Analyst\r\n\
NOTE:Loves poetry\\nand maths\r\n\
URL:https://www.instagram.com/ada.l/\r\n\
END:VCARD\r\n";

        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(card.nickname.as_deref(), Some("Countess"));
        assert_eq!(card.phones[0].value, "+44 20 7946 0018");
        assert_eq!(card.phones[0].label.as_deref(), Some("mobile"));
        assert_eq!(card.emails[0].value, "ada@example.org");
        assert_eq!(card.emails[0].label, None);
        assert_eq!(card.addresses[0].street, "12 St James, Square");
        assert_eq!(card.addresses[0].city, "London");
        assert_eq!(card.addresses[0].zip, "SW1Y 4JH");
        assert_eq!(card.birthday, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert_eq!(card.organization.as_deref(), Some("Analytical Engines"));
        assert_eq!(card.title.as_deref(), Some("Analyst"));
        assert_eq!(card.notes.as_deref(), Some("Loves poetry\nand maths"));
        assert_eq!(card.instagram.as_deref(), Some("ada.l"));
        assert!(card.websites.is_empty());
    }

    #[test]
    fn reads_2_1_quoted_printable_and_bare_params() {
        let text = "BEGIN:VCARD\n\
VERSION:2.1\n\
N;CHARSET=UTF-8;ENCODING=QUOTED-PRINTABLE:M=C3=BCller;J=C3=BC=\n\
rgen;;;\n\
TEL;CELL:555-0100\n\
TEL;WORK;VOICE:555-0199\n\
END:VCARD\n";

        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards[0].name.as_deref(), Some("Jürgen Müller"));
        assert_eq!(cards[0].phones[0].label.as_deref(), Some("mobile"));
        assert_eq!(cards[0].phones[1].label.as_deref(), Some("work"));
    }

    #[test]
    fn unfolds_continuation_lines() {
        let text = "BEGIN:VCARD\nVERSION:4.0\nFN:Grace\n  Hopper\nNOTE:first\n\tsecond\nEND:VCARD";
        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards[0].name.as_deref(), Some("Grace Hopper"));
        assert_eq!(cards[0].notes.as_deref(), Some("firstsecond"));
    }

    #[test]
    fn birthday_forms() {
        assert_eq!(parse_birthday("19900315"), NaiveDate::from_ymd_opt(1990, 3, 15));
        assert_eq!(
            parse_birthday("1990-03-15T00:00:00Z"),
            NaiveDate::from_ymd_opt(1990, 3, 15)
        );
        assert_eq!(parse_birthday("--0315"), None);
        assert_eq!(parse_birthday("March"), None);
    }

    #[test]
    fn apple_omitted_year_is_ignored() {
        let text = "BEGIN:VCARD\nFN:Kim\nBDAY;X-APPLE-OMIT-YEAR=1604:1604-03-15\nEND:VCARD";
        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards[0].birthday, None);
    }

    #[test]
    fn multiple_cards_and_empty_cards() {
        let text = "BEGIN:VCARD\nFN:One\nEND:VCARD\nBEGIN:VCARD\nVERSION:3.0\nEND:VCARD\nBEGIN:VCARD\nFN:Two\nEND:VCARD";
        let names: Vec<_> = parse_vcards(text)
            .unwrap()
            .into_iter()
            .filter_map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[test]
    fn social_profiles_and_photos() {
        let text = "BEGIN:VCARD\n\
FN:Lin\n\
X-SOCIALPROFILE;type=instagram;x-user=lin_draws:x-apple:lin_draws\n\
PHOTO;ENCODING=b;TYPE=JPEG:/9j/4AAQSkZJRg\n\
END:VCARD\n\
BEGIN:VCARD\n\
FN:Sam\n\
IMPP;X-SERVICE-TYPE=Instagram:x-apple:sam.k\n\
PHOTO;VALUE=uri:https://example.org/sam.jpg\n\
URL:https://sam.example.org\n\
END:VCARD";
        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards[0].instagram.as_deref(), Some("lin_draws"));
        assert_eq!(cards[0].photo_url, None);
        assert_eq!(cards[1].instagram.as_deref(), Some("sam.k"));
        assert_eq!(cards[1].photo_url.as_deref(), Some("https://example.org/sam.jpg"));
        assert_eq!(cards[1].websites, vec!["https://sam.example.org".to_string()]);
    }

    #[test]
    fn soft_breaks_stop_at_the_card_boundary() {
        let text = "BEGIN:VCARD\nN;ENCODING=QUOTED-PRINTABLE:Doe;Jane=\n=\nEND:VCARD";
        let cards = parse_vcards(text).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn truncated_and_lower_case_cards() {
        let cards = parse_vcards("begin:vcard\nfn:Kim Lee\ntel:555-0100").unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Kim Lee"));
        assert_eq!(cards[0].phones[0].value, "555-0100");

        let cards = parse_vcards("BEGIN:VCARD\nFN:One\nBEGIN:VCARD\nFN:Two\nEND:VCARD").unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn arbitrary_input_never_panics() {
        let inputs = [
            "BEGIN:VCARD",
            "BEGIN:VCARD\nFN:Cut off mid",
            "BEGIN:VCARD\n=\nEND:VCARD",
            "BEGIN:VCARD\nFN;ENCODING=QUOTED-PRINTABLE:=\nEND:VCARD",
            "BEGIN:VCARD\nN;ENCODING=QUOTED-PRINTABLE:=\n=\nEND:VCARD",
            "BEGIN:VCARD\nNOTE;ENCODING=QUOTED-PRINTABLE:=C3=\nEND:VCARD",
            "BEGIN:VCARD\nÜBER;TYPE=ä:wert\n名前:値\nEND:VCARD",
            "BEGIN:VCARD\n\u{0}:\u{fffd}\n:\n;;;\n\tfold\nEND:VCARD",
            "begin:vcard\nbday:--\nadr:;;;;;;;;\nend:vcard",
        ];
        for text in inputs {
            assert!(parse_vcards(text).is_ok(), "{text:?}");
        }
    }

    #[test]
    fn text_without_cards_is_invalid() {
        let err = parse_vcards("just some notes").unwrap_err();
        assert_eq!(err.field(), Some("vcard"));
    }
}
