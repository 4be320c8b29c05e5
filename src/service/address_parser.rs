use crate::models::event::CalendarEvent;

const ADDRESS_LABEL: &str = "address:";
const FILLER_WORDS: [&str; 3] = ["new", "customer", "please"];

/// Where an event's address was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSource {
    Location,
    LabeledLine,
    DescriptionLine,
    TitleWord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAddress {
    pub address: String,
    pub source: AddressSource,
}

/// Resolves a best-guess address for an existing booking.
///
/// Tries the event location, then an `Address:` line in the description,
/// then the first description line, then the last meaningful title word.
/// `markers` are phrases stripped from the title before the word search.
pub fn parse_event_address(event: &CalendarEvent, markers: &[&str]) -> Option<EventAddress> {
    if let Some(location) = non_empty(event.location.as_deref()) {
        return Some(EventAddress {
            address: location,
            source: AddressSource::Location,
        });
    }

    if let Some(description) = event.description.as_deref() {
        if let Some(address) = labeled_address(description) {
            return Some(EventAddress {
                address,
                source: AddressSource::LabeledLine,
            });
        }
        if let Some(first) = non_empty(description.lines().next()) {
            return Some(EventAddress {
                address: first,
                source: AddressSource::DescriptionLine,
            });
        }
    }

    title_place(&event.summary, markers).map(|address| EventAddress {
        address,
        source: AddressSource::TitleWord,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn labeled_address(description: &str) -> Option<String> {
    description.lines().find_map(|line| {
        let lower = line.to_lowercase();
        let idx = lower.find(ADDRESS_LABEL)?;
        // Offsets can shift when non-ASCII text lowercases to a different width.
        let rest = line.get(idx + ADDRESS_LABEL.len()..)?;
        non_empty(Some(rest))
    })
}

fn title_place(summary: &str, markers: &[&str]) -> Option<String> {
    let mut text = summary.to_lowercase();
    for marker in markers {
        text = text.replace(&marker.to_lowercase(), "");
    }
    text.split_whitespace()
        .filter(|word| word.chars().count() > 3 && !FILLER_WORDS.contains(word))
        .last()
        .map(title_case)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
