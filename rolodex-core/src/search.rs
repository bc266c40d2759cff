//! Substring search over the directory.
//!
//! A record matches when its first name, last name, email or full name
//! contains the query, ignoring case. Queries are trimmed; a blank query
//! matches everything.

use crate::contact::Contact;

/// Trimmed, lowercased query, or `None` if there is nothing to match on.
#[must_use]
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Whether `contact` matches an already-normalised `needle`.
#[must_use]
pub fn matches(contact: &Contact, needle: &str) -> bool {
    [
        contact.first_name.as_str(),
        contact.last_name.as_str(),
        contact.email.as_str(),
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(needle))
        || contact.full_name().to_lowercase().contains(needle)
}

/// Positions in `contacts` that match `needle`, in canonical order.
///
/// `None` selects every position.
#[must_use]
pub fn filter_indices(contacts: &[Contact], needle: Option<&str>) -> Vec<usize> {
    match needle {
        None => (0..contacts.len()).collect(),
        Some(needle) => contacts
            .iter()
            .enumerate()
            .filter(|(_, c)| matches(c, needle))
            .map(|(i, _)| i)
            .collect(),
    }
}
