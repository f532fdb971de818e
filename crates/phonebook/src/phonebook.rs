//! In-memory record store for contacts.
//!
//! [`PhoneBook`] keeps contacts in insertion order and answers every query
//! with a linear scan. Sorting and grouping return views; the underlying order
//! only changes through [`PhoneBook::add`] and [`PhoneBook::delete`].

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, warn};

use crate::contact::{Contact, ContactField, ContactUpdate};
use crate::error::{Error, Result};

/// Date format accepted for timeframe bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which end of a timeframe a bound belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    /// Earliest day to include.
    Start,
    /// Latest day to include.
    End,
}

impl std::fmt::Display for BoundSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// A timeframe bound that could not be parsed and was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredBound {
    /// Which side of the range was dropped.
    pub side: BoundSide,
    /// The raw input that failed to parse.
    pub input: String,
}

/// Result of a timeframe search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeMatches<'a> {
    /// Contacts added within the effective range, in insertion order.
    pub contacts: Vec<&'a Contact>,
    /// Bounds that were ignored because they did not parse.
    pub ignored_bounds: Vec<IgnoredBound>,
}

/// Contacts sharing one value of a grouping field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGroup<'a> {
    /// The shared value, or `None` for contacts without one.
    pub key: Option<&'a str>,
    /// Group members, in insertion order.
    pub contacts: Vec<&'a Contact>,
}

/// Ordered, in-memory collection of contacts.
#[derive(Debug, Default, Clone)]
pub struct PhoneBook {
    contacts: Vec<Contact>,
}

impl PhoneBook {
    /// Create an empty phone book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Check if the phone book holds no contacts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// All contacts in insertion order.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Iterate over contacts in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    /// Append a contact.
    pub fn add(&mut self, contact: Contact) {
        debug!("Adding contact {}", contact.full_name());
        self.contacts.push(contact);
    }

    /// Find contacts whose first or last name contains `query`, ignoring case.
    ///
    /// An empty query matches every contact.
    #[must_use]
    pub fn search_by_name(&self, query: &str) -> Vec<&Contact> {
        let query = query.to_lowercase();
        self.contacts
            .iter()
            .filter(|c| {
                c.first_name.to_lowercase().contains(&query)
                    || c.last_name.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Find contacts whose phone number contains `query` verbatim.
    ///
    /// No normalization is applied, so partial digit runs such as `456-7890`
    /// match.
    #[must_use]
    pub fn search_by_phone(&self, query: &str) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| c.phone.contains(query))
            .collect()
    }

    /// Find contacts whose phone number equals `phone` exactly.
    #[must_use]
    pub fn find_by_phone(&self, phone: &str) -> Vec<&Contact> {
        self.contacts.iter().filter(|c| c.phone == phone).collect()
    }

    /// Find contacts added between two optional `YYYY-MM-DD` dates.
    ///
    /// Both bounds are inclusive and compared against the local calendar date
    /// of [`Contact::time_added`]. Empty input means "no bound". A bound that
    /// does not parse is logged, reported in
    /// [`TimeframeMatches::ignored_bounds`], and treated as absent.
    #[must_use]
    pub fn search_by_timeframe(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> TimeframeMatches<'_> {
        let mut ignored_bounds = Vec::new();
        let mut bound = |side: BoundSide, input: Option<&str>| {
            let input = input.map(str::trim).filter(|s| !s.is_empty())?;
            match parse_date(input) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("Ignoring {} bound: {}", side, e);
                    ignored_bounds.push(IgnoredBound {
                        side,
                        input: input.to_string(),
                    });
                    None
                }
            }
        };

        let start = bound(BoundSide::Start, start_date);
        let end = bound(BoundSide::End, end_date);

        TimeframeMatches {
            contacts: self.search_by_dates(start, end),
            ignored_bounds,
        }
    }

    /// Find contacts added between two optional calendar dates, inclusive.
    #[must_use]
    pub fn search_by_dates(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&Contact> {
        self.contacts
            .iter()
            .filter(|c| within(c.time_added(), start, end))
            .collect()
    }

    /// Remove every contact whose phone equals `phone` exactly.
    ///
    /// Returns the number removed. Removing nothing is not an error.
    pub fn delete(&mut self, phone: &str) -> usize {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.phone != phone);
        let removed = before - self.contacts.len();
        debug!("Deleted {} contact(s) with phone {}", removed, phone);
        removed
    }

    /// Apply `update` to every contact whose phone equals `phone` exactly.
    ///
    /// Returns the number of contacts updated. When several contacts share
    /// the phone number, all receive the same changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the update would blank a required
    /// field; no contact is changed in that case.
    pub fn update(&mut self, phone: &str, update: &ContactUpdate) -> Result<usize> {
        update.validate()?;

        let mut updated = 0;
        for contact in self.contacts.iter_mut().filter(|c| c.phone == phone) {
            contact.update(update)?;
            updated += 1;
        }
        debug!("Updated {} contact(s) with phone {}", updated, phone);
        Ok(updated)
    }

    /// All contacts ordered by `by`.
    ///
    /// The sort is stable: contacts with equal values keep their insertion
    /// order. Contacts missing an optional value sort first.
    #[must_use]
    pub fn sort(&self, by: ContactField) -> Vec<&Contact> {
        let mut sorted: Vec<&Contact> = self.contacts.iter().collect();
        sorted.sort_by(|a, b| a.field(by).cmp(&b.field(by)));
        sorted
    }

    /// Group contacts by the value of `by`.
    ///
    /// Groups appear in the order their key was first seen; members keep
    /// insertion order.
    #[must_use]
    pub fn group_by(&self, by: ContactField) -> Vec<ContactGroup<'_>> {
        let mut groups: Vec<ContactGroup<'_>> = Vec::new();
        for contact in &self.contacts {
            let key = contact.field(by);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.contacts.push(contact),
                None => groups.push(ContactGroup {
                    key,
                    contacts: vec![contact],
                }),
            }
        }
        groups
    }
}

impl<'a> IntoIterator for &'a PhoneBook {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Contact> for PhoneBook {
    fn extend<I: IntoIterator<Item = Contact>>(&mut self, iter: I) {
        for contact in iter {
            self.add(contact);
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is not a valid calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(input.to_string()))
}

fn within(time_added: DateTime<Local>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let day = time_added.date_naive();
    start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::FieldUpdate;
    use chrono::TimeZone;

    fn contact(first: &str, last: &str, phone: &str) -> Contact {
        Contact::new(first, last, phone, None, None).unwrap()
    }

    fn contact_added(first: &str, phone: &str, y: i32, m: u32, d: u32) -> Contact {
        let at = Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        Contact::with_time_added(first, "Tester", phone, None, None, at).unwrap()
    }

    fn names(contacts: &[&Contact]) -> Vec<String> {
        contacts.iter().map(|c| c.first_name.clone()).collect()
    }

    fn sample_book() -> PhoneBook {
        let mut book = PhoneBook::new();
        book.add(contact("Ada", "Lovelace", "(123) 456-7890"));
        book.add(contact("Alan", "Turing", "(555) 010-0001"));
        book.add(contact("Grace", "Hopper", "(555) 010-0002"));
        book
    }

    #[test]
    fn test_new_is_empty() {
        let book = PhoneBook::new();
        assert!(book.is_empty());
        assert_eq!(book.len(), 0);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let book = sample_book();
        assert_eq!(book.len(), 3);
        let firsts: Vec<&str> = book.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(firsts, ["Ada", "Alan", "Grace"]);
    }

    #[test]
    fn test_search_by_name_matches_first_or_last() {
        let book = sample_book();
        assert_eq!(names(&book.search_by_name("al")), ["Alan"]);
        assert_eq!(names(&book.search_by_name("hop")), ["Grace"]);
        assert_eq!(names(&book.search_by_name("a")).len(), 3);
    }

    #[test]
    fn test_search_by_name_is_case_insensitive() {
        let mut book = PhoneBook::new();
        book.add(contact("John", "Smith", "(111) 111-1111"));
        book.add(contact("Jane", "Smithers", "(222) 222-2222"));
        book.add(contact("Bob", "Jones", "(333) 333-3333"));

        let lower = book.search_by_name("smith");
        let upper = book.search_by_name("SMITH");
        assert_eq!(lower, upper);
        assert_eq!(names(&lower), ["John", "Jane"]);
    }

    #[test]
    fn test_search_by_name_empty_query_matches_all() {
        let book = sample_book();
        assert_eq!(book.search_by_name("").len(), 3);
    }

    #[test]
    fn test_search_by_name_no_match() {
        let book = sample_book();
        assert!(book.search_by_name("zzz").is_empty());
    }

    #[test]
    fn test_search_by_phone_is_substring() {
        let book = sample_book();
        assert_eq!(names(&book.search_by_phone("456-7890")), ["Ada"]);
        assert_eq!(names(&book.search_by_phone("(555)")), ["Alan", "Grace"]);
        assert!(book.search_by_phone("999").is_empty());
    }

    #[test]
    fn test_find_by_phone_is_exact() {
        let book = sample_book();
        assert_eq!(names(&book.find_by_phone("(555) 010-0001")), ["Alan"]);
        assert!(book.find_by_phone("010-0001").is_empty());
    }

    #[test]
    fn test_delete_exact_match_only() {
        let mut book = sample_book();
        assert_eq!(book.delete("456-7890"), 0);
        assert_eq!(book.len(), 3);

        assert_eq!(book.delete("(123) 456-7890"), 1);
        assert_eq!(book.len(), 2);
        assert!(book.search_by_phone("456-7890").is_empty());
    }

    #[test]
    fn test_delete_removes_all_duplicates() {
        let mut book = sample_book();
        book.add(contact("Augusta", "King", "(123) 456-7890"));
        assert_eq!(book.delete("(123) 456-7890"), 2);
        assert_eq!(names(&book.sort(ContactField::FirstName)), ["Alan", "Grace"]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut book = sample_book();
        assert_eq!(book.delete("(000) 000-0000"), 0);
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_update_by_exact_phone() {
        let mut book = sample_book();
        let update = ContactUpdate {
            email: FieldUpdate::Set("grace@navy.mil".to_string()),
            ..ContactUpdate::default()
        };

        assert_eq!(book.update("(555) 010-0002", &update).unwrap(), 1);
        let grace = book.find_by_phone("(555) 010-0002")[0];
        assert_eq!(grace.email.as_deref(), Some("grace@navy.mil"));

        assert_eq!(book.update("010-0002", &update).unwrap(), 0);
    }

    #[test]
    fn test_update_applies_to_every_duplicate() {
        let mut book = sample_book();
        book.add(contact("Augusta", "King", "(123) 456-7890"));

        let update = ContactUpdate {
            last_name: Some("Byron".to_string()),
            ..ContactUpdate::default()
        };
        assert_eq!(book.update("(123) 456-7890", &update).unwrap(), 2);
        assert!(book
            .find_by_phone("(123) 456-7890")
            .iter()
            .all(|c| c.last_name == "Byron"));
    }

    #[test]
    fn test_update_with_nothing_set_changes_nothing() {
        let mut book = sample_book();
        let before = book.contacts().to_vec();

        assert_eq!(
            book.update("(123) 456-7890", &ContactUpdate::default())
                .unwrap(),
            1
        );
        assert_eq!(book.contacts(), before.as_slice());
    }

    #[test]
    fn test_update_invalid_changes_nothing() {
        let mut book = sample_book();
        let before = book.contacts().to_vec();
        let update = ContactUpdate {
            first_name: Some(" ".to_string()),
            ..ContactUpdate::default()
        };

        assert!(book.update("(123) 456-7890", &update).is_err());
        assert_eq!(book.contacts(), before.as_slice());
    }

    #[test]
    fn test_sort_by_last_name_is_stable() {
        let mut book = PhoneBook::new();
        book.add(contact("Zed", "Smith", "(111) 111-1111"));
        book.add(contact("Amy", "Jones", "(222) 222-2222"));
        book.add(contact("Bea", "Smith", "(333) 333-3333"));
        book.add(contact("Cal", "Adams", "(444) 444-4444"));

        let sorted = book.sort(ContactField::LastName);
        assert_eq!(names(&sorted), ["Cal", "Amy", "Zed", "Bea"]);
    }

    #[test]
    fn test_sort_does_not_reorder_store() {
        let book = sample_book();
        let _ = book.sort(ContactField::LastName);
        assert_eq!(book.contacts()[0].first_name, "Ada");
    }

    #[test]
    fn test_sort_missing_optional_values_first() {
        let mut book = PhoneBook::new();
        book.add(
            Contact::new("A", "X", "(111) 111-1111", Some("b@x.io".to_string()), None).unwrap(),
        );
        book.add(contact("B", "Y", "(222) 222-2222"));
        book.add(
            Contact::new("C", "Z", "(333) 333-3333", Some("a@x.io".to_string()), None).unwrap(),
        );

        assert_eq!(names(&book.sort(ContactField::Email)), ["B", "C", "A"]);
    }

    #[test]
    fn test_group_by_last_name() {
        let mut book = PhoneBook::new();
        book.add(contact("A", "Smith", "(111) 111-1111"));
        book.add(contact("B", "Jones", "(222) 222-2222"));
        book.add(contact("C", "Smith", "(333) 333-3333"));

        let groups = book.group_by(ContactField::LastName);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, Some("Smith"));
        assert_eq!(names(&groups[0].contacts), ["A", "C"]);
        assert_eq!(groups[1].key, Some("Jones"));
        assert_eq!(names(&groups[1].contacts), ["B"]);
    }

    #[test]
    fn test_group_by_optional_field_collects_missing() {
        let mut book = PhoneBook::new();
        book.add(contact("A", "Smith", "(111) 111-1111"));
        book.add(
            Contact::new("B", "Jones", "(222) 222-2222", None, Some("Paris".to_string()))
                .unwrap(),
        );
        book.add(contact("C", "Brown", "(333) 333-3333"));

        let groups = book.group_by(ContactField::Address);
        assert_eq!(groups[0].key, None);
        assert_eq!(names(&groups[0].contacts), ["A", "C"]);
        assert_eq!(groups[1].key, Some("Paris"));
    }

    #[test]
    fn test_search_by_timeframe_inclusive() {
        let mut book = PhoneBook::new();
        book.add(contact_added("Mid", "(111) 111-1111", 2020, 6, 15));
        book.add(contact_added("Next", "(222) 222-2222", 2021, 1, 1));
        book.add(contact_added("First", "(333) 333-3333", 2020, 1, 1));
        book.add(contact_added("Last", "(444) 444-4444", 2020, 12, 31));

        let found = book.search_by_timeframe(Some("2020-01-01"), Some("2020-12-31"));
        assert!(found.ignored_bounds.is_empty());
        assert_eq!(names(&found.contacts), ["Mid", "First", "Last"]);
    }

    #[test]
    fn test_search_by_timeframe_open_bounds() {
        let mut book = PhoneBook::new();
        book.add(contact_added("Old", "(111) 111-1111", 2019, 3, 1));
        book.add(contact_added("New", "(222) 222-2222", 2022, 3, 1));

        assert_eq!(book.search_by_timeframe(None, None).contacts.len(), 2);
        assert_eq!(
            names(&book.search_by_timeframe(Some("2020-01-01"), None).contacts),
            ["New"]
        );
        assert_eq!(
            names(&book.search_by_timeframe(None, Some("2020-01-01")).contacts),
            ["Old"]
        );
        assert_eq!(book.search_by_timeframe(Some(""), Some("  ")).contacts.len(), 2);
    }

    #[test]
    fn test_search_by_timeframe_invalid_bound_is_ignored() {
        let mut book = PhoneBook::new();
        book.add(contact_added("Old", "(111) 111-1111", 2019, 3, 1));
        book.add(contact_added("New", "(222) 222-2222", 2022, 3, 1));

        let found = book.search_by_timeframe(Some("2020-13-45"), Some("2020-06-01"));
        assert_eq!(names(&found.contacts), ["Old"]);
        assert_eq!(
            found.ignored_bounds,
            vec![IgnoredBound {
                side: BoundSide::Start,
                input: "2020-13-45".to_string(),
            }]
        );
    }

    #[test]
    fn test_search_by_timeframe_invalid_end_bound_is_ignored() {
        let mut book = PhoneBook::new();
        book.add(contact_added("Old", "(111) 111-1111", 2019, 3, 1));
        book.add(contact_added("New", "(222) 222-2222", 2022, 3, 1));

        let found = book.search_by_timeframe(Some("2020-01-01"), Some("next week"));
        assert_eq!(names(&found.contacts), ["New"]);
        assert_eq!(
            found.ignored_bounds,
            vec![IgnoredBound {
                side: BoundSide::End,
                input: "next week".to_string(),
            }]
        );
    }

    #[test]
    fn test_search_by_timeframe_both_bounds_invalid() {
        let mut book = PhoneBook::new();
        book.add(contact_added("Old", "(111) 111-1111", 2019, 3, 1));
        book.add(contact_added("New", "(222) 222-2222", 2022, 3, 1));

        let found = book.search_by_timeframe(Some("2020/01/01"), Some("2020-02-30"));
        assert_eq!(names(&found.contacts), ["Old", "New"]);
        let sides: Vec<BoundSide> = found.ignored_bounds.iter().map(|b| b.side).collect();
        assert_eq!(sides, [BoundSide::Start, BoundSide::End]);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2020-06-15").unwrap(),
            NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()
        );
        assert!(matches!(
            parse_date("15/06/2020"),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn test_extend() {
        let mut book = PhoneBook::new();
        book.extend(vec![
            contact("A", "Smith", "(111) 111-1111"),
            contact("B", "Jones", "(222) 222-2222"),
        ]);
        assert_eq!(book.len(), 2);
        assert_eq!((&book).into_iter().count(), 2);
    }
}
