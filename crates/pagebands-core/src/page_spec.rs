//! Page selection parsing
//!
//! Turns free-form text such as `"1,3,5"` or `"2-4, 7"` into a validated,
//! deduplicated set of 1-indexed page numbers bounded by the document length.

use std::collections::BTreeSet;
use std::fmt;
use std::num::IntErrorKind;

use crate::error::{PageBandsError, Result};

/// A validated set of page numbers, iterated in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSpec {
    pages: BTreeSet<u32>,
}

impl PageSpec {
    /// Parse a comma-separated list of pages and `start-end` ranges.
    ///
    /// # Arguments
    /// * `input` - Selection text like "1,3,5" or "2-4"
    /// * `max_page` - Number of pages in the document
    ///
    /// # Errors
    /// * `InvalidFormat` if any token is not a number or a two-sided range
    /// * `OutOfRange` if any page is below 1 or above `max_page`
    ///
    /// An inverted range such as "5-3" contributes no pages.
    ///
    /// # Examples
    /// ```
    /// use pagebands_core::PageSpec;
    ///
    /// let spec = PageSpec::parse("1, 3-4, 3", 10).unwrap();
    /// assert_eq!(spec.iter().collect::<Vec<_>>(), vec![1, 3, 4]);
    /// ```
    pub fn parse(input: &str, max_page: u32) -> Result<Self> {
        let mut pages = BTreeSet::new();

        for token in input.split(',') {
            let token = token.trim();

            if let Some((start, end)) = token.split_once('-') {
                if end.contains('-') {
                    return Err(PageBandsError::InvalidFormat(format!(
                        "'{}' is not a valid range",
                        token
                    )));
                }
                let start = parse_number(start)?;
                let end = parse_number(end)?;

                for bound in [start, end] {
                    if bound > u64::from(max_page) {
                        return Err(PageBandsError::OutOfRange {
                            page: bound,
                            max: max_page,
                        });
                    }
                }
                if start < 1 {
                    return Err(PageBandsError::OutOfRange {
                        page: start,
                        max: max_page,
                    });
                }

                // Both bounds are <= max_page here, so they fit in u32
                let (start, end) = (start as u32, end as u32);
                pages.extend(start..=end.min(max_page));
            } else {
                let page = parse_number(token)?;
                if page < 1 || page > u64::from(max_page) {
                    return Err(PageBandsError::OutOfRange {
                        page,
                        max: max_page,
                    });
                }
                pages.insert(page as u32);
            }
        }

        Ok(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Lowest selected page
    pub fn first(&self) -> Option<u32> {
        self.pages.first().copied()
    }

    /// Highest selected page
    pub fn last(&self) -> Option<u32> {
        self.pages.last().copied()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Pages in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }
}

impl FromIterator<u32> for PageSpec {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().filter(|&p| p >= 1).collect(),
        }
    }
}

impl fmt::Display for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for page in &self.pages {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", page)?;
            first = false;
        }
        Ok(())
    }
}

/// Parse one page number. Digit strings too long for `u64` saturate, so they
/// surface as out of range rather than malformed.
fn parse_number(text: &str) -> Result<u64> {
    let text = text.trim();
    match text.parse::<u64>() {
        Ok(number) => Ok(number),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        Err(_) => Err(PageBandsError::InvalidFormat(format!(
            "'{}' is not a page number, enter pages like 1,3,5 or ranges like 2-4",
            text
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pages(spec: &PageSpec) -> Vec<u32> {
        spec.iter().collect()
    }

    #[test]
    fn test_parse_singletons() {
        let spec = PageSpec::parse("1,3,5", 5).unwrap();
        assert_eq!(pages(&spec), vec![1, 3, 5]);
    }

    #[test]
    fn test_parse_range() {
        let spec = PageSpec::parse("2-4", 4).unwrap();
        assert_eq!(pages(&spec), vec![2, 3, 4]);
    }

    #[test]
    fn test_parse_mixed_with_whitespace() {
        let spec = PageSpec::parse(" 1 , 3 - 4,8", 10).unwrap();
        assert_eq!(pages(&spec), vec![1, 3, 4, 8]);
    }

    #[test]
    fn test_parse_deduplicates() {
        let spec = PageSpec::parse("1-3,2-4,3", 10).unwrap();
        assert_eq!(pages(&spec), vec![1, 2, 3, 4]);
        assert_eq!(spec.len(), 4);
    }

    #[test]
    fn test_range_end_beyond_document_fails() {
        let err = PageSpec::parse("3-10", 5).unwrap_err();
        assert!(matches!(err, PageBandsError::OutOfRange { page: 10, max: 5 }));
    }

    #[test]
    fn test_range_start_beyond_document_fails() {
        let err = PageSpec::parse("7-8", 5).unwrap_err();
        assert!(matches!(err, PageBandsError::OutOfRange { page: 7, .. }));
    }

    #[test]
    fn test_range_starting_at_zero_fails() {
        let err = PageSpec::parse("0-2", 5).unwrap_err();
        assert!(matches!(err, PageBandsError::OutOfRange { page: 0, .. }));
    }

    #[test]
    fn test_singleton_out_of_range() {
        assert!(matches!(
            PageSpec::parse("0", 5),
            Err(PageBandsError::OutOfRange { page: 0, .. })
        ));
        assert!(matches!(
            PageSpec::parse("6", 5),
            Err(PageBandsError::OutOfRange { page: 6, .. })
        ));
    }

    #[test]
    fn test_non_numeric_fails() {
        assert!(matches!(
            PageSpec::parse("abc", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
        assert!(matches!(
            PageSpec::parse("1,x-3", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_tokens_fail() {
        assert!(matches!(
            PageSpec::parse("", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
        assert!(matches!(
            PageSpec::parse("1,", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_malformed_ranges_fail() {
        assert!(matches!(
            PageSpec::parse("1-2-3", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
        assert!(matches!(
            PageSpec::parse("-3", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
        assert!(matches!(
            PageSpec::parse("2-", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_first_error_wins() {
        // Tokens are checked left to right
        assert!(matches!(
            PageSpec::parse("9,abc", 5),
            Err(PageBandsError::OutOfRange { page: 9, .. })
        ));
        assert!(matches!(
            PageSpec::parse("abc,9", 5),
            Err(PageBandsError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let spec = PageSpec::parse("4-2", 5).unwrap();
        assert!(spec.is_empty());

        let spec = PageSpec::parse("4-2,5", 5).unwrap();
        assert_eq!(pages(&spec), vec![5]);
    }

    #[test]
    fn test_huge_number_is_out_of_range() {
        assert!(matches!(
            PageSpec::parse("99999999999", 5),
            Err(PageBandsError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_number_wider_than_u64_is_out_of_range() {
        assert!(matches!(
            PageSpec::parse("99999999999999999999999", 5),
            Err(PageBandsError::OutOfRange { page: u64::MAX, max: 5 })
        ));
        assert!(matches!(
            PageSpec::parse("1-99999999999999999999999", 5),
            Err(PageBandsError::OutOfRange { page: u64::MAX, .. })
        ));
    }

    #[test]
    fn test_first_last_and_display() {
        let spec = PageSpec::parse("7,2-3", 10).unwrap();
        assert_eq!(spec.first(), Some(2));
        assert_eq!(spec.last(), Some(7));
        assert!(spec.contains(3));
        assert!(!spec.contains(4));
        assert_eq!(spec.to_string(), "2,3,7");
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(a in 1u32..30, b in 1u32..30, c in 1u32..30) {
            let input = format!("{},{}-{}", a, b, c);
            let first = PageSpec::parse(&input, 30).unwrap();
            let second = PageSpec::parse(&input, 30).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn parsed_pages_stay_in_bounds(max in 1u32..50, a in 1u32..50, b in 1u32..50) {
            let input = format!("{}-{}", a.min(max), b.min(max));
            let spec = PageSpec::parse(&input, max).unwrap();
            prop_assert!(spec.iter().all(|p| p >= 1 && p <= max));
        }

        #[test]
        fn display_round_trips(pages in proptest::collection::btree_set(1u32..40, 1..10)) {
            let spec: PageSpec = pages.iter().copied().collect();
            let reparsed = PageSpec::parse(&spec.to_string(), 40).unwrap();
            prop_assert_eq!(reparsed, spec);
        }
    }
}
