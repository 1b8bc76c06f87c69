//! Entity identity: opaque ULID-based ids and `OKR-<n>` display ids
//!
//! Opaque ids are minted once at creation and never reassigned. Display ids
//! are minted for root OKRs only, as one more than the highest number
//! currently in use.

use ulid::Ulid;

use crate::entities::Okr;

/// Display id prefix for global OKRs
pub const DISPLAY_PREFIX: &str = "OKR-";

/// Mint a fresh opaque id, e.g. `okr-01hq3k...`
pub fn new_id(prefix: &str) -> String {
    let ulid = Ulid::new().to_string().to_lowercase();
    if prefix.is_empty() {
        ulid
    } else {
        format!("{}-{}", prefix, ulid)
    }
}

/// Parse a well-formed display id (`OKR-<positive integer>`) into its number
pub fn parse_display_id(display_id: &str) -> Option<u64> {
    let digits = display_id.strip_prefix(DISPLAY_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().filter(|&n| n > 0)
}

/// Extract the number from the first `OKR-<digits>` occurrence in `text`
///
/// Lenient on purpose: legacy records may carry decorated labels, and any
/// number found must still count towards the next assignment.
pub fn display_number(text: &str) -> Option<u64> {
    for (idx, _) in text.match_indices(DISPLAY_PREFIX) {
        let rest = &text[idx + DISPLAY_PREFIX.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if end > 0 {
            if let Ok(n) = rest[..end].parse::<u64>() {
                return Some(n);
            }
        }
    }
    None
}

pub fn format_display_id(number: u64) -> String {
    format!("{}{}", DISPLAY_PREFIX, number)
}

/// Next display id: `OKR-(max + 1)` over the numbers currently in use
///
/// Deleting a lower-numbered root never frees its number; deleting the
/// highest-numbered root does, since the maximum drops. Fails with the
/// current maximum when it is already `u64::MAX`.
pub fn assign_display_id<'a>(
    existing_roots: impl IntoIterator<Item = &'a Okr>,
) -> Result<String, u64> {
    let max = existing_roots
        .into_iter()
        .filter_map(|okr| okr.display_id.as_deref())
        .filter_map(display_number)
        .max()
        .unwrap_or(0);
    max.checked_add(1).map(format_display_id).ok_or(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(display_id: Option<&str>) -> Okr {
        let mut okr = Okr::new("Objective");
        okr.display_id = display_id.map(str::to_string);
        okr
    }

    #[test]
    fn test_new_id_is_prefixed_and_unique() {
        let a = new_id("okr");
        let b = new_id("okr");
        assert!(a.starts_with("okr-"));
        assert_eq!(a.len(), 4 + 26);
        assert_ne!(a, b);
        assert_eq!(new_id("").len(), 26);
    }

    #[test]
    fn test_parse_display_id() {
        assert_eq!(parse_display_id("OKR-1"), Some(1));
        assert_eq!(parse_display_id("OKR-42"), Some(42));
        assert_eq!(parse_display_id("OKR-0"), None);
        assert_eq!(parse_display_id("OKR-"), None);
        assert_eq!(parse_display_id("OKR-3a"), None);
        assert_eq!(parse_display_id("okr-3"), None);
    }

    #[test]
    fn test_display_number_is_lenient() {
        assert_eq!(display_number("OKR-7"), Some(7));
        assert_eq!(display_number("Legacy OKR-12 (old)"), Some(12));
        assert_eq!(display_number("OKR-x OKR-5"), Some(5));
        assert_eq!(display_number("GOAL-3"), None);
    }

    #[test]
    fn test_assign_uses_max_plus_one_not_count() {
        let roots = vec![root(Some("OKR-1")), root(Some("OKR-3"))];
        assert_eq!(assign_display_id(&roots), Ok("OKR-4".to_string()));
    }

    #[test]
    fn test_assign_on_empty_or_unnumbered() {
        assert_eq!(assign_display_id(&[]), Ok("OKR-1".to_string()));
        let roots = vec![root(None), root(Some("not a label"))];
        assert_eq!(assign_display_id(&roots), Ok("OKR-1".to_string()));
    }

    #[test]
    fn test_deleting_highest_frees_its_number() {
        let mut roots = vec![root(Some("OKR-1")), root(Some("OKR-2")), root(Some("OKR-3"))];
        roots.remove(1);
        assert_eq!(assign_display_id(&roots), Ok("OKR-4".to_string()));
        roots.pop();
        assert_eq!(assign_display_id(&roots), Ok("OKR-2".to_string()));
    }

    #[test]
    fn test_assign_stops_at_largest_number() {
        let highest = format_display_id(u64::MAX);
        let last = root(Some(&highest));
        assert!(last.validate().is_ok());
        assert_eq!(assign_display_id([&last]), Err(u64::MAX));

        let below = root(Some("OKR-18446744073709551614"));
        assert_eq!(assign_display_id([&below]), Ok(highest));
    }
}
