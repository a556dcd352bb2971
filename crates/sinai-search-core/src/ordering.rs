//! Catalog ordering rules.
//!
//! Two comparators that a plain alphabetic sort cannot reproduce:
//!
//! - **Shelf marks** ([`compare_shelf_marks`], [`sort_by_shelf_mark`]) are
//!   parsed into language, new-find status, new-find type, number and an
//!   optional trailing letter, and compared field by field. Numbers compare
//!   by value, so `Arabic 9` sorts before `Arabic 10`.
//! - **Undertext objects** ([`compare_undertext_objects`]) sort by primary
//!   language, then author, then work, with present values ahead of absent
//!   ones at every key.
//!
//! # Shelf mark grammar
//!
//! ```text
//! <language>( NF( <type>)?)? <number>(<letter>)?
//! ```
//!
//! `<type>` is a fragment marker (`frg`, `frg.`, `Frg`, `Frg.`) or, for
//! Greek, `M` / `MG`. The pattern may appear anywhere in the string.
//!
//! # Example
//!
//! ```rust
//! use std::cmp::Ordering;
//! use sinai_search_core::ordering::compare_shelf_marks;
//!
//! assert_eq!(compare_shelf_marks("Arabic 9", "Arabic 10"), Ok(Ordering::Less));
//! assert_eq!(compare_shelf_marks("Syriac NF 3", "Syriac 40"), Ok(Ordering::Greater));
//! ```

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DataIntegrityError;
use crate::models::UndertextObject;

static SHELF_MARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<language>[a-zA-Z]+)(?: (?P<new_find>NF(?: (?P<new_find_type>[Ff]rg\.?|MG?))?))? (?P<number>[0-9]+)(?P<letter>[a-z])?",
    )
    .expect("shelf mark pattern is valid")
});

const GREEK: &str = "Greek";

/// The qualifier that may follow `NF` in a shelf mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewFindType {
    /// `frg.` and its spelling variants.
    Fragment,
    /// Greek `M`.
    M,
    /// Greek `MG`.
    Mg,
}

impl NewFindType {
    fn parse(raw: &str) -> Self {
        match raw {
            "M" => NewFindType::M,
            "MG" => NewFindType::Mg,
            _ => NewFindType::Fragment,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NewFindType::Fragment => "frg.",
            NewFindType::M => "M",
            NewFindType::Mg => "MG",
        }
    }
}

/// A parsed catalog shelf mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfMark {
    pub language: String,
    /// `None` for the old collection; `Some(type)` for new finds (`NF`).
    pub new_find: Option<Option<NewFindType>>,
    pub number: u64,
    pub letter: Option<char>,
}

impl FromStr for ShelfMark {
    type Err = DataIntegrityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unparseable = || DataIntegrityError::UnparseableShelfMark(raw.to_string());
        let caps = SHELF_MARK_PATTERN.captures(raw).ok_or_else(unparseable)?;

        let number = caps["number"].parse::<u64>().map_err(|_| unparseable())?;
        let new_find = caps
            .name("new_find")
            .map(|_| caps.name("new_find_type").map(|t| NewFindType::parse(t.as_str())));

        Ok(ShelfMark {
            language: caps["language"].to_string(),
            new_find,
            number,
            letter: caps.name("letter").and_then(|m| m.as_str().chars().next()),
        })
    }
}

impl ShelfMark {
    /// Compares two shelf marks.
    ///
    /// Fails when both are new finds of the same language with different
    /// types, unless the language is Greek and the types are `MG` and `M`.
    pub fn try_cmp(&self, other: &ShelfMark) -> Result<Ordering, DataIntegrityError> {
        let by_language = self.language.cmp(&other.language);
        if by_language != Ordering::Equal {
            return Ok(by_language);
        }

        match (&self.new_find, &other.new_find) {
            (None, Some(_)) => return Ok(Ordering::Less),
            (Some(_), None) => return Ok(Ordering::Greater),
            (Some(left), Some(right)) => {
                let by_type = compare_new_find_types(&self.language, *left, *right)?;
                if by_type != Ordering::Equal {
                    return Ok(by_type);
                }
            }
            (None, None) => {}
        }

        let by_number = self.number.cmp(&other.number);
        if by_number != Ordering::Equal {
            return Ok(by_number);
        }

        Ok(match (self.letter, other.letter) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (left, right) => left.cmp(&right),
        })
    }
}

fn compare_new_find_types(
    language: &str,
    left: Option<NewFindType>,
    right: Option<NewFindType>,
) -> Result<Ordering, DataIntegrityError> {
    match (left, right) {
        (None, None) => Ok(Ordering::Equal),
        (None, Some(_)) => Ok(Ordering::Less),
        (Some(_), None) => Ok(Ordering::Greater),
        (Some(l), Some(r)) if l == r => Ok(Ordering::Equal),
        (Some(NewFindType::Mg), Some(NewFindType::M)) if language == GREEK => Ok(Ordering::Less),
        (Some(NewFindType::M), Some(NewFindType::Mg)) if language == GREEK => Ok(Ordering::Greater),
        (Some(l), Some(r)) => Err(DataIntegrityError::ConflictingNewFindTypes {
            language: language.to_string(),
            left: l.as_str().to_string(),
            right: r.as_str().to_string(),
        }),
    }
}

/// Compares two raw shelf marks.
pub fn compare_shelf_marks(left: &str, right: &str) -> Result<Ordering, DataIntegrityError> {
    left.parse::<ShelfMark>()?.try_cmp(&right.parse::<ShelfMark>()?)
}

/// Stable-sorts `items` by the shelf mark returned from `key`.
///
/// Every shelf mark is parsed once, and the whole set is checked for
/// conflicting new-find types before sorting, so the sort itself always
/// sees a total order. On error `items` is left untouched.
pub fn sort_by_shelf_mark<T, F>(items: &mut Vec<T>, key: F) -> Result<(), DataIntegrityError>
where
    F: Fn(&T) -> &str,
{
    let marks = items
        .iter()
        .map(|item| key(item).parse::<ShelfMark>())
        .collect::<Result<Vec<_>, _>>()?;

    check_new_find_types(&marks)?;

    let mut keyed: Vec<(ShelfMark, T)> = marks.into_iter().zip(items.drain(..)).collect();
    keyed.sort_by(|(a, _), (b, _)| a.try_cmp(b).unwrap_or(Ordering::Equal));
    items.extend(keyed.into_iter().map(|(_, item)| item));
    Ok(())
}

/// Rejects a set of shelf marks in which two new finds of one language carry
/// types that cannot be ordered against each other.
fn check_new_find_types(marks: &[ShelfMark]) -> Result<(), DataIntegrityError> {
    let mut seen: Vec<(&str, NewFindType)> = Vec::new();
    for mark in marks {
        let Some(Some(kind)) = mark.new_find else {
            continue;
        };
        for &(language, other) in &seen {
            if language == mark.language {
                compare_new_find_types(language, Some(other), Some(kind))?;
            }
        }
        if !seen.contains(&(mark.language.as_str(), kind)) {
            seen.push((mark.language.as_str(), kind));
        }
    }
    Ok(())
}

/// Orders undertext objects by primary language, author, then work.
///
/// At each key a present value sorts before an absent one; two absent
/// values defer to the next key; two present values that differ decide the
/// order immediately.
pub fn compare_undertext_objects(left: &UndertextObject, right: &UndertextObject) -> Ordering {
    let keys = [
        (left.primary_language.as_deref(), right.primary_language.as_deref()),
        (left.author.as_deref(), right.author.as_deref()),
        (left.work.as_deref(), right.work.as_deref()),
    ];

    for key in keys {
        let ord = match key {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn cmp(a: &str, b: &str) -> Ordering {
        compare_shelf_marks(a, b).unwrap()
    }

    fn uto(language: Option<&str>, author: Option<&str>, work: Option<&str>) -> UndertextObject {
        UndertextObject {
            id: 0,
            manuscript_id: 0,
            author: author.map(String::from),
            work: work.map(String::from),
            genre: None,
            primary_language: language.map(String::from),
            script_name: None,
            script_characterization: None,
            script_date_text: None,
            script_date_start: None,
            script_date_end: None,
            place_of_origin: None,
            folios: Vec::new(),
            undertext_folio_order: None,
            folio_order_comments: None,
            scholar_names: Vec::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_acceptance_fixtures() {
        assert_eq!(cmp("Arabic 518", "Arabic 588"), Ordering::Less);
        assert_eq!(cmp("Arabic 588", "Arabic NF 8"), Ordering::Less);
        assert_eq!(cmp("Georgian NF 13", "Georgian NF frg. 68a"), Ordering::Less);
        assert_eq!(cmp("Greek NF MG 14", "Greek NF M 48"), Ordering::Less);
        assert_eq!(cmp("Arabic 518", "Arabic 518"), Ordering::Equal);
    }

    #[test]
    fn test_language_dominates() {
        assert_eq!(cmp("Arabic NF 99", "Georgian 1"), Ordering::Less);
        assert_eq!(cmp("Syriac 1", "Greek 900"), Ordering::Greater);
    }

    #[test]
    fn test_number_compares_by_value() {
        assert_eq!(cmp("Arabic 9", "Arabic 10"), Ordering::Less);
        assert_eq!(cmp("Arabic 100", "Arabic 20"), Ordering::Greater);
        assert_eq!(cmp("Arabic 007", "Arabic 7"), Ordering::Equal);
    }

    #[test]
    fn test_letter_suffix() {
        assert_eq!(cmp("Syriac 30", "Syriac 30a"), Ordering::Less);
        assert_eq!(cmp("Syriac 30b", "Syriac 30a"), Ordering::Greater);
        assert_eq!(cmp("Syriac 30b", "Syriac 31"), Ordering::Less);
    }

    #[test]
    fn test_fragment_spellings_are_one_type() {
        assert_eq!(cmp("Georgian NF frg. 2", "Georgian NF Frg 10"), Ordering::Less);
        assert_eq!(cmp("Georgian NF frg 5", "Georgian NF frg. 5"), Ordering::Equal);
    }

    #[test]
    fn test_greek_types_reversed_order() {
        assert_eq!(cmp("Greek NF M 48", "Greek NF MG 14"), Ordering::Greater);
        assert_eq!(cmp("Greek NF MG 1", "Greek NF MG 2"), Ordering::Less);
    }

    #[test]
    fn test_non_greek_conflicting_types_fail() {
        let err = compare_shelf_marks("Arabic NF frg. 1", "Arabic NF M 2").unwrap_err();
        assert!(matches!(
            err,
            DataIntegrityError::ConflictingNewFindTypes { ref language, .. } if language == "Arabic"
        ));
    }

    #[test]
    fn test_greek_fragment_against_m_fails() {
        assert!(compare_shelf_marks("Greek NF frg. 1", "Greek NF M 2").is_err());
        assert!(compare_shelf_marks("Greek NF M 2", "Greek NF frg. 1").is_err());
    }

    #[test]
    fn test_unparseable_shelf_mark() {
        assert_eq!(
            compare_shelf_marks("", "Arabic 1"),
            Err(DataIntegrityError::UnparseableShelfMark(String::new()))
        );
        assert!(compare_shelf_marks("Arabic", "Arabic 1").is_err());
    }

    #[test]
    fn test_pattern_found_inside_longer_text() {
        let mark: ShelfMark = "Sinai Arabic 514 (olim 4)".parse().unwrap();
        assert_eq!(mark.language, "Arabic");
        assert_eq!(mark.number, 514);
        assert_eq!(mark.new_find, None);
    }

    #[test]
    fn test_parse_new_find_with_type() {
        let mark: ShelfMark = "Georgian NF frg. 68a".parse().unwrap();
        assert_eq!(mark.new_find, Some(Some(NewFindType::Fragment)));
        assert_eq!(mark.number, 68);
        assert_eq!(mark.letter, Some('a'));
    }

    #[test]
    fn test_sort_by_shelf_mark() {
        let mut marks = vec![
            "Greek NF M 48",
            "Arabic NF 8",
            "Arabic 588",
            "Greek NF MG 14",
            "Arabic 518",
            "Georgian NF frg. 68a",
            "Georgian NF 13",
        ];
        sort_by_shelf_mark(&mut marks, |m| *m).unwrap();
        assert_eq!(
            marks,
            vec![
                "Arabic 518",
                "Arabic 588",
                "Arabic NF 8",
                "Georgian NF 13",
                "Georgian NF frg. 68a",
                "Greek NF MG 14",
                "Greek NF M 48",
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_marks() {
        let mut items = vec![("Arabic 1", 'x'), ("Arabic 01", 'y'), ("Arabic 1", 'z')];
        sort_by_shelf_mark(&mut items, |item| item.0).unwrap();
        let tags: Vec<char> = items.iter().map(|(_, t)| *t).collect();
        assert_eq!(tags, vec!['x', 'y', 'z']);
    }

    #[test]
    fn test_sort_rejects_conflicts_and_leaves_input() {
        let mut marks = vec!["Syriac NF M 2", "Arabic 1", "Syriac NF frg. 1"];
        let before = marks.clone();
        assert!(sort_by_shelf_mark(&mut marks, |m| *m).is_err());
        assert_eq!(marks, before);
    }

    #[test]
    fn test_sort_rejects_unparseable() {
        let mut marks = vec!["Arabic 1", "no number here"];
        assert_eq!(
            sort_by_shelf_mark(&mut marks, |m| *m),
            Err(DataIntegrityError::UnparseableShelfMark("no number here".into()))
        );
    }

    #[test]
    fn test_uto_present_before_absent() {
        let with_author = uto(Some("Arabic"), Some("Smith"), Some("A"));
        let without_author = uto(Some("Arabic"), None, Some("X"));
        let aramaic = uto(Some("Aramaic"), Some("Smith"), Some("A"));

        assert_eq!(compare_undertext_objects(&with_author, &without_author), Ordering::Less);
        assert_eq!(compare_undertext_objects(&without_author, &aramaic), Ordering::Less);
        assert_eq!(compare_undertext_objects(&aramaic, &with_author), Ordering::Greater);
    }

    #[test]
    fn test_uto_language_mismatch_skips_later_keys() {
        let a = uto(Some("Greek"), Some("Aaron"), Some("Zeta"));
        let b = uto(Some("Coptic"), Some("Zed"), Some("Alpha"));
        assert_eq!(compare_undertext_objects(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_uto_absent_on_both_sides_defers() {
        let a = uto(None, None, Some("Alpha"));
        let b = uto(None, None, Some("Beta"));
        assert_eq!(compare_undertext_objects(&a, &b), Ordering::Less);
        assert_eq!(compare_undertext_objects(&a, &a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_uto_missing_language_sorts_last() {
        let mut objects = vec![
            uto(None, Some("A"), Some("A")),
            uto(Some("Syriac"), None, None),
            uto(Some("Arabic"), Some("B"), None),
            uto(Some("Arabic"), Some("B"), Some("C")),
        ];
        objects.sort_by(compare_undertext_objects);
        let languages: Vec<Option<&str>> =
            objects.iter().map(|u| u.primary_language.as_deref()).collect();
        assert_eq!(languages, vec![Some("Arabic"), Some("Arabic"), Some("Syriac"), None]);
        assert_eq!(objects[0].work.as_deref(), Some("C"));
    }
}
