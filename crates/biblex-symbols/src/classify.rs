//! Classification of entry types and field values

use std::fmt;

/// Bibliographic class of an entry, derived from its `@type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryClass {
    Article,
    Book,
    Booklet,
    Conference,
    Electronic,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    Other,
    Patent,
    Periodical,
    PhdThesis,
    Proceedings,
    Standard,
    TechReport,
    Unpublished,
}

impl EntryClass {
    pub const ALL: [EntryClass; 19] = [
        EntryClass::Article,
        EntryClass::Book,
        EntryClass::Booklet,
        EntryClass::Conference,
        EntryClass::Electronic,
        EntryClass::InBook,
        EntryClass::InCollection,
        EntryClass::InProceedings,
        EntryClass::Manual,
        EntryClass::MastersThesis,
        EntryClass::Misc,
        EntryClass::Other,
        EntryClass::Patent,
        EntryClass::Periodical,
        EntryClass::PhdThesis,
        EntryClass::Proceedings,
        EntryClass::Standard,
        EntryClass::TechReport,
        EntryClass::Unpublished,
    ];

    /// Classifies an entry type name, ignoring case
    ///
    /// Unknown types are `Misc`.
    pub fn from_entry_type(entry_type: &str) -> Self {
        match entry_type.to_ascii_lowercase().as_str() {
            "article" => EntryClass::Article,
            "book" => EntryClass::Book,
            "booklet" => EntryClass::Booklet,
            "conference" => EntryClass::Conference,
            "electronic" => EntryClass::Electronic,
            "inbook" => EntryClass::InBook,
            "incollection" => EntryClass::InCollection,
            "inproceedings" => EntryClass::InProceedings,
            "manual" => EntryClass::Manual,
            "mastersthesis" => EntryClass::MastersThesis,
            "other" => EntryClass::Other,
            "patent" => EntryClass::Patent,
            "periodical" => EntryClass::Periodical,
            "phdthesis" => EntryClass::PhdThesis,
            "proceedings" => EntryClass::Proceedings,
            "standard" => EntryClass::Standard,
            "techreport" => EntryClass::TechReport,
            "unpublished" => EntryClass::Unpublished,
            _ => EntryClass::Misc,
        }
    }

    /// Canonical lowercase type name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryClass::Article => "article",
            EntryClass::Book => "book",
            EntryClass::Booklet => "booklet",
            EntryClass::Conference => "conference",
            EntryClass::Electronic => "electronic",
            EntryClass::InBook => "inbook",
            EntryClass::InCollection => "incollection",
            EntryClass::InProceedings => "inproceedings",
            EntryClass::Manual => "manual",
            EntryClass::MastersThesis => "mastersthesis",
            EntryClass::Misc => "misc",
            EntryClass::Other => "other",
            EntryClass::Patent => "patent",
            EntryClass::Periodical => "periodical",
            EntryClass::PhdThesis => "phdthesis",
            EntryClass::Proceedings => "proceedings",
            EntryClass::Standard => "standard",
            EntryClass::TechReport => "techreport",
            EntryClass::Unpublished => "unpublished",
        }
    }
}

impl fmt::Display for EntryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `@string`, `@preamble` and `@comment` are not bibliography entries
pub fn is_special_entry_type(entry_type: &str) -> bool {
    ["string", "preamble", "comment"]
        .iter()
        .any(|t| entry_type.eq_ignore_ascii_case(t))
}

/// Month number (1-12) for a BibTeX month value
///
/// Accepts three-letter abbreviations and full English names in any case,
/// plus the `februay` misspelling found in older databases.
pub fn parse_month(text: &str) -> Option<u8> {
    let month = match text.trim().to_ascii_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" | "februay" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };

    Some(month)
}

/// Fields whose value is a list of person names
pub fn is_person_field(name: &str) -> bool {
    name.eq_ignore_ascii_case("author") || name.eq_ignore_ascii_case("editor")
}
