//! biblex-symbols - Lookup tables for BibTeX values
//!
//! Pure functions used after tokenizing, when values are formatted or
//! summarised: LaTeX accent resolution, entry type classification and
//! month names. Nothing here runs inside the lexer.
//!
//! # Example
//!
//! ```rust
//! use biblex_symbols::{resolve_accents, EntryClass};
//!
//! assert_eq!(resolve_accents(r"Erd\H{o}s"), "Erdős");
//! assert_eq!(EntryClass::from_entry_type("InProceedings"), EntryClass::InProceedings);
//! ```

pub mod accent;
pub mod classify;

pub use accent::{accented_char, resolve_accents, special_symbol};
pub use classify::{is_person_field, is_special_entry_type, parse_month, EntryClass};
