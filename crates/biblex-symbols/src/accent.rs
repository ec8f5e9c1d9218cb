//! LaTeX accent commands
//!
//! BibTeX values spell accented letters as TeX commands: `\'e`, `\"{o}`,
//! `{\c c}`, `\v{s}`. [`accented_char`] is the raw table from an accent
//! command character plus a base letter to the precomposed character;
//! [`resolve_accents`] rewrites a whole value with it.
//!
//! The lexer never calls into this module. Token text stays raw.

use std::borrow::Cow;

/// Accent commands written with a punctuation character: `\'e`
const SYMBOL_ACCENTS: &[char] = &['`', '\'', '^', '"', '~', '=', '.'];

/// Accent commands written with a letter: `\c{c}`, `\v s`
const LETTER_ACCENTS: &[char] = &['u', 'v', 'H', 'c', 'k', 'r', 'd', 'b'];

/// Precomposed character for `accent` applied to `base`
///
/// `accent` is the character after the backslash (`'` for `\'`, `v` for
/// `\v`). Returns `None` for combinations with no precomposed form.
pub fn accented_char(accent: char, base: char) -> Option<char> {
    let ch = match (accent, base) {
        // Grave
        ('`', 'A') => 'À',
        ('`', 'E') => 'È',
        ('`', 'I') => 'Ì',
        ('`', 'O') => 'Ò',
        ('`', 'U') => 'Ù',
        ('`', 'a') => 'à',
        ('`', 'e') => 'è',
        ('`', 'i') => 'ì',
        ('`', 'o') => 'ò',
        ('`', 'u') => 'ù',

        // Acute
        ('\'', 'A') => 'Á',
        ('\'', 'C') => 'Ć',
        ('\'', 'E') => 'É',
        ('\'', 'I') => 'Í',
        ('\'', 'N') => 'Ń',
        ('\'', 'O') => 'Ó',
        ('\'', 'S') => 'Ś',
        ('\'', 'U') => 'Ú',
        ('\'', 'Y') => 'Ý',
        ('\'', 'Z') => 'Ź',
        ('\'', 'a') => 'á',
        ('\'', 'c') => 'ć',
        ('\'', 'e') => 'é',
        ('\'', 'i') => 'í',
        ('\'', 'n') => 'ń',
        ('\'', 'o') => 'ó',
        ('\'', 's') => 'ś',
        ('\'', 'u') => 'ú',
        ('\'', 'y') => 'ý',
        ('\'', 'z') => 'ź',

        // Circumflex
        ('^', 'A') => 'Â',
        ('^', 'E') => 'Ê',
        ('^', 'I') => 'Î',
        ('^', 'O') => 'Ô',
        ('^', 'U') => 'Û',
        ('^', 'a') => 'â',
        ('^', 'e') => 'ê',
        ('^', 'i') => 'î',
        ('^', 'o') => 'ô',
        ('^', 'u') => 'û',

        // Umlaut
        ('"', 'A') => 'Ä',
        ('"', 'E') => 'Ë',
        ('"', 'I') => 'Ï',
        ('"', 'O') => 'Ö',
        ('"', 'U') => 'Ü',
        ('"', 'Y') => 'Ÿ',
        ('"', 'a') => 'ä',
        ('"', 'e') => 'ë',
        ('"', 'i') => 'ï',
        ('"', 'o') => 'ö',
        ('"', 'u') => 'ü',
        ('"', 'y') => 'ÿ',

        // Tilde
        ('~', 'A') => 'Ã',
        ('~', 'N') => 'Ñ',
        ('~', 'O') => 'Õ',
        ('~', 'a') => 'ã',
        ('~', 'n') => 'ñ',
        ('~', 'o') => 'õ',

        // Macron
        ('=', 'A') => 'Ā',
        ('=', 'E') => 'Ē',
        ('=', 'I') => 'Ī',
        ('=', 'O') => 'Ō',
        ('=', 'U') => 'Ū',
        ('=', 'a') => 'ā',
        ('=', 'e') => 'ē',
        ('=', 'i') => 'ī',
        ('=', 'o') => 'ō',
        ('=', 'u') => 'ū',

        // Dot above
        ('.', 'C') => 'Ċ',
        ('.', 'E') => 'Ė',
        ('.', 'I') => 'İ',
        ('.', 'Z') => 'Ż',
        ('.', 'c') => 'ċ',
        ('.', 'e') => 'ė',
        ('.', 'z') => 'ż',

        // Breve
        ('u', 'A') => 'Ă',
        ('u', 'G') => 'Ğ',
        ('u', 'U') => 'Ŭ',
        ('u', 'a') => 'ă',
        ('u', 'g') => 'ğ',
        ('u', 'u') => 'ŭ',

        // Caron
        ('v', 'C') => 'Č',
        ('v', 'D') => 'Ď',
        ('v', 'E') => 'Ě',
        ('v', 'N') => 'Ň',
        ('v', 'R') => 'Ř',
        ('v', 'S') => 'Š',
        ('v', 'T') => 'Ť',
        ('v', 'Z') => 'Ž',
        ('v', 'c') => 'č',
        ('v', 'd') => 'ď',
        ('v', 'e') => 'ě',
        ('v', 'n') => 'ň',
        ('v', 'r') => 'ř',
        ('v', 's') => 'š',
        ('v', 't') => 'ť',
        ('v', 'z') => 'ž',

        // Double acute
        ('H', 'O') => 'Ő',
        ('H', 'U') => 'Ű',
        ('H', 'o') => 'ő',
        ('H', 'u') => 'ű',

        // Cedilla
        ('c', 'C') => 'Ç',
        ('c', 'S') => 'Ş',
        ('c', 'c') => 'ç',
        ('c', 's') => 'ş',

        // Ogonek
        ('k', 'A') => 'Ą',
        ('k', 'E') => 'Ę',
        ('k', 'a') => 'ą',
        ('k', 'e') => 'ę',

        // Ring
        ('r', 'A') => 'Å',
        ('r', 'U') => 'Ů',
        ('r', 'a') => 'å',
        ('r', 'u') => 'ů',

        // Dot below
        ('d', 'S') => 'Ṣ',
        ('d', 's') => 'ṣ',

        // Bar below
        ('b', 'T') => 'Ṯ',
        ('b', 't') => 'ṯ',

        _ => return None,
    };

    Some(ch)
}

/// Character for a symbol command such as `\ss` or `\o`
pub fn special_symbol(name: &str) -> Option<char> {
    let ch = match name {
        "ss" => 'ß',
        "o" => 'ø',
        "O" => 'Ø',
        "ae" => 'æ',
        "AE" => 'Æ',
        "oe" => 'œ',
        "OE" => 'Œ',
        "aa" => 'å',
        "AA" => 'Å',
        "l" => 'ł',
        "L" => 'Ł',
        "i" => 'ı',
        "j" => 'ȷ',
        _ => return None,
    };

    Some(ch)
}

/// Rewrites every recognised accent command in `text`
///
/// Handles `\'e`, `\'{e}`, `\'{\i}`, `{\'e}`, `\c c`, `\ss`, `\ss{}` and
/// `{\ss}`. Anything else, including accents without a precomposed form,
/// is copied unchanged.
pub fn resolve_accents(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while let Some(ch) = text[i..].chars().next() {
        let tail = &text[i..];

        // `{\'e}`: the group exists only to hold the command
        if ch == '{' {
            if let Some((resolved, len)) = parse_command(&tail[1..]) {
                if tail[1 + len..].starts_with('}') {
                    out.push(resolved);
                    i += len + 2;
                    continue;
                }
            }
        } else if ch == '\\' {
            if let Some((resolved, len)) = parse_command(tail) {
                out.push(resolved);
                i += len;
                continue;
            }
        }

        out.push(ch);
        i += ch.len_utf8();
    }

    Cow::Owned(out)
}

/// Parses one command at the start of `s`, returning the character it
/// stands for and the number of bytes it spans
fn parse_command(s: &str) -> Option<(char, usize)> {
    let rest = s.strip_prefix('\\')?;
    let first = rest.chars().next()?;

    if SYMBOL_ACCENTS.contains(&first) {
        let (base, len) = parse_argument(&rest[1..], false)?;
        return Some((accented_char(first, base)?, 2 + len));
    }

    let name_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let after = &rest[name_len..];

    if name.len() == 1 && LETTER_ACCENTS.contains(&first) {
        if let Some((base, len)) = parse_argument(after, true) {
            return Some((accented_char(first, base)?, 2 + len));
        }
    }

    let symbol = special_symbol(name)?;
    let trailing = if after.starts_with("{}") {
        2
    } else if after.starts_with(' ') {
        1
    } else {
        0
    };

    Some((symbol, 1 + name_len + trailing))
}

/// Parses the base letter of an accent: `e`, `{e}`, `\i` or `{\i}`
fn parse_argument(s: &str, allow_space: bool) -> Option<(char, usize)> {
    if let Some(inner) = s.strip_prefix('{') {
        if let Some(base) = dotless(inner) {
            return inner[2..].starts_with('}').then_some((base, 4));
        }
        let base = inner.chars().next().filter(|c| c.is_alphabetic())?;
        let len = base.len_utf8();
        return inner[len..].starts_with('}').then_some((base, len + 2));
    }

    if let Some(base) = dotless(s) {
        return Some((base, 2));
    }

    let spaces = if allow_space {
        s.len() - s.trim_start_matches(' ').len()
    } else {
        0
    };
    let base = s[spaces..].chars().next().filter(|c| c.is_ascii_alphabetic())?;
    if allow_space && spaces == 0 {
        // `\cc` is a different command name, not `\c c`
        return None;
    }

    Some((base, spaces + 1))
}

/// `\i` and `\j` used as accent bases stand for plain `i` and `j`
fn dotless(s: &str) -> Option<char> {
    let base = match s.get(..2)? {
        "\\i" => 'i',
        "\\j" => 'j',
        _ => return None,
    };
    let followed_by_letter = s[2..].chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    (!followed_by_letter).then_some(base)
}
