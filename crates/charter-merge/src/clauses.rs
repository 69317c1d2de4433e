//! Splitting negotiated clause text into individual clauses

use once_cell::sync::Lazy;
use regex::Regex;

/// A newline followed by a clause number such as `12.`
static CLAUSE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[0-9]+\.").expect("valid clause regex"));

/// Split clause text at every newline that is followed by digits and a
/// period.
///
/// The separating newline (and a `\r` before it) is dropped, so every clause
/// after the first starts with its numeral. When the text was split, the last
/// clause also loses one trailing line ending. Numbers are not validated; text
/// without numbering comes back as a single element equal to the input.
pub fn split_clauses(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut start = 0;

    for boundary in CLAUSE_BOUNDARY.find_iter(text) {
        let newline = boundary.start();
        if newline > 0 {
            let clause = &text[start..newline];
            clauses.push(clause.strip_suffix('\r').unwrap_or(clause).to_string());
        }
        start = newline + 1;
    }

    let last = &text[start..];
    if start > 0 {
        let last = last.strip_suffix('\n').unwrap_or(last);
        clauses.push(last.strip_suffix('\r').unwrap_or(last).to_string());
    } else {
        clauses.push(last.to_string());
    }
    clauses
}
