//! Splitting of comma-separated clause strings.
//!
//! Select, from, group-by and order-by strings are split on top-level
//! commas, then each entry is matched against `<expr> [AS] <alias>` or
//! `<column> ASC|DESC`.

use super::order::SortDirection;

/// Splits `text` on commas that are outside parentheses and quotes.
///
/// Entries are trimmed; empty entries are dropped.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                push_entry(&mut entries, &text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_entry(&mut entries, &text[start..]);
    entries
}

fn push_entry(entries: &mut Vec<String>, entry: &str) {
    let entry = entry.trim();
    if !entry.is_empty() {
        entries.push(String::from(entry));
    }
}

const fn is_alias_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Splits `<expr> [AS] <alias>` into `(expr, alias)`.
///
/// The alias is the trailing run of word characters (`[A-Za-z0-9_.-]`)
/// after whitespace; a case-insensitive `AS` before it is dropped. Returns
/// `None` when the entry has no whitespace-separated trailing word.
pub(crate) fn split_alias(entry: &str) -> Option<(&str, &str)> {
    let entry = entry.trim();
    let alias_start = entry
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_alias_char(*c))
        .last()?
        .0;
    let head = &entry[..alias_start];
    if !head.ends_with(char::is_whitespace) {
        return None;
    }
    let alias = &entry[alias_start..];
    let stripped = head.trim_end();
    let len = stripped.len();
    let expr = if len > 2
        && stripped[len - 2..].eq_ignore_ascii_case("as")
        && stripped[..len - 2].ends_with(char::is_whitespace)
    {
        stripped[..len - 2].trim_end()
    } else {
        stripped
    };
    Some((expr, alias))
}

/// Splits `<column> ASC|DESC`. Entries without a direction sort ascending.
pub(crate) fn split_direction(entry: &str) -> (&str, SortDirection) {
    let entry = entry.trim();
    for (suffix, direction) in [("desc", SortDirection::Desc), ("asc", SortDirection::Asc)] {
        let len = entry.len();
        if len <= suffix.len() || !entry.is_char_boundary(len - suffix.len()) {
            continue;
        }
        let (head, tail) = entry.split_at(len - suffix.len());
        if tail.eq_ignore_ascii_case(suffix) && head.ends_with(char::is_whitespace) {
            return (head.trim_end(), direction);
        }
    }
    (entry, SortDirection::Asc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("id, name ,email"), ["id", "name", "email"]);
        assert_eq!(split_list(" a,, b ,"), ["a", "b"]);
        assert_eq!(
            split_list("COALESCE(a, b) AS c, 'x,y' AS d, e"),
            ["COALESCE(a, b) AS c", "'x,y' AS d", "e"]
        );
        assert!(split_list("   ").is_empty());
    }

    #[test]
    fn test_split_alias() {
        assert_eq!(split_alias("field1 as a"), Some(("field1", "a")));
        assert_eq!(split_alias("field 1 as b"), Some(("field 1", "b")));
        assert_eq!(split_alias("field1 AS a"), Some(("field1", "a")));
        assert_eq!(split_alias("t.id tid"), Some(("t.id", "tid")));
        assert_eq!(split_alias("COUNT(*) cnt"), Some(("COUNT(*)", "cnt")));
        assert_eq!(split_alias("as b"), Some(("as", "b")));
        assert_eq!(split_alias("id"), None);
        assert_eq!(split_alias("t.id"), None);
        assert_eq!(split_alias("COUNT(*)"), None);
    }

    #[test]
    fn test_split_direction() {
        assert_eq!(split_direction("name DESC"), ("name", SortDirection::Desc));
        assert_eq!(split_direction("name  asc"), ("name", SortDirection::Asc));
        assert_eq!(split_direction("created_at desc"), ("created_at", SortDirection::Desc));
        assert_eq!(split_direction("name"), ("name", SortDirection::Asc));
        assert_eq!(split_direction("desc"), ("desc", SortDirection::Asc));
        assert_eq!(split_direction("doc_desc"), ("doc_desc", SortDirection::Asc));
    }
}
