//! Token splitting.

/// Split `s` on any of the `separators`, dropping empty tokens.
///
/// With `max_items > 0` the result holds at most that many tokens and the
/// last one keeps the unsplit remainder of the input. `max_items == 0`
/// means no limit.
///
/// ```
/// use slirc_proto::explode;
///
/// assert_eq!(explode("a  b c", " ", 0), vec!["a", "b", "c"]);
/// assert_eq!(explode("a b c d", " ", 2), vec!["a", "b c d"]);
/// ```
pub fn explode<'a>(s: &'a str, separators: &str, max_items: usize) -> Vec<&'a str> {
    let is_sep = |c: char| separators.contains(c);
    let mut items = Vec::new();
    let mut rest = s.trim_start_matches(is_sep);

    while !rest.is_empty() {
        if max_items > 0 && items.len() + 1 == max_items {
            items.push(rest);
            break;
        }
        let end = rest.find(is_sep).unwrap_or(rest.len());
        items.push(&rest[..end]);
        rest = rest[end..].trim_start_matches(is_sep);
    }

    items
}

/// Split off the first space-delimited word; the rest has leading spaces
/// removed and is `None` when empty.
pub fn split_first_word(s: &str) -> (&str, Option<&str>) {
    let s = s.trim_start_matches(' ');
    match s.split_once(' ') {
        Some((word, rest)) => {
            let rest = rest.trim_start_matches(' ');
            (word, (!rest.is_empty()).then_some(rest))
        }
        None => (s, None),
    }
}
