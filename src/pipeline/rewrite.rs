//! Forward-pass rewriting helpers shared by the text stages.
//!
//! Every rewrite in the pipeline walks the ordered, non-overlapping matches of
//! one regex and builds a fresh output buffer. The infallible case is
//! [`regex::Regex::replace_all`]; [`try_replace_all`] is the same walk for
//! replacements that can fail (a missing sample file, an unknown label).

use regex::{Captures, Regex};

/// Replace every match of `re` with the result of `replacer`, stopping at
/// the first error.
///
/// Text between matches is copied unchanged. Matches are visited in
/// ascending position, so stateful replacers (counters) see document order.
pub fn try_replace_all<E>(
    re: &Regex,
    text: &str,
    mut replacer: impl FnMut(&Captures<'_>) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacer(&caps)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_in_order() {
        let re = Regex::new(r"x").unwrap();
        let mut n = 0;
        let out: Result<String, ()> = try_replace_all(&re, "axbxc", |_| {
            n += 1;
            Ok(n.to_string())
        });
        assert_eq!(out.unwrap(), "a1b2c");
    }

    #[test]
    fn duplicate_text_is_replaced_per_occurrence() {
        // Whole-string substitution would rewrite both "foo"s on the first match.
        let re = Regex::new(r"\[(foo)\]").unwrap();
        let mut n = 0;
        let out: Result<String, ()> = try_replace_all(&re, "[foo] foo [foo]", |caps| {
            n += 1;
            Ok(format!("{}{}", &caps[1], n))
        });
        assert_eq!(out.unwrap(), "foo1 foo foo2");
    }

    #[test]
    fn first_error_aborts() {
        let re = Regex::new(r"\d").unwrap();
        let out = try_replace_all(&re, "1 2 3", |caps| {
            if &caps[0] == "2" {
                Err("two")
            } else {
                Ok(String::new())
            }
        });
        assert_eq!(out, Err("two"));
    }

    #[test]
    fn no_match_is_identity() {
        let re = Regex::new(r"zzz").unwrap();
        let out: Result<String, ()> = try_replace_all(&re, "hello", |_| Ok(String::new()));
        assert_eq!(out.unwrap(), "hello");
    }
}
