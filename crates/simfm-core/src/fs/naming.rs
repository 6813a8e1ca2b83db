//! Sibling-name collision resolution and name helpers.
//!
//! Both backends create objects through [`resolve_collision`], so a paste
//! or a new folder never overwrites an existing sibling. The resolver is a
//! pure function over the set of names already taken in the destination.

use std::collections::HashSet;

use crate::fs::object::ObjectKind;

/// Returns the first free name for an object proposed as `proposed`.
///
/// If `proposed` is not in `taken` it is returned unchanged. Otherwise a
/// parenthesized counter is attached: when the current candidate already
/// ends in `(n)` and differs from `original`, `n` is incremented; in every
/// other case `(1)` is appended. For files the counter goes before the
/// extension (`report(1).txt`), for folders at the end (`data(1)`).
///
/// The search only moves forward from the candidate it is looking at. With
/// `a` and `a(1)` taken it yields `a(2)`, but with `a`, `a(1)` and `a(3)`
/// taken it still yields `a(2)`; a free `a(2)` is never skipped, and a free
/// lower slot behind an occupied one is never revisited either.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use simfm_core::fs::naming::resolve_collision;
/// use simfm_core::fs::object::ObjectKind;
///
/// let taken: HashSet<String> = ["report.txt".to_string()].into();
/// let name = resolve_collision(&taken, "report.txt", "report.txt", ObjectKind::File);
/// assert_eq!(name, "report(1).txt");
/// ```
pub fn resolve_collision(
    taken: &HashSet<String>,
    proposed: &str,
    original: &str,
    kind: ObjectKind,
) -> String {
    let (stem, ext) = match kind {
        ObjectKind::File => split_extension(proposed),
        ObjectKind::Folder => (proposed, ""),
    };
    let original_stem = match kind {
        ObjectKind::File => split_extension(original).0,
        ObjectKind::Folder => original,
    };

    let mut stem = stem.to_string();
    loop {
        let candidate = format!("{stem}{ext}");
        if !taken.contains(&candidate) {
            return candidate;
        }

        let counter = if stem != original_stem {
            counter_suffix(&stem)
        } else {
            None
        };
        stem = match counter {
            Some((base, n)) => match n.checked_add(1) {
                Some(next) => format!("{base}({next})"),
                None => format!("{stem}(1)"),
            },
            None => format!("{stem}(1)"),
        };
    }
}

/// Splits `name` into stem and extension (the extension keeps its dot).
///
/// A dot in the first position does not start an extension, so `.bashrc`
/// has none. Names without a dot have an empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Parses a trailing `(n)` counter, returning the text before it and `n`.
fn counter_suffix(stem: &str) -> Option<(&str, u64)> {
    let inner = stem.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n = digits.parse().ok()?;
    Some((&inner[..open], n))
}

/// Returns `true` if `name` can be used as a single path component.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\0') {
        return false;
    }
    #[cfg(windows)]
    if name.contains('\\') || name.contains(':') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn free_name_is_accepted() {
        let taken = names(&["other.txt"]);
        assert_eq!(
            resolve_collision(&taken, "report.txt", "report.txt", ObjectKind::File),
            "report.txt"
        );
    }

    #[test]
    fn first_collision_appends_one_before_extension() {
        let taken = names(&["report.txt"]);
        assert_eq!(
            resolve_collision(&taken, "report.txt", "report.txt", ObjectKind::File),
            "report(1).txt"
        );
    }

    #[test]
    fn repeated_collisions_increment_counter() {
        let taken = names(&["report.txt", "report(1).txt"]);
        assert_eq!(
            resolve_collision(&taken, "report.txt", "report.txt", ObjectKind::File),
            "report(2).txt"
        );
    }

    #[test]
    fn folder_counter_goes_at_end() {
        let taken = names(&["data"]);
        assert_eq!(
            resolve_collision(&taken, "data", "data", ObjectKind::Folder),
            "data(1)"
        );

        let taken = names(&["data", "data(1)", "data(2)"]);
        assert_eq!(
            resolve_collision(&taken, "data", "data", ObjectKind::Folder),
            "data(3)"
        );
    }

    #[test]
    fn folder_with_dot_keeps_whole_name_as_stem() {
        let taken = names(&["v1.2"]);
        assert_eq!(
            resolve_collision(&taken, "v1.2", "v1.2", ObjectKind::Folder),
            "v1.2(1)"
        );
    }

    #[test]
    fn never_looks_backward_for_lower_slots() {
        let taken = names(&["a", "a(1)", "a(3)"]);
        assert_eq!(resolve_collision(&taken, "a", "a", ObjectKind::Folder), "a(2)");

        let taken = names(&["a", "a(1)", "a(2)", "a(3)"]);
        assert_eq!(resolve_collision(&taken, "a", "a", ObjectKind::Folder), "a(4)");
    }

    #[test]
    fn original_with_counter_gets_fresh_counter() {
        // The source itself is called "copy(3)": its counter is part of the name.
        let taken = names(&["copy(3).txt"]);
        assert_eq!(
            resolve_collision(&taken, "copy(3).txt", "copy(3).txt", ObjectKind::File),
            "copy(3)(1).txt"
        );

        let taken = names(&["copy(3).txt", "copy(3)(1).txt"]);
        assert_eq!(
            resolve_collision(&taken, "copy(3).txt", "copy(3).txt", ObjectKind::File),
            "copy(3)(2).txt"
        );
    }

    #[test]
    fn proposed_counter_is_incremented_when_differing_from_original() {
        let taken = names(&["notes(4).md"]);
        assert_eq!(
            resolve_collision(&taken, "notes(4).md", "notes.md", ObjectKind::File),
            "notes(5).md"
        );
    }

    #[test]
    fn non_numeric_counter_appends_one() {
        let taken = names(&["x(abc)"]);
        assert_eq!(
            resolve_collision(&taken, "x(abc)", "x", ObjectKind::Folder),
            "x(abc)(1)"
        );

        let taken = names(&["x()"]);
        assert_eq!(resolve_collision(&taken, "x()", "x", ObjectKind::Folder), "x()(1)");
    }

    #[test]
    fn overflowing_counter_appends_one() {
        let huge = format!("n({})", u64::MAX);
        let taken: HashSet<String> = [huge.clone()].into();
        assert_eq!(
            resolve_collision(&taken, &huge, "n", ObjectKind::Folder),
            format!("{huge}(1)")
        );
    }

    #[test]
    fn result_is_never_taken() {
        let taken = names(&[
            "a", "a(1)", "a(2)", "b.txt", "b(1).txt", ".env", ".env(1)", "c(1)", "c(1)(1)",
            "d.tar.gz", "d.tar(1).gz",
        ]);
        for name in [
            "a", "a(1)", "b.txt", "b(1).txt", ".env", "c(1)", "d.tar.gz", "fresh", "",
        ] {
            for kind in [ObjectKind::File, ObjectKind::Folder] {
                let resolved = resolve_collision(&taken, name, name, kind);
                assert!(
                    !taken.contains(&resolved),
                    "{name:?} ({kind:?}) resolved to taken name {resolved:?}"
                );
            }
        }
    }

    #[test]
    fn hidden_file_has_no_extension() {
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        let taken = names(&[".bashrc"]);
        assert_eq!(
            resolve_collision(&taken, ".bashrc", ".bashrc", ObjectKind::File),
            ".bashrc(1)"
        );
    }

    #[test]
    fn split_extension_uses_last_dot() {
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn counter_suffix_parses_trailing_counter() {
        assert_eq!(counter_suffix("a(12)"), Some(("a", 12)));
        assert_eq!(counter_suffix("a(1)(2)"), Some(("a(1)", 2)));
        assert_eq!(counter_suffix("a(b)"), None);
        assert_eq!(counter_suffix("a)"), None);
        assert_eq!(counter_suffix("a"), None);
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("report.txt"));
        assert!(is_valid_name("데이터"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("nul\0byte"));
    }
}
