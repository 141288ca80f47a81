//! core::naming
//!
//! Perforce filename escaping.
//!
//! `p4` treats `@`, `#`, `*` and `%` in file arguments as revision
//! specifiers, wildcards, or escapes. Literal filenames containing them
//! must use the ASCII hex form Perforce expects.

/// Escape Perforce special characters in a file path.
///
/// # Example
///
/// ```
/// use p4session::core::naming::sanitize_filepath;
///
/// assert_eq!(sanitize_filepath("foo@foo.js"), "foo%40foo.js");
/// assert_eq!(sanitize_filepath("100%#1*"), "100%25%231%2A");
/// ```
pub fn sanitize_filepath(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '@' => out.push_str("%40"),
            '#' => out.push_str("%23"),
            '*' => out.push_str("%2A"),
            '%' => out.push_str("%25"),
            other => out.push(other),
        }
    }
    out
}
