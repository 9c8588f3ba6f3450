//! Document titles derived from file names.

/// Build a display title from a Markdown file name.
///
/// Strips the `.md` extension, turns `_`, `-` and `.` into spaces and
/// uppercases the first letter of every word. Falls back to the file name
/// itself when nothing printable is left.
///
/// # Examples
///
/// ```
/// use mdserve_document::title_from_filename;
///
/// assert_eq!(title_from_filename("getting-started.md"), "Getting Started");
/// assert_eq!(title_from_filename("v1.2_notes.md"), "V1 2 Notes");
/// assert_eq!(title_from_filename(".md"), ".md");
/// ```
pub fn title_from_filename(name: &str) -> String {
    let stem = strip_md_extension(name);
    let mut title = String::with_capacity(stem.len());
    let mut at_word_start = true;

    for c in stem.chars() {
        let c = if matches!(c, '_' | '-' | '.') { ' ' } else { c };
        if at_word_start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        at_word_start = is_word_separator(c);
    }

    if title.trim().is_empty() {
        return name.to_owned();
    }
    title
}

fn strip_md_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(3);
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".md") => stem,
        _ => name,
    }
}

/// Letters, digits and underscores continue a word; everything else ends it.
fn is_word_separator(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_')
}
