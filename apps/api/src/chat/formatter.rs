//! Normalises provider replies into plain paragraphs.

/// Markdown emphasis characters removed from replies.
const MARKDOWN_CHARS: [char; 4] = ['*', '_', '~', '`'];

/// Strips emphasis characters, collapses whitespace runs, drops lines left
/// blank (including lines made only of markers) and rejoins the lines as
/// blank-line separated paragraphs.
pub fn format_response(raw: &str) -> String {
    raw.split('\n')
        .map(|line| line.replace(MARKDOWN_CHARS, ""))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
