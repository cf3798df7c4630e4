//! Input sanitization for free-form user text.

/// Maximum number of characters kept by [`sanitize_input`].
pub const MAX_INPUT_CHARS: usize = 500;

/// Clean user-supplied text before it reaches command handlers.
///
/// Trims surrounding whitespace, keeps at most [`MAX_INPUT_CHARS`]
/// characters, then removes ASCII control characters and anything that looks
/// like an HTML tag (`<...>`).
///
/// # Example
/// ```
/// use abuse_guard::sanitize_input;
///
/// assert_eq!(sanitize_input("  <b>lunch</b> 25k\u{7}  "), "lunch 25k");
/// ```
pub fn sanitize_input(text: &str) -> String {
    let truncated: String = text.trim().chars().take(MAX_INPUT_CHARS).collect();

    let mut out = String::with_capacity(truncated.len());
    let mut pending_tag = String::new();
    let mut in_tag = false;

    for c in truncated.chars().filter(|c| !is_ascii_control(*c)) {
        if in_tag {
            pending_tag.push(c);
            if c == '>' {
                pending_tag.clear();
                in_tag = false;
            }
        } else if c == '<' {
            in_tag = true;
            pending_tag.push(c);
        } else {
            out.push(c);
        }
    }

    // An unterminated '<' is not a tag
    out.push_str(&pending_tag);
    out
}

fn is_ascii_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1F}' | '\u{7F}')
}
