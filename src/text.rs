//! Text utilities
//!
//! Widths are counted in chars; every fixture and upload is expected to be
//! made of single-column characters.

/// Wrap text to a maximum width on word boundaries, preserving line breaks.
/// Words longer than the width are split.
#[must_use]
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw_line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len <= max_width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            let mut pieces = split_chars(word, max_width);
            if let Some(last) = pieces.pop() {
                lines.extend(pieces);
                current_len = last.chars().count();
                current = last;
            }
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}

/// Hard-wrap every line at `max_width` chars, keeping whitespace as is.
#[must_use]
pub fn wrap_text_preserve(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return Vec::new();
    }

    text.split('\n')
        .flat_map(|raw_line| {
            if raw_line.is_empty() {
                vec![String::new()]
            } else {
                split_chars(raw_line, max_width)
            }
        })
        .collect()
}

/// Cut `text` to at most `max_width` chars, ending in `…` when shortened.
#[must_use]
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn split_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
