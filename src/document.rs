use crate::error::Result;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Printable area of one page, measured in character cells. The defaults
/// approximate an A4 sheet set in a 12pt monospace-ish body with the
/// usual margins.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    /// Characters per line.
    pub width: usize,
    /// Lines per page.
    pub height: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 86,
            height: 27,
        }
    }
}

/// One page of laid-out transcript text. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUnit {
    pub index: usize,
    pub text: String,
}

/// Lay a transcript out into fixed-size pages.
///
/// Words are packed greedily onto the current line until one more would
/// exceed the width, then a new line starts. Words longer than a whole
/// line are hard-split. Newlines in the input always force a line break.
/// When the page is full a new page starts. Every word of the input lands
/// on exactly one page, in order; an empty transcript still yields one
/// empty page so downstream stages have something to work on.
pub fn paginate(text: &str, geometry: &PageGeometry) -> Vec<PageUnit> {
    let mut lines: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let mut word = word;

            // Hard-split words wider than a whole line
            while word.chars().count() > geometry.width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let split_at = word
                    .char_indices()
                    .nth(geometry.width)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                lines.push(word[..split_at].to_string());
                word = &word[split_at..];
            }
            if word.is_empty() {
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
            } else if current.chars().count() + 1 + word.chars().count() <= geometry.width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        return vec![PageUnit {
            index: 1,
            text: String::new(),
        }];
    }

    lines
        .chunks(geometry.height)
        .enumerate()
        .map(|(i, page_lines)| PageUnit {
            index: i + 1,
            text: page_lines.join("\n"),
        })
        .collect()
}

/// Persist each page as `page_<index>.txt` inside `dir`.
pub async fn write_pages(pages: &[PageUnit], dir: &Path) -> Result<()> {
    for page in pages {
        let path = dir.join(format!("page_{}.txt", page.index));
        fs::write(&path, &page.text).await?;
    }
    debug!("Wrote {} pages to {}", pages.len(), dir.display());
    Ok(())
}
