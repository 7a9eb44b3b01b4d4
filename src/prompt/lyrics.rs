// Lyrics - Structure-tag formatting for the renderer's lyrics block

/// Tag sent when there are no lyrics
pub const INSTRUMENTAL_TAG: &str = "[instrumental]";

const LINES_PER_BLOCK: usize = 4;

/// Format free text into tagged verse/chorus blocks
///
/// Empty input becomes `[instrumental]` and text that already carries
/// `[...]` tags passes through untouched. Otherwise the text opens with
/// `[Verse 1]` and every four lines a new block starts, alternating
/// `[Chorus]` and `[Verse n]`. No block is opened after the final line.
pub fn format_lyrics(text: &str) -> String {
    if text.trim().is_empty() {
        return INSTRUMENTAL_TAG.to_string();
    }

    if text.contains('[') && text.contains(']') {
        return text.to_string();
    }

    let lines: Vec<&str> = text.trim().lines().collect();
    let last = lines.last().map(|l| l.trim()).unwrap_or_default();

    let mut formatted = String::from("[Verse 1]\n");
    let mut block_count = 1;
    let mut line_count = 0;

    for line in &lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        formatted.push_str(line);
        formatted.push('\n');
        line_count += 1;

        if line_count >= LINES_PER_BLOCK && line != last {
            block_count += 1;
            if block_count % 2 == 0 {
                formatted.push_str("\n[Chorus]\n");
            } else {
                formatted.push_str(&format!("\n[Verse {}]\n", (block_count + 1) / 2));
            }
            line_count = 0;
        }
    }

    formatted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_instrumental() {
        assert_eq!(format_lyrics(""), "[instrumental]");
        assert_eq!(format_lyrics("  \n\t "), "[instrumental]");
    }

    #[test]
    fn test_tagged_text_passes_through() {
        let text = "[Chorus]\nTe quiero\n";
        assert_eq!(format_lyrics(text), text);
    }

    #[test]
    fn test_short_text_is_one_verse() {
        assert_eq!(
            format_lyrics("uno\n\ndos\ntres"),
            "[Verse 1]\nuno\ndos\ntres"
        );
    }

    #[test]
    fn test_blocks_alternate_chorus_and_verse() {
        let text = (1..=10)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n");

        let formatted = format_lyrics(&text);
        let tags: Vec<&str> = formatted.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(tags, vec!["[Verse 1]", "[Chorus]", "[Verse 2]"]);
        assert!(formatted.ends_with("line 10"));
    }

    #[test]
    fn test_no_trailing_tag_after_last_line() {
        let text = "a\nb\nc\nd";
        assert_eq!(format_lyrics(text), "[Verse 1]\na\nb\nc\nd");
    }
}
