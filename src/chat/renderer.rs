use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

// Decorations dropped from heading text
const HEADING_DECORATIONS: &[&str] = &["🍲", "🛒", "👩‍🍳", "🥗", "✨"];

// Emoji that open a section marker line. Variation-selector forms are listed first so
// the longest prefix is the one reported.
const SECTION_EMOJI: &[&str] = &[
    "🍽️", "🍽", "🛒", "👩‍🍳", "🥗", "✨", "🔥", "💡", "⏱️", "⏱", "🍲",
];

const INFO_MARKERS: &[&str] = &["Yields:", "Prep time:", "Cook time:"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Span {
    Plain(String),
    Bold(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(text) | Span::Bold(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletGlyph {
    #[serde(rename = "•")]
    Dot,
    #[serde(rename = "→")]
    Arrow,
}

impl BulletGlyph {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulletGlyph::Dot => "•",
            BulletGlyph::Arrow => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListItem {
    Bullet { glyph: BulletGlyph, spans: Vec<Span> },
    Numbered { step_number: u32, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    SectionMarker { emoji: String, text: String },
    Paragraph { spans: Vec<Span> },
    List { items: Vec<ListItem> },
    InfoCallout { text: String },
    Divider,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDocument {
    pub blocks: Vec<Block>,
}

/// What a single input line is, before any grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken {
    Heading { level: u8, text: String },
    SectionMarker { emoji: String, text: String },
    Bullet { glyph: BulletGlyph, spans: Vec<Span> },
    Numbered { step_number: u32, text: String },
    BoldLine { spans: Vec<Span> },
    InfoCallout { text: String },
    Divider,
    Blank,
    Text(String),
}

/// Splits on `**`, alternating plain and bold. Empty pieces are dropped.
pub fn split_bold(text: &str) -> Vec<Span> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 0 {
                Span::Plain(part.to_string())
            } else {
                Span::Bold(part.to_string())
            }
        })
        .collect()
}

fn strip_heading_decorations(text: &str) -> String {
    let mut cleaned = text.to_string();
    for emoji in HEADING_DECORATIONS {
        cleaned = cleaned.replace(emoji, "");
    }
    cleaned.trim().to_string()
}

fn heading(line: &str) -> Option<LineToken> {
    // Longest marker first so "###" is not read as "#"
    for (marker, level) in [("###", 3u8), ("##", 2), ("#", 1)] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(LineToken::Heading {
                level,
                text: strip_heading_decorations(rest),
            });
        }
    }
    None
}

fn section_marker(line: &str) -> Option<LineToken> {
    SECTION_EMOJI.iter().find_map(|emoji| {
        line.strip_prefix(emoji).map(|rest| LineToken::SectionMarker {
            emoji: emoji.to_string(),
            text: rest.trim().to_string(),
        })
    })
}

fn bullet(line: &str) -> Option<LineToken> {
    let (glyph, rest) = if let Some(rest) = line.strip_prefix('→') {
        (BulletGlyph::Arrow, rest)
    } else if let Some(rest) = line.strip_prefix('•').or_else(|| line.strip_prefix('-')) {
        (BulletGlyph::Dot, rest)
    } else if line.starts_with('*') && !line.starts_with("**") {
        (BulletGlyph::Dot, &line[1..])
    } else {
        return None;
    };
    Some(LineToken::Bullet {
        glyph,
        spans: split_bold(rest.trim()),
    })
}

// "**Label:** value" style lines are list items even without a marker
fn label_item(line: &str) -> Option<LineToken> {
    if line.contains("**") && (line.contains(":**") || line.contains("**:")) {
        Some(LineToken::Bullet {
            glyph: BulletGlyph::Dot,
            spans: split_bold(line),
        })
    } else {
        None
    }
}

fn numbered(line: &str) -> Option<LineToken> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 || !line[digits_end..].starts_with('.') {
        return None;
    }
    let step_number = line[..digits_end].parse::<u32>().ok()?;
    Some(LineToken::Numbered {
        step_number,
        text: line[digits_end + 1..].trim().to_string(),
    })
}

/// Classifies one line. Leading and trailing whitespace is ignored.
pub fn classify_line(raw: &str) -> LineToken {
    let line = raw.trim();
    if line.is_empty() {
        return LineToken::Blank;
    }
    if line == "---" {
        return LineToken::Divider;
    }

    if let Some(token) = heading(line)
        .or_else(|| section_marker(line))
        .or_else(|| bullet(line))
        .or_else(|| numbered(line))
        .or_else(|| label_item(line))
    {
        return token;
    }

    if line.contains("**") {
        return LineToken::BoldLine {
            spans: split_bold(line),
        };
    }
    if INFO_MARKERS.iter().any(|marker| line.contains(marker)) {
        return LineToken::InfoCallout {
            text: line.to_string(),
        };
    }
    LineToken::Text(line.to_string())
}

#[derive(Default)]
struct Grouper {
    blocks: Vec<Block>,
    paragraph: Vec<String>,
    list: Option<Vec<ListItem>>,
}

impl Grouper {
    fn flush_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.blocks.push(Block::Paragraph {
                spans: vec![Span::Plain(text)],
            });
        }
    }

    fn flush_list(&mut self) {
        if let Some(items) = self.list.take() {
            if !items.is_empty() {
                self.blocks.push(Block::List { items });
            }
        }
    }

    fn flush_all(&mut self) {
        self.flush_list();
        self.flush_paragraph();
    }

    fn push_item(&mut self, item: ListItem) {
        self.flush_paragraph();
        self.list.get_or_insert_with(Vec::new).push(item);
    }

    fn emit(&mut self, block: Block) {
        self.flush_all();
        self.blocks.push(block);
    }

    fn feed(&mut self, token: LineToken) {
        match token {
            LineToken::Heading { level, text } => self.emit(Block::Heading { level, text }),
            LineToken::SectionMarker { emoji, text } => self.emit(Block::SectionMarker { emoji, text }),
            LineToken::Bullet { glyph, spans } => self.push_item(ListItem::Bullet { glyph, spans }),
            LineToken::Numbered { step_number, text } => {
                self.push_item(ListItem::Numbered { step_number, text })
            }
            LineToken::BoldLine { spans } => self.emit(Block::Paragraph { spans }),
            LineToken::InfoCallout { text } => self.emit(Block::InfoCallout { text }),
            LineToken::Divider => self.emit(Block::Divider),
            LineToken::Blank => self.flush_all(),
            LineToken::Text(text) => {
                // plain text ends a running list
                self.flush_list();
                self.paragraph.push(text);
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_all();
        self.blocks
    }
}

/// Parses assistant text into blocks. Never fails; anything unrecognized becomes paragraph text.
pub fn render(text: &str) -> ChatDocument {
    let mut grouper = Grouper::default();
    for line in text.lines() {
        grouper.feed(classify_line(line));
    }
    ChatDocument {
        blocks: grouper.finish(),
    }
}

fn spans_to_string(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

impl ChatDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Terminal-friendly rendering, blocks separated by blank lines.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match block {
                Block::Heading { level, text } => {
                    let underline = match level {
                        1 => '=',
                        2 => '-',
                        _ => '~',
                    };
                    let _ = writeln!(out, "{}", text);
                    let _ = writeln!(out, "{}", underline.to_string().repeat(text.chars().count()));
                }
                Block::SectionMarker { emoji, text } => {
                    let _ = writeln!(out, "{} {}", emoji, text);
                }
                Block::Paragraph { spans } => {
                    let _ = writeln!(out, "{}", spans_to_string(spans));
                }
                Block::List { items } => {
                    for item in items {
                        match item {
                            ListItem::Bullet { glyph, spans } => {
                                let _ = writeln!(out, "  {} {}", glyph.as_str(), spans_to_string(spans));
                            }
                            ListItem::Numbered { step_number, text } => {
                                let _ = writeln!(out, "  {}. {}", step_number, text);
                            }
                        }
                    }
                }
                Block::InfoCallout { text } => {
                    let _ = writeln!(out, "| {}", text);
                }
                Block::Divider => out.push_str("----------------------------------------\n"),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet_item(text: &str) -> ListItem {
        ListItem::Bullet {
            glyph: BulletGlyph::Dot,
            spans: vec![Span::Plain(text.to_string())],
        }
    }

    #[test]
    fn test_heading_followed_by_bullets() {
        let doc = render("### Tips\n- Use fresh basil\n- Salt early");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading { level: 3, text: "Tips".to_string() },
                Block::List {
                    items: vec![bullet_item("Use fresh basil"), bullet_item("Salt early")]
                },
            ]
        );
    }

    #[test]
    fn test_numbered_steps() {
        let doc = render("1. Boil water\n2. Add pasta");
        assert_eq!(
            doc.blocks,
            vec![Block::List {
                items: vec![
                    ListItem::Numbered { step_number: 1, text: "Boil water".to_string() },
                    ListItem::Numbered { step_number: 2, text: "Add pasta".to_string() },
                ]
            }]
        );
    }

    #[test]
    fn test_bold_line_becomes_standalone_paragraph() {
        let doc = render("Great **dish** overall");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                spans: vec![
                    Span::Plain("Great ".to_string()),
                    Span::Bold("dish".to_string()),
                    Span::Plain(" overall".to_string()),
                ]
            }]
        );
    }

    #[test]
    fn test_trailing_list_is_emitted() {
        let doc = render("Shopping:\n* eggs\n* flour");
        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(&doc.blocks[1], Block::List { items } if items.len() == 2));
    }

    #[test]
    fn test_paragraph_lines_join_with_spaces() {
        let doc = render("This dish is\nreally simple.\n\nEnjoy!");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph { spans: vec![Span::Plain("This dish is really simple.".to_string())] },
                Block::Paragraph { spans: vec![Span::Plain("Enjoy!".to_string())] },
            ]
        );
    }

    #[test]
    fn test_plain_text_closes_list() {
        let doc = render("- one\n- two\nAfter the list");
        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(doc.blocks[0], Block::List { .. }));
        assert!(matches!(doc.blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_each_non_list_line_closes_open_list() {
        let cases = [
            ("## Sauce", Some(Block::Heading { level: 2, text: "Sauce".to_string() })),
            (
                "🔥 Hot tip",
                Some(Block::SectionMarker { emoji: "🔥".to_string(), text: "Hot tip".to_string() }),
            ),
            (
                "Keep it **simple**",
                Some(Block::Paragraph {
                    spans: vec![Span::Plain("Keep it ".to_string()), Span::Bold("simple".to_string())],
                }),
            ),
            ("---", Some(Block::Divider)),
            ("Cook time: 20 minutes", Some(Block::InfoCallout { text: "Cook time: 20 minutes".to_string() })),
            ("", None),
        ];

        for (line, between) in cases {
            let doc = render(&format!("- a\n{}\n- b", line));
            let mut expected = vec![Block::List { items: vec![bullet_item("a")] }];
            expected.extend(between);
            expected.push(Block::List { items: vec![bullet_item("b")] });
            assert_eq!(doc.blocks, expected, "separator line {:?}", line);
        }
    }

    #[test]
    fn test_heading_strips_markers_and_decorations() {
        assert_eq!(
            classify_line("## 🍲 Hearty Stew ✨"),
            LineToken::Heading { level: 2, text: "Hearty Stew".to_string() }
        );
        assert_eq!(
            classify_line("#Quick Bites"),
            LineToken::Heading { level: 1, text: "Quick Bites".to_string() }
        );
    }

    #[test]
    fn test_section_markers() {
        assert_eq!(
            classify_line("🛒 Shopping List"),
            LineToken::SectionMarker { emoji: "🛒".to_string(), text: "Shopping List".to_string() }
        );
        assert_eq!(
            classify_line("🍽️ Yield & Prep Time"),
            LineToken::SectionMarker { emoji: "🍽️".to_string(), text: "Yield & Prep Time".to_string() }
        );
    }

    #[test]
    fn test_arrow_bullets_keep_their_glyph() {
        assert_eq!(
            classify_line("→ Stir **gently**"),
            LineToken::Bullet {
                glyph: BulletGlyph::Arrow,
                spans: vec![Span::Plain("Stir ".to_string()), Span::Bold("gently".to_string())],
            }
        );
        assert!(matches!(
            classify_line("• Chop onions"),
            LineToken::Bullet { glyph: BulletGlyph::Dot, .. }
        ));
    }

    #[test]
    fn test_label_style_items() {
        assert_eq!(
            classify_line("**Servings:** 4"),
            LineToken::Bullet {
                glyph: BulletGlyph::Dot,
                spans: vec![Span::Bold("Servings:".to_string()), Span::Plain(" 4".to_string())],
            }
        );
        assert!(matches!(classify_line("**Tip**: rest the dough"), LineToken::Bullet { .. }));
        // bold without a label colon stays a paragraph
        assert!(matches!(classify_line("**Enjoy** your meal"), LineToken::BoldLine { .. }));
    }

    #[test]
    fn test_info_callouts_and_dividers() {
        let doc = render("Intro\nPrep time: 10 minutes\n---\nYields: 4 servings");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph { spans: vec![Span::Plain("Intro".to_string())] },
                Block::InfoCallout { text: "Prep time: 10 minutes".to_string() },
                Block::Divider,
                Block::InfoCallout { text: "Yields: 4 servings".to_string() },
            ]
        );
    }

    #[test]
    fn test_number_without_dot_is_text() {
        assert_eq!(classify_line("2 cups rice"), LineToken::Text("2 cups rice".to_string()));
        assert!(matches!(classify_line("12. Serve"), LineToken::Numbered { step_number: 12, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(render("").is_empty());
        assert!(render("\n  \n").is_empty());
    }

    #[test]
    fn test_plain_text_output() {
        let doc = render("# Menu\n- soup\n1. heat");
        let text = doc.to_plain_text();
        assert_eq!(text, "Menu\n====\n\n  • soup\n  1. heat\n");
    }
}
