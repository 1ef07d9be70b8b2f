use console::style;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Render a Markdown summary as terminal text.
///
/// Single newlines in the source are kept as line breaks, since the
/// summarizer formats its answer line by line. Strong and emphasized spans
/// are styled when `styled` is set.
pub fn summary_to_text(markdown: &str, styled: bool) -> String {
    let parser = Parser::new(markdown);
    let mut text = String::new();
    let mut strong = false;
    let mut emphasis = false;
    let mut list_depth: usize = 0;

    for event in parser {
        match event {
            Event::Text(t) => {
                if styled && strong {
                    text.push_str(&style(t.as_ref()).bold().to_string());
                } else if styled && emphasis {
                    text.push_str(&style(t.as_ref()).italic().to_string());
                } else {
                    text.push_str(&t);
                }
            }
            Event::Code(t) => {
                text.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
            }
            Event::Start(Tag::Strong) => strong = true,
            Event::End(TagEnd::Strong) => strong = false,
            Event::Start(Tag::Emphasis) => emphasis = true,
            Event::End(TagEnd::Emphasis) => emphasis = false,
            Event::Start(Tag::Paragraph) | Event::Start(Tag::Heading { .. }) => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Heading(_)) => {
                text.push_str("\n\n");
            }
            Event::Start(Tag::List(_)) => {
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    text.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                text.push_str("• ");
            }
            Event::End(TagEnd::Item) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }

    text.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
