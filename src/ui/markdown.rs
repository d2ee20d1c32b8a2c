use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::agent::RenderResult;
use crate::llm::Attribution;

/// `[n] [title](uri)`, numbered from 1 in sequence order.
pub fn source_lines(sources: &[Attribution]) -> Vec<String> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| format!("[{}] [{}]({})", i + 1, source.title, source.uri))
        .collect()
}

/// Plain Markdown rendering of a result, used by the terminal front end.
pub fn render_markdown(result: &RenderResult) -> String {
    match result {
        RenderResult::Warning { message } | RenderResult::Error { message } => message.clone(),
        RenderResult::Success { answer, sources } => {
            let mut out = format!("## Answer\n\n{}\n", answer.trim_end());
            if !sources.is_empty() {
                out.push_str("\n## Sources\n\n");
                for line in source_lines(sources) {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            out
        }
    }
}

/// Markdown to HTML. Raw HTML in the input is shown as text and links with
/// non-web schemes lose their target.
pub fn to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_web_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_web_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn is_web_url(url: &str) -> bool {
    match url.split_once(':') {
        None => true,
        // a ':' after a path, query or fragment delimiter is not a scheme
        Some((scheme, _)) if scheme.contains(|c: char| matches!(c, '/' | '?' | '#')) => true,
        Some((scheme, _)) => matches!(
            scheme.to_ascii_lowercase().as_str(),
            "http" | "https" | "mailto"
        ),
    }
}
