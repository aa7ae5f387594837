use crate::diagram::DiagramServer;
use log::warn;
use pulldown_cmark::*;
use url::Url;

const MARKDOWN_EXTENSION: &str = ".md";
const HTML_EXTENSION: &str = ".html";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Converts markdown to HTML.
///
/// * [`markdown`] is the article body.
/// * [`diagrams`] is the server that PlantUML blocks are linked to. When it's
///   `None`, PlantUML blocks are rendered as ordinary code blocks.
///
/// Rendering never fails. A diagram that can't be encoded is left as a code
/// block.
pub fn to_html(markdown: &str, diagrams: Option<&DiagramServer>) -> String {
    let events = convert(Parser::new_ext(markdown, options()), diagrams);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

fn convert<'a>(
    parser: Parser<'a>,
    diagrams: Option<&DiagramServer>,
) -> Vec<Event<'a>> {
    let mut events = Vec::new();

    // The events of the diagram block currently being collected, from its
    // start tag onwards.
    let mut pending: Option<Vec<Event<'a>>> = None;

    for event in parser.map(convert_link) {
        if let Some(mut block) = pending.take() {
            let end = matches!(event, Event::End(Tag::CodeBlock(_)));
            block.push(event);
            match end {
                true => events.extend(substitute_diagram(block, diagrams)),
                false => pending = Some(block),
            }
            continue;
        }

        let starts_diagram = matches!(
            &event,
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if diagrams.map_or(false, |d| d.handles(info))
        );
        match starts_diagram {
            true => pending = Some(vec![event]),
            false => events.push(event),
        }
    }

    if let Some(block) = pending {
        events.extend(block);
    }
    events
}

/// Replaces the events of a diagram's code block with a single HTML event, or
/// returns them untouched if the diagram can't be encoded.
fn substitute_diagram<'a>(
    block: Vec<Event<'a>>,
    diagrams: Option<&DiagramServer>,
) -> Vec<Event<'a>> {
    let source: String = block
        .iter()
        .filter_map(|ev| match ev {
            Event::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();

    match diagrams.map(|d| d.fragment(&source)) {
        Some(Ok(fragment)) => vec![Event::Html(CowStr::from(fragment))],
        Some(Err(err)) => {
            warn!("leaving diagram as a code block: {}", err);
            block
        }
        None => block,
    }
}

// Links between articles are written against the source files (e.g.,
// `02-setup.md`), so relative links to markdown files are pointed at the
// rendered pages instead.
fn convert_link(ev: Event) -> Event {
    match ev {
        Event::Start(Tag::Link(link_type, dest, title)) => {
            Event::Start(Tag::Link(link_type, convert_destination(dest), title))
        }
        _ => ev,
    }
}

fn convert_destination(dest: CowStr) -> CowStr {
    // Absolute URLs (including `mailto:` and friends) are never rewritten.
    if Url::parse(&dest).is_ok() {
        return dest;
    }
    let (path, fragment) = match dest.find('#') {
        Some(i) => dest.split_at(i),
        None => (&*dest, ""),
    };
    let converted = path
        .strip_suffix(MARKDOWN_EXTENSION)
        .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
        .map(|stem| format!("{}{}{}", stem, HTML_EXTENSION, fragment));

    match converted {
        Some(converted) => CowStr::from(converted),
        None => dest,
    }
}

/// Flattens markdown to plain text: markup is dropped, code blocks are
/// skipped, and runs of whitespace become single spaces.
pub fn plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    let mut in_code_block = false;
    for ev in Parser::new_ext(markdown, options()) {
        match ev {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(Tag::CodeBlock(_)) => {
                in_code_block = false;
                text.push(' ');
            }
            Event::Text(t) | Event::Code(t) if !in_code_block => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(Tag::Paragraph)
            | Event::End(Tag::Heading(_))
            | Event::End(Tag::Item)
            | Event::End(Tag::TableCell) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
