use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::dom::Document;

const OPTIONS: Options = Options::ENABLE_TABLES.union(Options::ENABLE_FOOTNOTES);

/// Build a document tree from Markdown the way a site renderer would emit
/// it: `body > main > article`, inline code spans as `<code>`, fenced blocks
/// as `<pre><code class="language-*">`. This is driver glue for the CLI and
/// for tests; the annotation pipeline itself never parses markup.
pub fn document_from_markdown(input: &str) -> Document {
    let mut doc = Document::new();
    let main = doc.create_element("main");
    doc.append(doc.root(), main);
    let article = doc.create_element("article");
    doc.append(main, article);

    let mut stack = vec![article];
    for event in Parser::new_ext(input, OPTIONS) {
        let top = *stack.last().unwrap_or(&article);
        match event {
            Event::Start(Tag::Paragraph) => {
                let p = doc.create_element("p");
                doc.append(top, p);
                stack.push(p);
            }
            Event::End(TagEnd::Paragraph) => {
                stack.pop();
            }
            Event::Start(Tag::Heading { level, .. }) => {
                let heading = doc.create_element(&level.to_string());
                doc.append(top, heading);
                stack.push(heading);
            }
            Event::End(TagEnd::Heading(_)) => {
                stack.pop();
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let pre = doc.create_element("pre");
                doc.append(top, pre);
                let code = doc.create_element("code");
                if let CodeBlockKind::Fenced(info) = &kind {
                    if let Some(lang) = info.split_whitespace().next() {
                        doc.set_attr(code, "class", &format!("language-{}", lang));
                    }
                }
                doc.append(pre, code);
                stack.push(code);
            }
            Event::End(TagEnd::CodeBlock) => {
                stack.pop();
            }
            Event::Code(text) => {
                let code = doc.create_element("code");
                let inner = doc.create_text(&text);
                doc.append(code, inner);
                doc.append(top, code);
            }
            Event::Text(text) => {
                let node = doc.create_text(&text);
                doc.append(top, node);
            }
            Event::SoftBreak => {
                let space = doc.create_text(" ");
                doc.append(top, space);
            }
            Event::HardBreak => {
                let br = doc.create_element("br");
                doc.append(top, br);
            }
            _ => {}
        }
    }
    doc
}

#[cfg(test)]
mod test {
    use super::document_from_markdown;

    #[test]
    fn test_code_markup_shapes() {
        let doc = document_from_markdown(
            "# Title\n\nInline `$x$` here.\n\n```python\nprint(1)\n```\n\n```\ne^{x}\n```\n",
        );
        let html = doc.to_html();
        assert!(html.starts_with("<body><main><article>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Inline <code>$x$</code> here.</p>"));
        assert!(html.contains("<pre><code class=\"language-python\">print(1)\n</code></pre>"));
        assert!(html.contains("<pre><code>e^{x}\n</code></pre>"));
    }

    #[test]
    fn test_empty_fence_info_has_no_language_class() {
        let doc = document_from_markdown("```\nx\n```\n");
        assert!(!doc.to_html().contains("language-"));
    }
}
