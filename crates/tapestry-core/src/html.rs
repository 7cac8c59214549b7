//! Readable-text extraction from HTML pages.
//!
//! A fallback extractor: walks the parsed DOM, drops page chrome (navigation,
//! scripts, forms, and the like), and turns block-level elements into
//! paragraphs.

use scraper::{ElementRef, Html, Node};

/// Subtrees whose text is never captured.
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "form", "noscript", "iframe", "svg",
    "canvas", "template",
];

/// Elements that end the current paragraph on entry and exit.
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "article",
    "section",
    "main",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "br",
    "hr",
    "blockquote",
    "pre",
    "tr",
    "table",
];

/// Site-name separators, tried in this order.
const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " \u{2013} ", " \u{2014} ", " :: "];

/// Title and body text of a page. Both may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    /// Paragraphs separated by a blank line.
    pub content: String,
}

impl Extracted {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Markdown-ish rendering: `# title`, blank line, content. Without a
    /// title this is just the content.
    pub fn render(&self) -> String {
        if self.title.is_empty() {
            self.content.clone()
        } else {
            format!("# {}\n\n{}", self.title, self.content)
        }
    }
}

#[derive(Default)]
struct Collector {
    title: String,
    paragraphs: Vec<String>,
    pending: Vec<String>,
}

impl Collector {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let joined = self.pending.join(" ");
        let paragraph = joined.split_whitespace().collect::<Vec<_>>().join(" ");
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph);
        }
        self.pending.clear();
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIP_ELEMENTS.contains(&name) {
            return;
        }
        if name == "title" {
            self.title = element.text().collect::<String>().trim().to_string();
            return;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            self.flush();
        }
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.pending.push(text.to_string());
                    }
                }
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(child) {
                        self.walk(el);
                    }
                }
                _ => {}
            }
        }
        if block {
            self.flush();
        }
    }
}

/// Cuts a trailing site name off a page title ("Post - Blog" becomes "Post").
pub fn clean_title(raw: &str) -> String {
    let mut title = raw;
    for sep in TITLE_SEPARATORS {
        if let Some((head, _)) = title.split_once(sep) {
            title = head;
        }
    }
    title.trim().to_string()
}

/// Extracts the page title and main text from an HTML document.
pub fn extract_from_html(html: &str) -> Extracted {
    let doc = Html::parse_document(html);
    let mut collector = Collector::default();
    collector.walk(doc.root_element());
    collector.flush();

    Extracted {
        title: clean_title(&collector.title),
        content: collector.paragraphs.join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(html: &str) -> String {
        extract_from_html(html).content
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        let html = "<html><body><p>First paragraph</p><p>Second paragraph</p></body></html>";
        assert_eq!(content(html), "First paragraph\n\nSecond paragraph");
    }

    #[test]
    fn article_and_main_content_kept() {
        let html = "<body><article><p>Article content here</p></article>\
                    <main><p>Main content here</p></main></body>";
        let c = content(html);
        assert!(c.contains("Article content here"));
        assert!(c.contains("Main content here"));
    }

    #[test]
    fn inline_markup_joins_with_spaces() {
        let html = "<article><div><p>Deeply <strong>nested</strong> content</p></div></article>";
        assert_eq!(content(html), "Deeply nested content");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let html = "<body><p>   Multiple   spaces \n\t here  </p></body>";
        assert_eq!(content(html), "Multiple spaces here");
    }

    #[test]
    fn chrome_is_skipped() {
        let html = r#"<html><body>
            <header>Site Logo and Menu</header>
            <nav><a href="/">Home</a><a href="/about">About</a></nav>
            <script>var x = 'malicious code';</script>
            <style>body { color: red; }</style>
            <aside>Related articles sidebar</aside>
            <form><input type="email" placeholder="Subscribe"><button>Submit</button></form>
            <noscript>Please enable JavaScript</noscript>
            <p>Real content</p>
            <footer>Copyright 2024</footer>
        </body></html>"#;
        assert_eq!(content(html), "Real content");
    }

    #[test]
    fn nested_skip_elements() {
        let html = "<body><aside><nav><p>menu</p></nav><p>sidebar</p></aside><p>kept</p></body>";
        assert_eq!(content(html), "kept");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(content("<p>Tom &amp; Jerry &lt;3</p>"), "Tom & Jerry <3");
    }

    #[test]
    fn line_breaks_split_paragraphs() {
        assert_eq!(content("<p>one<br>two</p>"), "one\n\ntwo");
    }

    #[test]
    fn title_extracted_and_cleaned() {
        let t = |raw: &str| {
            extract_from_html(&format!(
                "<html><head><title>{raw}</title></head><body><p>x</p></body></html>"
            ))
            .title
        };
        assert_eq!(t("Page Title"), "Page Title");
        assert_eq!(t("Article Title - Site Name"), "Article Title");
        assert_eq!(t("Article Title | Site Name"), "Article Title");
        assert_eq!(t("Post \u{2014} Blog"), "Post");
        assert_eq!(t("Docs :: Index"), "Docs");
        assert_eq!(t("  Spaced  "), "Spaced");
    }

    #[test]
    fn title_separators_applied_in_order() {
        assert_eq!(clean_title("A | B - C"), "A");
        assert_eq!(clean_title("A - B | C"), "A");
        assert_eq!(clean_title("No-separator|here"), "No-separator|here");
    }

    #[test]
    fn title_text_not_in_content() {
        let e = extract_from_html("<html><head><title>Title</title></head></html>");
        assert_eq!(e.title, "Title");
        assert_eq!(e.content, "");
    }

    #[test]
    fn empty_document() {
        assert_eq!(extract_from_html(""), Extracted::default());
    }

    #[test]
    fn render_with_and_without_title() {
        let e = Extracted {
            title: "T".into(),
            content: "Body text".into(),
        };
        assert_eq!(e.render(), "# T\n\nBody text");
        assert_eq!(e.word_count(), 2);
        let e = Extracted {
            title: String::new(),
            content: "Body".into(),
        };
        assert_eq!(e.render(), "Body");
    }

    #[test]
    fn sample_article() {
        let html = r#"<!DOCTYPE html>
<html>
<head><title>How to Write Better Code - Dev Blog</title></head>
<body>
  <header><nav><a href="/">Home</a> <a href="/contact">Contact</a></nav></header>
  <main>
    <article>
      <h1>How to Write Better Code</h1>
      <p>Writing clean code is essential for maintainability.</p>
      <ul>
        <li>Use meaningful variable names</li>
        <li>Always keep functions small</li>
      </ul>
      <p>Finally, write tests for your code.</p>
    </article>
  </main>
  <aside><h3>Related Articles</h3><p>Buy our premium plan</p></aside>
  <footer><form><input placeholder="Subscribe"></form>Copyright 2024</footer>
</body>
</html>"#;
        let e = extract_from_html(html);
        assert_eq!(e.title, "How to Write Better Code");
        assert_eq!(
            e.content,
            "How to Write Better Code\n\n\
             Writing clean code is essential for maintainability.\n\n\
             Use meaningful variable names\n\n\
             Always keep functions small\n\n\
             Finally, write tests for your code."
        );
        for noise in ["Home", "Contact", "Related Articles", "premium", "Copyright", "Subscribe"] {
            assert!(!e.content.contains(noise), "{noise}");
        }
    }
}
