//! Renderers turning a token list into one markup flavor.
//!
//! - `HtmlRenderer`: `<i>` labels, HTML-escaped text and an icon arrow
//! - `ConsoleRenderer`: `<info>` labels for console tag styling and a `→` arrow

use crate::token::Token;

/// Turns tokens into a markup string.
pub trait MarkupRenderer {
    /// Append the markup for one token to `out`.
    fn render_token(&self, token: &Token, out: &mut String);

    fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            self.render_token(token, &mut out);
        }
        out
    }
}

// ── HTML ──────────────────────────────────────────────────────────────────────

/// Rich markup for web views.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub const ARROW: &'static str = r#"<i class="fas fa-long-arrow-alt-right"></i>"#;
}

impl MarkupRenderer for HtmlRenderer {
    fn render_token(&self, token: &Token, out: &mut String) {
        match token {
            Token::Label(s) => {
                out.push_str("<i>");
                escape_html(s, out);
                out.push_str("</i>");
            }
            Token::Text(s) => escape_html(s, out),
            Token::Separator(s) => out.push_str(s),
            Token::Reference(id) => out.push_str(&id.to_string()),
            Token::Arrow => out.push_str(Self::ARROW),
        }
    }
}

fn escape_html(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
}

// ── Console ───────────────────────────────────────────────────────────────────

/// Markup for terminals that style `<info>…</info>` spans.
///
/// Angle brackets in text are backslash-escaped so they cannot open a tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    pub const ARROW: &'static str = "→";
}

impl MarkupRenderer for ConsoleRenderer {
    fn render_token(&self, token: &Token, out: &mut String) {
        match token {
            Token::Label(s) => {
                out.push_str("<info>");
                escape_console(s, out);
                out.push_str("</info>");
            }
            Token::Text(s) => escape_console(s, out),
            Token::Separator(s) => out.push_str(s),
            Token::Reference(id) => out.push_str(&id.to_string()),
            Token::Arrow => out.push_str(Self::ARROW),
        }
    }
}

fn escape_console(s: &str, out: &mut String) {
    for c in s.chars() {
        if matches!(c, '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Strip console tags, for plain terminals.
pub fn strip_console_tags(s: &str) -> String {
    s.replace("<info>", "")
        .replace("</info>", "")
        .replace("\\<", "<")
        .replace("\\>", ">")
}
