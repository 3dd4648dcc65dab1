// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Where the candidate text sits in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathContext {
    /// A code span flowing with surrounding prose.
    Inline,
    /// A fenced code block on its own line.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Math,
    Code,
    Skip,
}

/// One token of a LaTeX command, a backslash followed by letters.
fn latex_command() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\[a-zA-Z]+").unwrap())
}

/// An author-supplied language tag, the alphanumeric token after the
/// `language-` class prefix.
fn language_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap())
}

const COMMAND_SUBSTRINGS: [&str; 7] = [
    r"\frac", r"\sum", r"\sqrt", r"\mathbf", r"\langle", r"\rangle", r"\text",
];

/// `$E=mc^2$` → `E=mc^2`. The delimiters must enclose the whole trimmed
/// text and there must be something between them.
pub fn strip_inline_delimiters(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.len() > 2 && text.starts_with('$') && text.ends_with('$') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

pub struct Classifier {
    max_block_len: usize,
}

impl Classifier {
    pub fn new(max_block_len: usize) -> Classifier {
        Classifier { max_block_len }
    }

    /// Judge a candidate's text. An explicit language tag always wins, then
    /// math signals, then code markers; a math signal forces the code
    /// heuristic off because real LaTeX is full of `=` and parentheses.
    pub fn classify(
        &self,
        raw_text: &str,
        explicit_language: Option<&str>,
        context: MathContext,
    ) -> Verdict {
        if explicit_language.is_some_and(|lang| language_tag().is_match(lang)) {
            return Verdict::Skip;
        }

        let text = raw_text.trim();
        if text.is_empty() {
            return Verdict::Skip;
        }

        if context == MathContext::Inline {
            return match strip_inline_delimiters(text) {
                Some(_) => Verdict::Math,
                None => Verdict::Skip,
            };
        }

        let has_latex_command = text.contains('\\')
            && (COMMAND_SUBSTRINGS.iter().any(|c| text.contains(c))
                || latex_command().is_match(text));
        let has_math_notation =
            (text.contains('^') || text.contains('_')) && (text.contains('{') || text.contains('}'));

        if !has_latex_command && !has_math_notation {
            return match looks_like_code(text) {
                true => Verdict::Code,
                false => Verdict::Skip,
            };
        }

        // Math this long in an unmarked block is almost always pasted
        // pseudo-code, not genuine notation.
        if text.len() > self.max_block_len {
            return Verdict::Skip;
        }

        Verdict::Math
    }
}

fn looks_like_code(text: &str) -> bool {
    text.contains("import ")
        || text.contains("def ")
        || text.contains("class ")
        || text.contains("print(")
        || text.contains("return ")
        || text.contains("from ")
        || text.contains("//")
        || text.contains("# ")
        || (text.contains('=') && text.contains('(') && text.contains(')') && !text.contains('\\'))
}
