// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use tracing::debug;

use crate::classify::{strip_inline_delimiters, Classifier, MathContext, Verdict};
use crate::config;
use crate::dom::{Document, NodeId};
use crate::scan::Candidate;
use crate::typeset::{RenderOptions, Typesetter};

/// A substitution that must not happen inside the pass that decided it.
/// Replacing a block container while the host is still hydrating can detach
/// the node out from under the substitution, so the pipeline applies patches
/// one scheduler tick later and tolerates a target that has gone away.
#[derive(Debug, Clone, Copy)]
pub struct Patch {
    pub target: NodeId,
    pub replacement: NodeId,
}

#[derive(Debug)]
pub enum Outcome {
    /// The candidate was replaced in place (inline path).
    Replaced,
    /// The replacement is built; substitution is deferred (block path).
    Deferred(Patch),
    /// Left as originally rendered.
    Unchanged,
}

pub struct Annotator<'a> {
    classifier: Classifier,
    typesetter: &'a dyn Typesetter,
    scan: &'a config::Scan,
    render: &'a config::Render,
}

impl<'a> Annotator<'a> {
    pub fn new(
        config: &'a crate::config::Config,
        typesetter: &'a dyn Typesetter,
    ) -> Annotator<'a> {
        Annotator {
            classifier: Classifier::new(config.classify.max_block_len),
            typesetter,
            scan: &config.scan,
            render: &config.render,
        }
    }

    pub fn annotate(&self, doc: &mut Document, candidate: &Candidate) -> Outcome {
        let verdict = self.classifier.classify(
            &candidate.text,
            candidate.language.as_deref(),
            candidate.context,
        );
        match candidate.context {
            MathContext::Inline => self.annotate_inline(doc, candidate, verdict),
            MathContext::Block => self.annotate_block(doc, candidate, verdict),
        }
    }

    /// Tolerant path: a broken inline math guess must never break the
    /// surrounding prose, so a delegate failure leaves the span alone and
    /// stays retryable.
    fn annotate_inline(&self, doc: &mut Document, candidate: &Candidate, verdict: Verdict) -> Outcome {
        if verdict != Verdict::Math {
            doc.set_attr(candidate.node, &self.scan.node_marker, "true");
            return Outcome::Unchanged;
        }
        let Some(math) = strip_inline_delimiters(&candidate.text) else {
            return Outcome::Unchanged;
        };
        let options = RenderOptions {
            display_mode: false,
            throw_on_error: false,
        };
        match self.typesetter.render(math, &options) {
            Ok(markup) => {
                doc.set_attr(candidate.node, &self.scan.node_marker, "true");
                let span = doc.create_element("span");
                let inner = doc.create_raw(&markup);
                doc.append(span, inner);
                doc.replace(candidate.node, span);
                Outcome::Replaced
            }
            Err(err) => {
                debug!("inline typesetting rejected {:?}: {}", math, err);
                Outcome::Unchanged
            }
        }
    }

    /// Strict path: a delegate failure is taken as proof the classification
    /// was wrong, never shown to the reader. The candidate is still marked so
    /// later passes do not retry a block the engine will keep rejecting.
    fn annotate_block(&self, doc: &mut Document, candidate: &Candidate, verdict: Verdict) -> Outcome {
        doc.set_attr(candidate.node, &self.scan.node_marker, "true");
        if verdict != Verdict::Math {
            return Outcome::Unchanged;
        }
        let options = RenderOptions {
            display_mode: true,
            throw_on_error: true,
        };
        match self.typesetter.render(&candidate.text, &options) {
            Ok(markup) => {
                let wrapper = doc.create_element("div");
                doc.set_attr(wrapper, "class", &self.render.display_class);
                doc.set_attr(
                    wrapper,
                    "style",
                    "text-align:center;margin:1em 0;overflow-x:auto",
                );
                let inner = doc.create_raw(&markup);
                doc.append(wrapper, inner);
                Outcome::Deferred(Patch {
                    target: candidate.container.unwrap_or(candidate.node),
                    replacement: wrapper,
                })
            }
            Err(err) => {
                debug!("block typesetting rejected {:?}: {}", candidate.text, err);
                Outcome::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Annotator, Outcome};
    use crate::config::Config;
    use crate::dom::Document;
    use crate::scan::Scanner;
    use crate::typeset::{RenderOptions, Typesetter};

    struct FakeTypesetter;

    impl Typesetter for FakeTypesetter {
        fn render(&self, text: &str, options: &RenderOptions) -> eyre::Result<String> {
            if text.contains("reject") {
                return Err(eyre::eyre!("not valid notation"));
            }
            Ok(format!(
                "<math display=\"{}\">{}</math>",
                if options.display_mode { "block" } else { "inline" },
                text
            ))
        }
    }

    fn inline_doc(text: &str) -> (Document, Config) {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        let article = doc.create_element("article");
        let p = doc.create_element("p");
        let code = doc.create_element("code");
        let t = doc.create_text(text);
        doc.append(doc.root(), main);
        doc.append(main, article);
        doc.append(article, p);
        doc.append(p, code);
        doc.append(code, t);
        (doc, Config::default())
    }

    fn block_doc(text: &str) -> (Document, Config) {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        let article = doc.create_element("article");
        let pre = doc.create_element("pre");
        let code = doc.create_element("code");
        let t = doc.create_text(text);
        doc.append(doc.root(), main);
        doc.append(main, article);
        doc.append(article, pre);
        doc.append(pre, code);
        doc.append(code, t);
        (doc, Config::default())
    }

    fn first_candidate(doc: &mut Document, config: &Config) -> crate::scan::Candidate {
        let scanner = Scanner::new(&config.scan);
        let roots = scanner.roots(doc);
        scanner.scan_root(doc, roots[0]).remove(0)
    }

    #[test]
    fn test_inline_math_replaced_with_delimiters_stripped() {
        let (mut doc, config) = inline_doc("$E=mc^2$");
        let candidate = first_candidate(&mut doc, &config);
        let annotator = Annotator::new(&config, &FakeTypesetter);

        assert!(matches!(
            annotator.annotate(&mut doc, &candidate),
            Outcome::Replaced
        ));
        let html = doc.to_html();
        assert!(html.contains("<math display=\"inline\">E=mc^2</math>"));
        assert!(!html.contains('$'));
    }

    #[test]
    fn test_inline_failure_leaves_span_untouched() {
        let (mut doc, config) = inline_doc("$reject me$");
        let before = doc.to_html();
        let candidate = first_candidate(&mut doc, &config);
        let annotator = Annotator::new(&config, &FakeTypesetter);

        assert!(matches!(
            annotator.annotate(&mut doc, &candidate),
            Outcome::Unchanged
        ));
        // the original markup survives, minus the root marker added by the scan
        assert_eq!(
            doc.to_html().replace(" data-math-processed=\"true\"", ""),
            before
        );
    }

    #[test]
    fn test_block_math_substitution_is_deferred() {
        let (mut doc, config) = block_doc(r"e^{-E_a/(RT)}");
        let candidate = first_candidate(&mut doc, &config);
        let annotator = Annotator::new(&config, &FakeTypesetter);

        let outcome = annotator.annotate(&mut doc, &candidate);
        let Outcome::Deferred(patch) = outcome else {
            panic!("expected a deferred patch, got {:?}", outcome);
        };
        // nothing replaced yet
        assert!(doc.to_html().contains("<pre>"));

        assert!(doc.replace(patch.target, patch.replacement));
        let html = doc.to_html();
        assert!(html.contains("class=\"katex-display\""));
        assert!(html.contains("<math display=\"block\">"));
        assert!(!html.contains("<pre>"));
    }

    /// A rejected block stays as originally rendered but is still marked, so
    /// later passes do not pile retries onto a block the engine will keep
    /// rejecting.
    #[test]
    fn test_block_failure_marks_without_modifying() {
        let (mut doc, config) = block_doc(r"\reject{x}");
        let candidate = first_candidate(&mut doc, &config);
        let annotator = Annotator::new(&config, &FakeTypesetter);

        assert!(matches!(
            annotator.annotate(&mut doc, &candidate),
            Outcome::Unchanged
        ));
        let html = doc.to_html();
        assert!(html.contains(r"\reject{x}"));
        assert!(doc.attr(candidate.node, &config.scan.node_marker).is_some());
    }

    #[test]
    fn test_tagged_block_is_never_touched() {
        let (mut doc, config) = block_doc(r"x^{2} = \sum_{i} a_i");
        let mut candidate = first_candidate(&mut doc, &config);
        // as if the block carried class="language-python"
        candidate.language = Some("python".to_string());
        let annotator = Annotator::new(&config, &FakeTypesetter);

        assert!(matches!(
            annotator.annotate(&mut doc, &candidate),
            Outcome::Unchanged
        ));
        assert!(doc.to_html().contains(r"x^{2}"));
    }
}
