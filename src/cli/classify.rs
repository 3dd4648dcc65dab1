// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use mathsieve::config;
use mathsieve::{Classifier, MathContext, Verdict};

#[derive(clap::Args)]
pub struct ClassifyCommand {
    /// The snippet to judge.
    text: String,

    /// Treat the snippet as a fenced block rather than an inline span.
    #[arg(short, long)]
    block: bool,

    /// Explicit language tag carried by the block, if any.
    #[arg(short, long)]
    language: Option<String>,
}

pub fn classify(command: &ClassifyCommand) -> eyre::Result<()> {
    let context = match command.block {
        true => MathContext::Block,
        false => MathContext::Inline,
    };
    let classifier = Classifier::new(config::DEFAULT_MAX_BLOCK_LEN);
    let verdict = classifier.classify(&command.text, command.language.as_deref(), context);
    match verdict {
        Verdict::Math => color_print::cprintln!("<g>math</>"),
        Verdict::Code => color_print::cprintln!("<y>code</>"),
        Verdict::Skip => color_print::cprintln!("skip"),
    }
    Ok(())
}
