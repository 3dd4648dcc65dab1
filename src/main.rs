// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

mod cli;

use clap::Parser;

use crate::cli::{classify::ClassifyCommand, render::RenderCommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Render a Markdown file to HTML with the math pass applied.
    #[command(visible_alias = "r")]
    Render(RenderCommand),

    /// Print the classification verdict for a snippet.
    #[command(visible_alias = "c")]
    Classify(ClassifyCommand),
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Render(command) => crate::cli::render::render(command)?,
        Command::Classify(command) => crate::cli::classify::classify(command)?,
    };
    Ok(())
}
