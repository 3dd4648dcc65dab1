// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::fs;

use camino::Utf8PathBuf;
use eyre::WrapErr;

use mathsieve::config;
use mathsieve::markdown;
use mathsieve::{MathMlTypesetter, Pipeline};

#[derive(clap::Args)]
pub struct RenderCommand {
    /// Path to the Markdown file to render.
    path: Utf8PathBuf,

    /// Write the HTML here instead of stdout.
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Path to the configuration file (e.g., "Mathsieve.toml").
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    config: String,
}

pub fn render(command: &RenderCommand) -> eyre::Result<()> {
    let config = config::load_config(&command.config)?;
    let input = fs::read_to_string(&command.path)
        .wrap_err_with(|| format!("failed to read \"{}\"", command.path))?;

    let mut doc = markdown::document_from_markdown(&input);
    let mut pipeline = Pipeline::new(config, Box::new(MathMlTypesetter));
    pipeline.on_initial_load(&mut doc);
    pipeline.run_until_idle(&mut doc);

    let html = doc.to_html();
    match &command.output {
        Some(path) => {
            fs::write(path, html).wrap_err_with(|| format!("failed to write \"{}\"", path))?;
            color_print::cprintln!("<g>Rendered:</> {}", path);
        }
        None => println!("{}", html),
    }
    Ok(())
}
