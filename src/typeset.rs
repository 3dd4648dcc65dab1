use pulldown_latex::config::DisplayMode;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Block math is centered on its own line, inline math flows with prose.
    pub display_mode: bool,
    /// Hint for engines that can degrade instead of failing. The annotation
    /// policies still treat an `Err` as a rejection either way.
    pub throw_on_error: bool,
}

/// The external typesetting engine. Only this contract is used; the engine
/// itself is never reimplemented here.
pub trait Typesetter {
    fn render(&self, text: &str, options: &RenderOptions) -> eyre::Result<String>;
}

/// Default delegate, rendering LaTeX-ish notation to MathML.
pub struct MathMlTypesetter;

impl Typesetter for MathMlTypesetter {
    fn render(&self, text: &str, options: &RenderOptions) -> eyre::Result<String> {
        let storage = pulldown_latex::Storage::new();
        let parser = pulldown_latex::Parser::new(text, &storage);
        let mut config = pulldown_latex::RenderConfig::default();
        config.display_mode = match options.display_mode {
            true => DisplayMode::Block,
            false => DisplayMode::Inline,
        };

        let mut markup = String::new();
        pulldown_latex::push_mathml(&mut markup, parser, config)?;
        Ok(markup)
    }
}
