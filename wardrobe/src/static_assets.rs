//! Landing page and other static files, embedded into the binary at build time.

use anyhow::Context;
use minijinja::{Environment, context};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
pub struct Assets;

const LANDING_PAGE: &str = "index.html";

/// Render the embedded landing page. `.html` templates are auto-escaped.
pub fn render_landing_page(title: &str) -> anyhow::Result<String> {
    let index = Assets::get(LANDING_PAGE).context("landing page is not embedded")?;
    let source = std::str::from_utf8(&index.data).context("landing page is not valid UTF-8")?;

    let mut env = Environment::new();
    env.add_template(LANDING_PAGE, source)?;
    let page = env.get_template(LANDING_PAGE)?.render(context! { title => title })?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page_substitutes_escaped_title() {
        let page = render_landing_page("Spring <Edition>").unwrap();
        assert!(page.contains("<title>Spring &lt;Edition&gt;</title>"));
        assert!(!page.contains("{{"));
    }
}
