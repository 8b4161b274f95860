//! Halftone CLI
//!
//! Renders an HTML document to a PNG without a display.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use halftone_browser::{RenderOptions, fonts::FontBook, images::ImageStore, prepare};
use halftone_css::layout::InlineMode;

/// Halftone — render HTML+CSS to a PNG
#[derive(Parser, Debug)]
#[command(name = "halftone")]
#[command(author, version, about, long_about = None)]
#[command(group = clap::ArgGroup::new("input").required(true))]
#[command(after_help = r#"EXAMPLES:
    # Render a local file
    halftone page.html -o page.png

    # Render inline markup at a custom viewport
    halftone --html '<div style="background:red;width:100px;height:100px"></div>' \
        --width 400 --height 300 -o box.png

    # Compare the inline engines
    halftone page.html --single-pass-inline -o single.png

    # Inspect the layout tree as JSON
    halftone page.html --dump-layout
"#)]
struct Cli {
    /// Path to an HTML file or an http(s) URL
    #[arg(value_name = "FILE|URL", group = "input")]
    path: Option<String>,

    /// Render an inline HTML string instead of a file/URL
    #[arg(long, value_name = "HTML", group = "input")]
    html: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "out.png")]
    out: PathBuf,

    /// Viewport width in px
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Viewport height in px
    #[arg(long, default_value = "720")]
    height: u32,

    /// Use the single-pass inline fallback (diagnostic A/B against the
    /// multi-pass engine)
    #[arg(long)]
    single_pass_inline: bool,

    /// Print the positioned box tree as JSON instead of rendering
    #[arg(long)]
    dump_layout: bool,

    /// Print the paint list as JSON instead of rendering
    #[arg(long)]
    dump_paint: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (html, base_dir) = if let Some(html) = cli.html {
        (html, None)
    } else if let Some(path) = cli.path {
        let html = halftone_common::fetch_text(&path)
            .with_context(|| format!("could not read '{path}'"))?;
        let base = (!path.starts_with("http://") && !path.starts_with("https://"))
            .then(|| {
                PathBuf::from(&path)
                    .parent()
                    .map(std::path::Path::to_path_buf)
            })
            .flatten();
        (html, base)
    } else {
        anyhow::bail!("either a file/URL or --html is required");
    };

    let options = RenderOptions {
        base_dir,
        inline_mode: if cli.single_pass_inline {
            InlineMode::SinglePass
        } else {
            InlineMode::MultiPass
        },
    };

    if cli.dump_layout || cli.dump_paint {
        let fonts = FontBook::load_system();
        let images = ImageStore::new();
        let document = prepare(
            &html,
            f64::from(cli.width),
            f64::from(cli.height),
            &options,
            &fonts,
            &images,
        );
        if cli.dump_layout {
            println!("{}", serde_json::to_string_pretty(&LayoutDump::from(&document.layout))?);
        }
        if cli.dump_paint {
            println!("{}", serde_json::to_string_pretty(document.paint.ops())?);
        }
        return Ok(());
    }

    let png = halftone_browser::render_with(&html, cli.width, cli.height, &options)?;
    std::fs::write(&cli.out, png)
        .with_context(|| format!("could not write '{}'", cli.out.display()))?;
    println!("wrote {}", cli.out.display());
    Ok(())
}

/// A compact serializable view of the box tree for `--dump-layout`.
#[derive(serde::Serialize)]
struct LayoutDump {
    kind: String,
    rect: halftone_css::layout::Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<LayoutDump>,
}

impl From<&halftone_css::LayoutBox> for LayoutDump {
    fn from(bx: &halftone_css::LayoutBox) -> Self {
        Self {
            kind: format!("{:?}", bx.kind),
            rect: bx.rect,
            text: bx.text.clone(),
            children: bx.children.iter().map(Self::from).collect(),
        }
    }
}
