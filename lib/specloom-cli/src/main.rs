#![allow(missing_docs)]
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use specloom_core::{DeclarationLoader, OutputFormat, SplitLayout, split_and_write};
use tracing::{Level, info, warn};
use utoipa::openapi::InfoBuilder;

fn main() -> Result<()> {
    let ExportArgs {
        dsl,
        out,
        title,
        version,
        format,
        verbose,
        remaining,
    } = ExportArgs::parse().context("parsing arguments")?;

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().pretty().with_max_level(level).init();
    if !remaining.is_empty() {
        warn!(?remaining, "Warning: unused arguments left");
    }

    let layout = SplitLayout::new(&out).with_format(format);
    let declarations = DeclarationLoader::new(&dsl)
        .mirror_into(&layout)
        .load()
        .with_context(|| format!("loading declarations from {}", dsl.display()))?;
    info!(dsl = %dsl.display(), declarations = declarations.len(), "declarations loaded");

    let info = InfoBuilder::new().title(title).version(version).build();
    let index = split_and_write(&layout, info, declarations)
        .with_context(|| format!("writing split document into {}", out.display()))?;

    info!(index = %index.display(), "Done");
    Ok(())
}

#[derive(Debug)]
struct ExportArgs {
    dsl: PathBuf,
    out: PathBuf,
    title: String,
    version: String,
    format: OutputFormat,
    verbose: bool,
    remaining: Vec<OsString>,
}

impl ExportArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let verbose = pargs.contains(["-v", "--verbose"]);

        let dsl = pargs
            .value_from_str("--dsl")
            .context("parsing dsl argument")?;

        let out = pargs
            .value_from_str("--out")
            .context("parsing out argument")?;

        let title = pargs
            .opt_value_from_str("--title")
            .context("parsing title argument")?;

        let version = pargs
            .opt_value_from_str("--version")
            .context("parsing version argument")?;

        let format = pargs
            .opt_value_from_str("--format")
            .context("parsing format argument")?;

        let result = Self {
            dsl,
            out,
            title: title.unwrap_or_else(|| "API".to_string()),
            version: version.unwrap_or_else(|| "1.0.0".to_string()),
            format: format.unwrap_or_default(),
            verbose,
            remaining: pargs.finish(),
        };
        Ok(result)
    }
}
