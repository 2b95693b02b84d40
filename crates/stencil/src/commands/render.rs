//! Render command - render a template, optionally into a layout

use crate::cli::RenderArgs;
use crate::context::Context;
use crate::output::print_raw;
use anyhow::{Context as _, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use stencil_core::data::{load_data_files, parse_assignment};
use stencil_core::template::{BlockRegistry, TemplateContext};

/// Render `args.template` to stdout or `args.output`
///
/// The context is built from the configured data and vars, then `--data`
/// files, then `--set` assignments, each overriding the previous.
pub fn run(args: RenderArgs, config: Option<&Path>, verbose: bool) -> Result<()> {
    let mut ctx = Context::new(config, verbose)?;
    if args.no_builtins {
        ctx.settings.config.render.builtin_modifiers = false;
    }

    let mut context = ctx.settings.base_context()?;
    context.merge(load_data_files(&args.data)?);
    for assignment in &args.set {
        context.merge(parse_assignment(assignment)?);
    }

    let template = ctx.load_template(&args.template)?;

    let rendered = match &args.layout {
        Some(layout_name) => {
            let layout = ctx.load_template(layout_name)?;
            if ctx.verbose {
                eprintln!(
                    "{} Rendering '{}' into layout '{}'",
                    "→".cyan(),
                    template.name(),
                    layout.name()
                );
            }
            let mut blocks = BlockRegistry::new();
            blocks.extend_from_template(&Arc::new(template));
            tracing::debug!(layout = layout.name(), overrides = blocks.len(), "rendering layout");
            ctx.settings.render(&layout, &context, Some(&blocks))?
        }
        None => {
            if ctx.verbose {
                eprintln!("{} Rendering '{}'", "→".cyan(), template.name());
            }
            ctx.settings.render(&template, &context, None)?
        }
    };

    write_output(&rendered, args.output.as_deref(), &context)
}

fn write_output(rendered: &str, output: Option<&Path>, context: &TemplateContext) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!(
                "{} Rendered {} bytes to {} ({} variable(s))",
                "✓".green().bold(),
                rendered.len(),
                path.display(),
                context.len()
            );
        }
        None => print_raw(rendered)?,
    }
    Ok(())
}
