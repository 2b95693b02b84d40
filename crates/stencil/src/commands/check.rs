//! Check command - compile templates without rendering them

use crate::context::Context;
use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;

/// Compile every template and report the result of each
///
/// All templates are checked even after a failure.
pub fn run(templates: Vec<String>, config: Option<&Path>, verbose: bool) -> Result<()> {
    let ctx = Context::new(config, verbose)?;

    let mut failed = 0;
    for name in &templates {
        if ctx.verbose {
            println!(
                "{} Checking {}",
                "→".cyan(),
                ctx.settings.template_path(name).display()
            );
        }
        match ctx.load_template(name) {
            Ok(template) => println!(
                "{} {}: {} operation(s), {} block(s)",
                "✓".green().bold(),
                name,
                template.op_count(),
                template.block_names().count()
            ),
            Err(e) => {
                failed += 1;
                println!("{} {:#}", "✗".red().bold(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} template(s) failed to compile", failed, templates.len());
    }
    Ok(())
}
