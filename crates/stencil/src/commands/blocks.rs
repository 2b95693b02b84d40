//! Blocks command - list the named blocks of a template

use crate::context::Context;
use crate::output::print_json;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(template: String, json: bool, config: Option<&Path>) -> Result<()> {
    let ctx = Context::new(config, false)?;
    let template = ctx.load_template(&template)?;
    let names: Vec<&str> = template.block_names().collect();

    if json {
        print_json(&serde_json::to_string(&names)?)?;
        return Ok(());
    }

    if names.is_empty() {
        println!("{} No blocks defined in {}", "!".yellow(), template.name());
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}
