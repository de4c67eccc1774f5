//! # Slugline CLI
//!
//! Usage:
//!   slugline input.script -o output.pdf
//!   slugline input.script --config render.json --regular Font.ttf --bold Font-Bold.ttf
//!   slugline input.script --locale he-IL --layout > layout.json
//!   cat input.script | slugline -o output.pdf
//!   slugline --new "Night Shift" --author "Alice, Bob"
//!   slugline --example > example.script

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use slugline::font::{load_font_source, FontContext, FontRole};
use slugline::frontmatter::{new_script_text, script_file_name};
use slugline::{Locale, RenderConfig, ScriptMetadata, SluglineError};

fn main() {
    let args: Vec<String> = env::args().collect();

    let level = if has_flag(&args, "-v") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    if has_flag(&args, "--example") {
        print!("{}", example_script());
        return;
    }

    let result = match flag_value(&args, "--new") {
        Some(name) => create_script(&name, flag_value(&args, "--author")),
        None => render(&args),
    };

    if let Err(e) = result {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn render(args: &[String]) -> Result<(), SluglineError> {
    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let mut config = match flag_value(args, "--config") {
        Some(path) => RenderConfig::from_json(&fs::read_to_string(path)?)?,
        None => RenderConfig::default(),
    };
    if let Some(tag) = flag_value(args, "--locale") {
        config.locale = Some(Locale::from_tag(&tag));
    }

    let mut fonts = FontContext::from_config(&config.fonts)?;
    for (flag, role) in [("--regular", FontRole::Regular), ("--bold", FontRole::Bold)] {
        if let Some(src) = flag_value(args, flag) {
            fonts.register(role, load_font_source(&src)?)?;
        }
    }

    let script = slugline::parse(&input);
    info!(
        "Parsed '{}': {} scenes",
        script.metadata.title,
        script.scenes.len()
    );

    if has_flag(args, "--layout") {
        let document = slugline::layout(&script, &config, &fonts);
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| SluglineError::Render(format!("Failed to serialize layout: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    let output_path = flag_value(args, "-o").unwrap_or_else(|| "output.pdf".to_string());
    let pdf_bytes = slugline::render_pdf_with_fonts(&script, &config, &fonts)?;
    fs::write(&output_path, &pdf_bytes)?;
    eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
    Ok(())
}

fn create_script(name: &str, author: Option<String>) -> Result<(), SluglineError> {
    let file_name = script_file_name(name);
    if Path::new(&file_name).exists() {
        return Err(SluglineError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", file_name),
        )));
    }
    let metadata = ScriptMetadata {
        title: name.to_string(),
        writers: author.unwrap_or_default(),
        ..ScriptMetadata::default()
    };
    fs::write(&file_name, new_script_text(&metadata))?;
    eprintln!("✓ Created {}", file_name);
    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(1).any(|a| a == flag)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn example_script() -> &'static str {
    r#"---
title: Night Shift
subtitle: A short film
author: Alice Moreau, Bob Ito
prod_company: Lantern Pictures
date: 2024-03-05
---
# INT. DINER - NIGHT
## Three hours before close
Rain streaks the windows. A neon sign buzzes, half its letters dead.
@MARA
"Another coffee? You've been nursing that one since midnight.
@DEV
"I'm waiting for someone.
Mara glances at the empty booth across from him, then at the clock.
-CUT TO:
# EXT. PARKING LOT - CONTINUOUS
A car idles with its headlights off.
"#
}
