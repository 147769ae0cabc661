//! Walk through every widget on the real terminal.
//!
//! Run with: cargo run --example showcase [level]

use std::env;
use std::thread;
use std::time::Duration;

use herald::{Choices, Level, Logger, LoggerConfig, PromptOptions};

fn main() {
    let level = env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<Level>().ok())
        .unwrap_or_default();

    let mut logger = Logger::with_config(LoggerConfig {
        level,
        ..Default::default()
    });

    if let Err(e) = run(&mut logger) {
        logger.err(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(logger: &mut Logger) -> herald::Result<()> {
    logger.detail("detail is only shown at the debug level");
    logger.info("Welcome to the herald showcase.");
    logger.delayed("(this line was queued before the first prompt)");

    let name = logger.prompt(
        "What is your name?",
        PromptOptions {
            default_value: Some("Dash".into()),
            ..Default::default()
        },
    )?;
    let _secret = logger.prompt(
        "Pick a secret:",
        PromptOptions {
            hidden: true,
            ..Default::default()
        },
    )?;

    let shape = logger.choose_one(
        "Choose a shape:",
        Choices::new(["circle", "square", "triangle"]),
        Some(&"square"),
    )?;
    let toppings = logger.choose_any(
        "Any toppings?\n(space toggles, enter confirms)",
        Choices::new(["cheese", "olives", "basil"]),
        &["cheese"],
    )?;
    let tags = logger.prompt_any("Tags (comma separated):")?;

    let mut progress = logger.progress("Baking");
    thread::sleep(Duration::from_millis(1500));
    progress.update("Cooling");
    thread::sleep(Duration::from_millis(800));
    progress.complete();

    if logger.confirm("Print the summary?", true)? {
        logger.success(&format!("{name} ordered a {shape} with {toppings:?} tagged {tags:?}"));
    } else {
        logger.warn("summary skipped");
    }

    logger.flush();
    Ok(())
}
