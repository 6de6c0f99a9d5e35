use super::AppContext;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use catalog_config::{Config, API_KEY_ENV};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(ctx: &AppContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(ctx, output),
        ConfigCommands::Init { api_key, force } => init_config(ctx, api_key, force, output),
        ConfigCommands::Path => {
            output.render(
                || println!("{}", ctx.config_file.display()),
                &json!({ "config_file": ctx.config_file.display().to_string() }),
            );
            Ok(())
        }
    }
}

fn show_config(ctx: &AppContext, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let api_key = config.omdb.resolved_api_key();
    let key_from_env = std::env::var(API_KEY_ENV).map(|k| !k.trim().is_empty()).unwrap_or(false);

    if !ctx.config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", ctx.config_file.display()));
        output.info("Showing defaults. Run 'moviecatalog config init --api-key <KEY>' to create it.");
    }

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!();
            println!("{}", "Configuration".bright_cyan().bold());
            println!();

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            table.set_header(vec![
                Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config file"), Cell::new(ctx.config_file.display().to_string())]);
            table.add_row(vec![
                Cell::new("omdb.api_key"),
                Cell::new(format!(
                    "{}{}",
                    mask_string(&api_key),
                    if key_from_env { format!(" (from {})", API_KEY_ENV) } else { String::new() }
                )),
            ]);
            table.add_row(vec![Cell::new("omdb.base_url"), Cell::new(&config.omdb.base_url)]);
            table.add_row(vec![Cell::new("omdb.timeout_secs"), Cell::new(config.omdb.timeout_secs)]);
            table.add_row(vec![Cell::new("search.default_term"), Cell::new(&config.search.default_term)]);
            table.add_row(vec![Cell::new("search.debounce_ms"), Cell::new(config.search.debounce_ms)]);
            table.add_row(vec![
                Cell::new("search.has_more_threshold"),
                Cell::new(config.search.has_more_threshold),
            ]);
            table.add_row(vec![Cell::new("storage directory"), Cell::new(ctx.store_dir().display().to_string())]);
            table.add_row(vec![
                Cell::new("logging.file"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<stderr>".to_string()),
                ),
            ]);
            println!("{}", table);

            if let Err(e) = config.validate() {
                println!();
                println!("{} {}", "⚠".yellow(), e);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let data = json!({
                "config_file": ctx.config_file.display().to_string(),
                "omdb": {
                    "api_key": mask_string(&api_key),
                    "api_key_from_env": key_from_env,
                    "base_url": config.omdb.base_url,
                    "timeout_secs": config.omdb.timeout_secs,
                },
                "search": {
                    "default_term": config.search.default_term,
                    "debounce_ms": config.search.debounce_ms,
                    "has_more_threshold": config.search.has_more_threshold,
                },
                "storage": { "directory": ctx.store_dir().display().to_string() },
                "logging": { "file": config.logging.file.as_ref().map(|p| p.display().to_string()) },
                "valid": config.validate().is_ok(),
            });
            output.render(|| {}, &data);
        }
    }

    Ok(())
}

fn init_config(ctx: &AppContext, api_key: Option<String>, force: bool, output: &Output) -> Result<()> {
    let path = &ctx.config_file;
    if path.exists() && !force && api_key.is_none() {
        return Err(eyre!(
            "Configuration already exists at {} (use --force to reset it, or --api-key to update the key)",
            path.display()
        ));
    }

    // An existing file only gets its key replaced unless --force resets everything
    let mut config = if force { Config::default() } else { ctx.config.clone() };
    if let Some(key) = api_key {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(eyre!("The API key cannot be empty"));
        }
        config.omdb.api_key = key;
    }

    config
        .save_to_file(path)
        .map_err(|e| eyre!("Failed to save config to {}: {}", path.display(), e))?;

    output.success(format!("Configuration saved to {}", path.display()));
    if config.omdb.resolved_api_key().is_empty() {
        output.warn(format!(
            "No OMDb API key set. Add one with --api-key or the {} environment variable.",
            API_KEY_ENV
        ));
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
