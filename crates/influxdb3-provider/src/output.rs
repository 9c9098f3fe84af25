//! Rendering of documents for the command-line driver

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render any serializable value in the chosen format
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let value = serde_json::to_value(data)?;
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&value)?,
    };
    Ok(rendered)
}

pub fn print_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(data, format)?.trim_end());
    Ok(())
}
