use serde::Serialize;

use crate::cli::OutputFormat;

/// Pretty JSON in JSON mode, otherwise the given text lines
pub fn output<T: Serialize>(output_format: OutputFormat, data: &T, text: impl FnOnce() -> Vec<String>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            for line in text() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// `label: value` with the value rendered as compact JSON
pub fn labeled<T: Serialize>(label: &str, value: &T) -> String {
    let rendered = serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".to_string());
    format!("{}: {}", label, rendered)
}
