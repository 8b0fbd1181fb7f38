//! `config show`: display the effective configuration.

use owo_colors::OwoColorize;

use super::CommandOutput;
use crate::config::Config;
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(config: &Config, output_json: bool) -> Result<()> {
    let json_output = serde_json::to_value(config)?;

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text_output.push_str(&serde_yaml_ng::to_string(config)?);
    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output_json)
}
