use crate::format::{self, Formattable};
use libklippy::{AccessReport, FormattedCommand, ImageOverview, Klippy, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

pub mod handlers;

/// Tags of one repository, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagList {
    pub reference: String,
    pub tags: Vec<String>,
}

impl Formattable for TagList {
    fn format_pretty(&self, _color: bool) -> String {
        if self.tags.is_empty() {
            return format!("No tags found for image '{}'.", self.reference);
        }
        self.tags
            .iter()
            .map(|tag| format!("\t{}", tag))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build commands of one image, in manifest history order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandList {
    pub reference: String,
    pub commands: Vec<FormattedCommand>,
}

/// One table row of `image commands`.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
struct CommandRow {
    #[tabled(rename = "LAYER")]
    layer: usize,
    #[tabled(rename = "COMMAND")]
    command: String,
}

impl Formattable for CommandList {
    fn format_pretty(&self, color: bool) -> String {
        if self.commands.is_empty() {
            return format!("No build history found for image '{}'.", self.reference);
        }

        let rows: Vec<CommandRow> = self
            .commands
            .iter()
            .map(|command| CommandRow {
                layer: command.layer,
                command: format::colorize_command(command, color),
            })
            .collect();

        Table::new(&rows).with(Style::empty()).to_string()
    }
}

impl Formattable for ImageOverview {
    fn format_pretty(&self, color: bool) -> String {
        let label = |text: &str| {
            if color {
                text.bold().to_string()
            } else {
                text.to_string()
            }
        };

        let mut lines = vec![
            format!("{}   {}", label("Name:"), self.name),
            format!("{}   {}", label("Arch:"), self.architecture),
            format!("{}    {}", label("Tag:"), self.tag),
            format!("{}", label("Layers:")),
        ];
        for (index, blob_sum) in self.layers.iter().enumerate() {
            lines.push(format!("  Layer [{}]:  {}", index, blob_sum));
        }
        lines.join("\n")
    }
}

impl Formattable for AccessReport {
    fn format_pretty(&self, color: bool) -> String {
        let api_version = self.api_version.as_deref().unwrap_or("unknown");
        let token = if self.token_issued {
            "issued"
        } else {
            "not required"
        };

        format!(
            "{} {} is accessible\n  Registry API:  {}\n  Pull token:    {}",
            format::checkmark(color),
            self.reference,
            api_version,
            token
        )
    }
}

/// Lists the tags of the reference's repository.
pub async fn fetch_tags(klippy: &Klippy, reference: &str) -> Result<TagList> {
    let tags = klippy.list_tags(reference).await?;
    Ok(TagList {
        reference: reference.to_string(),
        tags,
    })
}

/// Reconstructs the build commands of the referenced image.
pub async fn fetch_commands(klippy: &Klippy, reference: &str) -> Result<CommandList> {
    let commands = klippy.build_commands(reference).await?;
    Ok(CommandList {
        reference: reference.to_string(),
        commands,
    })
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
