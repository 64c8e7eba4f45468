use crate::error::Result;
use crate::extractor::SearchRequest;
use crate::scanner::Extension;
use anyhow::Context;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::PathBuf;

/// Values already known from flags or config; used as prompt defaults.
#[derive(Debug, Default, Clone)]
pub struct PromptDefaults {
    pub root: Option<PathBuf>,
    pub extension: Option<String>,
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptAnswers {
    pub root: PathBuf,
    pub extension: String,
    pub destination: Option<PathBuf>,
}

impl PromptAnswers {
    pub fn into_request(self) -> Result<SearchRequest> {
        Ok(SearchRequest::new(self.root, &self.extension)?.with_destination(self.destination))
    }
}

/// Asks for the root folder, the extension and an optional destination.
pub fn ask_for_request(defaults: &PromptDefaults) -> anyhow::Result<PromptAnswers> {
    let theme = ColorfulTheme::default();

    let mut root_input = Input::<String>::with_theme(&theme)
        .with_prompt("Enter the path to the parent folder")
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if clean_path_input(input).is_empty() {
                Err("A folder path is required")
            } else {
                Ok(())
            }
        });
    if let Some(root) = &defaults.root {
        root_input = root_input.default(root.display().to_string());
    }
    let root: String = root_input
        .interact_text()
        .context("Failed to read the parent folder")?;

    let mut ext_input = Input::<String>::with_theme(&theme)
        .with_prompt("Enter the file extension (e.g. ipt or .ipt)")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            Extension::parse(input)
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a usable extension", input.trim()))
        });
    if let Some(ext) = &defaults.extension {
        ext_input = ext_input.default(ext.clone());
    }
    let extension: String = ext_input
        .interact_text()
        .context("Failed to read the file extension")?;

    let move_elsewhere = Confirm::with_theme(&theme)
        .with_prompt("Move files to a different folder?")
        .default(defaults.destination.is_some())
        .interact()
        .context("Failed to confirm destination choice")?;

    let destination = if move_elsewhere {
        let mut dest_input = Input::<String>::with_theme(&theme)
            .with_prompt("Enter the destination folder path");
        if let Some(dest) = &defaults.destination {
            dest_input = dest_input.default(dest.display().to_string());
        }
        let dest: String = dest_input
            .interact_text()
            .context("Failed to read the destination folder")?;
        Some(PathBuf::from(clean_path_input(&dest)))
    } else {
        println!("{}", style("Files will be moved into the parent folder.").dim());
        None
    };

    Ok(PromptAnswers {
        root: PathBuf::from(clean_path_input(&root)),
        extension: extension.trim().to_string(),
        destination,
    })
}

/// Strips whitespace and one pair of surrounding quotes, as left behind by
/// drag-and-drop into a terminal.
pub fn clean_path_input(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim().to_string();
        }
    }
    trimmed.to_string()
}
