use std::io::{self, Write};

use anyhow::Context;
use memo_core::MemoFormData;
use serde::{Deserialize, Serialize};

const DELIMITER: &str = "+++";

/// Front matter edited above the `+++` line; the memo body goes below it
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct EditorTemplate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub content: String,
}

impl EditorTemplate {
    pub fn from_form(form: &MemoFormData) -> Self {
        EditorTemplate {
            title: form.title.clone(),
            category: form.category.clone(),
            tags: form.tags.clone(),
            content: form.content.clone(),
        }
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let front = toml::to_string(self).context("Failed to render memo template")?;
        Ok(format!("{}{}\n{}", front, DELIMITER, self.content))
    }

    fn into_form(self) -> anyhow::Result<MemoFormData> {
        if self.title.trim().is_empty() {
            anyhow::bail!("title must not be empty");
        }

        Ok(MemoFormData {
            title: self.title,
            content: self.content,
            category: self.category,
            tags: self.tags,
        })
    }
}

pub struct Editor {
    command: String,
}

impl Editor {
    /// Uses `$VISUAL`, then `$EDITOR`, then `vi`
    pub fn from_env() -> Self {
        let command = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());
        Editor { command }
    }

    /// Format error message as safe TOML comments
    fn format_error_header(error: &anyhow::Error, content: &str) -> String {
        let error_lines = format!("{}", error)
            .lines()
            .map(|line| format!("# {}", line))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "# ===== PARSING ERROR =====\n{}\n# ===== Fix the issue below and save again =====\n\n{}",
            error_lines, content
        )
    }

    fn edit_text(&self, initial: &str) -> anyhow::Result<String> {
        let mut tempfile = tempfile::Builder::new()
            .suffix(".md")
            .tempfile()
            .context("Failed to create temporary file")?;
        tempfile
            .write_all(initial.as_bytes())
            .context("Failed to write initial content")?;

        // EDITOR may carry arguments, e.g. "code --wait"
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or("vi");

        let status = std::process::Command::new(program)
            .args(parts)
            .arg(tempfile.path())
            .status()
            .with_context(|| format!("Failed to open editor '{}'", self.command))?;

        if !status.success() {
            anyhow::bail!("Editor returned non-zero exit code");
        }

        std::fs::read_to_string(tempfile.path()).context("Failed to read temporary file")
    }

    /// Edit `initial` until it parses into a memo or the user aborts
    pub fn open(&self, initial: &MemoFormData) -> anyhow::Result<MemoFormData> {
        let mut current = EditorTemplate::from_form(initial).render()?;

        loop {
            let edited = self.edit_text(&current)?;

            let error = match parse_template(&edited).and_then(EditorTemplate::into_form) {
                Ok(form) => return Ok(form),
                Err(e) => e,
            };

            println!("Error parsing memo: {}\n", error);
            println!("Your changes have been preserved in the editor.");
            print!("[R]etry or [A]bort? (R/a): ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            match input.trim().to_lowercase().as_str() {
                "a" => anyhow::bail!("User aborted memo editing"),
                _ => current = Self::format_error_header(&error, &edited),
            }
        }
    }
}

/// Split on the first line that is exactly `+++` (surrounding whitespace allowed)
pub fn parse_template(text: &str) -> anyhow::Result<EditorTemplate> {
    let lines: Vec<&str> = text.lines().collect();

    let (front, body) = match lines.iter().position(|line| line.trim() == DELIMITER) {
        Some(pos) => (&lines[..pos], &lines[pos + 1..]),
        None => (lines.as_slice(), &[] as &[&str]),
    };

    let mut template =
        toml::from_str::<EditorTemplate>(&front.join("\n")).context("Invalid memo header")?;
    template.content = body.join("\n");

    Ok(template)
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_render_then_parse_keeps_form() {
        let form = MemoFormData::new("Weekly plan", "# Monday\n\n- ship it", "work")
            .with_tags(["planning"]);

        let rendered = EditorTemplate::from_form(&form).render().unwrap();
        assert!(rendered.starts_with("title = \"Weekly plan\""));

        let parsed = parse_template(&rendered).unwrap().into_form().unwrap();
        assert_eq!(parsed, form);
    }

    #[test]
    fn test_parse_template_with_plus_in_content() {
        let template = r#"title = "C"
tags = ["programming"]
+++
Learning C+++ today
Some more content with +++ in the middle"#;

        let parsed = parse_template(template).unwrap();

        assert_eq!(parsed.tags, vec!["programming"]);
        assert_eq!(
            parsed.content,
            "Learning C+++ today\nSome more content with +++ in the middle"
        );
    }

    #[test]
    fn test_parse_template_delimiter_with_whitespace() {
        let parsed = parse_template("title = \"x\"\n   +++  \nContent here").unwrap();

        assert_eq!(parsed.content, "Content here");
    }

    #[test]
    fn test_parse_template_no_delimiter() {
        let parsed = parse_template("title = \"only header\"\ncategory = \"misc\"").unwrap();

        assert_eq!(parsed.category, "misc");
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_empty_title_is_rejected() {
        let parsed = parse_template("category = \"misc\"\n+++\nbody").unwrap();

        assert!(parsed.into_form().is_err());
    }

    #[test]
    fn test_invalid_header_is_error() {
        assert!(parse_template("title = \"unterminated\n+++\nbody").is_err());
    }

    #[test]
    fn test_format_error_header_comments_every_line() {
        let error = anyhow::anyhow!("Line 1 error\nLine 2 error");

        let formatted = Editor::format_error_header(&error, "title = \"x\"\n+++\nbody");

        assert!(formatted.contains("# Line 1 error"));
        assert!(formatted.contains("# Line 2 error"));
        assert!(formatted.ends_with("body"));

        // The commented header still parses on the next attempt
        let parsed = parse_template(&formatted).unwrap();
        assert_eq!(parsed.title, "x");
    }
}
