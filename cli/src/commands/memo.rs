use std::io::{self, Write};

use anyhow::Context;
use memo_core::{MemoFormData, MemoRepository};

use crate::{
    app_config::AppConfig,
    args::{AddArgs, ClearArgs, EditArgs, MemoCommand, OutputFormat},
    editor::Editor,
    formatters::MemoFormatter,
};

pub async fn memo_cmd(
    repo: &MemoRepository,
    config: &AppConfig,
    command: MemoCommand,
) -> Result<(), anyhow::Error> {
    match command {
        MemoCommand::List(args) => {
            let memos = match args.category {
                Some(category) => repo.get_by_category(&category).await,
                None => repo.get_all().await,
            };
            print_with(args.output, |f| f.print_memos(&memos))?;
        }
        MemoCommand::Add(args) => {
            let form = add_form(config, args)?;
            let memo = repo.add(&form).await.context("Failed to add memo")?;

            println!("Memo added successfully ({})", memo.id);
        }
        MemoCommand::Show(args) => {
            let memo = repo
                .get_by_id(&args.id)
                .await
                .with_context(|| format!("Memo {} not found", args.id))?;
            print_with(args.output, |f| f.print_memo(&memo))?;
        }
        MemoCommand::Edit(args) => {
            let current = repo
                .find_by_id(&args.id)
                .await
                .context("Failed to load memo")?
                .with_context(|| format!("Memo {} not found", args.id))?;

            let form = edit_form(MemoFormData::from(&current), &args)?;
            let memo = repo
                .update(&args.id, &form)
                .await
                .context("Failed to update memo")?;

            println!("Memo updated successfully ({})", memo.id);
        }
        MemoCommand::Delete(args) => {
            for id in &args.ids {
                repo.remove(id)
                    .await
                    .with_context(|| format!("Failed to delete memo {}", id))?;
                println!("Deleted memo {}", id);
            }
        }
        MemoCommand::Search(args) => {
            let memos = repo.search(&args.query.join(" ")).await;
            print_with(args.output, |f| f.print_memos(&memos))?;
        }
        MemoCommand::Clear(args) => {
            if !confirm_clear(&args)? {
                println!("Aborted");
                return Ok(());
            }
            repo.clear_all().await.context("Failed to clear memos")?;

            println!("All memos deleted");
        }
        MemoCommand::Stats(args) => {
            let stats = repo.get_stats().await;
            print_with(args.output, |f| f.print_stats(&stats))?;
        }
    };

    Ok(())
}

fn print_with(
    output: OutputFormat,
    print: impl FnOnce(&mut MemoFormatter<termcolor::StandardStream>) -> io::Result<()>,
) -> Result<(), anyhow::Error> {
    let mut formatter = MemoFormatter::stdout(output);
    print(&mut formatter).map_err(|e| anyhow::anyhow!("Error while formatting memos: {}", e))
}

fn add_form(config: &AppConfig, args: AddArgs) -> anyhow::Result<MemoFormData> {
    let form = MemoFormData {
        title: args.title.unwrap_or_default(),
        content: args.content.join(" "),
        category: args
            .category
            .unwrap_or_else(|| config.default_category.clone()),
        tags: clean_tags(args.tag),
    };

    if args.edit {
        return Editor::from_env().open(&form);
    }

    if form.title.trim().is_empty() {
        anyhow::bail!("A title is required; pass --title or use --edit");
    }
    Ok(form)
}

/// Field flags replace single fields of the current memo; without them the whole
/// memo goes through the editor. Either way the result is a full replacement.
fn edit_form(mut form: MemoFormData, args: &EditArgs) -> anyhow::Result<MemoFormData> {
    if !args.has_field_changes() {
        return Editor::from_env().open(&form);
    }

    if let Some(title) = &args.title {
        form.title = title.clone();
    }
    if let Some(category) = &args.category {
        form.category = category.clone();
    }
    if let Some(tags) = &args.tag {
        form.tags = clean_tags(tags.clone());
    }
    if let Some(content) = &args.content {
        form.content = content.clone();
    }
    Ok(form)
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn confirm_clear(args: &ClearArgs) -> anyhow::Result<bool> {
    if args.yes {
        return Ok(true);
    }

    print!("Delete ALL memos? This cannot be undone. [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn edit_args(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            title: None,
            category: None,
            tag: None,
            content: None,
        }
    }

    #[test]
    fn test_edit_form_replaces_only_given_fields() {
        let current = MemoFormData::new("Old", "old body", "work").with_tags(["keep"]);
        let args = EditArgs {
            title: Some("New".to_string()),
            tag: Some(vec![" a ".to_string(), "".to_string()]),
            ..edit_args("1")
        };

        let form = edit_form(current, &args).unwrap();

        assert_eq!(form.title, "New");
        assert_eq!(form.content, "old body");
        assert_eq!(form.category, "work");
        assert_eq!(form.tags, vec!["a"]);
    }

    #[test]
    fn test_clean_tags() {
        assert_eq!(
            clean_tags(vec!["x".to_string(), "  ".to_string(), " y".to_string()]),
            vec!["x", "y"]
        );
    }
}
