use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "memo",
    version,
    about,
    long_about = "Keep markdown memos in a local SQLite file or a Supabase table"
)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args, Serialize)]
pub struct ConfigArgs {
    /// Profile name, or path to a profile TOML file
    #[arg(long, short, env = "MEMO_PROFILE")]
    pub profile_path: Option<String>,
}

#[derive(Debug, Subcommand, Serialize, PartialEq)]
pub enum Command {
    /// Prints out current configuration
    Config,
    #[command(flatten)]
    Memo(MemoCommand),
}

/// Subcommands that need an open memo store
#[derive(Debug, Subcommand, Serialize, PartialEq)]
pub enum MemoCommand {
    /// Lists memos, newest first
    List(ListArgs),
    /// Creates a new memo
    Add(AddArgs),
    /// Shows a single memo
    Show(ShowArgs),
    /// Replaces the fields of a memo
    Edit(EditArgs),
    /// Deletes memos
    Delete(DeleteArgs),
    /// Finds memos whose title or content contains the query
    Search(SearchArgs),
    /// Deletes every memo
    Clear(ClearArgs),
    /// Counts memos per category
    Stats(StatsArgs),
}

#[derive(Debug, Clone, Default, ValueEnum, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Plain,
    Json,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct ListArgs {
    /// Only memos in this category ("all" lists everything)
    #[arg(long, short)]
    pub category: Option<String>,

    /// Output format (pretty, plain, or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct AddArgs {
    /// Memo title
    #[arg(long, short)]
    pub title: Option<String>,

    /// Memo category (defaults to the profile's default category)
    #[arg(long, short)]
    pub category: Option<String>,

    /// Tags (can be specified multiple times or comma-separated)
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tag: Vec<String>,

    /// Open in external editor for interactive editing
    #[arg(long, short, default_value_t = false)]
    pub edit: bool,

    /// Memo content
    #[arg(value_name = "CONTENT")]
    pub content: Vec<String>,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct ShowArgs {
    /// Memo ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output format (pretty, plain, or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct EditArgs {
    /// Memo ID to edit
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long, short)]
    pub title: Option<String>,

    /// New category
    #[arg(long, short)]
    pub category: Option<String>,

    /// New tags, replacing the current ones (comma-separated)
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tag: Option<Vec<String>>,

    /// New content
    #[arg(long)]
    pub content: Option<String>,
}

impl EditArgs {
    /// Without any field flag the memo is edited in the external editor
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some() || self.category.is_some() || self.tag.is_some() || self.content.is_some()
    }
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct DeleteArgs {
    /// Memo ID(s) to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct SearchArgs {
    /// Text to look for; an empty query lists every memo
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Output format (pretty, plain, or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Args, Serialize, PartialEq)]
pub struct StatsArgs {
    /// Output format (pretty, plain, or json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn parse(args: &[&str]) -> MemoCommand {
        let mut argv = vec!["memo"];
        argv.extend_from_slice(args);
        match CliArgs::try_parse_from(argv).unwrap().command.unwrap() {
            Command::Memo(command) => command,
            Command::Config => unreachable!("memo subcommand expected"),
        }
    }

    #[test]
    fn test_add_with_tags_and_content() {
        let command = parse(&[
            "add", "--title", "Plan", "-c", "work", "--tag", "a,b", "--tag", "c", "write", "it",
        ]);

        assert_eq!(
            command,
            MemoCommand::Add(AddArgs {
                title: Some("Plan".to_string()),
                category: Some("work".to_string()),
                tag: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                edit: false,
                content: vec!["write".to_string(), "it".to_string()],
            })
        );
    }

    #[test]
    fn test_edit_without_fields_uses_editor() {
        let MemoCommand::Edit(args) = parse(&["edit", "01HX"]) else {
            unreachable!("edit subcommand expected")
        };
        assert!(!args.has_field_changes());

        let MemoCommand::Edit(args) = parse(&["edit", "01HX", "--tag", "a,b"]) else {
            unreachable!("edit subcommand expected")
        };
        assert!(args.has_field_changes());
    }

    #[test]
    fn test_search_collects_words() {
        let command = parse(&["search", "--output", "json", "release", "notes"]);

        assert_eq!(
            command,
            MemoCommand::Search(SearchArgs {
                query: vec!["release".to_string(), "notes".to_string()],
                output: OutputFormat::Json,
            })
        );
    }

    #[test]
    fn test_flags_after_query_words() {
        let command = parse(&["search", "release", "notes", "--output", "json"]);

        assert_eq!(
            command,
            MemoCommand::Search(SearchArgs {
                query: vec!["release".to_string(), "notes".to_string()],
                output: OutputFormat::Json,
            })
        );

        let command = parse(&["add", "buy", "milk", "--title", "Shop", "--tag", "home"]);
        let MemoCommand::Add(args) = command else {
            unreachable!("add subcommand expected")
        };
        assert_eq!(args.title.as_deref(), Some("Shop"));
        assert_eq!(args.tag, vec!["home"]);
        assert_eq!(args.content, vec!["buy", "milk"]);
    }

    #[test]
    fn test_config_is_not_a_memo_command() {
        let args = CliArgs::try_parse_from(["memo", "config"]).unwrap();

        assert_eq!(args.command, Some(Command::Config));
    }

    #[test]
    fn test_delete_requires_an_id() {
        assert!(CliArgs::try_parse_from(["memo", "delete"]).is_err());
    }
}
