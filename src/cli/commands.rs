use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::filter::FilterMode;

#[derive(Parser)]
#[command(name = "gd", about = concat!("glassdo v", env!("CARGO_PKG_VERSION"), " - clarity in every task"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// List tasks (the default when no command is given)
    List(ListArgs),
    /// Mark a task done, or not done again
    Toggle(IdArg),
    /// Change a task's text
    Edit(EditArgs),
    /// Delete a task
    Rm(IdArg),
    /// Add a task and let the AI break it down into subtasks
    Suggest(AddArgs),
    /// Show or change the colour theme
    Theme(ThemeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
    /// Due date: YYYY-MM-DD, YYYY-MM-DDTHH:MM, or RFC 3339
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Which tasks to show
    #[arg(long, short, value_enum, ignore_case = true, default_value_t = FilterMode::All)]
    pub filter: FilterMode,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID (any unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (any unique prefix)
    pub id: String,
    /// New text (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// New theme; omit to print the current one
    pub action: Option<ThemeAction>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

/// Join multi-word text arguments into one string
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}
