use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("[+] taskdeck v", env!("CARGO_PKG_VERSION"), " - a task list that stays on your machine"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the list
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Toggle a task's completion
    Toggle(ToggleArgs),
    /// Delete a task
    Rm(RmArgs),
}

// ---------------------------------------------------------------------------
// Command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD, today or later)
    #[arg(long)]
    pub due: Option<String>,
    /// Priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// Category label
    #[arg(long)]
    pub category: Option<String>,
    /// Category display color (e.g. #ff8800)
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show only tasks not yet completed
    #[arg(long, conflicts_with = "completed")]
    pub active: bool,
    /// Show only completed tasks
    #[arg(long)]
    pub completed: bool,
    /// Order by creation time (asc or desc)
    #[arg(long, default_value = "asc")]
    pub sort: String,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: String,
}
