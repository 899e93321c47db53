use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::storage::JsonFileStorage;
use crate::local::{LocalStoreError, LocalTaskStore, SortDirection, TaskFilter};
use crate::model::local_task::TaskForm;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let mut store = open_store(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Add(args) => cmd_add(&mut store, args, json),
        Commands::List(args) => cmd_list(&store, args, json),
        Commands::Toggle(args) => cmd_toggle(&mut store, args),
        Commands::Rm(args) => cmd_rm(&mut store, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the data directory: -C flag, then taskdeck.toml in the
/// current directory, then the built-in default.
fn data_dir(flag: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(dir) = flag {
        return Ok(PathBuf::from(dir));
    }
    let cwd = std::env::current_dir()?;
    let config = config_io::read_config(&cwd)?;
    Ok(config.storage.data_dir)
}

fn open_store(flag: Option<&str>) -> Result<LocalTaskStore, Box<dyn std::error::Error>> {
    let dir = data_dir(flag)?;
    let storage = Arc::new(JsonFileStorage::new(dir));
    Ok(LocalTaskStore::load(storage))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_add(
    store: &mut LocalTaskStore,
    args: AddArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = TaskForm::new(args.title);
    form.description = args.description;
    form.category = args.category;
    form.color = args.color;
    if let Some(ref due) = args.due {
        form.due_date = Some(
            due.parse::<NaiveDate>()
                .map_err(|_| format!("invalid due date '{}' (expected YYYY-MM-DD)", due))?,
        );
    }
    if let Some(ref p) = args.priority {
        form.priority = parse_priority(p)?;
    }

    match store.add_task(form) {
        Ok(task) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
            } else {
                println!("{}", task.id);
            }
            Ok(())
        }
        Err(LocalStoreError::Invalid(errors)) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ValidationJson { errors })?
                );
            } else {
                for line in format_validation_errors(&errors) {
                    eprintln!("{}", line);
                }
            }
            Err("task not added".into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_list(
    store: &LocalTaskStore,
    args: ListArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if args.active {
        TaskFilter::Active
    } else if args.completed {
        TaskFilter::Completed
    } else {
        TaskFilter::All
    };
    let direction = match args.sort.as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => return Err(format!("unknown sort '{}' (expected: asc, desc)", other).into()),
    };

    let tasks = store.view(filter, direction);

    if json {
        let items: Vec<TaskJson> = tasks.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        if tasks.is_empty() {
            println!("(no tasks)");
        }
        for task in &tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_toggle(store: &mut LocalTaskStore, args: ToggleArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !store.toggle_completion(&args.id)? {
        return Err(format!("task not found: {}", args.id).into());
    }
    let task = store
        .tasks()
        .iter()
        .find(|t| t.id == args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let state = if task.is_completed { "done" } else { "open" };
    println!("{} → {}", args.id, state);
    Ok(())
}

fn cmd_rm(store: &mut LocalTaskStore, args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !store.delete_task(&args.id)? {
        return Err(format!("task not found: {}", args.id).into());
    }
    println!("{} deleted", args.id);
    Ok(())
}
