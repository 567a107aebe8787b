use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tick_core::{Task, TaskDraft, TaskPatch};
use tick_storage::{create_task, delete_task, get_task, list_tasks, update_task};
use tick_storage_sqlite::SqliteStore;

#[derive(Parser)]
#[command(name = "tick", version, about = "A minimalist task tracker")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new task
    Add {
        content: String,
        /// Priority from 1 (low) to 3 (high)
        #[arg(short, long, default_value_t = 1)]
        priority: i64,
        /// Category label
        #[arg(short, long, default_value = "general")]
        category: String,
    },

    /// Show one task in full
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },

    /// List tasks, optionally filtered by status
    List {
        /// Only completed tasks
        #[arg(long, conflicts_with = "pending")]
        done: bool,
        /// Only open tasks
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing task
    Update {
        id: i64,
        /// New task text
        #[arg(short = 'm', long)]
        content: Option<String>,
        /// New priority (1-3)
        #[arg(short, long)]
        priority: Option<i64>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// Mark as done
        #[arg(long, conflicts_with = "pending")]
        done: bool,
        /// Mark as open again
        #[arg(long)]
        pending: bool,
    },

    /// Remove a task
    Rm { id: i64 },

    /// Create the database and schema
    InitDb,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let store = SqliteStore::open_default()?;

    match cli.cmd {
        Command::Add { content, priority, category } => {
            let draft = TaskDraft::new(content).with_priority(priority).with_category(category);
            let task = create_task(&store, &draft)?;
            println!("Added task {}: {}", task.id, task.content);
        }
        Command::Show { id, json } => {
            let Some(task) = get_task(&store, id)? else {
                bail!("task {id} not found");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("Task {}", task.id);
                println!("  content:  {}", task.content);
                println!("  priority: {}", priority_label(task.priority));
                println!("  category: {}", task.category);
                println!("  status:   {}", if task.is_done { "done" } else { "pending" });
                println!("  created:  {}", format_timestamp(task.created_at_unix));
            }
        }
        Command::List { done, pending, json } => {
            let filter = status_filter(done, pending);
            let tasks = list_tasks(&store, filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &tasks {
                    print_task_line(task);
                }
            }
        }
        Command::Update { id, content, priority, category, done, pending } => {
            let patch = TaskPatch {
                content,
                priority,
                category,
                is_done: status_filter(done, pending),
            };
            // The repository treats an empty patch as a no-op; at the CLI
            // it means the user forgot every flag.
            if patch.is_empty() {
                bail!("no update fields provided");
            }
            let Some(task) = update_task(&store, id, &patch)? else {
                bail!("task {id} not found");
            };
            println!("Updated task {}", task.id);
        }
        Command::Rm { id } => {
            if !delete_task(&store, id)? {
                bail!("task {id} not found");
            }
            println!("Deleted task {id}");
        }
        Command::InitDb => {
            // open_default already applied the schema; run it again so the
            // command stays meaningful (and harmless) on an existing db.
            store.init_schema()?;
            println!("Database ready at {}", tick_storage_sqlite::resolve_db_path().display());
        }
    }

    Ok(())
}

/// Two mutually exclusive flags folded into the optional filter/patch value.
fn status_filter(done: bool, pending: bool) -> Option<bool> {
    match (done, pending) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn priority_label(priority: i64) -> String {
    match priority {
        1 => "1 (low)".to_string(),
        2 => "2 (medium)".to_string(),
        3 => "3 (high)".to_string(),
        other => other.to_string(),
    }
}

fn format_timestamp(unix: i64) -> String {
    chrono::DateTime::from_timestamp(unix, 0)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| unix.to_string())
}

fn print_task_line(task: &Task) {
    let mark = if task.is_done { "x" } else { " " };
    println!(
        "{:>4} [{}] p{} ({}) {}",
        task.id, mark, task.priority, task.category, task.content
    );
}
