use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{ApiClient, RestTaskRepository},
    config::FileConfigStore,
    tui::{run_tui, App},
};
use application::{AppError, TaskStore};
use domain::{derive_page, DomainError, NewTask, SortField, SortOrder, TaskId, ViewState};
use ports::ConfigStore;

const API_URL_ENV: &str = "TASKDESK_API_URL";

fn cli() -> Command {
    Command::new("taskdesk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A terminal task manager backed by a REST /posts resource")
        .long_about("A keyboard-driven terminal interface for listing, filtering, editing and creating tasks.\n\nRun without a subcommand to open the interactive UI.")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .help("Base URL of the task API (can also be set via TASKDESK_API_URL env var)")
                .global(true),
        )
        .subcommand(
            Command::new("tasks")
                .about("Task operations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("Print one page of tasks as JSON")
                        .arg(
                            Arg::new("filter")
                                .long("filter")
                                .value_name("TEXT")
                                .help("Case-insensitive title filter"),
                        )
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .value_name("FIELD")
                                .value_parser(["title", "body"])
                                .default_value("title")
                                .help("Field to sort by"),
                        )
                        .arg(
                            Arg::new("desc")
                                .long("desc")
                                .action(ArgAction::SetTrue)
                                .help("Sort descending"),
                        )
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_name("N")
                                .value_parser(value_parser!(usize))
                                .default_value("1")
                                .help("1-based page number"),
                        ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Create a task and print it as JSON")
                        .arg(title_arg())
                        .arg(body_arg()),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Replace a task's title and description")
                        .arg(id_arg())
                        .arg(title_arg())
                        .arg(body_arg()),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a task")
                        .arg(id_arg()),
                ),
        )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .help("Task ID")
        .required(true)
        .index(1)
        .value_parser(value_parser!(u64))
}

fn title_arg() -> Arg {
    Arg::new("title")
        .long("title")
        .value_name("TITLE")
        .required(true)
        .help("Task title")
}

fn body_arg() -> Arg {
    Arg::new("body")
        .long("body")
        .value_name("TEXT")
        .required(true)
        .help("Task description")
}

fn required_str<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn list_view(matches: &ArgMatches) -> Result<ViewState> {
    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);
    if page == 0 {
        return Err(AppError::from(DomainError::InvalidPage(page)).into());
    }

    let sort_field = required_str(matches, "sort")
        .parse::<SortField>()
        .map_err(AppError::Application)?;

    Ok(ViewState {
        filter: matches
            .get_one::<String>("filter")
            .cloned()
            .unwrap_or_default(),
        sort_field,
        sort_order: if matches.get_flag("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        },
        current_page: page,
    })
}

/// Edit values are sent as given, blank ones included, the same as an inline save.
fn edit_values(matches: &ArgMatches) -> (TaskId, String, String) {
    (
        TaskId(matches.get_one::<u64>("id").copied().unwrap_or_default()),
        required_str(matches, "title").to_string(),
        required_str(matches, "body").to_string(),
    )
}

async fn run_tasks_command(store: Arc<TaskStore>, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", list_matches)) => {
            let view = list_view(list_matches)?;
            store.load().await?;

            let page = derive_page(&store.snapshot().await, &view);
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Some(("add", add_matches)) => {
            let new_task = NewTask::new(
                required_str(add_matches, "title"),
                required_str(add_matches, "body"),
            )
            .map_err(AppError::from)?;

            let task = store.add(&new_task).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Some(("edit", edit_matches)) => {
            let (id, title, body) = edit_values(edit_matches);

            // Edits only apply to tasks present in the loaded collection
            store.load().await?;
            match store.edit(id, title, body).await? {
                Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
                None => {
                    return Err(AppError::Application(format!("Task {id} not found")).into())
                }
            }
        }
        Some(("delete", delete_matches)) => {
            let id = TaskId(
                delete_matches
                    .get_one::<u64>("id")
                    .copied()
                    .unwrap_or_default(),
            );
            store.delete(id).await?;
            println!("{}", serde_json::json!({ "deleted": id }));
        }
        _ => {
            eprintln!("❌ Unknown tasks subcommand");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Log to a file; stdout belongs to the terminal UI and the JSON output
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("taskdesk.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .init();

    let matches = cli().get_matches();

    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;

    // Command line beats the environment, which beats the config file
    if let Some(url) = matches.get_one::<String>("api-url") {
        config.api_base_url = url.clone();
        config_store.save_config(&config).await?;
    } else if let Ok(url) = std::env::var(API_URL_ENV) {
        config.api_base_url = url;
    }

    tracing::info!("Using task API at {}", config.api_base_url);

    let client = ApiClient::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.request_timeout_seconds),
    )?;
    let repository = Arc::new(RestTaskRepository::new(client));
    let store = Arc::new(TaskStore::new(repository));

    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => {
            if let Err(e) = run_tasks_command(store, tasks_matches).await {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
        }
        None => {
            let app = App::new(store);

            if let Err(e) = run_tui(app).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["taskdesk", "tasks", "list"];
        argv.extend_from_slice(args);
        let matches = cli().try_get_matches_from(argv).unwrap();
        let (_, tasks) = matches.subcommand().unwrap();
        let (_, list) = tasks.subcommand().unwrap();
        list.clone()
    }

    #[test]
    fn test_list_defaults() {
        let view = list_view(&list_matches(&[])).unwrap();
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn test_list_flags_build_view_state() {
        let view = list_view(&list_matches(&[
            "--filter", "Foo", "--sort", "body", "--desc", "--page", "3",
        ]))
        .unwrap();

        assert_eq!(view.filter, "Foo");
        assert_eq!(view.sort_field, SortField::Body);
        assert_eq!(view.sort_order, SortOrder::Desc);
        assert_eq!(view.current_page, 3);
    }

    #[test]
    fn test_list_rejects_page_zero() {
        assert!(list_view(&list_matches(&["--page", "0"])).is_err());
    }

    #[test]
    fn test_edit_requires_numeric_id() {
        let result = cli().try_get_matches_from([
            "taskdesk", "tasks", "edit", "abc", "--title", "t", "--body", "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_keeps_blank_values() {
        let matches = cli()
            .try_get_matches_from([
                "taskdesk", "tasks", "edit", "7", "--title", "  ", "--body", "",
            ])
            .unwrap();
        let (_, tasks) = matches.subcommand().unwrap();
        let (_, edit) = tasks.subcommand().unwrap();

        assert_eq!(
            edit_values(edit),
            (TaskId(7), "  ".to_string(), String::new())
        );
    }

    #[test]
    fn test_api_url_is_global() {
        let matches = cli()
            .try_get_matches_from(["taskdesk", "tasks", "delete", "5", "--api-url", "http://x"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("api-url").map(String::as_str),
            Some("http://x")
        );
    }
}
