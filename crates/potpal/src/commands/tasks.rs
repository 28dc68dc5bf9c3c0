//! To-do task commands.

use std::sync::Arc;

use tabled::Tabled;

use potpal_core::{DocumentId, TaskItem};

use crate::cli::{GlobalOpts, TasksCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    name: String,
    #[tabled(rename = "Done")]
    done: &'static str,
}

fn to_row(task: &Arc<TaskItem>) -> TaskRow {
    TaskRow {
        id: task.id.to_string(),
        name: task.name.clone(),
        done: if task.completed { "yes" } else { "" },
    }
}

fn render(global: &GlobalOpts, tasks: &[Arc<TaskItem>]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    let rendered = output::render_list(global.output, tasks, to_row, |t| t.id.to_string());
    output::print_output(&rendered);
}

pub async fn handle(cmd: TasksCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        TasksCommand::List { watch } => {
            super::with_session(global, |session| async move {
                render(global, &session.tasks_snapshot());

                if watch {
                    let mut stream = session.tasks();
                    while let Some(snapshot) = stream.changed().await {
                        println!();
                        render(global, &snapshot);
                    }
                }
                Ok(())
            })
            .await
        }

        TasksCommand::Add { name } => {
            super::with_session(global, |session| async move {
                session.add_task(&name).await?;
                Ok(())
            })
            .await?;
            output::ok_line(output::should_color(global.color), "Task added");
            Ok(())
        }

        TasksCommand::Done { id, undo } => {
            super::with_session(global, |session| async move {
                session
                    .set_task_completed(&DocumentId::from(id.as_str()), !undo)
                    .await?;
                Ok(())
            })
            .await?;
            output::ok_line(
                output::should_color(global.color),
                if undo { "Task reopened" } else { "Task completed" },
            );
            Ok(())
        }

        TasksCommand::Remove { id } => {
            super::with_session(global, |session| async move {
                session.delete_task(&DocumentId::from(id.as_str())).await?;
                Ok(())
            })
            .await?;
            output::ok_line(output::should_color(global.color), "Task removed");
            Ok(())
        }
    }
}
