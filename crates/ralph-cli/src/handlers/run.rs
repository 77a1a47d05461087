//! `ralph run`: launch a command under supervision and stream its log.

use anyhow::Result;
use ralph_core::ProcessEvent;
use ralph_runtime::LaunchSpec;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::bootstrap::CliContext;
use crate::commands::RunArgs;
use crate::error::CliError;

use super::print_lines;

/// Exit code reported when the run is interrupted with Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Terminate each scripted response with a newline, as typed at a prompt.
fn as_typed(response: String) -> String {
    if response.ends_with('\n') {
        response
    } else {
        response + "\n"
    }
}

/// Execute the run command. Returns the exit code of the supervised
/// command.
pub async fn execute(ctx: &CliContext, args: RunArgs) -> Result<i32> {
    let RunArgs {
        project,
        cwd,
        watch,
        auto_respond,
        command,
    } = args;

    if project.trim().is_empty() {
        return Err(CliError::Arguments("project name must not be empty".to_string()).into());
    }
    let cwd = match cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().map_err(CliError::from)?,
    };

    let spec = LaunchSpec::new(&project, command, cwd)
        .with_auto_respond(auto_respond.into_iter().map(as_typed));

    let mut events = ctx.supervisor.events().subscribe();
    let mut logs = ctx.supervisor.subscribe_logs(&project);
    if let Some(history) = logs.history() {
        print_lines(history.lines())?;
    }

    let process = ctx
        .supervisor
        .launch_project(spec, &watch)
        .await
        .map_err(CliError::from)?;
    info!(project = %project, pid = ?process.pid(), "Supervising");

    let exit_code = loop {
        tokio::select! {
            message = logs.next() => print_lines(message.lines())?,
            event = events.recv() => {
                match event {
                    Ok(ProcessEvent::Exited { project: exited, exit_code }) if exited == project => {
                        while let Some(message) = logs.try_next() {
                            print_lines(message.lines())?;
                        }
                        break exit_code;
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break process.wait().await.unwrap_or(1),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!(project = %project, "Interrupted, stopping");
                ctx.supervisor.stop_project(&project).await;
                break INTERRUPTED_EXIT_CODE;
            }
        }
    };

    ctx.supervisor.shutdown().await;
    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{CliConfig, bootstrap};
    use ralph_core::{ProcessStatus, Settings};
    use std::path::PathBuf;

    fn context() -> CliContext {
        bootstrap(CliConfig {
            config_path: PathBuf::from("/nonexistent/config.json"),
            settings: Settings::with_defaults(),
        })
    }

    fn args(command: &[&str]) -> RunArgs {
        RunArgs {
            project: "alpha".to_string(),
            cwd: Some(std::env::temp_dir()),
            watch: Vec::new(),
            auto_respond: Vec::new(),
            command: command.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_responses_are_newline_terminated() {
        assert_eq!(as_typed("y".to_string()), "y\n");
        assert_eq!(as_typed("y\n".to_string()), "y\n");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_run_returns_child_exit_code() {
        let ctx = context();
        let code = execute(&ctx, args(&["sh", "-c", "echo hi; exit 3"]))
            .await
            .unwrap();
        assert_eq!(code, 3);
        assert_eq!(ctx.supervisor.status("alpha").await, ProcessStatus::Error);
        assert_eq!(
            ctx.supervisor.logs().get_logs("alpha", 0, None, None),
            vec!["hi"]
        );
    }

    #[tokio::test]
    async fn test_missing_executable_maps_to_127() {
        let ctx = context();
        let err = execute(&ctx, args(&["definitely-not-an-installed-agent"]))
            .await
            .unwrap_err();
        let cli_err = err.downcast_ref::<CliError>().expect("CliError");
        assert_eq!(cli_err.exit_code(), 127);
    }

    #[tokio::test]
    async fn test_empty_project_is_rejected() {
        let ctx = context();
        let mut run = args(&["true"]);
        run.project = " ".to_string();
        let err = execute(&ctx, run).await.unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().map(CliError::exit_code), Some(2));
    }
}
