use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use planboard_client::{
    api::WorkspaceState,
    feedback::{Navigator, Notifier},
    flows::{
        CreateProject, CreateTask, CreateWorkspace, JoinWorkspace, MemberList, Outcome,
        TaskActions, WorkspaceSettings,
    },
    invite::parse_invite_link,
    upload::{load_file, ImageStager},
    ClientConfig, ClientContext, ConfirmGate, Feedback, Route, Toast, ToastKind,
};
use planboard_shared::{api::TaskFilter, MemberRole, TaskStatus, Trend};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Prints toasts and navigation to the terminal.
struct TerminalFeedback;

impl Notifier for TerminalFeedback {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Success => println!("✓ {}", toast.message),
            ToastKind::Error => eprintln!("✗ {}", toast.message),
        }
    }
}

impl Navigator for TerminalFeedback {
    fn navigate(&self, route: Route) {
        println!("→ {}", route);
    }
}

struct Args {
    command: String,
    positional: Vec<String>,
    image: Option<PathBuf>,
    project: Option<Uuid>,
    assume_yes: bool,
}

fn print_usage() {
    println!("Usage: planboard [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  workspaces                                List your workspaces");
    println!("  use <workspaceId>                         Select the workspace to work in");
    println!("  create-workspace <name> [--image <path>]  Create a workspace");
    println!("  join <inviteLink>                         Join a workspace from an invite link");
    println!("  invite-link                               Print the invite link");
    println!("  reset-invite                              Invalidate the invite link and make a new one");
    println!("  delete-workspace                          Delete the selected workspace");
    println!("  projects                                  List projects");
    println!("  create-project <name> [--image <path>]    Create a project");
    println!("  tasks [--project <projectId>]             List tasks");
    println!("  create-task <projectId> <assigneeId> <name>");
    println!("  move-task <taskId> <STATUS>               BACKLOG, TODO, IN_PROGRESS, IN_REVIEW or DONE");
    println!("  delete-task <taskId>");
    println!("  members                                   List members");
    println!("  set-role <memberId> <ADMIN|MEMBER>");
    println!("  remove-member <memberId>");
    println!("  analytics                                 This month against last month");
    println!();
    println!("Options:");
    println!("  --yes, -y      Answer yes to confirmation prompts");
    println!("  --help, -h     Show this help message");
}

fn parse_args() -> Result<Option<Args>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut positional = Vec::new();
    let mut image = None;
    let mut project = None;
    let mut assume_yes = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--yes" | "-y" => {
                assume_yes = true;
                i += 1;
            }
            "--image" => {
                let path = args.get(i + 1).context("--image requires a path")?;
                image = Some(PathBuf::from(path));
                i += 2;
            }
            "--project" => {
                let id = args.get(i + 1).context("--project requires a project id")?;
                project = Some(Uuid::parse_str(id).context("--project must be a UUID")?);
                i += 2;
            }
            "--help" | "-h" => return Ok(None),
            other if other.starts_with("--") => bail!("Unknown argument: {}", other),
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }

    if positional.is_empty() {
        return Ok(None);
    }
    let command = positional.remove(0);
    Ok(Some(Args {
        command,
        positional,
        image,
        project,
        assume_yes,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planboard=info,planboard_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Some(args) = parse_args()? else {
        print_usage();
        return Ok(());
    };

    let config = ClientConfig::from_env()?;
    if config.identity.is_none() {
        bail!("PLANBOARD_USER_ID must be set");
    }
    let feedback = Feedback::new(Arc::new(TerminalFeedback), Arc::new(TerminalFeedback));
    let ctx = ClientContext::from_config(&config, feedback);

    run(&ctx, args).await
}

async fn run(ctx: &ClientContext, args: Args) -> Result<()> {
    let queries = ctx.queries();

    match args.command.as_str() {
        "workspaces" => {
            let current = WorkspaceState::load()?.map(|state| state.workspace_id);
            let workspaces = queries.workspaces().await?;
            for workspace in &workspaces.documents {
                let marker = if Some(workspace.id) == current { "*" } else { " " };
                println!("{} {}  {}", marker, workspace.id, workspace.name);
            }
        }
        "use" => {
            let workspace_id = parse_id(arg(&args, 0, "workspaceId")?)?;
            let workspace = queries.workspace(workspace_id).await?;
            WorkspaceState::save(workspace.id)?;
            println!("Using workspace {}", workspace.name);
        }
        "create-workspace" => {
            let mut flow = CreateWorkspace::new(ctx);
            flow.name = arg(&args, 0, "name")?.to_string();
            stage_image(&mut flow.image, args.image.as_ref()).await?;
            if let Some(workspace) = finish(flow.submit().await)? {
                WorkspaceState::save(workspace.id)?;
            }
        }
        "join" => {
            let invite = parse_invite_link(arg(&args, 0, "inviteLink")?)?;
            let flow = JoinWorkspace::new(ctx, invite);
            let info = flow.info().await?;
            println!("Joining {}", info.name);
            if let Some(workspace) = finish(flow.join().await)? {
                WorkspaceState::save(workspace.id)?;
            }
        }
        "invite-link" => {
            let settings = workspace_settings(ctx).await?;
            println!("{}", settings.invite_link());
        }
        "reset-invite" => {
            let mut settings = workspace_settings(ctx).await?;
            let responder = answer_prompts(settings.reset_gate().clone(), args.assume_yes);
            let outcome = settings.reset_invite_code().await;
            responder.abort();
            if finish(outcome)?.is_some() {
                println!("{}", settings.invite_link());
            }
        }
        "delete-workspace" => {
            let settings = workspace_settings(ctx).await?;
            let responder = answer_prompts(settings.delete_gate().clone(), args.assume_yes);
            let outcome = settings.delete().await;
            responder.abort();
            if finish(outcome)?.is_some() {
                WorkspaceState::clear()?;
            }
        }
        "projects" => {
            let projects = queries.projects(current_workspace()?).await?;
            for project in &projects.documents {
                println!("{}  {}", project.id, project.name);
            }
        }
        "create-project" => {
            let mut flow = CreateProject::new(ctx, current_workspace()?);
            flow.name = arg(&args, 0, "name")?.to_string();
            stage_image(&mut flow.image, args.image.as_ref()).await?;
            finish(flow.submit().await)?;
        }
        "tasks" => {
            let workspace_id = current_workspace()?;
            let filter = match args.project {
                Some(project_id) => TaskFilter::project(workspace_id, project_id),
                None => TaskFilter::workspace(workspace_id),
            };
            let today = chrono::Local::now().date_naive();
            let tasks = queries.tasks(filter).await?;
            for task in &tasks.documents {
                let due = match task.due_date {
                    Some(date) if task.is_overdue(today) => format!("{} (overdue)", date),
                    Some(date) => date.to_string(),
                    None => String::new(),
                };
                println!("{}  {:<12} {}  {}", task.id, task.status.label(), task.name, due);
            }
        }
        "create-task" => {
            let mut flow = CreateTask::new(ctx, current_workspace()?, None);
            flow.form.project_id = arg(&args, 0, "projectId")?.to_string();
            flow.form.assignee_id = arg(&args, 1, "assigneeId")?.to_string();
            flow.form.name = args.positional[2..].join(" ");
            finish(flow.submit().await)?;
        }
        "move-task" => {
            let task_id = parse_id(arg(&args, 0, "taskId")?)?;
            let status: TaskStatus = arg(&args, 1, "STATUS")?.parse()?;
            let task = queries.task(task_id).await?;
            finish(TaskActions::new(ctx).set_status(&task, status).await)?;
        }
        "delete-task" => {
            let task_id = parse_id(arg(&args, 0, "taskId")?)?;
            let actions = TaskActions::new(ctx);
            let responder = answer_prompts(actions.delete_gate().clone(), args.assume_yes);
            let outcome = actions.delete(task_id).await;
            responder.abort();
            finish(outcome)?;
        }
        "members" => {
            let members = MemberList::new(ctx, current_workspace()?).members().await?;
            for member in &members.documents {
                println!("{}  {:<6} {} <{}>", member.id, member.role.as_str(), member.name, member.email);
            }
        }
        "set-role" => {
            let member_id = parse_id(arg(&args, 0, "memberId")?)?;
            let role: MemberRole = arg(&args, 1, "ADMIN|MEMBER")?.parse()?;
            let list = MemberList::new(ctx, current_workspace()?);
            finish(list.set_role(member_id, role).await)?;
        }
        "remove-member" => {
            let member_id = parse_id(arg(&args, 0, "memberId")?)?;
            let list = MemberList::new(ctx, current_workspace()?);
            let responder = answer_prompts(list.remove_gate().clone(), args.assume_yes);
            let outcome = list.remove(member_id).await;
            responder.abort();
            finish(outcome)?;
        }
        "analytics" => {
            let analytics = queries.workspace_analytics(current_workspace()?).await?;
            for (title, value, difference) in analytics.cards() {
                let arrow = match Trend::of(difference) {
                    Trend::Up => "↑",
                    Trend::Down => "↓",
                };
                println!("{:<17} {:>4}  {} {}", title, value, arrow, difference.abs());
            }
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn arg<'a>(args: &'a Args, index: usize, name: &str) -> Result<&'a str> {
    args.positional
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires <{}>", args.command, name))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("{} is not a valid id", raw))
}

fn current_workspace() -> Result<Uuid> {
    WorkspaceState::load()?
        .map(|state| state.workspace_id)
        .context("No workspace selected. Run `planboard use <workspaceId>` first.")
}

async fn workspace_settings(ctx: &ClientContext) -> Result<WorkspaceSettings> {
    let workspace = ctx.queries().workspace(current_workspace()?).await?;
    Ok(WorkspaceSettings::new(ctx, (*workspace).clone()))
}

async fn stage_image(stager: &mut ImageStager, path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = load_file(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;
    stager.offer(file)?;
    Ok(())
}

/// Answer the next prompt of `gate` from stdin, or accept it straight away.
fn answer_prompts(gate: ConfirmGate, assume_yes: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cycle = gate.prompted().await;
        if assume_yes {
            gate.respond(cycle, true);
            return;
        }

        let prompt = gate.prompt().clone();
        let answer = tokio::task::spawn_blocking(move || {
            print!("{}: {} [y/N] ", prompt.title, prompt.description);
            let _ = io::stdout().flush();
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        let confirmed = matches!(answer, Ok(Ok(line)) if line.trim().eq_ignore_ascii_case("y"));
        gate.respond(cycle, confirmed);
    })
}

/// Failures were already shown as toasts; only the exit code is left.
fn finish<T>(outcome: Outcome<T>) -> Result<Option<T>> {
    match outcome {
        Outcome::Completed(value) => Ok(Some(value)),
        Outcome::Cancelled => {
            println!("Cancelled.");
            Ok(None)
        }
        Outcome::Rejected(errors) => bail!("{}", errors),
        Outcome::Failed(_) => std::process::exit(1),
    }
}
