//! Command execution

use std::future::Future;

use colored::Colorize;
use openapi_client::models::ToolId;
use tracing::{debug, info};

use crate::app::command::{BundleSource, Command};
use crate::app::state::AppState;
use crate::bundle::{package_from_source, Bundle, DEFAULT_REQUIREMENTS};
use crate::errors::StudioError;
use crate::filesys::file::File;
use crate::lifecycle::view::ViewSnapshot;
use crate::models::ToolDetailExt;
use crate::workers::poller::{self, PollExit};

/// Run one command. Failures are printed as a user-facing message before
/// being returned.
pub async fn run(
    state: &AppState,
    command: Command,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StudioError> {
    let fallback = command.fallback_message();
    let result = execute(state, &command, shutdown_signal).await;
    if let Err(e) = &result {
        debug!("Command failed: {:?}", e);
        report_failure(&command, e, fallback);
    }
    result
}

async fn execute(
    state: &AppState,
    command: &Command,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StudioError> {
    match command {
        Command::Register { email, password } => {
            let user = state.http_client.register(email, password).await?;
            info!("Registered user {}", user.id);
            sign_in(state, email, password).await?;
            println!("{} {}", "Registered and signed in as".green(), user.email.bold());
        }
        Command::Login { email, password } => {
            sign_in(state, email, password).await?;
            println!("{} {}", "Signed in as".green(), email.bold());
        }
        Command::Logout => {
            state.credentials.set(None).await?;
            println!("{}", "Signed out".green());
        }
        Command::Create {
            name,
            description,
            source,
        } => {
            let bundle = load_bundle(source).await?;
            let session = state.create_session();
            let deployed = session.submit(name, description, &bundle).await?;
            println!(
                "{} {} {}",
                "Created tool".green(),
                deployed.tool_id.to_string().bold(),
                format!("(version {})", deployed.version_id).dimmed()
            );
            println!("Next: sheetify build --tool={}", deployed.tool_id);
        }
        Command::Upload { tool_id, source } => {
            let bundle = load_bundle(source).await?;
            let view = state.tool_view(*tool_id);
            let version_id = view.upload_version(&bundle).await?;
            println!(
                "{} {} {}",
                "Uploaded version".green(),
                version_id.to_string().bold(),
                format!("to tool {}", tool_id).dimmed()
            );
        }
        Command::Build { tool_id } => {
            let view = state.tool_view(*tool_id);
            view.refresh().await?;
            let version_id = view
                .tool()
                .and_then(|t| t.latest_version().map(|v| v.id));
            let ack = view.trigger_build().await?;
            println!(
                "{} {} {}",
                "Build queued for version".green(),
                version_id.map(|id| id.to_string()).unwrap_or_default().bold(),
                status_suffix(ack.status.as_deref())
            );
        }
        Command::Run { tool_id } => {
            let view = state.tool_view(*tool_id);
            view.refresh().await?;
            let ack = view.trigger_run().await?;
            println!(
                "{} {}",
                "Run requested".green(),
                status_suffix(ack.status.as_deref())
            );
            println!("Follow it with: sheetify watch --tool={}", tool_id);
        }
        Command::Stop { tool_id } => {
            let view = state.tool_view(*tool_id);
            let ack = view.trigger_stop().await?;
            println!(
                "{} {}",
                "Stop requested".green(),
                status_suffix(ack.status.as_deref())
            );
        }
        Command::Show { tool_id } => {
            let view = state.tool_view(*tool_id);
            view.refresh().await?;
            println!("{}", render_snapshot(&view.snapshot()));
        }
        Command::Watch { tool_id } => {
            watch(state, *tool_id, shutdown_signal).await?;
        }
    }
    Ok(())
}

async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<(), StudioError> {
    let credential = state.http_client.login(email, password).await?;
    state.credentials.set(Some(credential)).await
}

/// Build the bundle a create or upload sends
pub async fn load_bundle(source: &BundleSource) -> Result<Bundle, StudioError> {
    match source {
        BundleSource::App { app, requirements } => {
            let entrypoint = File::new(app).read_string().await?;
            let requirements = match requirements {
                Some(path) => File::new(path).read_string().await?,
                None => DEFAULT_REQUIREMENTS.to_string(),
            };
            package_from_source(&entrypoint, &requirements)
        }
        BundleSource::File(path) => Bundle::from_path(&File::new(path)).await,
    }
}

fn report_failure(command: &Command, error: &StudioError, fallback: &str) {
    eprintln!("{} {}", "Error:".red().bold(), error.user_message(fallback));

    if let (Command::Create { source, .. }, Some(tool_id)) = (command, error.created_tool_id()) {
        eprintln!(
            "{}",
            format!(
                "Tool {} was created but its upload failed. Retry the upload with:",
                tool_id
            )
            .yellow()
        );
        eprintln!("  sheetify upload --tool={} {}", tool_id, source_flags(source));
    }
}

fn source_flags(source: &BundleSource) -> String {
    match source {
        BundleSource::App { app, requirements } => {
            let mut flags = format!("--app={}", app.display());
            if let Some(path) = requirements {
                flags.push_str(&format!(" --requirements={}", path.display()));
            }
            flags
        }
        BundleSource::File(path) => format!("--file={}", path.display()),
    }
}

fn status_suffix(status: Option<&str>) -> String {
    status
        .map(|s| format!("({})", s).dimmed().to_string())
        .unwrap_or_default()
}

// ================================== WATCH ======================================== //

async fn watch(
    state: &AppState,
    tool_id: ToolId,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), StudioError> {
    let view = state.tool_view(tool_id);
    view.refresh().await?;

    let mut last_printed = render_snapshot(&view.snapshot());
    println!("{}", last_printed);

    let mut updates = view.subscribe();
    let poll = poller::run(
        &state.options.poller,
        view.clone(),
        state.credentials.subscribe(),
        tokio::time::sleep,
        Box::pin(shutdown_signal),
    );
    tokio::pin!(poll);

    let exit = loop {
        tokio::select! {
            exit = &mut poll => break exit,
            changed = updates.changed() => {
                if changed.is_err() {
                    break PollExit::ViewClosed;
                }
                let rendered = render_snapshot(&view.snapshot());
                if rendered != last_printed {
                    println!("\n{}", rendered);
                    last_printed = rendered;
                }
            }
        }
    };
    view.close();

    match exit {
        PollExit::SignedOut => Err(StudioError::AuthError(
            "Signed out, stopped watching".to_string(),
        )),
        PollExit::Shutdown | PollExit::ViewClosed => Ok(()),
    }
}

fn render_snapshot(snapshot: &ViewSnapshot) -> String {
    let Some(tool) = &snapshot.tool else {
        return "No data yet".yellow().to_string();
    };

    let mut lines = vec![
        format!("{} {}", tool.name.bold(), format!("#{}", tool.id).dimmed()),
        format!("  status:  {}", tool.status),
        format!(
            "  image:   {}",
            tool.current_image_ref.as_deref().filter(|i| !i.is_empty()).unwrap_or("-")
        ),
    ];

    match tool.latest_version() {
        Some(version) => lines.push(format!("  version: {} ({})", version.id, version.created_at)),
        None => lines.push("  version: -".to_string()),
    }
    match tool.latest_build() {
        Some(build) => lines.push(format!("  build:   {} {}", build.id, build.status)),
        None => lines.push("  build:   -".to_string()),
    }
    match tool.latest_run() {
        Some(run) => lines.push(format!("  run:     {} {}", run.id, run.status)),
        None => lines.push("  run:     -".to_string()),
    }
    if let Some(url) = &snapshot.share_url {
        lines.push(format!("  url:     {}", url.cyan().underline()));
    }

    let controls = snapshot.controls;
    let allowed: Vec<&str> = [
        (controls.can_upload, "upload"),
        (controls.can_build, "build"),
        (controls.can_run, "run"),
        (controls.can_stop, "stop"),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, name)| *name)
    .collect();
    lines.push(format!("  actions: {}", allowed.join(", ")).dimmed().to_string());

    if let Some(error) = &snapshot.last_error {
        lines.push(format!("  stale: {}", error).yellow().to_string());
    }

    lines.join("\n")
}
