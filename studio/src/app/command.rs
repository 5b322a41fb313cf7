//! Command-line commands

use std::collections::HashMap;
use std::path::PathBuf;

use openapi_client::models::ToolId;

use crate::errors::StudioError;

/// Environment variable read when `--password` is not given
pub const PASSWORD_ENV: &str = "SHEETIFY_PASSWORD";

/// Where the bundle of a create or upload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSource {
    /// Package an entrypoint, with the given requirements file or the
    /// default requirements
    App {
        app: PathBuf,
        requirements: Option<PathBuf>,
    },

    /// Send a file as-is
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout,
    Create {
        name: String,
        description: String,
        source: BundleSource,
    },
    Upload { tool_id: ToolId, source: BundleSource },
    Build { tool_id: ToolId },
    Run { tool_id: ToolId },
    Stop { tool_id: ToolId },
    Show { tool_id: ToolId },
    Watch { tool_id: ToolId },
}

impl Command {
    /// Parse a command from its name and `--key=value` arguments
    pub fn parse(
        name: Option<&str>,
        args: &HashMap<String, String>,
        password_env: Option<String>,
    ) -> Result<Self, StudioError> {
        let name = name.ok_or_else(|| usage("Missing command"))?;
        let command = match name {
            "register" | "login" => {
                let email = required(args, "email")?;
                let password = args
                    .get("password")
                    .cloned()
                    .or(password_env)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        StudioError::ValidationError(format!("--password or {} is required", PASSWORD_ENV))
                    })?;
                if name == "register" {
                    Command::Register { email, password }
                } else {
                    Command::Login { email, password }
                }
            }
            "logout" => Command::Logout,
            // an empty name is left to the lifecycle client to reject
            "create" => Command::Create {
                name: args.get("name").cloned().unwrap_or_default(),
                description: args.get("description").cloned().unwrap_or_default(),
                source: bundle_source(args)?,
            },
            "upload" => Command::Upload {
                tool_id: tool_id(args)?,
                source: bundle_source(args)?,
            },
            "build" => Command::Build { tool_id: tool_id(args)? },
            "run" => Command::Run { tool_id: tool_id(args)? },
            "stop" => Command::Stop { tool_id: tool_id(args)? },
            "show" => Command::Show { tool_id: tool_id(args)? },
            "watch" => Command::Watch { tool_id: tool_id(args)? },
            other => return Err(usage(&format!("Unknown command '{}'", other))),
        };
        Ok(command)
    }

    /// Message shown when the command fails without a backend detail
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Command::Register { .. } => "Unable to register",
            Command::Login { .. } => "Unable to authenticate",
            Command::Logout => "Unable to sign out",
            Command::Create { .. } => "Unable to create tool",
            Command::Upload { .. } => "Unable to upload bundle",
            Command::Build { .. } => "Unable to start build",
            Command::Run { .. } => "Unable to run tool",
            Command::Stop { .. } => "Unable to stop tool",
            Command::Show { .. } | Command::Watch { .. } => "Unable to load tool",
        }
    }
}

/// Usage text printed for `--help` and parse failures
pub const USAGE: &str = "\
Usage: sheetify <command> [--key=value ...]

Commands:
  register --email=<email> [--password=<password>]
  login    --email=<email> [--password=<password>]
  logout
  create   --name=<name> [--description=<text>] (--app=<path> [--requirements=<path>] | --file=<path>)
  upload   --tool=<id> (--app=<path> [--requirements=<path>] | --file=<path>)
  build    --tool=<id>
  run      --tool=<id>
  stop     --tool=<id>
  show     --tool=<id>
  watch    --tool=<id>

Options:
  --version  Print version information";

fn usage(message: &str) -> StudioError {
    StudioError::ValidationError(format!("{}\n\n{}", message, USAGE))
}

fn required(args: &HashMap<String, String>, key: &str) -> Result<String, StudioError> {
    args.get(key)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| StudioError::ValidationError(format!("--{} is required", key)))
}

fn tool_id(args: &HashMap<String, String>) -> Result<ToolId, StudioError> {
    let raw = required(args, "tool")?;
    raw.trim()
        .parse()
        .map_err(|_| StudioError::ValidationError(format!("Invalid tool id: {}", raw)))
}

fn bundle_source(args: &HashMap<String, String>) -> Result<BundleSource, StudioError> {
    match (args.get("app"), args.get("file")) {
        (Some(app), None) => Ok(BundleSource::App {
            app: PathBuf::from(app),
            requirements: args.get("requirements").map(PathBuf::from),
        }),
        (None, Some(file)) => Ok(BundleSource::File(PathBuf::from(file))),
        (Some(_), Some(_)) => Err(StudioError::ValidationError(
            "Use either --app or --file, not both".to_string(),
        )),
        (None, None) => Err(StudioError::ValidationError(
            "--app or --file is required".to_string(),
        )),
    }
}
