use dubsync_core::EngineError;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `command` (array of strings, or one whitespace-separated string)
    /// and optional `timeout_secs` from an engine's options table.
    pub fn from_options(options: &toml::Value, engine: &str) -> Result<Self, EngineError> {
        let missing = || {
            EngineError::InitializationFailed(format!("missing 'command' in {engine} config"))
        };
        let argv: Vec<String> = match options.get("command") {
            Some(toml::Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        EngineError::InitializationFailed(format!(
                            "'command' in {engine} config must contain only strings"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(missing()),
        };
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or_else(missing)?;
        let mut command = Self::new(program, argv.collect());

        let timeout = match options.get("timeout_secs") {
            Some(toml::Value::Integer(n)) if *n > 0 => Some(Duration::from_secs(*n as u64)),
            Some(toml::Value::Float(f)) if *f > 0.0 => Some(Duration::from_secs_f64(*f)),
            Some(_) => {
                return Err(EngineError::InitializationFailed(format!(
                    "'timeout_secs' in {engine} config must be a positive number"
                )))
            }
            None => None,
        };
        if let Some(timeout) = timeout {
            command = command.with_timeout(timeout);
        }
        Ok(command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with every `{key}` replaced by its value.
    pub fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    /// Run the program, feeding `stdin` if given, and return its stdout.
    pub async fn run(&self, vars: &[(&str, &str)], stdin: Option<&str>) -> Result<String, EngineError> {
        let args = self.render_args(vars);
        tracing::debug!(program = %self.program, ?args, "spawning collaborator");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::ProcessingFailed(format!("failed to launch {}: {e}", self.program))
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            let input = input.to_string();
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(input.as_bytes()).await {
                    tracing::debug!("collaborator stdin closed early: {e}");
                }
            });
        }

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    EngineError::ProcessingFailed(format!(
                        "{} timed out after {:.1}s",
                        self.program,
                        limit.as_secs_f64()
                    ))
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| EngineError::ProcessingFailed(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::ProcessingFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
