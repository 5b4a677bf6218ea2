// ABOUTME: Thin wrapper over the `docker compose` and `docker` command-line tools.
// ABOUTME: Runs in the compose project directory with the generated environment.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Compose releases at or below this one are missing features the stack needs.
pub const MIN_COMPOSE_VERSION: (u32, u32, u32) = (2, 12, 2);

/// Exit code reported when the binary itself is missing, as a shell would.
const NOT_FOUND: i32 = 127;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Clone)]
pub struct Compose {
    project_dir: PathBuf,
    env: Vec<(String, String)>,
}

impl Compose {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// `docker compose -f <file>... up -d`
    pub async fn up(&self, files: &[PathBuf]) -> io::Result<CommandOutput> {
        let mut args: Vec<String> = vec!["compose".into()];
        for file in files {
            args.push("-f".into());
            args.push(file.to_string_lossy().into_owned());
        }
        args.extend(["up".into(), "-d".into()]);
        self.docker(&args).await
    }

    /// `docker compose kill --remove-orphans`
    pub async fn kill(&self) -> io::Result<CommandOutput> {
        self.docker(&["compose", "kill", "--remove-orphans"]).await
    }

    /// `docker compose down -v --remove-orphans`
    pub async fn down(&self) -> io::Result<CommandOutput> {
        self.docker(&["compose", "down", "-v", "--remove-orphans"])
            .await
    }

    /// Version reported by `docker compose`, falling back to the standalone
    /// `docker-compose` binary.
    pub async fn version(&self) -> io::Result<Option<(u32, u32, u32)>> {
        let plugin = run("docker", &["compose", "version", "--short"], &self.project_dir, &[]).await?;
        let output = if plugin.success() {
            plugin
        } else {
            run("docker-compose", &["version", "--short"], &self.project_dir, &[]).await?
        };
        if !output.success() {
            return Ok(None);
        }
        Ok(parse_version(&output.stdout))
    }

    async fn docker<S: AsRef<str>>(&self, args: &[S]) -> io::Result<CommandOutput> {
        run("docker", args, &self.project_dir, &self.env).await
    }
}

async fn run<S: AsRef<str>>(
    program: &str,
    args: &[S],
    dir: &Path,
    env: &[(String, String)],
) -> io::Result<CommandOutput> {
    let shown: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    tracing::trace!("Running {} {}", program, shown.join(" "));

    let result = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .current_dir(dir)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .output()
        .await;

    match result {
        Ok(output) => Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(CommandOutput {
            exit_code: NOT_FOUND,
            stdout: String::new(),
            stderr: format!("{program}: command not found"),
        }),
        Err(e) => Err(e),
    }
}

/// Parse `2.24.6`, `v2.24.6` or `2.24.6-desktop.1` into its numeric triple.
pub fn parse_version(text: &str) -> Option<(u32, u32, u32)> {
    let text = text.trim().trim_start_matches('v');
    let mut parts = text.splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some((major, minor, patch.parse().ok()?))
}

pub fn is_supported_version(version: (u32, u32, u32)) -> bool {
    version > MIN_COMPOSE_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_version_strings() {
        assert_eq!(parse_version("2.24.6\n"), Some((2, 24, 6)));
        assert_eq!(parse_version("v2.12.3"), Some((2, 12, 3)));
        assert_eq!(parse_version("2.27.0-desktop.2"), Some((2, 27, 0)));
        assert_eq!(parse_version("garbage"), None);
        assert_eq!(parse_version("2.1"), None);
    }

    #[test]
    fn minimum_version_is_exclusive() {
        assert!(!is_supported_version((2, 12, 2)));
        assert!(is_supported_version((2, 12, 3)));
        assert!(is_supported_version((3, 0, 0)));
        assert!(!is_supported_version((1, 29, 2)));
    }

    #[tokio::test]
    async fn missing_binary_reports_127() {
        let dir = tempfile::tempdir().unwrap();
        let output = run::<&str>("hedera-local-no-such-binary", &[], dir.path(), &[])
            .await
            .unwrap();
        assert_eq!(output.exit_code, NOT_FOUND);
    }

    #[tokio::test]
    async fn command_output_is_captured_with_tracing_enabled() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let dir = tempfile::tempdir().unwrap();
        let env = [("GREETING".to_string(), "hedera".to_string())];

        let output = run("sh", &["-c", "echo $GREETING"], dir.path(), &env)
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hedera");
    }
}
