use crate::domain::catalog::NETWORK_NAME;
use crate::domain::{CallContext, ContainerRuntime, ContainerSummary, RuntimeError, VolumeSummary};
use std::ffi::OsStr;
use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runtime backed by the `docker` command line, or any binary that speaks
/// the same dialect (`podman`).
#[derive(Debug, Clone)]
pub struct DockerAdapter {
    binary: String,
    network: String,
}

struct CommandOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl DockerAdapter {
    pub fn new(binary: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            network: network.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Runs the runtime binary, killing it once the context expires.
    fn run<I, S>(
        &self,
        ctx: &CallContext,
        args: I,
        doing: &str,
    ) -> Result<CommandOutput, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        ctx.check(doing)?;
        debug!("{} ({})", doing, self.binary);

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            if let Err(e) = ctx.check(doing) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }

            thread::sleep(POLL_INTERVAL);
        };

        Ok(CommandOutput {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }

    /// Like [`run`](Self::run) but turns a failed exit status into an error.
    fn run_ok<I, S>(
        &self,
        ctx: &CallContext,
        args: I,
        doing: &str,
    ) -> Result<String, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(ctx, args, doing)?;
        ensure_success(output, doing)
    }
}

impl Default for DockerAdapter {
    fn default() -> Self {
        Self::new("docker", NETWORK_NAME)
    }
}

impl ContainerRuntime for DockerAdapter {
    fn list_containers(&self) -> Result<Vec<ContainerSummary>, RuntimeError> {
        let stdout = self.run_ok(
            &CallContext::background(),
            ["ps", "-a", "--format", "{{.Names}}"],
            "listing containers",
        )?;

        Ok(non_empty_lines(&stdout)
            .map(|line| ContainerSummary {
                names: line.split(',').map(|n| n.trim().to_string()).collect(),
            })
            .collect())
    }

    fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        self.run_ok(
            &CallContext::background(),
            ["rm", "-f", name],
            &format!("removing container {name}"),
        )
        .map(|_| ())
    }

    fn is_running(&self, name: &str, image_with_version: &str) -> Result<bool, RuntimeError> {
        let doing = format!("inspecting container {name}");
        let result = self.run_ok(
            &CallContext::background(),
            [
                "inspect",
                "--type",
                "container",
                "--format",
                "{{.State.Running}}|{{.Config.Image}}",
                name,
            ],
            &doing,
        );

        let stdout = match result {
            Ok(stdout) => stdout,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };

        match stdout.trim().split_once('|') {
            Some((running, image)) => {
                let same_image =
                    normalize_image_ref(image) == normalize_image_ref(image_with_version);
                Ok(running == "true" && same_image)
            }
            None => Err(RuntimeError::Parse {
                context: doing,
                output: stdout.trim().to_string(),
            }),
        }
    }

    fn is_installed(
        &self,
        ctx: &CallContext,
        image: &str,
        version: &str,
    ) -> Result<bool, RuntimeError> {
        let id = format!("{image}:{version}");
        match self.run_ok(
            ctx,
            ["image", "inspect", "--format", "{{.Id}}", id.as_str()],
            &format!("inspecting image {id}"),
        ) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn versions_installed(
        &self,
        ctx: &CallContext,
        image: &str,
    ) -> Result<Vec<String>, RuntimeError> {
        let stdout = self.run_ok(
            ctx,
            ["images", "--format", "{{.Tag}}", image],
            &format!("listing versions of {image}"),
        )?;

        Ok(non_empty_lines(&stdout)
            .filter(|tag| *tag != "<none>")
            .map(str::to_string)
            .collect())
    }

    fn pull(&self, ctx: &CallContext, image: &str, version: &str) -> Result<(), RuntimeError> {
        let id = format!("{image}:{version}");
        self.run_ok(ctx, ["pull", id.as_str()], &format!("pulling {id}"))
            .map(|_| ())
    }

    fn list_volumes(&self, ctx: &CallContext) -> Result<Vec<VolumeSummary>, RuntimeError> {
        let stdout = self.run_ok(
            ctx,
            ["volume", "ls", "--format", "{{.Name}}"],
            "listing volumes",
        )?;

        Ok(non_empty_lines(&stdout)
            .map(|name| VolumeSummary {
                name: name.to_string(),
            })
            .collect())
    }

    fn remove_volume(&self, ctx: &CallContext, name: &str) -> Result<(), RuntimeError> {
        self.run_ok(
            ctx,
            ["volume", "rm", name],
            &format!("removing volume {name}"),
        )
        .map(|_| ())
    }

    fn remove_network(&self, ctx: &CallContext) -> Result<(), RuntimeError> {
        self.run_ok(
            ctx,
            ["network", "rm", self.network.as_str()],
            &format!("removing network {}", self.network),
        )
        .map(|_| ())
    }

    fn remove_image(
        &self,
        ctx: &CallContext,
        image_with_version: &str,
    ) -> Result<(), RuntimeError> {
        self.run_ok(
            ctx,
            ["rmi", image_with_version],
            &format!("removing image {image_with_version}"),
        )
        .map(|_| ())
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn ensure_success(output: CommandOutput, doing: &str) -> Result<String, RuntimeError> {
    if output.status.success() {
        return Ok(output.stdout);
    }

    let stderr = output.stderr.trim().to_string();
    if is_not_found_message(&stderr) {
        return Err(RuntimeError::NotFound(doing.to_string()));
    }

    Err(RuntimeError::Command {
        context: doing.to_string(),
        status: output.status.to_string(),
        stderr,
    })
}

/// Phrasings docker and podman use when the addressed object does not exist.
/// File system errors such as "no such file or directory" are real failures.
const MISSING_OBJECT_PHRASES: &[&str] = &[
    "no such container",
    "no such volume",
    "no such image",
    "no such network",
    "no such object",
    "no container with name or id",
    "no volume with name",
    "network not found",
    "image not known",
];

fn is_not_found_message(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    if MISSING_OBJECT_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
    {
        return true;
    }

    // docker: "network srcd-cli-network not found"
    lower
        .lines()
        .any(|line| line.contains("network ") && line.trim_end().ends_with(" not found"))
}

/// Image reference without the default registry and library prefixes podman
/// adds to short names.
fn normalize_image_ref(image: &str) -> &str {
    let image = image.strip_prefix("docker.io/").unwrap_or(image);
    image.strip_prefix("library/").unwrap_or(image)
}
