use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use thiserror::Error;

pub struct Invocation {
    pub binary: PathBuf,
    pub arguments: Vec<String>,
    pub merge_streams: bool,
    pub current_dir: Option<PathBuf>,
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(binary: impl Into<PathBuf>, arguments: Vec<String>, merge_streams: bool) -> Self {
        Invocation {
            binary: binary.into(),
            arguments,
            merge_streams,
            current_dir: None,
            stdin: None,
        }
    }
}

#[derive(Debug)]
pub struct CapturedOutput {
    pub stdout: String,
    /// `None` when stderr was merged into stdout
    pub stderr: Option<String>,
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Display for Stream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("binary is not a file: {}", .0.display())]
    BinaryNotFound(PathBuf),
    #[error("{stream} of the program is not valid UTF-8")]
    FailedToDecodeUtf8 { stream: Stream },
    #[error(transparent)]
    IOError(#[from] io::Error),
}

/// Spawn the binary once and wait for it to terminate
///
/// With `merge_streams` set, stderr is sent into the same pipe as stdout so
/// the captured text keeps the interleaving the program produced.
pub fn run(invocation: &Invocation) -> Result<CapturedOutput, RunError> {
    if !invocation.binary.is_file() {
        return Err(RunError::BinaryNotFound(invocation.binary.clone()));
    }

    debug!(
        "spawning {} {:?} (merge_streams: {})",
        invocation.binary.display(),
        invocation.arguments,
        invocation.merge_streams
    );

    let mut cmd = Command::new(&invocation.binary);
    cmd.args(&invocation.arguments);
    if let Some(current_dir) = &invocation.current_dir {
        cmd.current_dir(current_dir);
    }
    cmd.stdin(if invocation.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    if invocation.merge_streams {
        run_merged(cmd, invocation)
    } else {
        run_separate(cmd, invocation)
    }
}

fn run_separate(mut cmd: Command, invocation: &Invocation) -> Result<CapturedOutput, RunError> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn()?;
    if let Err(err) = write_stdin(&mut child, invocation) {
        reap(&mut child);
        return Err(err);
    }

    let output = child.wait_with_output()?;

    Ok(CapturedOutput {
        stdout: decode(output.stdout, Stream::Stdout)?,
        stderr: Some(decode(output.stderr, Stream::Stderr)?),
        exit_code: output.status.code(),
    })
}

fn run_merged(mut cmd: Command, invocation: &Invocation) -> Result<CapturedOutput, RunError> {
    let (mut reader, writer) = io::pipe()?;
    cmd.stdout(writer.try_clone()?);
    cmd.stderr(writer);

    let mut child = cmd.spawn()?;
    // The write ends held by `cmd` must be closed, otherwise reading never sees EOF
    drop(cmd);

    let mut buf: Vec<u8> = vec![];
    let captured = write_stdin(&mut child, invocation)
        .and_then(|()| reader.read_to_end(&mut buf).map_err(RunError::from));
    if let Err(err) = captured {
        reap(&mut child);
        return Err(err);
    }
    let exit_status = child.wait()?;

    Ok(CapturedOutput {
        stdout: decode(buf, Stream::Stdout)?,
        stderr: None,
        exit_code: exit_status.code(),
    })
}

fn write_stdin(child: &mut Child, invocation: &Invocation) -> Result<(), RunError> {
    if let (Some(stdin_string), Some(mut stdin)) = (&invocation.stdin, child.stdin.take()) {
        match stdin.write_all(stdin_string.as_bytes()) {
            // The program exited or closed stdin without reading all of it
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("stdin closed early: {}", err);
            }
            result => result?,
        }
    }
    Ok(())
}

/// Stop a child whose output can no longer be captured, so it is not left
/// behind as a zombie
fn reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!("failed to kill child: {}", err);
    }
    if let Err(err) = child.wait() {
        warn!("failed to wait for child: {}", err);
    }
}

fn decode(buf: Vec<u8>, stream: Stream) -> Result<String, RunError> {
    String::from_utf8(buf).map_err(|_| RunError::FailedToDecodeUtf8 { stream })
}
