//! External transcoder wrapper (ffmpeg-compatible CLI over stdin/stdout).
//!
//! The tool is looked up once, when the transcoder is built, and the result is
//! carried as a [`ToolAvailability`] value. Every call spawns one independent
//! process: raw bytes go in on stdin, a single JPEG frame comes back on stdout.
//! There is no pooling, no retry and no timeout.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::TranscoderConfig;
use crate::error::{MediaError, MediaResult};

/// Longest stderr excerpt kept in a `TranscodeFailed` error.
const STDERR_EXCERPT: usize = 512;

/// Result of probing the environment for the transcoder binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAvailability {
    /// Found at the given path
    Available(PathBuf),
    /// Not found in PATH
    Missing,
}

impl ToolAvailability {
    /// Look `program` up in PATH.
    pub fn probe(program: &str) -> Self {
        match which::which(program) {
            Ok(path) => {
                tracing::debug!("Transcoder {} found at {:?}", program, path);
                Self::Available(path)
            }
            Err(e) => {
                tracing::debug!("Transcoder {} not found: {}", program, e);
                Self::Missing
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Parameters for one transcoder invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeRequest {
    /// Bounding box edge; the frame is shrunk to fit, never enlarged
    pub scale: Option<u32>,
    /// Encoder quality passed as `-q:v`
    pub quality: u32,
}

impl TranscodeRequest {
    /// Full-resolution frame extraction.
    pub fn full(quality: u32) -> Self {
        Self {
            scale: None,
            quality,
        }
    }

    /// Frame extraction shrunk to fit a `scale`×`scale` box.
    pub fn scaled(scale: u32, quality: u32) -> Self {
        Self {
            scale: Some(scale),
            quality,
        }
    }

    /// Build the argument list for this request.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-i", "pipe:", "-f", "image2pipe", "-vframes", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(scale) = self.scale {
            args.push("-vf".to_string());
            args.push(format!(
                "scale={scale}:{scale}:force_original_aspect_ratio=decrease"
            ));
        }

        args.push("-q:v".to_string());
        args.push(self.quality.to_string());
        args.push("pipe:.jpg".to_string());
        args
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a program with the given arguments, feeding `stdin` and collecting output.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin not captured"))?;

        // Feed stdin from a separate thread so a full stdout pipe can't deadlock us.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || child_stdin.write_all(stdin));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        match written {
            Ok(()) => {}
            // The tool may stop reading once it has its frame.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::trace!("Transcoder closed stdin early");
            }
            Err(e) => return Err(e),
        }

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Extracts a single JPEG frame from arbitrary media through an external process.
pub struct Transcoder {
    program: String,
    availability: ToolAvailability,
    quality: u32,
    default_scale: u32,
    runner: Box<dyn ProcessRunner>,
}

impl Transcoder {
    /// Create a transcoder that spawns real processes.
    pub fn new(config: &TranscoderConfig, availability: ToolAvailability) -> Self {
        Self::with_runner(config, availability, Box::new(SystemRunner))
    }

    /// Create a transcoder with a custom process runner.
    pub fn with_runner(
        config: &TranscoderConfig,
        availability: ToolAvailability,
        runner: Box<dyn ProcessRunner>,
    ) -> Self {
        Self {
            program: config.program.clone(),
            availability,
            quality: config.quality,
            default_scale: config.default_scale,
            runner,
        }
    }

    /// Probe PATH for the configured program and build a transcoder.
    pub fn detect(config: &TranscoderConfig) -> Self {
        let availability = ToolAvailability::probe(&config.program);
        Self::new(config, availability)
    }

    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Build a request using the configured quality.
    ///
    /// A scale of 0 falls back to the configured default scale.
    pub fn request(&self, scale: Option<u32>) -> TranscodeRequest {
        match scale {
            None => TranscodeRequest::full(self.quality),
            Some(0) => TranscodeRequest::scaled(self.default_scale, self.quality),
            Some(s) => TranscodeRequest::scaled(s, self.quality),
        }
    }

    /// Extract the first frame of `input` at full resolution as JPEG bytes.
    pub fn extract_frame(&self, input: &[u8]) -> MediaResult<Vec<u8>> {
        self.transcode(input, &self.request(None))
    }

    /// Extract the first frame of `input` shrunk to fit `scale`×`scale`.
    pub fn thumbnail(&self, input: &[u8], scale: u32) -> MediaResult<Vec<u8>> {
        self.transcode(input, &self.request(Some(scale)))
    }

    /// Run the transcoder once over `input`.
    pub fn transcode(&self, input: &[u8], request: &TranscodeRequest) -> MediaResult<Vec<u8>> {
        let program_path = self.program_path()?;
        if input.is_empty() {
            return Err(MediaError::InvalidStream("input is empty".into()));
        }

        let args = request.args();
        tracing::debug!("Running {} {}", self.program, args.join(" "));
        let start = std::time::Instant::now();

        let output = self
            .runner
            .run(program_path, &args, input)
            .map_err(|e| MediaError::TranscodeFailed {
                program: self.program.clone(),
                status: None,
                stderr: e.to_string(),
            })?;
        tracing::trace!("  Transcode: {:?}", start.elapsed());

        if !output.success() {
            tracing::warn!(
                "{} exited with {:?} ({} input bytes)",
                self.program,
                output.status,
                input.len()
            );
            return Err(self.failed(&output));
        }
        if output.stdout.is_empty() {
            return Err(MediaError::TranscodeFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: "no frame written to stdout".into(),
            });
        }

        Ok(output.stdout)
    }

    /// Stream variant of [`transcode`](Self::transcode).
    ///
    /// Reads `input` to the end, transcodes it, and writes the frame to
    /// `output`. Returns the number of bytes written.
    pub fn transcode_stream(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        request: &TranscodeRequest,
    ) -> MediaResult<usize> {
        self.program_path()?;

        let mut buffer = Vec::new();
        input
            .read_to_end(&mut buffer)
            .map_err(|e| MediaError::InvalidStream(format!("cannot read input: {e}")))?;

        let frame = self.transcode(&buffer, request)?;
        output
            .write_all(&frame)
            .and_then(|()| output.flush())
            .map_err(|e| MediaError::InvalidStream(format!("cannot write output: {e}")))?;
        Ok(frame.len())
    }

    fn program_path(&self) -> MediaResult<&Path> {
        match &self.availability {
            ToolAvailability::Available(path) => Ok(path),
            ToolAvailability::Missing => Err(MediaError::ToolNotFound {
                program: self.program.clone(),
            }),
        }
    }

    fn failed(&self, output: &ProcessOutput) -> MediaError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let trimmed = stderr.trim();
        let start = trimmed
            .char_indices()
            .rev()
            .nth(STDERR_EXCERPT.saturating_sub(1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        MediaError::TranscodeFailed {
            program: self.program.clone(),
            status: output.status,
            stderr: trimmed[start..].to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records invocations and replies with a canned output.
    #[derive(Clone, Default)]
    pub(crate) struct FakeRunner {
        pub calls: Arc<Mutex<Vec<Vec<String>>>>,
        pub reply: ProcessOutput,
    }

    impl FakeRunner {
        pub fn replying(stdout: Vec<u8>) -> Self {
            Self {
                calls: Arc::default(),
                reply: ProcessOutput {
                    status: Some(0),
                    stdout,
                    stderr: Vec::new(),
                },
            }
        }

        pub fn failing(code: i32, stderr: &str) -> Self {
            Self {
                calls: Arc::default(),
                reply: ProcessOutput {
                    status: Some(code),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                },
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, _program: &Path, args: &[String], _stdin: &[u8]) -> io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn available() -> ToolAvailability {
        ToolAvailability::Available(PathBuf::from("/usr/bin/ffmpeg"))
    }

    #[test]
    fn test_args_without_scale() {
        let args = TranscodeRequest::full(10).args();
        assert_eq!(
            args.join(" "),
            "-i pipe: -f image2pipe -vframes 1 -q:v 10 pipe:.jpg"
        );
    }

    #[test]
    fn test_args_with_scale() {
        let args = TranscodeRequest::scaled(1024, 10).args();
        assert_eq!(
            args.join(" "),
            "-i pipe: -f image2pipe -vframes 1 \
             -vf scale=1024:1024:force_original_aspect_ratio=decrease -q:v 10 pipe:.jpg"
        );
    }

    #[test]
    fn test_request_zero_scale_uses_default() {
        let runner = FakeRunner::default();
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner),
        );
        assert_eq!(t.request(Some(0)), TranscodeRequest::scaled(512, 10));
        assert_eq!(t.request(None), TranscodeRequest::full(10));
    }

    #[test]
    fn test_missing_tool_never_spawns() {
        let runner = FakeRunner::replying(vec![0xFF, 0xD8]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            ToolAvailability::Missing,
            Box::new(runner.clone()),
        );

        let err = t.extract_frame(b"data").unwrap_err();
        assert!(matches!(err, MediaError::ToolNotFound { .. }));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_empty_input_is_invalid_stream() {
        let runner = FakeRunner::replying(vec![0xFF]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner.clone()),
        );

        let err = t.extract_frame(&[]).unwrap_err();
        assert!(matches!(err, MediaError::InvalidStream(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_nonzero_exit_is_transcode_failed() {
        let runner = FakeRunner::failing(1, "pipe:: Invalid data found when processing input\n");
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner.clone()),
        );

        match t.thumbnail(b"garbage", 256).unwrap_err() {
            MediaError::TranscodeFailed { status, stderr, .. } => {
                assert_eq!(status, Some(1));
                assert!(stderr.ends_with("processing input"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_empty_stdout_is_transcode_failed() {
        let runner = FakeRunner::replying(Vec::new());
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner),
        );
        assert!(matches!(
            t.extract_frame(b"data"),
            Err(MediaError::TranscodeFailed { status: Some(0), .. })
        ));
    }

    #[test]
    fn test_success_returns_stdout_and_passes_args() {
        let runner = FakeRunner::replying(vec![1, 2, 3]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner.clone()),
        );

        assert_eq!(t.thumbnail(b"data", 0).unwrap(), vec![1, 2, 3]);
        let calls = runner.calls.lock().unwrap();
        assert!(calls[0].contains(&"scale=512:512:force_original_aspect_ratio=decrease".to_string()));
    }

    #[test]
    fn test_stream_writes_frame() {
        let runner = FakeRunner::replying(vec![9; 16]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner),
        );

        let mut input: &[u8] = b"video bytes";
        let mut output = Vec::new();
        let written = t
            .transcode_stream(&mut input, &mut output, &TranscodeRequest::full(10))
            .unwrap();
        assert_eq!(written, 16);
        assert_eq!(output, vec![9; 16]);
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("closed"))
        }
    }

    #[test]
    fn test_stream_unreadable_input() {
        let runner = FakeRunner::replying(vec![1]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner.clone()),
        );

        let mut output = Vec::new();
        let err = t
            .transcode_stream(&mut BrokenReader, &mut output, &TranscodeRequest::full(10))
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidStream(_)));
        assert_eq!(runner.call_count(), 0);
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("output closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("output closed"))
        }
    }

    #[test]
    fn test_stream_unwritable_output() {
        let runner = FakeRunner::replying(vec![0xFF, 0xD8]);
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            available(),
            Box::new(runner.clone()),
        );

        let err = t
            .transcode_stream(
                &mut &b"media"[..],
                &mut BrokenWriter,
                &TranscodeRequest::full(10),
            )
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidStream(_)));
        assert_eq!(runner.call_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_pipes_large_input() {
        let input: Vec<u8> = (0..8 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let output = SystemRunner
            .run(Path::new("/bin/cat"), &[], &input)
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout.len(), input.len());
        assert!(output.stdout == input);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_exit_code() {
        let args = vec!["-c".to_string(), "echo bad frame >&2; exit 3".to_string()];
        let output = SystemRunner
            .run(Path::new("/bin/sh"), &args, b"ignored")
            .unwrap();

        assert_eq!(output.status, Some(3));
        assert!(!output.success());
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "bad frame");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_child_closes_stdin_early() {
        // Exits without reading; the writer sees a broken pipe.
        let args = vec!["-c".to_string(), "exit 0".to_string()];
        let input = vec![0u8; 4 * 1024 * 1024];
        let output = SystemRunner
            .run(Path::new("/bin/sh"), &args, &input)
            .unwrap();

        assert_eq!(output.status, Some(0));
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_spawn_failure_has_no_status() {
        let t = Transcoder::with_runner(
            &TranscoderConfig::default(),
            ToolAvailability::Available(PathBuf::from("/nonexistent/thumbprint/ffmpeg")),
            Box::new(SystemRunner),
        );

        let err = t.extract_frame(b"media").unwrap_err();
        assert!(matches!(
            err,
            MediaError::TranscodeFailed { status: None, .. }
        ));
    }

    #[test]
    fn test_probe_missing_program() {
        let availability = ToolAvailability::probe("thumbprint-no-such-transcoder-binary");
        assert_eq!(availability, ToolAvailability::Missing);
    }
}
