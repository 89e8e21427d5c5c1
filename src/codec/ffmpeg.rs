use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::codec::{CodecBackend, EncodeJob, SourceGif, native};
use crate::foundation::core::LoopCount;
use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::foundation::scratch::Scratch;

/// Codec that encodes through a system `ffmpeg` binary.
///
/// Frames are streamed to `ffmpeg` stdin as raw RGBA; a two-pass palette (`palettegen` with a
/// reserved transparent slot, then `paletteuse`) is built per request and the GIF is written into
/// the invocation's scratch directory. Container decoding stays native: `ffmpeg` would apply
/// disposal and drop per-frame offsets and loop metadata.
#[derive(Clone, Debug)]
pub struct FfmpegCodec {
    binary: PathBuf,
}

impl FfmpegCodec {
    /// Use an explicit `ffmpeg` binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Use the platform's default binary name, resolved through `PATH`.
    pub fn locate() -> Self {
        Self::with_binary(default_binary_name())
    }

    /// Binary this codec invokes.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Return `true` when the binary can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Platform-specific `ffmpeg` executable name.
pub fn default_binary_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Return `true` when the default `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    FfmpegCodec::locate().is_available()
}

impl CodecBackend for FfmpegCodec {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn decode(&self, bytes: &[u8]) -> AvatarGifResult<SourceGif> {
        native::decode_gif(bytes)
    }

    fn encode(&self, job: &EncodeJob<'_>, scratch: &Scratch) -> AvatarGifResult<Vec<u8>> {
        job.validate()?;
        let out_path = scratch.file("encoded.gif");

        let mut cmd = Command::new(&self.binary);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", job.canvas.width, job.canvas.height),
            // Input frame rate from the delay: one frame every `millis` ms.
            "-r",
            &format!("1000/{}", job.delay.millis()),
            "-i",
            "pipe:0",
            "-filter_complex",
            &format!(
                "[0:v]split[a][b];[a]palettegen=reserve_transparent=1:stats_mode=full[p];\
                 [b][p]paletteuse=alpha_threshold={}",
                job.alpha_threshold.max(1)
            ),
            "-loop",
            &loop_arg(job.loop_count).to_string(),
            "-f",
            "gif",
        ])
        .arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| {
            AvatarGifError::encode(format!(
                "failed to spawn '{}': {e}",
                self.binary.display()
            ))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AvatarGifError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AvatarGifError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let write_result = job
            .frames
            .iter()
            .try_for_each(|frame| stdin.write_all(frame.as_raw()));
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| AvatarGifError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| AvatarGifError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| AvatarGifError::encode(format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AvatarGifError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        write_result.map_err(|e| {
            AvatarGifError::encode(format!("failed to write frames to ffmpeg stdin: {e}"))
        })?;

        let bytes = std::fs::read(&out_path).map_err(|e| {
            AvatarGifError::encode(format!(
                "ffmpeg produced no readable output at '{}': {e}",
                out_path.display()
            ))
        })?;
        tracing::debug!(
            frames = job.frames.len(),
            bytes = bytes.len(),
            "gif encoded (ffmpeg)"
        );
        Ok(bytes)
    }
}

/// `-loop` value of the gif muxer: `-1` plays once, `0` loops forever.
fn loop_arg(loop_count: LoopCount) -> i32 {
    match loop_count {
        LoopCount::Once => -1,
        LoopCount::Infinite => 0,
        LoopCount::Finite(n) => i32::from(n),
    }
}
