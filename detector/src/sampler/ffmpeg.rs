use anyhow::{Context, Result, anyhow, bail};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use super::{FrameSampler, SamplingPlan, select_frames};
use crate::frame::Frame;

/// Samples frames by piping raw rgb24 video out of the `ffmpeg` CLI
pub struct FfmpegSampler {
    threads: usize,
    timing: OnceLock<[&'static str; 2]>,
}

impl FfmpegSampler {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            timing: OnceLock::new(),
        }
    }

    fn timing_args(&self) -> [&'static str; 2] {
        *self.timing.get_or_init(|| {
            let version = probe_version();
            log::debug!("Detected ffmpeg version {:?}", version);
            timing_args(version)
        })
    }

    fn decode(&self, path: &Path, plan: &SamplingPlan) -> Result<Vec<Frame>> {
        let (width, height) = probe_dimensions(path)?;

        // Autorotation stays off so output dimensions match the probe.
        // Passthrough timing keeps decoded frames 1:1 with source frames.
        let mut child = Command::new("ffmpeg")
            .args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .args(["-threads", &self.threads.to_string()])
            .arg("-noautorotate")
            .arg("-i")
            .arg(path)
            .args(["-map", "0:v:0", "-an", "-sn"])
            .args(["-frames:v", &plan.decode_limit().to_string()])
            .args(self.timing_args())
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg")?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("ffmpeg stdout was not captured"))?;

        // Drain stderr on the side so a chatty decoder cannot stall the pipe
        let stderr_drain = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let frames = select_frames(RawFrameReader::new(stdout, width, height), plan);

        let status = child.wait().context("Failed to wait on ffmpeg")?;
        let stderr = stderr_drain
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            // Keep whatever decoded cleanly before the failure
            log::warn!(
                "ffmpeg exited with {} after {} frames from {:?}: {}",
                status,
                frames.len(),
                path,
                stderr.trim()
            );
        }

        Ok(frames)
    }
}

impl FrameSampler for FfmpegSampler {
    fn sample(&self, path: &Path, plan: &SamplingPlan) -> Vec<Frame> {
        match self.decode(path, plan) {
            Ok(frames) => {
                log::info!(
                    "Sampled {} frames from {:?} (max {}, stride {})",
                    frames.len(),
                    path,
                    plan.max_frames(),
                    plan.stride()
                );
                frames
            }
            Err(e) => {
                log::warn!("Could not sample frames from {:?}: {:#}", path, e);
                vec![]
            }
        }
    }
}

/// `-fps_mode` replaced `-vsync` in ffmpeg 5.1. Unknown versions (git
/// builds, failed probes) get the current flag.
fn timing_args(version: Option<(u32, u32)>) -> [&'static str; 2] {
    match version {
        Some(version) if version < (5, 1) => ["-vsync", "passthrough"],
        _ => ["-fps_mode", "passthrough"],
    }
}

fn probe_version() -> Option<(u32, u32)> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    parse_version(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `major.minor` from the first line of `ffmpeg -version`, e.g.
/// `ffmpeg version 4.4.2-0ubuntu0.22.04.1` or `ffmpeg version n6.1.1`
fn parse_version(output: &str) -> Option<(u32, u32)> {
    let token = output
        .lines()
        .next()?
        .trim()
        .strip_prefix("ffmpeg version ")?
        .split_whitespace()
        .next()?
        .trim_start_matches('n');

    let numeric: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some((major, minor))
}

/// Reads the first video stream's dimensions with ffprobe
fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height"])
        .args(["-of", "csv=p=0:s=x"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("Failed to spawn ffprobe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe failed: {}", stderr.trim());
    }

    parse_dimensions(&String::from_utf8_lossy(&output.stdout))
}

/// Parse ffprobe's `WIDTHxHEIGHT` output
fn parse_dimensions(output: &str) -> Result<(u32, u32)> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| anyhow!("no video stream found"))?;

    let mut parts = line.split('x').map(|p| p.trim().parse::<u32>());
    match (parts.next(), parts.next()) {
        (Some(Ok(width)), Some(Ok(height))) if width > 0 && height > 0 => Ok((width, height)),
        _ => bail!("unexpected ffprobe dimensions: {:?}", line),
    }
}

/// Splits a packed rgb24 byte stream into frames of a fixed size.
///
/// Iteration stops at end of stream; a trailing partial frame is dropped.
pub struct RawFrameReader<R> {
    inner: R,
    width: u32,
    height: u32,
    position: usize,
    done: bool,
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(inner: R, width: u32, height: u32) -> Self {
        Self {
            inner,
            width,
            height,
            position: 0,
            done: width == 0 || height == 0,
        }
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl<R: Read> Iterator for RawFrameReader<R> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }

        let mut rgb = vec![0u8; self.frame_len()];
        match self.inner.read_exact(&mut rgb) {
            Ok(()) => {
                let frame = Frame {
                    index: self.position,
                    width: self.width,
                    height: self.height,
                    rgb,
                };
                self.position += 1;
                Some(frame)
            }
            Err(e) => {
                if e.kind() != ErrorKind::UnexpectedEof {
                    log::warn!("Raw frame stream failed after {} frames: {}", self.position, e);
                }
                self.done = true;
                None
            }
        }
    }
}
