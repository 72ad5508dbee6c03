//! 视频帧读取
//! 通过 `CaptureGuard` 保证底层视频资源在任何退出路径上都只释放一次

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::error::{FcResult, FactCheckError};

/// 已打开的视频资源
pub trait FrameSource: Send {
    /// 读取下一帧可解码画面；流为空或无法解码时返回 None
    fn read_frame(&mut self) -> FcResult<Option<DynamicImage>>;

    /// 释放底层资源
    fn release(&mut self);
}

/// 视频打开器
pub trait VideoOpener: Send + Sync {
    fn open(&self, path: &Path) -> FcResult<Box<dyn FrameSource>>;
}

/// 视频资源守卫：显式 `release` 或 `Drop` 时释放，且只释放一次
pub struct CaptureGuard {
    source: Option<Box<dyn FrameSource>>,
}

impl CaptureGuard {
    pub fn open(opener: &dyn VideoOpener, path: &Path) -> FcResult<Self> {
        let source = opener.open(path)?;
        Ok(Self { source: Some(source) })
    }

    /// 读取第一帧可解码画面
    pub fn first_frame(&mut self) -> FcResult<DynamicImage> {
        let Some(source) = self.source.as_mut() else {
            return Err(FactCheckError::VideoError("视频资源已释放".to_string()));
        };

        source
            .read_frame()?
            .ok_or_else(|| FactCheckError::UnreadableMedia("没有可解码的视频帧".to_string()))
    }

    pub fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            debug!("视频资源已释放");
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// 基于 ffmpeg 子进程的视频打开器：只解出第一帧并以 PNG 输出到标准输出
#[derive(Debug, Clone)]
pub struct FfmpegOpener {
    ffmpeg_path: PathBuf,
    /// 单帧解码的最长等待时间，超时后结束子进程
    timeout: Duration,
}

impl FfmpegOpener {
    pub fn new(ffmpeg_path: PathBuf, timeout: Duration) -> Self {
        Self { ffmpeg_path, timeout }
    }
}

impl VideoOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> FcResult<Box<dyn FrameSource>> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            FactCheckError::UnreadableMedia(format!("无法访问视频文件 {}：{}", path.display(), e))
        })?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(FactCheckError::UnreadableMedia(format!("视频文件为空：{}", path.display())));
        }

        let child = Command::new(&self.ffmpeg_path)
            .arg("-v")
            .arg("error")
            .arg("-nostdin")
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FactCheckError::VideoError(format!(
                    "找不到ffmpeg：{}",
                    self.ffmpeg_path.display()
                )),
                _ => FactCheckError::VideoError(format!("启动ffmpeg失败：{}", e)),
            })?;

        debug!("ffmpeg已启动，视频={}", path.display());
        Ok(Box::new(FfmpegCapture {
            child: Some(child),
            timeout: self.timeout,
        }))
    }
}

/// 子进程状态轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// ffmpeg 子进程句柄
struct FfmpegCapture {
    child: Option<Child>,
    timeout: Duration,
}

impl FrameSource for FfmpegCapture {
    fn read_frame(&mut self) -> FcResult<Option<DynamicImage>> {
        let Some(child) = self.child.as_mut() else {
            return Ok(None);
        };

        // 后台线程持续读取 stdout/stderr，避免管道写满阻塞
        let stdout = child.stdout.take().map(drain_pipe);
        let stderr = child.stderr.take().map(drain_pipe);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                self.child = None;
                warn!("ffmpeg解码超时（{:?}），已结束子进程", self.timeout);
                return Err(FactCheckError::VideoError(format!("视频帧解码超时（{:?}）", self.timeout)));
            }
            std::thread::sleep(POLL_INTERVAL);
        };
        self.child = None;

        let stdout = join_pipe(stdout);
        let stderr = join_pipe(stderr);

        if !status.success() || stdout.is_empty() {
            warn!(
                "ffmpeg未能解出视频帧：状态={}，错误输出={}",
                status,
                String::from_utf8_lossy(&stderr).trim()
            );
            return Ok(None);
        }

        match image::load_from_memory_with_format(&stdout, ImageFormat::Png) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                warn!("视频帧PNG解码失败：{}", e);
                Ok(None)
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = pipe.read_to_end(&mut buffer);
        buffer
    })
}

fn join_pipe(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
