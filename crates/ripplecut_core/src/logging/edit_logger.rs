//! Per-operation logger with file and callback output.
//!
//! Each edit operation can get its own logger that:
//! - Writes to a dedicated log file (optional)
//! - Sends lines to a host callback (optional)
//! - Raises modal notifications through a second callback
//! - Keeps a tail buffer of recent lines for error reports
//! - Dumps the clip layout and transition markers after an edit

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{HostLogCallback, LogConfig, LogLevel, MessagePrefix, NotifyCallback};
use crate::models::{Project, TrackId};

/// Per-operation logger with dual output (file + host).
pub struct EditLogger {
    operation: String,
    log_path: Option<PathBuf>,
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    host_callback: Arc<Mutex<Option<HostLogCallback>>>,
    notify_callback: Arc<Mutex<Option<NotifyCallback>>>,
    config: LogConfig,
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl EditLogger {
    /// Create a logger writing to `<log_dir>/<operation>.log`.
    pub fn new(
        operation: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        host_callback: Option<HostLogCallback>,
    ) -> std::io::Result<Self> {
        let operation = operation.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&operation)));
        let file = File::create(&log_path)?;

        let mut logger = Self::in_memory(operation, config, host_callback);
        logger.log_path = Some(log_path);
        *logger.file_writer.lock() = Some(BufWriter::new(file));
        Ok(logger)
    }

    /// Create a logger without a log file.
    pub fn in_memory(
        operation: impl Into<String>,
        config: LogConfig,
        host_callback: Option<HostLogCallback>,
    ) -> Self {
        let tail_capacity = config.error_tail;
        Self {
            operation: operation.into(),
            log_path: None,
            file_writer: Arc::new(Mutex::new(None)),
            host_callback: Arc::new(Mutex::new(host_callback)),
            notify_callback: Arc::new(Mutex::new(None)),
            config,
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(tail_capacity))),
        }
    }

    /// Install the host's modal notification callback.
    pub fn set_notify_callback(&self, callback: NotifyCallback) {
        *self.notify_callback.lock() = Some(callback);
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.push_tail(message);
        if level < self.config.level {
            return;
        }
        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Per-clip detail line. In compact mode it only reaches the tail buffer.
    pub fn detail(&self, line: &str) {
        if self.config.compact {
            self.push_tail(line);
            return;
        }
        self.log(LogLevel::Info, line);
    }

    /// Raise a modal notification in the host and log it.
    pub fn notify(&self, title: &str, message: &str) {
        self.log(LogLevel::Info, &format!("[{}] {}", title, message));
        if let Some(ref callback) = *self.notify_callback.lock() {
            callback(title, message);
        }
    }

    /// Log the final layout of a track, one line per clip.
    pub fn log_layout(&self, project: &Project, track: TrackId) {
        let Some(track) = project.track(track) else {
            return;
        };
        self.section(&format!("Layout of {}", track.label()));
        for (index, clip) in track.clips().iter().enumerate() {
            self.detail(&format!(
                "Clip {}: start={} end={} length={} fade_in={} fade_out={} rate={:.3} envelope={:.3}",
                index,
                clip.start,
                clip.end(),
                clip.length,
                clip.fade_in,
                clip.fade_out,
                clip.playback_rate,
                clip.velocity_factor()
            ));
        }
    }

    /// Log the positions of all markers with `label`.
    pub fn log_transition_markers(&self, project: &Project, label: &str) {
        let markers = project.markers_labelled(label);
        self.section(&format!("{} '{}' marker(s)", markers.len(), label));
        for marker in markers {
            self.detail(&format!("Marker at {}", marker.position));
        }
    }

    /// Replay the tail buffer (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }
        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(line));
        }
    }

    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Flush and close the log file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn push_tail(&self, line: &str) {
        if self.config.error_tail == 0 {
            return;
        }
        let mut buffer = self.tail_buffer.lock();
        if buffer.len() >= self.config.error_tail {
            buffer.pop_front();
        }
        buffer.push_back(line.to_string());
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }
        if let Some(ref callback) = *self.host_callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for EditLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditLogger")
            .field("operation", &self.operation)
            .field("log_path", &self.log_path)
            .field("config", &self.config)
            .finish()
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ' ' => '_',
            _ => c,
        })
        .collect()
}

/// Builder for [`EditLogger`].
pub struct EditLoggerBuilder {
    operation: String,
    log_dir: Option<PathBuf>,
    config: LogConfig,
    host_callback: Option<HostLogCallback>,
    notify_callback: Option<NotifyCallback>,
}

impl EditLoggerBuilder {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            log_dir: None,
            config: LogConfig::default(),
            host_callback: None,
            notify_callback: None,
        }
    }

    /// Write a log file into `dir`.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.config.compact = compact;
        self
    }

    pub fn host_callback(mut self, callback: HostLogCallback) -> Self {
        self.host_callback = Some(callback);
        self
    }

    pub fn notify_callback(mut self, callback: NotifyCallback) -> Self {
        self.notify_callback = Some(callback);
        self
    }

    pub fn build(self) -> std::io::Result<EditLogger> {
        let logger = match self.log_dir {
            Some(dir) => EditLogger::new(self.operation, dir, self.config, self.host_callback)?,
            None => EditLogger::in_memory(self.operation, self.config, self.host_callback),
        };
        if let Some(callback) = self.notify_callback {
            logger.set_notify_callback(callback);
        }
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clip, FrameRate, MediaKind, Timecode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn creates_log_file() {
        let dir = tempdir().unwrap();
        let logger = EditLogger::new("collapse", dir.path(), LogConfig::default(), None).unwrap();
        let path = logger.log_path().unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with("collapse.log"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = EditLogger::new("shift", dir.path(), LogConfig::default(), None).unwrap();
        logger.info("Shifted 3 clips");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("Shifted 3 clips"));
    }

    #[test]
    fn calls_host_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: HostLogCallback = Box::new(move |_msg| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let logger = EditLogger::in_memory("speed", LogConfig::default(), Some(callback));
        logger.info("one");
        logger.debug("filtered by level");
        logger.info("two");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn notify_reaches_host() {
        let seen = Arc::new(Mutex::new(Vec::<(String, String)>::new()));
        let sink = seen.clone();
        let logger = EditLoggerBuilder::new("cut list")
            .notify_callback(Box::new(move |title, message| {
                sink.lock().push((title.to_string(), message.to_string()));
            }))
            .build()
            .unwrap();

        logger.notify("Error", "No video track named 'main' found");
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Error");
    }

    #[test]
    fn compact_details_only_reach_tail() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let logger = EditLoggerBuilder::new("collapse")
            .compact(true)
            .host_callback(Box::new(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .build()
            .unwrap();

        logger.detail("Clip 0: start=00:00:00.000");
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(logger.get_tail(), vec!["Clip 0: start=00:00:00.000"]);
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let config = LogConfig {
            error_tail: 5,
            ..LogConfig::default()
        };
        let logger = EditLogger::in_memory("collapse", config, None);
        for i in 0..10 {
            logger.detail(&format!("Line {}", i));
        }
        let tail = logger.get_tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "Line 5");
        assert_eq!(tail[4], "Line 9");
    }

    #[test]
    fn layout_lists_every_clip() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        project.add_clip(main, Clip::from_ms(0, 1000)).unwrap();
        project.add_clip(main, Clip::from_ms(1000, 500)).unwrap();
        project.add_marker(Timecode::from_ms(990), "v");

        let logger = EditLogger::in_memory("collapse", LogConfig::debug(), None);
        logger.log_layout(&project, main);
        logger.log_transition_markers(&project, "v");
        let tail = logger.get_tail();
        assert!(tail.iter().any(|line| line.starts_with("Clip 1: start=00:00:01.000")));
        assert!(tail.iter().any(|line| line == "Marker at 00:00:00.990"));
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("collapse"), "collapse");
        assert_eq!(sanitize_filename("cut list"), "cut_list");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}
