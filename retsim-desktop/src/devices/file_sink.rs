use std::io;
use std::path::Path;

use retsim::*;

use super::InputInfo;

/// Writes every presented frame to a file named by a mustache pattern.
pub struct FileSink {
    template: mustache::Template,
    info: InputInfo,
    severity: f32,
    tick: usize,
    written: Vec<String>,
}

impl FileSink {
    pub fn new(template: mustache::Template, info: InputInfo) -> Self {
        FileSink {
            template,
            info,
            severity: 0.0,
            tick: 0,
            written: Vec::new(),
        }
    }

    /// Sets the severity that names the next frame.
    pub fn set_severity(&mut self, severity: f32) {
        self.severity = severity;
    }

    pub fn written(&self) -> &[String] {
        &self.written
    }

    fn path(&self) -> Result<String, Error> {
        self.template
            .render_to_string(&self.info.at(self.severity, self.tick))
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, err.to_string())))
    }
}

impl PresentationSink for FileSink {
    fn present(&mut self, frame: &Frame) -> Result<(), Error> {
        let path = self.path()?;
        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        frame.save(&path)?;
        log::info!("[output] wrote {}", path);
        self.written.push(path);
        self.tick += 1;
        Ok(())
    }
}
