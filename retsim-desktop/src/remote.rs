use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;

use ws::{listen, CloseCode, Handler, Message, Sender};

use retsim::*;

/// A command received from a remote client.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    /// Sets the severity.
    Severity(f32),
    /// Sets the severity and/or disease parameters.
    Update {
        severity: Option<f32>,
        values: ValueMap,
    },
    /// Freezes severity and parameter updates.
    Pause,
    /// Unfreezes updates.
    Continue,
}

impl RemoteCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "PAUSE" {
            Some(RemoteCommand::Pause)
        } else if text == "CONTINUE" {
            Some(RemoteCommand::Continue)
        } else if text.starts_with('{') {
            // JSON syntax implies config.
            let json: serde_json::Value = serde_json::from_str(text).ok()?;
            let mut values = values_from_json(&json);
            let severity = values.remove("severity").and_then(|value| value.as_f64());
            Some(RemoteCommand::Update {
                severity: severity.map(|s| s as f32),
                values,
            })
        } else {
            text.parse::<f32>().ok().map(RemoteCommand::Severity)
        }
    }
}

#[derive(Default)]
struct RemoteState {
    paused: AtomicBool,
    values: Mutex<Option<ValueMap>>,
}

impl RemoteState {
    fn apply(&self, command: RemoteCommand, severity: &SharedSeverity) {
        match command {
            RemoteCommand::Pause => {
                log::info!("[remote] updates paused");
                self.paused.store(true, Ordering::SeqCst);
            }
            RemoteCommand::Continue => {
                log::info!("[remote] updates resumed");
                self.paused.store(false, Ordering::SeqCst);
            }
            _ if self.paused.load(Ordering::SeqCst) => {
                log::debug!("[remote] ignoring update while paused");
            }
            RemoteCommand::Severity(value) => severity.set(value),
            RemoteCommand::Update {
                severity: value,
                values,
            } => {
                if let Some(value) = value {
                    severity.set(value);
                }
                if !values.is_empty() {
                    let mut pending = self.values.lock().unwrap_or_else(PoisonError::into_inner);
                    pending.get_or_insert_with(ValueMap::new).extend(values);
                }
            }
        }
    }
}

///
/// Remote control over WebSocket.
///
/// Clients send severities and parameters as text messages and receive every published
/// frame as a JPEG image.
///
pub struct Remote {
    state: Arc<RemoteState>,
    clients: Arc<RwLock<Vec<Sender>>>,
}

impl Remote {
    pub fn new(port: u16, severity: SharedSeverity) -> Result<Self, Error> {
        let remote = Remote {
            state: Arc::new(RemoteState::default()),
            clients: Arc::new(RwLock::new(Vec::new())),
        };

        // Start listening thread.
        let clients = remote.clients.clone();
        let state = remote.state.clone();
        thread::Builder::new()
            .name("retsim-remote".to_string())
            .spawn(move || {
                log::info!("[remote] listening to ws://localhost:{}/", port);
                let result = listen(format!("0.0.0.0:{}", port), |out| {
                    log::info!("[remote] client connected");
                    clients
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(out.clone());
                    RemoteClient {
                        out,
                        state: state.clone(),
                        severity: severity.clone(),
                        clients: clients.clone(),
                    }
                });
                if let Err(err) = result {
                    log::error!("[remote] listener failed: {}", err);
                }
            })?;
        Ok(remote)
    }

    /// Parameters received since the last call, if any.
    pub fn take_values(&self) -> Option<ValueMap> {
        self.state
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    /// Sends a frame to all connected clients.
    pub fn publish(&self, frame: &Frame) {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        if clients.is_empty() {
            return;
        }
        let mut data = Vec::new();
        let mut encoder = image::jpeg::JpegEncoder::new_with_quality(&mut data, 50);
        let (width, height) = frame.dimensions();
        if let Err(err) = encoder.encode(frame.as_raw(), width, height, image::ColorType::Rgb8) {
            log::warn!("[remote] unable to encode frame: {}", err);
            return;
        }
        for client in clients.iter() {
            if let Err(err) = client.send(data.clone()) {
                log::warn!("[remote] dropping frame for client {}: {}", client.connection_id(), err);
            }
        }
    }
}

struct RemoteClient {
    out: Sender,
    state: Arc<RemoteState>,
    severity: SharedSeverity,
    clients: Arc<RwLock<Vec<Sender>>>,
}

impl Handler for RemoteClient {
    fn on_message(&mut self, msg: Message) -> ws::Result<()> {
        match msg {
            Message::Text(ref text) => match RemoteCommand::parse(text) {
                Some(command) => self.state.apply(command, &self.severity),
                None => log::warn!("[remote] dropping unexpected message {:?}", text),
            },
            Message::Binary(_) => log::warn!("[remote] dropping unexpected binary data"),
        }
        Ok(())
    }

    fn on_close(&mut self, code: CloseCode, reason: &str) {
        log::info!("[remote] closing with {:?}: {}", code, reason);
        let id = self.out.connection_id();
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|client| client.connection_id() != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(RemoteCommand::parse(" 0.25 "), Some(RemoteCommand::Severity(0.25)));
        assert_eq!(RemoteCommand::parse("PAUSE"), Some(RemoteCommand::Pause));
        assert_eq!(RemoteCommand::parse("CONTINUE"), Some(RemoteCommand::Continue));
        assert_eq!(RemoteCommand::parse("hello"), None);
        assert_eq!(RemoteCommand::parse("{broken"), None);

        match RemoteCommand::parse(r#"{"severity": 0.5, "glaucoma_s1": 0.3}"#) {
            Some(RemoteCommand::Update { severity, values }) => {
                assert_eq!(severity, Some(0.5));
                assert_eq!(values.len(), 1);
                assert_eq!(values["glaucoma_s1"], Value::Number(0.3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pause_freezes_updates() {
        let state = RemoteState::default();
        let severity = SharedSeverity::new(0.1);
        state.apply(RemoteCommand::Severity(0.4), &severity);
        assert_eq!(severity.get(), 0.4);

        state.apply(RemoteCommand::Pause, &severity);
        state.apply(RemoteCommand::Severity(0.9), &severity);
        let mut values = ValueMap::new();
        values.insert("cataract_blur".to_string(), Value::Number(0.01));
        state.apply(
            RemoteCommand::Update {
                severity: None,
                values: values.clone(),
            },
            &severity,
        );
        assert_eq!(severity.get(), 0.4);
        assert!(state.values.lock().unwrap().is_none());

        state.apply(RemoteCommand::Continue, &severity);
        state.apply(
            RemoteCommand::Update {
                severity: Some(0.7),
                values,
            },
            &severity,
        );
        assert_eq!(severity.get(), 0.7);
        assert_eq!(state.values.lock().unwrap().as_ref().map(|v| v.len()), Some(1));
    }
}
