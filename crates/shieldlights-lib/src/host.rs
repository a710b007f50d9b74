//! Service host — line-delimited JSON requests served by a worker pool.
//!
//! Stands in for the platform's binder thread pool: each request line is
//! handed to one of `workers` threads, translated by the matching front-end
//! and answered with one JSON line. Responses carry the request's `seq` so a
//! client can match them up; with more than one worker they may arrive out
//! of order.

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, mpsc};

use serde::{Deserialize, Serialize};

use crate::error::{LightsError, Result};
use crate::frontend::{AidlLights, HidlLights, hidl};
use crate::light::{HwLight, LightState, LightType};
use crate::lights::Lights;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Current interface: address a light by identifier.
    SetLightState { id: i32, state: LightState },
    GetLights,
    /// Previous interface: address a light by type.
    SetLight {
        #[serde(rename = "type")]
        light_type: LightType,
        state: LightState,
    },
    GetSupportedTypes,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    seq: Option<u64>,
    #[serde(flatten)]
    request: Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Unsupported,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<Vec<HwLight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<LightType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    fn status(seq: Option<u64>, status: ResponseStatus) -> Self {
        Response {
            seq,
            status,
            lights: None,
            types: None,
            message: None,
        }
    }

    fn error(seq: Option<u64>, message: String) -> Self {
        Response {
            message: Some(message),
            ..Self::status(seq, ResponseStatus::Error)
        }
    }
}

pub struct ServiceHost {
    name: String,
    workers: usize,
    aidl: AidlLights,
    hidl: HidlLights,
}

impl ServiceHost {
    pub fn new(name: impl Into<String>, core: Arc<dyn Lights>, workers: usize) -> Self {
        ServiceHost {
            name: name.into(),
            workers: workers.max(1),
            aidl: AidlLights::new(Arc::clone(&core)),
            hidl: HidlLights::new(core),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle one decoded request.
    pub fn dispatch(&self, seq: Option<u64>, request: Request) -> Response {
        match request {
            Request::SetLightState { id, state } => match self.aidl.set_light_state(id, &state) {
                Ok(()) => Response::status(seq, ResponseStatus::Ok),
                Err(status) => Response {
                    message: Some(status.to_string()),
                    ..Response::status(seq, ResponseStatus::Unsupported)
                },
            },
            Request::GetLights => match self.aidl.get_lights() {
                Ok(lights) => Response {
                    lights: Some(lights),
                    ..Response::status(seq, ResponseStatus::Ok)
                },
                Err(status) => Response::error(seq, status.to_string()),
            },
            Request::SetLight { light_type, state } => {
                let status = match self.hidl.set_light(light_type, &state) {
                    hidl::Status::Success => ResponseStatus::Ok,
                    hidl::Status::LightNotSupported | hidl::Status::BrightnessNotSupported => {
                        ResponseStatus::Unsupported
                    }
                    hidl::Status::Unknown => ResponseStatus::Error,
                };
                Response::status(seq, status)
            }
            Request::GetSupportedTypes => Response {
                types: Some(self.hidl.get_supported_types()),
                ..Response::status(seq, ResponseStatus::Ok)
            },
        }
    }

    /// Decode and handle one request line. Malformed input yields an error
    /// response rather than a failure.
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Envelope>(line) {
            Ok(env) => self.dispatch(env.seq, env.request),
            Err(e) => {
                let err = LightsError::Protocol(e.to_string());
                log::warn!("rejected request: {err}");
                Response::error(None, err.to_string())
            }
        }
    }

    /// Serve requests from `reader` until it is exhausted, writing one
    /// response line per request to `writer`.
    pub fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write + Send,
    {
        log::info!("{} serving with {} workers", self.name, self.workers);
        let (tx, rx) = mpsc::channel::<String>();
        let rx = Mutex::new(rx);
        let writer = Mutex::new(writer);

        std::thread::scope(|scope| {
            for _ in 0..self.workers {
                scope.spawn(|| self.worker(&rx, &writer));
            }

            let mut result = Ok(());
            for line in reader.lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => {}
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        result = Err(LightsError::Io(e));
                        break;
                    }
                }
            }
            drop(tx);
            result
        })
    }

    fn worker<W: Write>(&self, rx: &Mutex<mpsc::Receiver<String>>, writer: &Mutex<W>) {
        loop {
            let line = {
                let Ok(rx) = rx.lock() else { return };
                match rx.recv() {
                    Ok(line) => line,
                    Err(_) => return,
                }
            };
            let response = self.handle_line(&line);
            let encoded = match serde_json::to_string(&response) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("could not encode response: {e}");
                    continue;
                }
            };
            let Ok(mut out) = writer.lock() else { return };
            if let Err(e) = writeln!(out, "{encoded}").and_then(|()| out.flush()) {
                log::warn!("could not write response: {e}");
            }
        }
    }
}
