use super::FemState;
use crate::base::DEFAULT_VIS_PORT;
use russell_lab::Vector;
use serde::Serialize;
use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

/// Holds the payload streamed to the visualization server at each step
#[derive(Serialize)]
struct VisPayload<'a> {
    step: usize,
    t: f64,
    coordinates: &'a Vector,
    deformation: &'a Vector,
}

/// Streams the mesh and deformation state to an external rendering server
///
/// The connection is optional: if the server cannot be reached, the stream is
/// silently skipped; write errors disable the stream for the rest of the run.
pub struct Visualization {
    stream: Option<TcpStream>,
}

impl Visualization {
    /// Allocates a new instance, trying to connect to localhost
    ///
    /// With `enabled = false`, no connection is attempted.
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Visualization { stream: None };
        }
        Visualization {
            stream: TcpStream::connect_timeout(
                &([127, 0, 0, 1], DEFAULT_VIS_PORT).into(),
                Duration::from_millis(250),
            )
            .ok(),
        }
    }

    /// Returns whether the stream is connected
    pub fn connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Streams the state of one step (one JSON line)
    pub fn send_step(&mut self, state: &FemState, step: usize) {
        let stream = match &mut self.stream {
            Some(s) => s,
            None => return,
        };
        let payload = VisPayload {
            step,
            t: state.t,
            coordinates: &state.xx,
            deformation: &state.xx_def,
        };
        let mut line = match serde_json::to_string(&payload) {
            Ok(l) => l,
            Err(_) => return,
        };
        line.push('\n');
        if stream.write_all(line.as_bytes()).is_err() {
            self.stream = None; // disable the stream on write errors
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
