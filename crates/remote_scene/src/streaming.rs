//! Streaming read state machine
//!
//! A sensor starts cold. Its first read is blocking and, once that succeeds, subscribes
//! the sensor to server-side streaming. Later reads poll the client-side buffer. Until
//! the first buffered value arrives, the value captured by the blocking read masks
//! buffer misses.

use contracts::{Handle, LinkResult, ObjectKind, OpMode};
use observability::ReadPath;
use tracing::{debug, warn};

use crate::error::{Result, SceneError};
use crate::link::{LinkOperation, RemoteLink};
use crate::session::Session;

/// One kind of streamable sensor read
pub(crate) trait StreamedRead {
    type Reading: Clone;

    const KIND: ObjectKind;
    const OPERATION: LinkOperation;

    fn read(link: &dyn RemoteLink, handle: Handle, mode: OpMode) -> LinkResult<Self::Reading>;
}

/// Streaming state of one sensor
#[derive(Debug, Clone)]
pub struct StreamState<R> {
    streamed: bool,
    /// Value captured by the cold read, held until the buffer first delivers
    last_good: Option<R>,
}

impl<R> Default for StreamState<R> {
    fn default() -> Self {
        Self {
            streamed: false,
            last_good: None,
        }
    }
}

impl<R: Clone> StreamState<R> {
    pub fn is_streamed(&self) -> bool {
        self.streamed
    }

    /// Whether a buffer miss would still be masked
    #[cfg(test)]
    pub fn holds_fallback(&self) -> bool {
        self.last_good.is_some()
    }

    /// Produce the next value for the sensor at `handle`
    pub(crate) fn next<S>(&mut self, session: &Session, handle: Handle) -> Result<R>
    where
        S: StreamedRead<Reading = R>,
    {
        session.ensure_alive()?;
        session.ensure_running()?;

        if !self.streamed {
            return self.cold_start::<S>(session, handle);
        }

        match Self::buffered::<S>(session, handle) {
            Ok(reading) => {
                if self.last_good.take().is_some() {
                    debug!(handle, operation = %S::OPERATION, "first buffered value received");
                }
                session.record_read(S::KIND, ReadPath::Buffered);
                Ok(reading)
            }
            Err(err) => match &self.last_good {
                Some(fallback) => {
                    warn!(handle, operation = %S::OPERATION, error = %err, "buffered read missed, returning subscription-time value");
                    session.record_read(S::KIND, ReadPath::Masked);
                    Ok(fallback.clone())
                }
                None => Err(err.escalate()),
            },
        }
    }

    fn cold_start<S>(&mut self, session: &Session, handle: Handle) -> Result<R>
    where
        S: StreamedRead<Reading = R>,
    {
        let reading = session
            .call(S::OPERATION, OpMode::Blocking, |link| {
                S::read(link, handle, OpMode::Blocking)
            })?
            .map_err(|code| SceneError::remote(S::OPERATION, code))?;

        let subscribed = session.call(S::OPERATION, OpMode::Streaming, |link| {
            S::read(link, handle, OpMode::Streaming).map(drop)
        })?;
        if let Err(code) = subscribed {
            if !code.accepted_for(OpMode::Streaming) {
                return Err(SceneError::remote(S::OPERATION, code));
            }
        }

        self.streamed = true;
        self.last_good = Some(reading.clone());
        debug!(handle, operation = %S::OPERATION, "stream subscribed");
        session.record_read(S::KIND, ReadPath::Cold);
        Ok(reading)
    }

    fn buffered<S>(session: &Session, handle: Handle) -> Result<R>
    where
        S: StreamedRead<Reading = R>,
    {
        session
            .call(S::OPERATION, OpMode::Buffer, |link| {
                S::read(link, handle, OpMode::Buffer)
            })?
            .map_err(|code| {
                if code.is_no_value() {
                    SceneError::TransientReadMiss {
                        operation: S::OPERATION,
                        code,
                    }
                } else {
                    SceneError::remote(S::OPERATION, code)
                }
            })
    }
}
