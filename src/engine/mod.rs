// src/engine/mod.rs

//! The SM70 protocol engine: request queue plus the cooperative
//! turnaround state machine.
//!
//! The engine owns the serial port for the duration of a transaction and
//! sequences each request through send → drain → receive-enable → collect
//! → validate → complete, respecting half-duplex timing. It never blocks:
//! every wait is expressed as "stay in this state until a counter or
//! timestamp condition holds", and the host drives it forward by calling
//! [`Sm70::poll`] from its scheduler loop. Each poll performs exactly one
//! state evaluation and at most one transition.

pub mod request;

pub use request::{DoneFn, RequestHandle, RequestKind, REQUEST_POOL_SIZE};

use crate::common::error::{Sm70Error, WireError};
use crate::common::hal_traits::{Sm70Clock, Sm70Serial};
use crate::common::message::{DataReport, SensorInfoReport};
use crate::common::timing::{reply_timeout_us, SM70_BAUD, TURNAROUND_GUARD_US};
use request::RequestPool;

/// States of the turnaround machine. Exposed so hosts can observe
/// progress; only the engine ever changes state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum State {
    /// One-shot start state.
    Initial,
    /// Opens the transport at the protocol's fixed baud rate.
    Normal,
    /// Frees a finished request, then either launches the next exchange
    /// or terminates toward `Final`.
    CheckPendingRequest,
    /// Waiting for the transmit buffer to drain back to its pre-send
    /// level.
    SendingRequest,
    /// Waiting out the turnaround guard interval after the last byte
    /// left the buffer.
    DrainTx,
    /// Receive enabled; collecting reply bytes until the buffer is full
    /// or the receive deadline passes.
    EnableRx,
    /// Restores the idle line state after collection.
    RequestDone,
    /// Runs the wire codec over the collected bytes and notifies the
    /// request's completion callback.
    Validate,
    /// Closes the transport and stops the engine.
    Final,
}

/// Protocol engine for one SM70 sensor on a half-duplex serial line.
///
/// `'a` bounds the completion callbacks, `P` is the transport, `C` the
/// microsecond clock. The engine is single-threaded and cooperatively
/// scheduled; all methods are meant to be called from one context.
pub struct Sm70<'a, P, C> {
    port: P,
    clock: C,
    pool: RequestPool<'a>,
    state: State,
    /// True when the next evaluation is the first one inside `state`.
    entry: bool,
    begun: bool,
    running: bool,
    exit: bool,
    /// `free_to_write` level captured just before emitting a frame.
    tx_free_mark: usize,
    /// Timestamp anchoring the guard interval or the receive deadline.
    t_mark_us: u32,
    /// Most recent request to finish validation: slot, kind, outcome.
    last_completion: Option<(u8, RequestKind, Result<(), WireError>)>,
    data_report: Option<DataReport>,
    sensor_info: Option<SensorInfoReport>,
}

impl<'a, P, C> Sm70<'a, P, C>
where
    P: Sm70Serial,
    C: Sm70Clock,
{
    /// Creates an idle engine. Call [`Sm70::begin`] before polling.
    pub fn new(port: P, clock: C) -> Self {
        Sm70 {
            port,
            clock,
            pool: RequestPool::new(),
            state: State::Initial,
            entry: false,
            begun: false,
            running: false,
            exit: false,
            tx_free_mark: 0,
            t_mark_us: 0,
            last_completion: None,
            data_report: None,
            sensor_info: None,
        }
    }

    /// Starts operation and arms the state machine.
    pub fn begin(&mut self) {
        self.begun = true;
        self.exit = false;
        if !self.running {
            self.arm();
        }
    }

    /// Stops operation, driving the machine to `Final` first so the line
    /// is never abandoned mid-frame. An in-flight exchange is allowed to
    /// finish (bounded by the receive deadline).
    pub fn end(&mut self) {
        self.exit = true;
        while self.running {
            let _ = self.poll();
        }
        self.begun = false;
    }

    /// Advances the state machine by at most one transition.
    ///
    /// Intended to be invoked repeatedly by the host scheduler. Returns
    /// an error only when the transport fails to open; all per-request
    /// failures are delivered through completion callbacks instead.
    pub fn poll(&mut self) -> Result<(), Sm70Error<P::Error>> {
        if !self.running {
            return Ok(());
        }
        let entry = self.entry;
        self.entry = false;
        match self.step(entry) {
            Ok(Some(next)) => {
                self.state = next;
                self.entry = true;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.state = State::Final;
                self.entry = true;
                Err(e)
            }
        }
    }

    /// Submits an asynchronous data-report read. The callback fires with
    /// the validation outcome once the exchange completes; on success the
    /// decoded report is available from [`Sm70::data_report`].
    pub fn start_read_data(
        &mut self,
        done: &'a mut DoneFn<'a>,
    ) -> Result<RequestHandle, Sm70Error<P::Error>> {
        self.start(RequestKind::ReadData, Some(done))
    }

    /// Submits an asynchronous sensor-info read.
    pub fn start_read_info(
        &mut self,
        done: &'a mut DoneFn<'a>,
    ) -> Result<RequestHandle, Sm70Error<P::Error>> {
        self.start(RequestKind::ReadInfo, Some(done))
    }

    /// Cancels a request.
    ///
    /// A queued request is unlinked immediately and its callback never
    /// runs. The current request, if its exchange is already on the wire,
    /// is only marked: the exchange completes, the callback is
    /// suppressed, and the slot is reclaimed at the
    /// `CheckPendingRequest` boundary.
    pub fn cancel(&mut self, handle: RequestHandle) {
        let idx = handle.0;
        if !self.pool.is_pending(idx) {
            return;
        }
        let in_flight = self.running
            && self.pool.current() == Some(idx)
            && matches!(
                self.state,
                State::SendingRequest
                    | State::DrainTx
                    | State::EnableRx
                    | State::RequestDone
                    | State::Validate
            );
        if in_flight {
            self.pool.mark_canceled(idx);
        } else {
            self.pool.remove(idx);
            self.pool.free(idx);
        }
    }

    /// Synchronous convenience wrapper: submits a data read and polls
    /// until it completes. Meant for hosts without a scheduler loop.
    pub fn read_data(&mut self) -> Result<(), Sm70Error<P::Error>> {
        self.read_sync(RequestKind::ReadData)
    }

    /// Synchronous convenience wrapper for a sensor-info read.
    pub fn read_info(&mut self) -> Result<(), Sm70Error<P::Error>> {
        self.read_sync(RequestKind::ReadInfo)
    }

    /// The most recent successfully validated data report.
    pub fn data_report(&self) -> Option<&DataReport> {
        self.data_report.as_ref()
    }

    /// The most recent successfully validated sensor-info report.
    pub fn sensor_info(&self) -> Option<&SensorInfoReport> {
        self.sensor_info.as_ref()
    }

    /// Current state of the turnaround machine.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the state machine is armed and advancing.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Access to the underlying transport.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the underlying transport.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    fn arm(&mut self) {
        self.state = State::Initial;
        self.entry = true;
        self.running = true;
    }

    fn start(
        &mut self,
        kind: RequestKind,
        done: Option<&'a mut DoneFn<'a>>,
    ) -> Result<RequestHandle, Sm70Error<P::Error>> {
        let idx = self
            .pool
            .allocate(kind, done)
            .ok_or(Sm70Error::PoolExhausted)?;
        // This request's outcome has not been recorded yet; drop any
        // record left behind by a finished one so a recycled slot index
        // cannot alias it.
        self.last_completion = None;
        let newly_available = self.pool.enqueue(idx);
        // A drained machine parks in Final; new work re-arms it.
        if newly_available && self.begun && !self.running {
            self.exit = false;
            self.arm();
        }
        Ok(RequestHandle(idx))
    }

    fn read_sync(&mut self, kind: RequestKind) -> Result<(), Sm70Error<P::Error>> {
        if !self.begun {
            return Err(Sm70Error::NotRunning);
        }
        let handle = self.start(kind, None)?;
        loop {
            self.poll()?;
            if let Some((idx, _, outcome)) = self.last_completion {
                if idx == handle.0 {
                    self.last_completion = None;
                    return outcome.map_err(Sm70Error::from);
                }
            }
            if !self.running {
                return Err(Sm70Error::NotRunning);
            }
        }
    }

    fn elapsed_us(&self) -> u32 {
        self.clock.now_us().wrapping_sub(self.t_mark_us)
    }

    /// One state evaluation. Returns the next state, or `None` to stay.
    /// `entry` is true exactly once per state, on the evaluation that
    /// follows the transition edge.
    fn step(&mut self, entry: bool) -> Result<Option<State>, Sm70Error<P::Error>> {
        use State::*;

        Ok(match self.state {
            Initial => Some(Normal),

            Normal => {
                self.port.open(SM70_BAUD).map_err(Sm70Error::Io)?;
                Some(CheckPendingRequest)
            }

            CheckPendingRequest => {
                if entry {
                    // Reclaim the request the previous pass finished or
                    // deferred-canceled.
                    if let Some(cur) = self.pool.current() {
                        if self.pool.is_completed(cur) || self.pool.is_canceled(cur) {
                            self.pool.complete_current();
                        }
                    }
                }
                if self.exit {
                    Some(Final)
                } else if let Some(cur) = self.pool.current() {
                    let frame = self.pool.kind(cur).frame();
                    // Wait for the whole frame to fit so it is never
                    // queued truncated.
                    if self.port.free_to_write() < frame.len() {
                        None
                    } else {
                        self.port.set_tx_enable(true);
                        self.tx_free_mark = self.port.free_to_write();
                        self.port.write(frame);
                        Some(SendingRequest)
                    }
                } else {
                    Some(Final)
                }
            }

            SendingRequest => {
                // All bytes have left the local buffer once the free
                // count returns to its pre-send level.
                if self.port.free_to_write() >= self.tx_free_mark {
                    Some(DrainTx)
                } else {
                    None
                }
            }

            DrainTx => {
                if entry {
                    let _ = self.port.flush();
                    self.t_mark_us = self.clock.now_us();
                }
                if self.elapsed_us() >= TURNAROUND_GUARD_US {
                    Some(EnableRx)
                } else {
                    None
                }
            }

            EnableRx => {
                if entry {
                    self.port.set_tx_enable(false);
                    self.port.set_rx_enable(true);
                    // Anything already buffered predates the request.
                    while self.port.read_byte().is_ok() {}
                    if let Some(cur) = self.pool.current() {
                        self.pool.clear_buf(cur);
                    }
                    self.t_mark_us = self.clock.now_us();
                }
                let cur = match self.pool.current() {
                    Some(cur) => cur,
                    None => return Ok(Some(RequestDone)),
                };
                let want = self.pool.kind(cur).reply_len();
                while self.pool.buf_len(cur) < want && self.port.available() > 0 {
                    match self.port.read_byte() {
                        Ok(byte) => self.pool.push_byte(cur, byte),
                        Err(_) => break,
                    }
                }
                if self.pool.buf_len(cur) >= want {
                    Some(RequestDone)
                } else if self.elapsed_us() >= reply_timeout_us(want) {
                    // Short or absent reply; validation will report it.
                    Some(RequestDone)
                } else {
                    None
                }
            }

            RequestDone => {
                if entry {
                    self.port.set_rx_enable(false);
                    self.port.set_tx_enable(false);
                }
                Some(Validate)
            }

            Validate => {
                if let Some(cur) = self.pool.current() {
                    let kind = self.pool.kind(cur);
                    let outcome = self.validate_current(cur);
                    if !self.pool.is_canceled(cur) {
                        self.last_completion = Some((cur, kind, outcome));
                        if let Some(done) = self.pool.take_done(cur) {
                            done(kind, outcome);
                        }
                    }
                    self.pool.mark_completed(cur);
                }
                Some(CheckPendingRequest)
            }

            Final => {
                if entry {
                    if !self.exit && self.pool.current().is_some() {
                        // A request slipped in after the empty-queue
                        // decision; resume instead of shutting down.
                        Some(CheckPendingRequest)
                    } else {
                        self.port.close();
                        self.port.set_tx_enable(false);
                        self.port.set_rx_enable(false);
                        self.running = false;
                        None
                    }
                } else {
                    None
                }
            }
        })
    }

    /// Zero-pads the collected bytes out to the kind's fixed layout and
    /// runs the codec's validation; a short or garbled reply surfaces
    /// here as a header or checksum failure.
    fn validate_current(&mut self, cur: u8) -> Result<(), WireError> {
        match self.pool.kind(cur) {
            RequestKind::ReadData => {
                let mut raw = [0u8; DataReport::LEN];
                let got = self.pool.buf(cur);
                raw[..got.len()].copy_from_slice(got);
                let report = DataReport::from_bytes(raw);
                let outcome = report.validate();
                if outcome.is_ok() {
                    self.data_report = Some(report);
                }
                outcome
            }
            RequestKind::ReadInfo => {
                let mut raw = [0u8; SensorInfoReport::LEN];
                let got = self.pool.buf(cur);
                let take = got.len().min(SensorInfoReport::LEN);
                raw[..take].copy_from_slice(&got[..take]);
                let report = SensorInfoReport::from_bytes(raw);
                let outcome = report.validate();
                if outcome.is_ok() {
                    self.sensor_info = Some(report);
                }
                outcome
            }
        }
    }
}
