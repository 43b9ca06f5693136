// src/engine/request.rs

//! Fixed-capacity request pool and pending queue.
//!
//! Requests live in a small arena of slots addressed by `u8` indices; no
//! dynamic allocation, no raw pointers. A slot is always in exactly one
//! place: on the free list (a FIFO threaded through `next`), or on the
//! circular doubly-linked pending list whose head is the single "current"
//! in-flight request. The circular links give O(1) removal from any
//! position, which cancellation and completion both rely on.

use arrayvec::ArrayVec;

use crate::common::error::WireError;
use crate::common::message::{
    DataReport, SensorInfoReport, DATA_REQUEST_FRAME, SENSOR_INFO_REQUEST_FRAME,
};

/// Number of request slots. Exceeding this makes `allocate` fail until a
/// slot frees; callers retry rather than queueing elsewhere.
pub const REQUEST_POOL_SIZE: usize = 4;

/// Largest reply the engine ever collects (the 15-byte data report).
pub const MAX_REPLY_LEN: usize = DataReport::LEN;

/// The kind of logical operation a request performs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RequestKind {
    /// Poll the sensor for a data report.
    ReadData,
    /// Ask the sensor to describe itself.
    ReadInfo,
}

impl RequestKind {
    /// The constant outbound frame for this request kind.
    pub(crate) fn frame(self) -> &'static [u8; 4] {
        match self {
            RequestKind::ReadData => &DATA_REQUEST_FRAME,
            RequestKind::ReadInfo => &SENSOR_INFO_REQUEST_FRAME,
        }
    }

    /// Expected reply length for this request kind.
    pub(crate) fn reply_len(self) -> usize {
        match self {
            RequestKind::ReadData => DataReport::LEN,
            RequestKind::ReadInfo => SensorInfoReport::LEN,
        }
    }
}

/// Completion callback type. Receives the request kind and the validation
/// outcome; captured state stands in for an opaque user-data pointer. The
/// lifetime lets callbacks borrow from the caller's stack frame.
pub type DoneFn<'a> = dyn FnMut(RequestKind, Result<(), WireError>) + 'a;

/// Opaque handle to a submitted request, for use with cancel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RequestHandle(pub(crate) u8);

struct Slot<'a> {
    kind: RequestKind,
    done: Option<&'a mut DoneFn<'a>>,
    buf: ArrayVec<u8, MAX_REPLY_LEN>,
    next: u8,
    prev: u8,
    pending: bool,
    canceled: bool,
    completed: bool,
}

impl<'a> Slot<'a> {
    fn new() -> Self {
        Slot {
            kind: RequestKind::ReadData,
            done: None,
            buf: ArrayVec::new(),
            next: 0,
            prev: 0,
            pending: false,
            canceled: false,
            completed: false,
        }
    }
}

pub(crate) struct RequestPool<'a> {
    slots: [Slot<'a>; REQUEST_POOL_SIZE],
    free_head: Option<u8>,
    free_tail: Option<u8>,
    /// Head of the circular pending list; the head is the current request.
    head: Option<u8>,
}

impl<'a> RequestPool<'a> {
    pub(crate) fn new() -> Self {
        let mut pool = RequestPool {
            slots: core::array::from_fn(|_| Slot::new()),
            free_head: None,
            free_tail: None,
            head: None,
        };
        for idx in 0..REQUEST_POOL_SIZE as u8 {
            pool.push_free(idx);
        }
        pool
    }

    // Invariant: the last free node's `next` points at itself.
    fn push_free(&mut self, idx: u8) {
        self.slots[idx as usize].next = idx;
        match self.free_tail {
            Some(tail) => self.slots[tail as usize].next = idx,
            None => self.free_head = Some(idx),
        }
        self.free_tail = Some(idx);
    }

    /// Takes a slot off the free list, or `None` when the pool is
    /// exhausted.
    pub(crate) fn allocate(
        &mut self,
        kind: RequestKind,
        done: Option<&'a mut DoneFn<'a>>,
    ) -> Option<u8> {
        let idx = self.free_head?;
        let next = self.slots[idx as usize].next;
        if next == idx {
            self.free_head = None;
            self.free_tail = None;
        } else {
            self.free_head = Some(next);
        }
        let slot = &mut self.slots[idx as usize];
        slot.kind = kind;
        slot.done = done;
        slot.buf.clear();
        slot.pending = false;
        slot.canceled = false;
        slot.completed = false;
        Some(idx)
    }

    /// Clears the callback and flags and returns the slot to the free
    /// list's tail.
    pub(crate) fn free(&mut self, idx: u8) {
        let slot = &mut self.slots[idx as usize];
        slot.done = None;
        slot.buf.clear();
        slot.pending = false;
        slot.canceled = false;
        slot.completed = false;
        self.push_free(idx);
    }

    /// Appends a slot to the pending queue. Returns `true` when the queue
    /// went from empty to non-empty, which is the engine's cue that work
    /// is newly available.
    pub(crate) fn enqueue(&mut self, idx: u8) -> bool {
        self.slots[idx as usize].pending = true;
        match self.head {
            None => {
                self.slots[idx as usize].next = idx;
                self.slots[idx as usize].prev = idx;
                self.head = Some(idx);
                true
            }
            Some(head) => {
                let tail = self.slots[head as usize].prev;
                self.slots[idx as usize].prev = tail;
                self.slots[idx as usize].next = head;
                self.slots[tail as usize].next = idx;
                self.slots[head as usize].prev = idx;
                false
            }
        }
    }

    /// The current (head-of-queue, in-flight) request.
    pub(crate) fn current(&self) -> Option<u8> {
        self.head
    }

    /// Unlinks a slot from the pending queue, from any position, in O(1).
    /// Does not free it.
    pub(crate) fn remove(&mut self, idx: u8) {
        if !self.slots[idx as usize].pending {
            return;
        }
        let next = self.slots[idx as usize].next;
        let prev = self.slots[idx as usize].prev;
        if next == idx {
            self.head = None;
        } else {
            self.slots[prev as usize].next = next;
            self.slots[next as usize].prev = prev;
            if self.head == Some(idx) {
                self.head = Some(next);
            }
        }
        self.slots[idx as usize].pending = false;
    }

    /// Detaches the current request, returns it to the free pool, and
    /// reports whether pending requests remain.
    pub(crate) fn complete_current(&mut self) -> bool {
        if let Some(cur) = self.head {
            self.remove(cur);
            self.free(cur);
        }
        self.head.is_some()
    }

    pub(crate) fn is_pending(&self, idx: u8) -> bool {
        self.slots[idx as usize].pending
    }

    pub(crate) fn kind(&self, idx: u8) -> RequestKind {
        self.slots[idx as usize].kind
    }

    pub(crate) fn buf(&self, idx: u8) -> &[u8] {
        &self.slots[idx as usize].buf
    }

    pub(crate) fn buf_len(&self, idx: u8) -> usize {
        self.slots[idx as usize].buf.len()
    }

    pub(crate) fn clear_buf(&mut self, idx: u8) {
        self.slots[idx as usize].buf.clear();
    }

    pub(crate) fn push_byte(&mut self, idx: u8, byte: u8) {
        // Capacity overflow cannot happen (reply_len <= MAX_REPLY_LEN),
        // but drop the byte rather than panic if it ever does.
        let _ = self.slots[idx as usize].buf.try_push(byte);
    }

    /// Moves the completion callback out of the slot, leaving `None`.
    pub(crate) fn take_done(&mut self, idx: u8) -> Option<&'a mut DoneFn<'a>> {
        self.slots[idx as usize].done.take()
    }

    pub(crate) fn mark_canceled(&mut self, idx: u8) {
        self.slots[idx as usize].canceled = true;
    }

    pub(crate) fn is_canceled(&self, idx: u8) -> bool {
        self.slots[idx as usize].canceled
    }

    pub(crate) fn mark_completed(&mut self, idx: u8) {
        self.slots[idx as usize].completed = true;
    }

    pub(crate) fn is_completed(&self, idx: u8) -> bool {
        self.slots[idx as usize].completed
    }
}
