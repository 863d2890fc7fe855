// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scoped socket ownership.

use std::io;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr;

use crate::transport::ByteStream;

/// Owns a stream and shuts it down exactly once.
///
/// The first of an explicit [`SocketGuard::close`] or the drop of the guard
/// performs the shutdown; later calls are no-ops. [`SocketGuard::release`]
/// hands the stream back without shutting it down.
#[derive(Debug)]
pub struct SocketGuard<S: ByteStream> {
    stream: S,
    closed: bool,
}

impl<S: ByteStream> SocketGuard<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Shut the stream down if that has not happened yet.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream.shutdown()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Give up ownership of the stream without shutting it down.
    pub fn release(self) -> S {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the stream is moved out exactly once.
        unsafe { ptr::read(&this.stream) }
    }
}

impl<S: ByteStream> Deref for SocketGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.stream
    }
}

impl<S: ByteStream> DerefMut for SocketGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

impl<S: ByteStream> ByteStream for SocketGuard<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.close()
    }

    fn is_transient(&self, err: &io::Error) -> bool {
        self.stream.is_transient(err)
    }
}

impl<S: ByteStream> Drop for SocketGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            // The peer may already have torn the connection down.
            tracing::debug!(error = %e, "Socket shutdown on drop failed");
        }
    }
}
