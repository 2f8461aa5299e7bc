use crate::{Error, Result};
use ahash::AHashMap as HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Barrier};
use tracing::trace;

/// Distinguishes concurrent streams between the same pair of ranks.
pub type Tag = u32;

pub const TAG_BROADCAST: Tag = 1;
pub const TAG_SCATTER: Tag = 2;
pub const TAG_GATHER: Tag = 3;

struct Envelope {
    source: usize,
    tag: Tag,
    data: Vec<u8>,
}

/// Creates the communicators of a fixed group of ranks.
pub struct World;

impl World {
    /// One communicator per rank; hand each one to its own task.
    pub fn new(size: usize) -> Vec<Communicator> {
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..size).map(|_| mpsc::unbounded_channel::<Envelope>()).unzip();
        let peers: Arc<[_]> = senders.into();
        let barrier = Arc::new(Barrier::new(size));
        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| Communicator {
                rank,
                peers: Arc::clone(&peers),
                inbox,
                parked: HashMap::new(),
                barrier: Arc::clone(&barrier),
            })
            .collect()
    }
}

/// Message-passing endpoint of one rank.
///
/// Sends never block. A receive waits for the next message with the
/// requested `(source, tag)`; messages that arrive for other pairs are
/// parked in arrival order until someone asks for them.
pub struct Communicator {
    rank: usize,
    peers: Arc<[mpsc::UnboundedSender<Envelope>]>,
    inbox: mpsc::UnboundedReceiver<Envelope>,
    parked: HashMap<(usize, Tag), VecDeque<Vec<u8>>>,
    barrier: Arc<Barrier>,
}

impl Communicator {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.peers.len()
    }

    pub fn send(&self, dest: usize, tag: Tag, data: Vec<u8>) -> Result<()> {
        trace!(from = self.rank, to = dest, tag, len = data.len(), "send");
        let envelope = Envelope {
            source: self.rank,
            tag,
            data,
        };
        self.peers
            .get(dest)
            .ok_or(Error::Disconnected(dest))?
            .send(envelope)
            .map_err(|_| Error::Disconnected(dest))
    }

    pub async fn recv(&mut self, source: usize, tag: Tag) -> Result<Vec<u8>> {
        if let Some(data) = self
            .parked
            .get_mut(&(source, tag))
            .and_then(VecDeque::pop_front)
        {
            return Ok(data);
        }
        loop {
            let envelope = self
                .inbox
                .recv()
                .await
                .ok_or(Error::Disconnected(source))?;
            if (envelope.source, envelope.tag) == (source, tag) {
                trace!(at = self.rank, from = source, tag, "recv");
                return Ok(envelope.data);
            }
            self.parked
                .entry((envelope.source, envelope.tag))
                .or_default()
                .push_back(envelope.data);
        }
    }

    /// Like [`Communicator::recv`], but fails unless exactly `len` cells arrive.
    pub async fn recv_exact(&mut self, source: usize, tag: Tag, len: usize) -> Result<Vec<u8>> {
        let data = self.recv(source, tag).await?;
        if data.len() != len {
            return Err(Error::UnexpectedLength {
                from_rank: source,
                expected: len,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Sends to `dest` and waits for `len` cells from `source`; safe with `dest == source == self`.
    pub async fn sendrecv(
        &mut self,
        dest: usize,
        data: Vec<u8>,
        source: usize,
        tag: Tag,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.send(dest, tag, data)?;
        self.recv_exact(source, tag, len).await
    }

    pub async fn barrier(&self) {
        self.barrier.wait().await;
    }

    /// Every rank returns the root's `data`; other ranks' input is ignored.
    pub async fn broadcast(&mut self, root: usize, data: Vec<u8>) -> Result<Vec<u8>> {
        if self.rank != root {
            return self.recv(root, TAG_BROADCAST).await;
        }
        for dest in (0..self.size()).filter(|&r| r != root) {
            self.send(dest, TAG_BROADCAST, data.clone())?;
        }
        Ok(data)
    }

    /// Rank `r` receives `send[displs[r]..displs[r] + counts[r]]` from the root.
    ///
    /// Only the root reads `send`.
    pub async fn scatterv(
        &mut self,
        root: usize,
        send: &[u8],
        counts: &[usize],
        displs: &[usize],
    ) -> Result<Vec<u8>> {
        if self.rank != root {
            return self.recv_exact(root, TAG_SCATTER, counts[self.rank]).await;
        }
        for dest in (0..self.size()).filter(|&r| r != root) {
            let span = &send[displs[dest]..displs[dest] + counts[dest]];
            self.send(dest, TAG_SCATTER, span.to_vec())?;
        }
        Ok(send[displs[root]..displs[root] + counts[root]].to_vec())
    }

    /// The root receives every rank's `local` at its displacement; others get `None`.
    pub async fn gatherv(
        &mut self,
        root: usize,
        local: Vec<u8>,
        counts: &[usize],
        displs: &[usize],
    ) -> Result<Option<Vec<u8>>> {
        if self.rank != root {
            self.send(root, TAG_GATHER, local)?;
            return Ok(None);
        }
        let total = counts.iter().sum();
        let mut recv = vec![0; total];
        for source in 0..self.size() {
            let span = &mut recv[displs[source]..displs[source] + counts[source]];
            if source == root {
                if local.len() != span.len() {
                    return Err(Error::UnexpectedLength {
                        from_rank: root,
                        expected: span.len(),
                        actual: local.len(),
                    });
                }
                span.copy_from_slice(&local);
            } else {
                let data = self.recv_exact(source, TAG_GATHER, counts[source]).await?;
                span.copy_from_slice(&data);
            }
        }
        Ok(Some(recv))
    }
}
