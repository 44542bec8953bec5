use std::collections::VecDeque;

use super::{NavFilterKey, NavMsgList};

/// Decision state of a buffered message
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Verdict {
    Pending,
    Accepted,
    Rejected,
}

/// [PendingQueue] holds messages in arrival order until their fate is known.
/// Messages are only released from the front, once decided,
/// which keeps accepted messages in their original relative order
/// whatever the order in which decisions are taken.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue<'a> {
    /// Handle of the next pushed message
    next: u64,
    entries: VecDeque<(NavFilterKey<'a>, Verdict)>,
}

impl<'a> PendingQueue<'a> {
    /// Buffers a new message, returns its handle.
    pub fn push(&mut self, msg: NavFilterKey<'a>, verdict: Verdict) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.entries.push_back((msg, verdict));
        handle
    }

    fn index(&self, handle: u64) -> Option<usize> {
        let front = self.next - self.entries.len() as u64;
        let index = handle.checked_sub(front)? as usize;
        if index < self.entries.len() {
            Some(index)
        } else {
            None
        }
    }

    /// Updates the decision for this message. Released messages are not affected.
    pub fn decide(&mut self, handle: u64, verdict: Verdict) {
        if let Some(index) = self.index(handle) {
            self.entries[index].1 = verdict;
        }
    }

    pub fn get(&self, handle: u64) -> Option<&NavFilterKey<'a>> {
        let index = self.index(handle)?;
        Some(&self.entries[index].0)
    }

    /// Releases every decided message sitting at the front of the queue.
    pub fn release(&mut self, output: &mut NavMsgList<'a>, rejected: &mut NavMsgList<'a>) {
        while let Some((_, verdict)) = self.entries.front() {
            match verdict {
                Verdict::Pending => return,
                Verdict::Accepted => {
                    if let Some((msg, _)) = self.entries.pop_front() {
                        output.push(msg);
                    }
                },
                Verdict::Rejected => {
                    if let Some((msg, _)) = self.entries.pop_front() {
                        rejected.push(msg);
                    }
                },
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
