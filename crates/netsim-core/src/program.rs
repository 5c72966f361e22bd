//! The dependency gate: a DAG of messages released as their prerequisites complete.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::packet::{Message, MessageId};
use crate::units::Seconds;

/// A dependency DAG over messages. A message becomes ready for injection once every message
/// named in its `after` set has completed delivery.
///
/// Cycles are not detected as they're recorded: a cyclic `after` set simply leaves its members
/// permanently unresolved, observable after a run via [`Program::pending`].
#[derive(Debug, Default)]
pub struct Program {
    /// `message -> unresolved predecessor set`. A message with an empty set is ready but not yet
    /// popped.
    unresolved: FxHashMap<MessageId, FxHashSet<MessageId>>,
    messages: FxHashMap<MessageId, Message>,
    delays: FxHashMap<MessageId, Seconds>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `message`, gated on every message in `after`, releasable with no additional delay
    /// once its prerequisites complete.
    pub fn add(&mut self, message: Message, after: impl IntoIterator<Item = MessageId>) -> MessageId {
        self.add_with_delay(message, after, Seconds::ZERO)
    }

    /// Like [`Program::add`], but the message is released `delay` seconds after its gate opens
    /// rather than immediately.
    pub fn add_with_delay(
        &mut self,
        message: Message,
        after: impl IntoIterator<Item = MessageId>,
        delay: Seconds,
    ) -> MessageId {
        let id = message.id;
        self.unresolved.insert(id, after.into_iter().collect());
        self.messages.insert(id, message.notify_program());
        if delay != Seconds::ZERO {
            self.delays.insert(id, delay);
        }
        id
    }

    /// The release delay configured for `id`, or [`Seconds::ZERO`] if none was set.
    pub fn delay_of(&self, id: MessageId) -> Seconds {
        self.delays.get(&id).copied().unwrap_or(Seconds::ZERO)
    }

    /// Marks `completed` as delivered, removing it from every other message's unresolved set.
    ///
    /// Called by the network when a message's completion action fires. `completed` has normally
    /// already been removed from this program's own tables by [`Program::pop_ready_messages`] at
    /// the point it was injected, so this only ever touches *other* entries.
    pub fn notify_delivered(&mut self, completed: MessageId) {
        for unresolved in self.unresolved.values_mut() {
            unresolved.remove(&completed);
        }
    }

    /// Removes and returns every message whose unresolved set is currently empty.
    pub fn pop_ready_messages(&mut self) -> Vec<Message> {
        let ready: Vec<MessageId> = self
            .unresolved
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| *id)
            .collect();
        ready
            .into_iter()
            .filter_map(|id| {
                self.unresolved.remove(&id);
                self.messages.remove(&id)
            })
            .collect()
    }

    /// Messages that remain unreleased, because of an unsatisfiable (typically cyclic)
    /// dependency. Empty after a well-formed run drains completely.
    pub fn pending(&self) -> Vec<MessageId> {
        self.unresolved.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::units::Bytes;

    fn msg(id: usize) -> Message {
        Message::new(MessageId::new(id), NodeId::new(0), NodeId::new(1), Bytes::new(1))
    }

    #[test]
    fn independent_messages_are_immediately_ready() {
        let mut program = Program::new();
        program.add(msg(0), []);
        program.add(msg(1), []);
        let ready = program.pop_ready_messages();
        assert_eq!(ready.len(), 2);
        assert!(program.pending().is_empty());
    }

    #[test]
    fn dependent_message_waits_for_prerequisite() {
        let mut program = Program::new();
        program.add(msg(0), []);
        program.add(msg(1), [MessageId::new(0)]);

        let ready = program.pop_ready_messages();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, MessageId::new(0));
        assert_eq!(program.pending(), vec![MessageId::new(1)]);

        program.notify_delivered(MessageId::new(0));
        let ready = program.pop_ready_messages();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, MessageId::new(1));
    }

    #[test]
    fn cyclic_dependency_never_releases() {
        let mut program = Program::new();
        program.add(msg(0), [MessageId::new(1)]);
        program.add(msg(1), [MessageId::new(0)]);
        assert!(program.pop_ready_messages().is_empty());
        assert_eq!(program.pending().len(), 2);
    }
}
