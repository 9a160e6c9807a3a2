use crossbeam_channel::{Receiver, Sender};

/// Handle identifying one subscriber of an [`InteractionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

/// Receiving end of a subscription. Each flip of the toggle pushes the new
/// value into every live subscription.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub changes: Receiver<bool>,
}

/// The single shared "expanded" flag.
///
/// Passed by reference to whoever needs to read or flip it. Writes that
/// don't change the value are ignored, so nothing downstream restarts.
pub struct InteractionState {
    expanded: bool,
    next_id: u64,
    subscribers: Vec<(SubscriberId, Sender<bool>)>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self {
            expanded: false,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self) -> bool {
        self.expanded
    }

    /// Write the flag. Returns true if the value changed (and subscribers
    /// were notified).
    pub fn set(&mut self, expanded: bool) -> bool {
        if self.expanded == expanded {
            log::trace!("Interaction state already {expanded}, ignoring");
            return false;
        }
        self.expanded = expanded;
        log::debug!("Interaction state -> expanded={expanded}");

        // Dropped receivers unsubscribe themselves.
        self.subscribers.retain(|(id, tx)| {
            let alive = tx.send(expanded).is_ok();
            if !alive {
                log::debug!("Pruning closed subscriber {:?}", id);
            }
            alive
        });
        true
    }

    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, tx));
        log::debug!("Subscriber {:?} added ({} live)", id, self.subscriber_count());
        Subscription { id, changes: rx }
    }

    /// Stop notifying `id`. Returns false if it wasn't subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
