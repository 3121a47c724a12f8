use std::collections::VecDeque;

/// Raw device input, normalized into a fixed tagged variant at the host
/// boundary. No other component ever sees device events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    PointerDown { x: f32, y: f32, button: u8 },
    PointerUp { x: f32, y: f32, button: u8 },
    PointerMove { x: f32, y: f32 },
    TouchStart { x: f32, y: f32, id: u32 },
    TouchEnd { id: u32 },
    GamepadButton { button: u8, pressed: bool, value: f32 },
    GamepadAxis { axis: u8, value: f32 },
}

/// One queued device event with the host timestamp it arrived at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEvent {
    pub timestamp_ms: f64,
    pub input: RawInput,
}

/// Bounded ring buffer where asynchronous device callbacks meet the
/// deterministic tick. Host listeners push; the input handler drains the
/// whole queue exactly once per tick.
///
/// On overflow the oldest event is discarded and counted; producers are
/// never blocked and the queue never grows past its capacity.
#[derive(Debug, Clone)]
pub struct InputQueue {
    events: VecDeque<RawEvent>,
    capacity: usize,
    overflow: u64,
}

impl InputQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            overflow: 0,
        }
    }

    /// Push a new device event (called from the host event listeners).
    pub fn push(&mut self, event: RawEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.overflow += 1;
            log::debug!("input queue overflow, oldest event dropped");
        }
        self.events.push_back(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = RawEvent> + '_ {
        self.events.drain(..)
    }

    /// Total events discarded to overflow since construction.
    pub fn overflow_count(&self) -> u64 {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(code: u32) -> RawEvent {
        RawEvent {
            timestamp_ms: 0.0,
            input: RawInput::KeyDown { code },
        }
    }

    #[test]
    fn push_and_drain_in_order() {
        let mut q = InputQueue::with_capacity(8);
        q.push(key_down(1));
        q.push(key_down(2));
        let codes: Vec<u32> = q
            .drain()
            .map(|e| match e.input {
                RawInput::KeyDown { code } => code,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(codes, vec![1, 2]);
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let mut q = InputQueue::with_capacity(2);
        q.push(key_down(1));
        q.push(key_down(2));
        q.push(key_down(3));
        assert_eq!(q.overflow_count(), 1);
        assert_eq!(q.len(), 2);
        let first = q.drain().next().unwrap();
        // Event 1 was the casualty.
        assert_eq!(first.input, RawInput::KeyDown { code: 2 });
    }

    #[test]
    fn drain_leaves_queue_reusable() {
        let mut q = InputQueue::with_capacity(4);
        q.push(key_down(1));
        let _ = q.drain().count();
        q.push(key_down(2));
        assert_eq!(q.len(), 1);
        assert_eq!(q.overflow_count(), 0);
    }
}
