use crate::event::ControllerEvent;
use crate::eventbus::InputListener;

/// Wraps a listener and filters events based on a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&ControllerEvent) -> bool + Send + Sync>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&ControllerEvent) -> bool + Send + Sync + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &ControllerEvent) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChannelId, InputKind};
    use std::sync::{Arc, Mutex};

    struct Count(Arc<Mutex<usize>>);

    impl InputListener for Count {
        fn on_input(&mut self, _event: &ControllerEvent) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn predicate_gates_inner_listener() {
        let hits = Arc::new(Mutex::new(0));
        let mut listener = FilteredListener::new(
            |e| matches!(e.kind, InputKind::Analog { value, .. } if value.abs() > 100),
            Count(Arc::clone(&hits)),
        );

        for value in [5, -500, 101, 100] {
            listener.on_input(&ControllerEvent {
                controller: 0,
                kind: InputKind::Analog {
                    channel: ChannelId::axis(0),
                    value,
                },
            });
        }
        assert_eq!(*hits.lock().unwrap(), 2);
    }
}
