use crate::models::Perceptron;

/// Snapshot delivered after every completed epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochEvent<'a> {
    pub epoch: u32,
    pub mse: f64,
    pub perceptron: &'a Perceptron,
}

/// Receives per-epoch progress from a [`super::Trainer`].
pub trait EpochObserver {
    fn on_epoch(&mut self, event: &EpochEvent<'_>);
}

impl<F> EpochObserver for F
where
    F: FnMut(&EpochEvent<'_>),
{
    fn on_epoch(&mut self, event: &EpochEvent<'_>) {
        self(event)
    }
}
