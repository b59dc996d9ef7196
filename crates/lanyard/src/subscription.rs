//! Cleanup callbacks owned by a chain, each run exactly once.

/// Runs its callback once, on [`Disposer::dispose`] or on drop.
pub struct Disposer {
    callback: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    #[must_use]
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Subscriptions {
    disposers: Vec<Disposer>,
}

impl Subscriptions {
    pub fn push(&mut self, disposer: Disposer) {
        self.disposers.push(disposer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    /// Runs every disposer, newest first.
    pub fn dispose_all(&mut self) {
        while let Some(disposer) = self.disposers.pop() {
            disposer.dispose();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
