/// Runs a cleanup closure when dropped, including while a task unwinds.
///
/// Connection routines hold one of these so a session leaves the registry no
/// matter how the routine ends.
pub struct ScopeGuard<F: FnOnce()> {
    on_exit: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
    pub fn new(on_exit: F) -> Self {
        Self { on_exit: Some(on_exit) }
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(on_exit) = self.on_exit.take() {
            on_exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn runs_once_on_drop() {
        let runs = Cell::new(0);
        {
            let _guard = ScopeGuard::new(|| runs.set(runs.get() + 1));
            assert_eq!(runs.get(), 0);
        }
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn runs_during_unwind() {
        let runs = Cell::new(0);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ScopeGuard::new(|| runs.set(runs.get() + 1));
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(runs.get(), 1);
    }
}
