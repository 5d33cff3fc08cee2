use std::{cell::RefCell, future::Future, rc::Rc};

use chrono::{Duration, Utc};
use futures_util::future::{AbortHandle, abortable};
use gloo_timers::future::TimeoutFuture;
use liftlog_domain::Debounce;
use log::debug;

/// Delays searches until the input has been stable for the debounce delay.
///
/// Every input aborts the pending timer, so only the most recent input is searched.
pub struct SearchController {
    debounce: Rc<RefCell<Debounce>>,
    pending: RefCell<Option<AbortHandle>>,
}

impl SearchController {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Rc::new(RefCell::new(Debounce::new(delay))),
            pending: RefCell::new(None),
        }
    }

    /// Schedules `search` to be run with the input once the delay has passed.
    pub fn input<F, Fut>(&self, input: &str, search: F)
    where
        F: FnOnce(String) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.abort_pending();

        let scheduled = Utc::now();
        let (generation, delay) = {
            let mut debounce = self.debounce.borrow_mut();
            (debounce.schedule(input, scheduled), debounce.delay())
        };
        let debounce = Rc::clone(&self.debounce);

        let (timer, handle) = abortable(async move {
            TimeoutFuture::new(timeout_ms(delay)).await;
            let due = {
                let mut debounce = debounce.borrow_mut();
                if debounce.is_current(generation) {
                    debounce.take_due(scheduled + delay)
                } else {
                    None
                }
            };
            if let Some(input) = due {
                search(input).await;
            }
        });

        *self.pending.borrow_mut() = Some(handle);

        wasm_bindgen_futures::spawn_local(async move {
            if timer.await.is_err() {
                debug!("search superseded");
            }
        });
    }

    /// Drops the pending input without searching.
    pub fn cancel(&self) {
        self.abort_pending();
        self.debounce.borrow_mut().cancel();
    }

    fn abort_pending(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            handle.abort();
        }
    }
}

fn timeout_ms(delay: Duration) -> u32 {
    u32::try_from(delay.num_milliseconds().max(0)).unwrap_or(u32::MAX)
}
