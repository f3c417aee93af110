//! RenameDiskDriver - probe/start/stop entry points called by the host

use crate::config::DriverConfig;
use crate::lifecycle::{validate_transition, SpliceState};
use crate::splice::SpliceController;
use parking_lot::Mutex;
use rdisk_host::{ClassRegistry, DriverBase, Service, ServiceRef};
use rdisk_props::dlog;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Block storage driver that splices the model rewriter into its target
///
/// Every entry point degrades to the superclass behaviour when there is
/// nothing to do, and never fails across the host boundary.
pub struct RenameDiskDriver {
    this: ServiceRef,
    base: Arc<dyn DriverBase>,
    classes: Arc<dyn ClassRegistry>,
    controller: SpliceController,
    state: Mutex<SpliceState>,
}

impl RenameDiskDriver {
    /// Driver bound to its own node `this`
    #[must_use]
    pub fn new(
        this: ServiceRef,
        base: Arc<dyn DriverBase>,
        classes: Arc<dyn ClassRegistry>,
        config: DriverConfig,
    ) -> Self {
        let controller = SpliceController::new(config, this.name());
        Self {
            this,
            base,
            classes,
            controller,
            state: Mutex::new(SpliceState::Unattached),
        }
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SpliceState {
        *self.state.lock()
    }

    /// Splice machinery
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &SpliceController {
        &self.controller
    }

    /// Attach-eligibility: the default check plus a reachable target
    pub fn probe(&self, provider: &ServiceRef, score: &mut i32) -> bool {
        dlog!("{}::probe({}, {score})", self.name(), provider.name());
        self.transition(SpliceState::Probed);

        if !self.base.probe(provider, score) {
            return false;
        }
        match self.controller.locate(&*self.classes, &*self.this) {
            Ok(_) => true,
            Err(err) => {
                dlog!("{}::probe - {err}", self.name());
                false
            }
        }
    }

    /// Install the hook on the target and restart it
    ///
    /// Returns `false` whenever the splice ran: the restarted target builds a
    /// fresh stack and the nodes between it and this driver are gone.
    /// Otherwise returns whatever the default start returns.
    pub fn start(&self, provider: &ServiceRef) -> bool {
        dlog!("{}::start({})", self.name(), provider.name());
        self.transition(SpliceState::Installed);

        let target = match self.controller.locate(&*self.classes, &*self.this) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!("{}::start - {err}", self.name());
                return self.base.start(provider);
            }
        };

        if target.has_hooked_properties() {
            dlog!(
                "{}::start - target ({}) is already hooked ... skipping",
                self.name(),
                target.name()
            );
            return self.base.start(provider);
        }

        match self.controller.install(provider, target) {
            Ok(report) => {
                if !report.restarted {
                    tracing::warn!("{}::start - target failed to restart", self.name());
                }
                false
            }
            Err(err) => {
                tracing::error!("{}::start - {err}", self.name());
                self.base.start(provider)
            }
        }
    }

    /// Remove the hook from the target, then run the default stop
    pub fn stop(&self, provider: &ServiceRef) {
        dlog!("{}::stop({})", self.name(), provider.name());
        self.transition(SpliceState::Uninstalled);

        match self.controller.locate(&*self.classes, &*self.this) {
            Ok(target) => {
                if let Err(err) = self.controller.uninstall(&target) {
                    tracing::warn!(
                        "{}::stop - {err} ({})",
                        self.name(),
                        err.io_return()
                    );
                }
            }
            Err(err) => tracing::warn!("{}::stop - {err}", self.name()),
        }
        self.base.stop(provider);
    }

    fn name(&self) -> &str {
        self.this.name()
    }

    fn transition(&self, to: SpliceState) {
        let mut state = self.state.lock();
        if let Err(err) = validate_transition(*state, to) {
            tracing::warn!("{}: {err}", self.name());
        }
        *state = to;
    }
}

impl Debug for RenameDiskDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameDiskDriver")
            .field("this", &self.this.name())
            .field("state", &self.state())
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
