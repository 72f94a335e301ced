//! Host-owned app model mutated by the transaction engine
//!
//! An [`App`] is shared between the host and the engine through an
//! [`AppHandle`] (`Rc<App>`). All mutation goes through `&self` using a
//! `RefCell`, which keeps apps on the single thread that drives a
//! transaction: `AppHandle` is neither `Send` nor `Sync`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use txflow_errors::StateError;

/// Shared handle to a host-owned app.
pub type AppHandle = Rc<App>;

/// Lifecycle state of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    #[default]
    Unknown,
    Installed,
    Available,
    AvailableLocal,
    Updatable,
    UpdatableLive,
    Unavailable,
    QueuedForInstall,
    Installing,
    Downloading,
    Removing,
    Purchasable,
    Purchasing,
}

impl AppState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Installed => "installed",
            Self::Available => "available",
            Self::AvailableLocal => "available-local",
            Self::Updatable => "updatable",
            Self::UpdatableLive => "updatable-live",
            Self::Unavailable => "unavailable",
            Self::QueuedForInstall => "queued-for-install",
            Self::Installing => "installing",
            Self::Downloading => "downloading",
            Self::Removing => "removing",
            Self::Purchasable => "purchasable",
            Self::Purchasing => "purchasing",
        }
    }

    /// Transient states are never remembered as the recover state.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Installing | Self::Downloading | Self::Removing | Self::QueuedForInstall
        )
    }

    /// States in which work is actively being done on the app.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Installing | Self::Downloading | Self::Removing)
    }

    /// Check whether moving from `self` to `to` is a legal state change.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        use AppState::{
            Available, AvailableLocal, Downloading, Installed, Installing, Purchasable, Purchasing,
            QueuedForInstall, Removing, Unavailable, Unknown, Updatable, UpdatableLive,
        };

        match self {
            // unknown has to go into one of the stable states
            Unknown => matches!(
                to,
                Installed
                    | QueuedForInstall
                    | Available
                    | AvailableLocal
                    | Updatable
                    | UpdatableLive
                    | Unavailable
                    | Purchasable
            ),
            // installed has to go into an action state
            Installed => matches!(
                to,
                Unknown | Removing | Unavailable | Updatable | UpdatableLive
            ),
            QueuedForInstall => matches!(to, Unknown | Installing | Available),
            Available => matches!(to, Unknown | QueuedForInstall | Installing),
            Installing => matches!(
                to,
                Unknown | Installed | Updatable | UpdatableLive | Available
            ),
            Downloading => matches!(to, Unknown | Installed | Updatable | UpdatableLive),
            Removing => matches!(to, Unknown | Available | Purchasable | Installed),
            Updatable => matches!(to, Unknown | Available | Removing | Downloading),
            UpdatableLive => matches!(to, Unknown | Removing | Installing | Downloading),
            Unavailable => matches!(to, Unknown | Available),
            AvailableLocal => matches!(to, Unknown | Installing),
            Purchasable => matches!(to, Unknown | Purchasing),
            Purchasing => matches!(to, Unknown | Available | Purchasable),
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion of the current action on an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    /// Percentage in `0..=100`
    Percent(u8),
    /// No reliable estimate is available (e.g. metadata is still being fetched)
    Unknown,
}

impl Progress {
    /// Build a percentage, clamping anything above 100.
    #[must_use]
    pub fn percent(value: u64) -> Self {
        // Clamped to 100 first, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        Self::Percent(value.min(100) as u8)
    }

    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn as_percent(self) -> Option<u8> {
        match self {
            Self::Percent(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::Percent(0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{value}%"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct AppInner {
    state: AppState,
    state_recover: AppState,
    progress: Progress,
    version: Option<String>,
    update_version: Option<String>,
    update_details: Option<String>,
    commit: Option<String>,
    runtime: Option<AppHandle>,
}

/// An installable software unit, keyed by its ref
#[derive(Debug)]
pub struct App {
    reference: String,
    inner: RefCell<AppInner>,
}

impl App {
    /// Create an app in the `Unknown` state
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            inner: RefCell::new(AppInner::default()),
        }
    }

    /// Set the initial state without transition checks.
    #[must_use]
    pub fn with_state(self, state: AppState) -> Self {
        {
            let mut inner = self.inner.borrow_mut();
            inner.state = state;
            if !state.is_transient() {
                inner.state_recover = state;
            }
        }
        self
    }

    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.inner.borrow_mut().version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_update_version(self, version: impl Into<String>) -> Self {
        self.inner.borrow_mut().update_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_commit(self, commit: impl Into<String>) -> Self {
        self.inner.borrow_mut().commit = Some(commit.into());
        self
    }

    #[must_use]
    pub fn with_runtime(self, runtime: AppHandle) -> Self {
        self.inner.borrow_mut().runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn into_handle(self) -> AppHandle {
        Rc::new(self)
    }

    /// The ref string identifying this app
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.inner.borrow().state
    }

    /// The last non-transient state, restored by [`App::set_state_recover`]
    #[must_use]
    pub fn state_recover(&self) -> AppState {
        self.inner.borrow().state_recover
    }

    /// Move the app to `state`.
    ///
    /// Returns `Ok(false)` when the app is already in `state`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidTransition` if the change is not allowed;
    /// the state is left untouched in that case.
    pub fn set_state(&self, state: AppState) -> Result<bool, StateError> {
        let mut inner = self.inner.borrow_mut();
        if inner.state == state {
            return Ok(false);
        }
        if !inner.state.can_transition_to(state) {
            return Err(StateError::InvalidTransition {
                app: self.reference.clone(),
                from: inner.state.to_string(),
                to: state.to_string(),
            });
        }
        inner.state = state;
        if !state.is_transient() {
            inner.state_recover = state;
        }
        Ok(true)
    }

    /// Return to the last non-transient state and reset progress.
    ///
    /// Returns the `(from, to)` pair when a change was made.
    pub fn set_state_recover(&self) -> Option<(AppState, AppState)> {
        let mut inner = self.inner.borrow_mut();
        if inner.state_recover == AppState::Unknown || inner.state_recover == inner.state {
            return None;
        }
        let from = inner.state;
        // reset so a retried attempt does not start from a stale value
        inner.progress = Progress::Percent(0);
        inner.state = inner.state_recover;
        Some((from, inner.state))
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.inner.borrow().progress
    }

    /// Set the progress, clamping percentages above 100.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_progress(&self, progress: Progress) -> bool {
        let progress = match progress {
            Progress::Percent(value) => Progress::percent(u64::from(value)),
            Progress::Unknown => Progress::Unknown,
        };
        let mut inner = self.inner.borrow_mut();
        if inner.progress == progress {
            return false;
        }
        inner.progress = progress;
        true
    }

    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.inner.borrow().version.clone()
    }

    pub fn set_version(&self, version: Option<String>) {
        self.inner.borrow_mut().version = version;
    }

    #[must_use]
    pub fn update_version(&self) -> Option<String> {
        self.inner.borrow().update_version.clone()
    }

    pub fn set_update_version(&self, version: Option<String>) {
        self.inner.borrow_mut().update_version = version;
    }

    #[must_use]
    pub fn update_details(&self) -> Option<String> {
        self.inner.borrow().update_details.clone()
    }

    pub fn set_update_details(&self, details: Option<String>) {
        self.inner.borrow_mut().update_details = details;
    }

    /// The deployed commit, if known
    #[must_use]
    pub fn commit(&self) -> Option<String> {
        self.inner.borrow().commit.clone()
    }

    pub fn set_commit(&self, commit: Option<String>) {
        self.inner.borrow_mut().commit = commit;
    }

    /// The runtime this app runs on, if any
    #[must_use]
    pub fn runtime(&self) -> Option<AppHandle> {
        self.inner.borrow().runtime.clone()
    }

    pub fn set_runtime(&self, runtime: Option<AppHandle>) {
        self.inner.borrow_mut().runtime = runtime;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_cycle_records_recover_state() {
        let app = App::new("app/org.example.App/x86_64/stable");
        assert!(app.set_state(AppState::Available).unwrap());
        assert_eq!(app.state_recover(), AppState::Available);

        assert!(app.set_state(AppState::Installing).unwrap());
        assert_eq!(app.state_recover(), AppState::Available);

        assert!(app.set_state(AppState::Installed).unwrap());
        assert_eq!(app.state_recover(), AppState::Installed);
    }

    #[test]
    fn same_state_is_a_no_op() {
        let app = App::new("a").with_state(AppState::Installed);
        assert!(!app.set_state(AppState::Installed).unwrap());
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let app = App::new("a").with_state(AppState::Installed);
        let err = app.set_state(AppState::Installing).unwrap_err();
        assert!(matches!(err, StateError::InvalidTransition { ref from, ref to, .. }
            if from == "installed" && to == "installing"));
        assert_eq!(app.state(), AppState::Installed);
    }

    #[test]
    fn recover_restores_last_stable_state_and_resets_progress() {
        let app = App::new("a").with_state(AppState::Installed);
        app.set_state(AppState::Removing).unwrap();
        app.set_progress(Progress::Percent(40));

        assert_eq!(
            app.set_state_recover(),
            Some((AppState::Removing, AppState::Installed))
        );
        assert_eq!(app.state(), AppState::Installed);
        assert_eq!(app.progress(), Progress::Percent(0));

        // nothing left to recover
        assert_eq!(app.set_state_recover(), None);
    }

    #[test]
    fn recover_without_recorded_state_does_nothing() {
        let app = App::new("a").with_state(AppState::Installing);
        assert_eq!(app.state_recover(), AppState::Unknown);
        assert_eq!(app.set_state_recover(), None);
        assert_eq!(app.state(), AppState::Installing);
    }

    #[test]
    fn progress_is_clamped() {
        let app = App::new("a");
        assert!(app.set_progress(Progress::Percent(250)));
        assert_eq!(app.progress(), Progress::Percent(100));
        assert!(!app.set_progress(Progress::Percent(100)));
        assert_eq!(Progress::percent(u64::MAX), Progress::Percent(100));
    }

    #[test]
    fn runtime_is_shared() {
        let runtime = App::new("runtime/org.example.Platform/x86_64/1").into_handle();
        let app = App::new("app/org.example.App/x86_64/stable")
            .with_runtime(runtime.clone())
            .into_handle();
        assert!(Rc::ptr_eq(&app.runtime().unwrap(), &runtime));
    }
}
