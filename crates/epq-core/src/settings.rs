//! Global library settings.
//!
//! [`Settings`] holds the defaults used when a one-dimensional spline has to
//! repair duplicate abscissas.  It is a process-wide singleton accessed via a
//! `std::sync::OnceLock`.
//!
//! Thread safety: the values are stored behind a `Mutex` so that they can be
//! changed from any thread.  Splines take a snapshot at construction time, so
//! changing the settings never affects a table that already exists.

use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::{errors::Result, Real};

/// Default separation between repaired duplicates, as a fraction of the
/// abscissa range (0.05 %).
pub const DEFAULT_SEPARATION_FRACTION: Real = 5e-4;

/// What to do with two samples sharing an abscissa but carrying different
/// ordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Move the samples apart by a small fraction of the abscissa range.
    #[default]
    Separate,
    /// Replace the samples by a single one carrying the mean ordinate.
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Values {
    duplicate_policy: DuplicatePolicy,
    separation_fraction: Real,
}

impl Default for Values {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            separation_fraction: DEFAULT_SEPARATION_FRACTION,
        }
    }
}

/// Process-wide settings used by the epq library.
pub struct Settings {
    values: Mutex<Values>,
}

static INSTANCE: OnceLock<Settings> = OnceLock::new();

impl Settings {
    /// Return a reference to the global singleton.
    pub fn instance() -> &'static Settings {
        INSTANCE.get_or_init(|| Settings {
            values: Mutex::new(Values::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Values> {
        // The guarded data is plain `Copy` values, so a poisoned lock still
        // holds a consistent state.
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Policy applied to duplicate abscissas with differing ordinates.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.lock().duplicate_policy
    }

    /// Set the duplicate-abscissa policy.
    pub fn set_duplicate_policy(&self, policy: DuplicatePolicy) {
        self.lock().duplicate_policy = policy;
    }

    /// Separation between repaired duplicates as a fraction of the range.
    pub fn separation_fraction(&self) -> Real {
        self.lock().separation_fraction
    }

    /// Set the separation fraction.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// unless `0 < fraction <= 0.1`.
    pub fn set_separation_fraction(&self, fraction: Real) -> Result<()> {
        Self::check_separation_fraction(fraction)?;
        self.lock().separation_fraction = fraction;
        Ok(())
    }

    /// Check that `fraction` is a usable separation fraction, i.e.
    /// `0 < fraction <= 0.1` (NaN is rejected).
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// otherwise.
    pub fn check_separation_fraction(fraction: Real) -> Result<()> {
        crate::ensure!(
            fraction > 0.0 && fraction <= 0.1,
            "separation fraction must lie in (0, 0.1], got {fraction}"
        );
        Ok(())
    }

    /// Restore the defaults.
    pub fn reset(&self) {
        *self.lock() = Values::default();
    }
}

/// Restores the settings that were in force when it was created.
///
/// ```
/// use epq_core::settings::{DuplicatePolicy, ScopedSettings, Settings};
///
/// {
///     let _guard = ScopedSettings::new();
///     Settings::instance().set_duplicate_policy(DuplicatePolicy::Average);
/// }
/// assert_eq!(Settings::instance().duplicate_policy(), DuplicatePolicy::Separate);
/// ```
#[must_use = "settings are restored when the guard is dropped"]
pub struct ScopedSettings {
    saved: Values,
}

impl ScopedSettings {
    /// Snapshot the current settings.
    pub fn new() -> Self {
        Self {
            saved: *Settings::instance().lock(),
        }
    }
}

impl Default for ScopedSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopedSettings {
    fn drop(&mut self) {
        *Settings::instance().lock() = self.saved;
    }
}
