//! Decides what an activation changes in the calling shell.
//!
//! Nothing here touches the process environment: a child process cannot
//! change its parent shell's variables, so the result is handed to the
//! emitter and printed for the shell to evaluate.

use crate::config::{ActiveProfile, StoreSnapshot, Var};
use crate::error::SwitchError;

/// What one activation assigns and removes. Consumed once by the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationRecord {
    /// In the profile's stored order.
    pub assign: Vec<Var>,
    pub unset: Vec<String>,
}

impl ActivationRecord {
    pub fn is_empty(&self) -> bool {
        self.assign.is_empty() && self.unset.is_empty()
    }

    pub fn assigned_names(&self) -> Vec<String> {
        self.assign.iter().map(|v| v.name.clone()).collect()
    }
}

/// Compute the switch from whatever is active to `target`.
///
/// Variables the previous activation injected and `target` does not define
/// are unset; shared ones are simply reassigned. Missing or dangling
/// bookkeeping only means nothing gets unset.
pub fn select_profile(
    snapshot: &StoreSnapshot,
    target: &str,
) -> Result<ActivationRecord, SwitchError> {
    let profile = snapshot.get_profile(target)?;
    let previous = previously_injected(snapshot);

    let mut unset: Vec<String> = Vec::new();
    for name in previous {
        if profile.get(name).is_none() && !unset.iter().any(|n| n == name) {
            unset.push(name.clone());
        }
    }

    log::debug!(
        "activating `{}`: {} assignment(s), {} unset(s)",
        profile.name,
        profile.vars.len(),
        unset.len()
    );
    Ok(ActivationRecord {
        assign: profile.vars.clone(),
        unset,
    })
}

/// Remove everything the active profile injected.
pub fn deactivate(snapshot: &StoreSnapshot) -> ActivationRecord {
    let mut unset: Vec<String> = Vec::new();
    for name in previously_injected(snapshot) {
        if !unset.contains(name) {
            unset.push(name.clone());
        }
    }
    ActivationRecord {
        assign: Vec::new(),
        unset,
    }
}

/// Bookkeeping after emitting `record` for `profile_name`: remember exactly
/// which names were injected so the next switch can remove them.
pub fn record_activation(
    snapshot: &StoreSnapshot,
    profile_name: &str,
    record: &ActivationRecord,
) -> StoreSnapshot {
    snapshot.with_active(Some(ActiveProfile {
        name: profile_name.to_string(),
        injected: record.assigned_names(),
    }))
}

pub fn clear_activation(snapshot: &StoreSnapshot) -> StoreSnapshot {
    snapshot.with_active(None)
}

fn previously_injected(snapshot: &StoreSnapshot) -> &[String] {
    snapshot
        .active_profile()
        .map(|a| a.injected.as_slice())
        .unwrap_or(&[])
}
