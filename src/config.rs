use crate::error::SwitchError;
use serde::{Deserialize, Serialize};

/// A single `NAME=value` assignment inside a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    pub value: String,
}

impl Var {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// An environment profile holds a name and an ordered list of assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvProfile {
    pub name: String,
    pub vars: Vec<Var>,
}

impl EnvProfile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_vars(name: &str, vars: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            vars: vars.iter().map(|(n, v)| Var::new(n, v)).collect(),
        }
    }

    pub fn get(&self, var_name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|v| v.name == var_name)
            .map(|v| v.value.as_str())
    }

    #[cfg(test)]
    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|v| v.name.as_str())
    }

    /// Assign a variable. An existing variable keeps its position, a new one is appended.
    pub fn set(&mut self, var: Var) -> Result<(), SwitchError> {
        if !is_valid_var_name(&var.name) {
            return Err(SwitchError::InvalidVarName(var.name));
        }
        match self.vars.iter_mut().find(|v| v.name == var.name) {
            Some(existing) => existing.value = var.value,
            None => self.vars.push(var),
        }
        Ok(())
    }

    /// Remove a variable, returning whether it was present.
    pub fn remove(&mut self, var_name: &str) -> bool {
        let before = self.vars.len();
        self.vars.retain(|v| v.name != var_name);
        self.vars.len() != before
    }

    pub fn validate(&self) -> Result<(), SwitchError> {
        validate_profile_name(&self.name)?;
        for (i, var) in self.vars.iter().enumerate() {
            if !is_valid_var_name(&var.name) {
                return Err(SwitchError::InvalidVarName(var.name.clone()));
            }
            if self.vars[..i].iter().any(|v| v.name == var.name) {
                return Err(SwitchError::DuplicateVar(var.name.clone()));
            }
        }
        Ok(())
    }
}

/// Bookkeeping for the profile that was activated last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveProfile {
    pub name: String,
    /// Exactly the variable names the last activation assigned.
    pub injected: Vec<String>,
}

/// The whole store as read from disk. Transformations return a new snapshot;
/// persisting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreSnapshot {
    /// Kept in insertion order.
    pub profiles: Vec<EnvProfile>,
    pub active: Option<ActiveProfile>,
}

impl StoreSnapshot {
    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get_profile(&self, name: &str) -> Result<&EnvProfile, SwitchError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SwitchError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.iter().any(|p| p.name == name)
    }

    /// Replace the profile with the same name in place, or append it.
    ///
    /// A new profile never inherits a stale active reference that happens to
    /// carry its name.
    pub fn upsert_profile(&self, profile: EnvProfile) -> Result<StoreSnapshot, SwitchError> {
        profile.validate()?;
        let mut next = self.clone();
        match next.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(slot) => *slot = profile,
            None => {
                if next.active.as_ref().is_some_and(|a| a.name == profile.name) {
                    log::debug!("dropping stale active reference to `{}`", profile.name);
                    next.active = None;
                }
                next.profiles.push(profile);
            }
        }
        Ok(next)
    }

    /// Remove a profile. Deleting the active profile also forgets the
    /// activation, so nothing is unset on the next switch.
    pub fn delete_profile(&self, name: &str) -> Result<StoreSnapshot, SwitchError> {
        if !self.contains(name) {
            return Err(SwitchError::NotFound(name.to_string()));
        }
        let mut next = self.clone();
        next.profiles.retain(|p| p.name != name);
        if next.active.as_ref().is_some_and(|a| a.name == name) {
            next.active = None;
        }
        Ok(next)
    }

    /// The active profile bookkeeping, or `None` when nothing is active or the
    /// reference no longer names an existing profile.
    pub fn active_profile(&self) -> Option<&ActiveProfile> {
        let active = self.active.as_ref()?;
        if self.contains(&active.name) {
            Some(active)
        } else {
            log::warn!(
                "active profile `{}` no longer exists; treating as none active",
                active.name
            );
            None
        }
    }

    pub fn with_active(&self, active: Option<ActiveProfile>) -> StoreSnapshot {
        StoreSnapshot {
            profiles: self.profiles.clone(),
            active,
        }
    }
}

/// POSIX environment variable name: letters, digits and `_`, not starting with a digit.
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_profile_name(name: &str) -> Result<(), SwitchError> {
    if name.is_empty() || name.trim() != name || name.chars().any(char::is_control) {
        return Err(SwitchError::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

/// Parse a `VAR=VALUE` command-line argument. Only the first `=` splits.
pub fn parse_assignment(arg: &str) -> Result<Var, SwitchError> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| SwitchError::InvalidAssignment(arg.to_string()))?;
    if !is_valid_var_name(name) {
        return Err(SwitchError::InvalidVarName(name.to_string()));
    }
    Ok(Var::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StoreSnapshot {
        StoreSnapshot {
            profiles: vec![
                EnvProfile::with_vars("dev", &[("API_URL", "http://x"), ("DEBUG", "1")]),
                EnvProfile::with_vars("prod", &[("API_URL", "http://y")]),
            ],
            active: None,
        }
    }

    #[test]
    fn var_name_rules_follow_posix() {
        assert!(is_valid_var_name("PATH"));
        assert!(is_valid_var_name("_private"));
        assert!(is_valid_var_name("A1_B2"));
        assert!(!is_valid_var_name(""));
        assert!(!is_valid_var_name("1ABC"));
        assert!(!is_valid_var_name("FOO-BAR"));
        assert!(!is_valid_var_name("FOO BAR"));
        assert!(!is_valid_var_name("$(rm)"));
    }

    #[test]
    fn list_keeps_insertion_order() {
        let snap = sample()
            .upsert_profile(EnvProfile::new("alpha"))
            .expect("upsert");
        assert_eq!(snap.list_profiles(), vec!["dev", "prod", "alpha"]);
    }

    #[test]
    fn upsert_replaces_in_place_without_touching_original() {
        let snap = sample();
        let next = snap
            .upsert_profile(EnvProfile::with_vars("dev", &[("ONLY", "1")]))
            .expect("upsert");

        assert_eq!(next.list_profiles(), vec!["dev", "prod"]);
        assert_eq!(next.get_profile("dev").expect("dev").get("ONLY"), Some("1"));
        assert_eq!(snap.get_profile("dev").expect("dev").get("DEBUG"), Some("1"));
    }

    #[test]
    fn upsert_rejects_duplicate_and_invalid_names() {
        let dup = EnvProfile::with_vars("x", &[("A", "1"), ("A", "2")]);
        assert!(matches!(
            sample().upsert_profile(dup),
            Err(SwitchError::DuplicateVar(name)) if name == "A"
        ));

        let bad = EnvProfile::with_vars("x", &[("9LIVES", "1")]);
        assert!(matches!(
            sample().upsert_profile(bad),
            Err(SwitchError::InvalidVarName(_))
        ));

        assert!(matches!(
            sample().upsert_profile(EnvProfile::new(" padded ")),
            Err(SwitchError::InvalidProfileName(_))
        ));
    }

    #[test]
    fn get_missing_profile_is_not_found() {
        assert!(matches!(
            sample().get_profile("nope"),
            Err(SwitchError::NotFound(name)) if name == "nope"
        ));
    }

    fn dev_active() -> Option<ActiveProfile> {
        Some(ActiveProfile {
            name: "dev".to_string(),
            injected: vec!["API_URL".to_string(), "DEBUG".to_string()],
        })
    }

    #[test]
    fn deleting_active_profile_forgets_activation() {
        let snap = sample().with_active(dev_active());
        assert!(snap.active_profile().is_some());

        let next = snap.delete_profile("dev").expect("delete");
        assert!(next.active.is_none());

        let recreated = next
            .upsert_profile(EnvProfile::with_vars("dev", &[("Z", "9")]))
            .expect("upsert");
        assert!(recreated.active_profile().is_none());
    }

    #[test]
    fn deleting_other_profile_keeps_activation() {
        let snap = sample().with_active(dev_active());
        let next = snap.delete_profile("prod").expect("delete");
        assert_eq!(next.active, dev_active());
    }

    #[test]
    fn dangling_reference_is_read_as_none_and_not_revived() {
        let snap = StoreSnapshot {
            profiles: vec![EnvProfile::with_vars("prod", &[("API_URL", "http://y")])],
            active: dev_active(),
        };
        assert!(snap.active_profile().is_none());

        let next = snap
            .upsert_profile(EnvProfile::with_vars("dev", &[("Z", "9")]))
            .expect("upsert");
        assert!(next.active.is_none());
        assert!(next.active_profile().is_none());
    }

    #[test]
    fn updating_active_profile_keeps_activation() {
        let snap = sample().with_active(dev_active());
        let next = snap
            .upsert_profile(EnvProfile::with_vars("dev", &[("ONLY", "1")]))
            .expect("upsert");
        assert_eq!(next.active, dev_active());
    }

    #[test]
    fn delete_missing_profile_is_not_found() {
        assert!(matches!(
            sample().delete_profile("ghost"),
            Err(SwitchError::NotFound(_))
        ));
    }

    #[test]
    fn set_keeps_position_and_appends_new_vars() {
        let mut p = EnvProfile::with_vars("dev", &[("A", "1"), ("B", "2")]);
        p.set(Var::new("A", "10")).expect("set");
        p.set(Var::new("C", "3")).expect("set");
        assert_eq!(p.var_names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(p.get("A"), Some("10"));

        assert!(p.remove("B"));
        assert!(!p.remove("B"));
        assert_eq!(p.var_names().collect::<Vec<_>>(), vec!["A", "C"]);
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        let v = parse_assignment("URL=http://x?a=b").expect("parse");
        assert_eq!(v, Var::new("URL", "http://x?a=b"));

        let empty = parse_assignment("EMPTY=").expect("parse");
        assert_eq!(empty.value, "");

        assert!(matches!(
            parse_assignment("NOEQUALS"),
            Err(SwitchError::InvalidAssignment(_))
        ));
        assert!(matches!(
            parse_assignment("BAD-NAME=1"),
            Err(SwitchError::InvalidVarName(_))
        ));
    }
}
