//! One function per subcommand.
//!
//! Output is rendered completely before anything is written, so a failing
//! command never leaves partial text on standard output.

use crate::activation::{self, ActivationRecord};
use crate::config::{parse_assignment, validate_profile_name, EnvProfile};
use crate::db::ProfileStore;
use crate::error::SwitchError;
use crate::export;
use crate::providers::{self, Provider};
use crate::settings::{self, Settings};
use crate::shell::Shell;
use crate::tui;
use anyhow::{Context as _, Result};
use std::io::Write;
use std::path::Path;

pub struct Context {
    pub store: ProfileStore,
    pub settings: Settings,
}

impl Context {
    pub fn from_env() -> Result<Self> {
        let settings = settings::load_settings()?;
        let store = ProfileStore::new(settings::store_path(&settings)?);
        log::debug!("using profile store {}", store.path().display());
        Ok(Self { store, settings })
    }

    /// `--shell` / `ENVSWAP_SHELL` first, then `default_shell` from settings.
    fn resolve_shell(&self, requested: Option<&str>) -> Result<Shell, SwitchError> {
        requested
            .or(self.settings.default_shell.as_deref())
            .unwrap_or(settings::default_shell())
            .parse()
    }
}

/// Activate `name`, or the profile chosen in the picker when `name` is `None`.
pub fn use_profile(
    ctx: &Context,
    name: Option<&str>,
    shell: Option<&str>,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    let shell = ctx.resolve_shell(shell)?;
    let snapshot = ctx.store.load()?;

    let target = match name {
        Some(n) => n.to_string(),
        None => {
            let theme = tui::theme::resolve_theme(ctx.settings.picker.as_ref())
                .context("invalid [picker] settings")?;
            tui::pick_profile(&snapshot, &theme)?
        }
    };

    let record = activation::select_profile(&snapshot, &target)?;
    let text = export::render(&record, shell)?;

    if dry_run {
        log::debug!("dry run, not recording `{target}` as active");
    } else {
        ctx.store
            .save(&activation::record_activation(&snapshot, &target, &record))?;
    }
    emit(out, &text, &record)
}

pub fn deactivate(
    ctx: &Context,
    shell: Option<&str>,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    let shell = ctx.resolve_shell(shell)?;
    let snapshot = ctx.store.load()?;
    let record = activation::deactivate(&snapshot);
    let text = export::render(&record, shell)?;

    if !dry_run && snapshot.active.is_some() {
        ctx.store.save(&activation::clear_activation(&snapshot))?;
    }
    emit(out, &text, &record)
}

fn emit(out: &mut impl Write, text: &str, record: &ActivationRecord) -> Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()?;
    if record.is_empty() {
        log::debug!("nothing to change");
    }
    Ok(())
}

pub fn list(ctx: &Context, quiet: bool, out: &mut impl Write) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let active = snapshot.active_profile().map(|a| a.name.as_str());

    let width = snapshot
        .profiles
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    let mut text = String::new();
    for profile in &snapshot.profiles {
        if quiet {
            text.push_str(&profile.name);
        } else {
            let marker = if Some(profile.name.as_str()) == active { '*' } else { ' ' };
            let count = profile.vars.len();
            let noun = if count == 1 { "var" } else { "vars" };
            text.push_str(&format!("{marker} {:<width$}({count} {noun})", profile.name));
        }
        text.push('\n');
    }
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub fn show(ctx: &Context, name: &str, out: &mut impl Write) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let profile = snapshot.get_profile(name)?;
    let mut text = String::new();
    for var in &profile.vars {
        text.push_str(&format!("{var}\n"));
    }
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub fn current(ctx: &Context, out: &mut impl Write) -> Result<()> {
    let snapshot = ctx.store.load()?;
    if let Some(active) = snapshot.active_profile() {
        writeln!(out, "{}", active.name)?;
    }
    Ok(())
}

pub fn create(ctx: &Context, name: &str, assignments: &[String]) -> Result<()> {
    validate_profile_name(name)?;
    let snapshot = ctx.store.load()?;
    if snapshot.contains(name) {
        return Err(SwitchError::AlreadyExists(name.to_string()).into());
    }

    let mut profile = EnvProfile::new(name);
    for arg in assignments {
        let var = parse_assignment(arg)?;
        if profile.get(&var.name).is_some() {
            return Err(SwitchError::DuplicateVar(var.name).into());
        }
        profile.set(var)?;
    }

    ctx.store.save(&snapshot.upsert_profile(profile)?)?;
    eprintln!("Created profile {name}");
    Ok(())
}

pub fn set_vars(ctx: &Context, name: &str, assignments: &[String]) -> Result<()> {
    validate_profile_name(name)?;
    let snapshot = ctx.store.load()?;
    let existed = snapshot.contains(name);
    let mut profile = match snapshot.get_profile(name) {
        Ok(p) => p.clone(),
        Err(_) => EnvProfile::new(name),
    };
    for arg in assignments {
        profile.set(parse_assignment(arg)?)?;
    }

    ctx.store.save(&snapshot.upsert_profile(profile)?)?;
    if existed {
        eprintln!("Updated profile {name}");
    } else {
        eprintln!("Created profile {name}");
    }
    Ok(())
}

pub fn unset_vars(ctx: &Context, name: &str, vars: &[String]) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let mut profile = snapshot.get_profile(name)?.clone();
    for var in vars {
        if !profile.remove(var) {
            eprintln!("warning: {var} is not set in profile {name}");
        }
    }

    ctx.store.save(&snapshot.upsert_profile(profile)?)?;
    eprintln!("Updated profile {name}");
    Ok(())
}

pub fn delete(ctx: &Context, name: &str) -> Result<()> {
    let snapshot = ctx.store.load()?;
    let next = snapshot.delete_profile(name)?;
    ctx.store.save(&next)?;
    eprintln!("Deleted profile {name}");
    Ok(())
}

/// Turn another tool's profiles or installed versions into envswap profiles.
pub fn import(ctx: &Context, provider: Provider, from: Option<&Path>) -> Result<()> {
    let source = match from {
        Some(path) => path.to_path_buf(),
        None => provider.default_source()?,
    };
    let values = provider.read_values(&source)?;

    let snapshot = ctx.store.load()?;
    let next = providers::import_values(&snapshot, provider, &values)?;
    ctx.store.save(&next)?;
    eprintln!(
        "Imported {} profile(s) from {}: {}",
        values.len(),
        provider.name(),
        values
            .iter()
            .map(|v| provider.profile_name(v))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

pub fn init(shell_name: &str, out: &mut impl Write) -> Result<()> {
    let shell: Shell = shell_name.parse()?;
    out.write_all(shell.init_script().as_bytes())?;
    Ok(())
}
