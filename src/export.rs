// src/export.rs

use crate::activation::ActivationRecord;
use crate::config::{is_valid_var_name, Var};
use crate::error::SwitchError;
use crate::shell::{Dialect, Shell};

fn shell_single_quote_literal(s: &str) -> String {
    // POSIX-shell safe single-quote escaping:
    // wrap in single quotes, and represent any internal ' as: '"'"'
    // Example: foo'bar => 'foo'"'"'bar'
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\"'\"'");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

fn fish_quote_literal(s: &str) -> String {
    // Inside fish single quotes only \\ and \' are special. Newlines are
    // emitted as an unquoted \n so every statement stays on one line.
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("'\\n'"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

fn checked_name(name: &str) -> Result<&str, SwitchError> {
    if is_valid_var_name(name) {
        Ok(name)
    } else {
        Err(SwitchError::InvalidVarName(name.to_string()))
    }
}

/// Generates the assignment statement for one variable.
pub fn generate_export_line(var: &Var, dialect: Dialect) -> Result<String, SwitchError> {
    let name = checked_name(&var.name)?;
    // Each statement ends with ';' so `eval $(...)` works even if newlines collapse to spaces.
    Ok(match dialect {
        Dialect::Posix => format!("export {}={};", name, shell_single_quote_literal(&var.value)),
        Dialect::Fish => format!("set -gx {} {};", name, fish_quote_literal(&var.value)),
    })
}

pub fn generate_unset_line(name: &str, dialect: Dialect) -> Result<String, SwitchError> {
    let name = checked_name(name)?;
    Ok(match dialect {
        Dialect::Posix => format!("unset {};", name),
        Dialect::Fish => format!("set -e -g {};", name),
    })
}

/// Renders an activation as shell statements, unsets first.
///
/// Values are always quoted as opaque literals; names that are not valid
/// variable names are refused rather than emitted.
pub fn render(record: &ActivationRecord, shell: Shell) -> Result<String, SwitchError> {
    let dialect = shell.dialect();
    let mut out = String::new();
    for name in &record.unset {
        out.push_str(&generate_unset_line(name, dialect)?);
        out.push('\n');
    }
    for var in &record.assign {
        out.push_str(&generate_export_line(var, dialect)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(assign: &[(&str, &str)], unset: &[&str]) -> ActivationRecord {
        ActivationRecord {
            assign: assign.iter().map(|(n, v)| Var::new(n, v)).collect(),
            unset: unset.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn posix_single_quotes_and_escapes_inner_single_quotes() {
        let line = generate_export_line(&Var::new("CC", "O'Reilly"), Dialect::Posix)
            .expect("valid");
        assert_eq!(line, "export CC='O'\"'\"'Reilly';");
    }

    #[test]
    fn posix_keeps_dollar_backticks_and_newlines_literal() {
        let line = generate_export_line(&Var::new("V", "$HOME `id`\n\"x\""), Dialect::Posix)
            .expect("valid");
        assert_eq!(line, "export V='$HOME `id`\n\"x\"';");
    }

    #[test]
    fn fish_escapes_backslash_quote_and_newline() {
        let line = generate_export_line(&Var::new("V", "a\\b'c\nd $e"), Dialect::Fish)
            .expect("valid");
        assert_eq!(line, "set -gx V 'a\\\\b\\'c'\\n'd $e';");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn unsets_come_before_assignments() {
        let rec = record(&[("API_URL", "http://y")], &["DEBUG"]);
        assert_eq!(
            render(&rec, Shell::Bash).expect("render"),
            "unset DEBUG;\nexport API_URL='http://y';\n"
        );
        assert_eq!(
            render(&rec, Shell::Fish).expect("render"),
            "set -e -g DEBUG;\nset -gx API_URL 'http://y';\n"
        );
    }

    #[test]
    fn empty_record_renders_nothing() {
        assert_eq!(render(&ActivationRecord::default(), Shell::Zsh).expect("render"), "");
    }

    #[test]
    fn rendering_is_deterministic() {
        let rec = record(&[("A", "1"), ("B", "two words")], &[]);
        assert_eq!(
            render(&rec, Shell::Sh).expect("render"),
            render(&rec, Shell::Sh).expect("render")
        );
    }

    #[test]
    fn invalid_names_are_never_emitted() {
        let rec = record(&[("X;touch /tmp/pwned", "1")], &[]);
        assert!(matches!(
            render(&rec, Shell::Bash),
            Err(SwitchError::InvalidVarName(_))
        ));
        let rec = record(&[], &["$(id)"]);
        assert!(render(&rec, Shell::Fish).is_err());
    }

    #[test]
    fn statements_end_with_semicolon() {
        let rec = record(&[("CFLAGS", "-O2 -Wall")], &["OLD"]);
        for line in render(&rec, Shell::Bash).expect("render").lines() {
            assert!(line.ends_with(';'), "line did not end with ';': {line}");
        }
    }
}
