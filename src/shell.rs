use crate::error::SwitchError;
use std::str::FromStr;

pub const SUPPORTED_SHELLS: &[&str] = &["bash", "zsh", "sh", "fish"];

/// Name of the binary the init snippets call.
const BIN: &str = "envswap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Sh,
    Fish,
}

/// Syntax family used for assignment, unset and quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Posix,
    Fish,
}

impl Shell {
    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Sh => "sh",
            Shell::Fish => "fish",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            Shell::Bash | Shell::Zsh | Shell::Sh => Dialect::Posix,
            Shell::Fish => Dialect::Fish,
        }
    }

    /// Snippet for the shell's startup file. It defines an `envswap` function
    /// that runs the binary for activations and evaluates what it prints,
    /// which is the only way the binary can change the interactive shell.
    pub fn init_script(self) -> String {
        match self.dialect() {
            Dialect::Posix => posix_init(self.name()),
            Dialect::Fish => fish_init(),
        }
    }
}

impl FromStr for Shell {
    type Err = SwitchError;

    /// Accepts a bare name or a path such as `$SHELL` (`/usr/bin/zsh`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().rsplit('/').next().unwrap_or_default();
        match name {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "sh" => Ok(Shell::Sh),
            "fish" => Ok(Shell::Fish),
            _ => Err(SwitchError::UnsupportedShell(s.to_string())),
        }
    }
}

// Help and dry runs print text meant for a human, so they bypass `eval`.
fn posix_init(shell: &str) -> String {
    format!(
        r#"# {BIN} shell integration for {shell}
# Load it from your startup file with: eval "$({BIN} init {shell})"
{BIN}() {{
    case "${{1-}}" in
        ""|use|deactivate) ;;
        *)
            command {BIN} "$@"
            return
            ;;
    esac
    for __{BIN}_arg in "$@"; do
        case "$__{BIN}_arg" in
            -h|--help|--dry-run)
                unset __{BIN}_arg
                command {BIN} "$@"
                return
                ;;
        esac
    done
    unset __{BIN}_arg
    __{BIN}_out="$(ENVSWAP_SHELL={shell} command {BIN} "$@")" || {{
        __{BIN}_status=$?
        unset __{BIN}_out
        return $__{BIN}_status
    }}
    eval "$__{BIN}_out"
    unset __{BIN}_out
}}
"#
    )
}

fn fish_init() -> String {
    format!(
        r#"# {BIN} shell integration for fish
# Load it from config.fish with: {BIN} init fish | source
function {BIN}
    switch "$argv[1]"
        case '' use deactivate
        case '*'
            command {BIN} $argv
            return
    end
    if contains -- -h $argv; or contains -- --help $argv; or contains -- --dry-run $argv
        command {BIN} $argv
        return
    end
    set -l __{BIN}_out (ENVSWAP_SHELL=fish command {BIN} $argv); or return
    eval $__{BIN}_out
end
"#
    )
}
