use std::io::IsTerminal;

/// Presentation switches; the output mode itself travels in
/// `ReportParameters`.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
}

/// Decide whether to emit ANSI colors.
///
/// `--no-color` and `NO_COLOR` always win; otherwise the config's
/// `color` setting applies, with "auto" meaning "stdout is a terminal".
pub fn detect_color(no_color_flag: bool, setting: &str) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match setting {
        "always" => true,
        "never" => false,
        _ => std::io::stdout().is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_disables_color() {
        assert!(!detect_color(true, "always"));
    }

    #[test]
    fn never_setting_disables_color() {
        assert!(!detect_color(false, "never"));
    }
}
