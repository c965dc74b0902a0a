use std::io::IsTerminal;

/// Colors are off when NO_COLOR is set or stderr is not a terminal
pub fn should_disable_color() -> bool {
    std::env::var_os("NO_COLOR").is_some() || !std::io::stderr().is_terminal()
}

/// Apply the color preference to the `colored` crate before any output
pub fn init_color() {
    if should_disable_color() {
        colored::control::set_override(false);
    }
}
