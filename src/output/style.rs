//! Terminal styles for report roles.

use super::report::Role;
use console::Style;

/// Resolve a role to its terminal style.
///
/// Styling is forced so colored reports keep their codes even when
/// written to a file or a pipe.
pub fn style_for(role: Role) -> Style {
    let style = match role {
        Role::Highlight => Style::new().yellow(),
        Role::Warning => Style::new().red(),
        Role::Info => Style::new().white(),
        Role::Accent => Style::new().cyan(),
        Role::Muted => Style::new().black().bright(),
    };
    style.force_styling(true)
}
