use std::path::PathBuf;

use colored::Colorize;

use crate::session::Session;

/// Submit every file in order, reporting each outcome on stderr.
///
/// A rejected file never aborts the run; it is remembered in the session and
/// the remaining files are still loaded.
pub fn load_files(files: &[PathBuf]) -> Session {
    let mut session = Session::new();
    for path in files {
        let label = path.display();
        match session.submit_path(path) {
            Ok(kind) => eprintln!("{} {label} \u{2014} detected as {kind}", "\u{2713}".green()),
            Err(e) => eprintln!("{} {label}: {e}", "\u{2717}".red()),
        }
    }
    session
}
