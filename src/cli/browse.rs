use std::path::PathBuf;

use super::load::load_files;
use crate::browser::SessionBrowser;
use crate::error::Result;
use crate::settings::load_settings;

pub fn run(files: &[PathBuf]) -> Result<()> {
    let session = load_files(files);
    session.require_data()?;
    let settings = load_settings();
    let mut browser = SessionBrowser::new(
        session,
        files.to_vec(),
        settings.date_format,
        settings.page_size,
    );
    browser.run()?;
    Ok(())
}
