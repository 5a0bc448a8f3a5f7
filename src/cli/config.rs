use crate::error::{LedgerError, Result};
use crate::settings::{load_settings, save_settings, settings_path, validate_date_format, Settings};

pub fn run(
    date_format: Option<String>,
    color: Option<bool>,
    page_size: Option<usize>,
    show: bool,
) -> Result<()> {
    let mut settings = load_settings();
    let changed = apply(&mut settings, date_format, color, page_size)?;
    if changed {
        save_settings(&settings)?;
        println!("Saved {}", settings_path().display());
    }
    if show || !changed {
        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| LedgerError::Settings(e.to_string()))?;
        println!("{json}");
    }
    Ok(())
}

/// Apply the given overrides. Returns whether anything was set.
fn apply(
    settings: &mut Settings,
    date_format: Option<String>,
    color: Option<bool>,
    page_size: Option<usize>,
) -> Result<bool> {
    let mut changed = false;
    if let Some(fmt) = date_format {
        validate_date_format(&fmt)?;
        settings.date_format = fmt;
        changed = true;
    }
    if let Some(c) = color {
        settings.color = c;
        changed = true;
    }
    if let Some(n) = page_size {
        if n == 0 {
            return Err(LedgerError::Settings("page size must be at least 1".into()));
        }
        settings.page_size = n;
        changed = true;
    }
    Ok(changed)
}
