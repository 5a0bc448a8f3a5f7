use std::path::PathBuf;

use super::load::load_files;
use crate::error::Result;
use crate::fmt;
use crate::query::Projection;

pub fn run(files: &[PathBuf], projection: Projection) -> Result<()> {
    let session = load_files(files);
    session.require_data()?;
    let total = session.get_aggregate(projection.view(), projection)?;
    println!("{}: {}", projection.label(), fmt::aggregate(projection, total));
    Ok(())
}
