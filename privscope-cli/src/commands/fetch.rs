use serde::Serialize;

use crate::{
    app::{AcquireOptions, GlobalOptions},
    commands::common::locate_target,
    output::print_output,
};

#[derive(Debug, Serialize)]
struct FetchInfo {
    path: String,
}

pub fn run(acquire: &AcquireOptions, opts: &GlobalOptions) -> anyhow::Result<()> {
    let path = locate_target(acquire)?;
    let info = FetchInfo {
        path: path.display().to_string(),
    };

    print_output(&info, opts, |info| println!("{}", info.path))
}
