//! Status command implementation

use autoconfigurator::error::Result;
use autoconfigurator::runtime::{FileRuntime, HostRuntime};

use super::{base_dir, default_state_dir};
use crate::cli::StatusArgs;

/// Print the component table held in the state directory
pub fn run(args: StatusArgs) -> Result<()> {
    let state_dir = match args.state_dir {
        Some(dir) => dir,
        None => default_state_dir(&base_dir(None)?),
    };
    let runtime = FileRuntime::open(&state_dir)?;
    let records = runtime.list_installed()?;

    println!("Components ({}):", records.len());
    for record in &records {
        let level = runtime
            .start_level_of(record)
            .map_or_else(|| "-".to_string(), |level| level.to_string());
        println!(
            "  {:>4}  {:<11} {:>3}  {}  {}",
            record.id,
            record.state.to_string(),
            level,
            record.identity,
            record.symbolic_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
