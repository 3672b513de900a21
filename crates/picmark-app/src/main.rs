//! Command-line entry point.

use anyhow::{Result, bail};
use std::path::PathBuf;

const USAGE: &str = "usage: picmark <session.json> [--commands]";

fn main() -> Result<()> {
    env_logger::init();

    let mut path = None;
    let mut record_commands = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--commands" => record_commands = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if path.is_none() => path = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }
    let Some(path) = path else {
        bail!(USAGE);
    };

    log::info!("Replaying {}", path.display());
    let session = picmark_app::Session::load(&path)?;
    let output = picmark_app::replay(&session, record_commands)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
