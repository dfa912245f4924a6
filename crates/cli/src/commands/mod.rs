pub mod analyze;
pub mod config_cmd;
pub mod hook;

use std::io::Read;

/// Read all of stdin. Blocking; run it on the blocking pool.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_stdin() -> std::io::Result<String> {
    let mut raw = Vec::new();
    std::io::stdin().read_to_end(&mut raw)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
