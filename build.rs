// build.rs
//
// Stamps the binary with its build time as BUILD_DATE (OUT_DIR/build_info.rs).

use chrono::Utc;
use std::{env, fs, io, path::PathBuf};

fn main() -> io::Result<()> {
    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set"))?;

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    fs::write(
        out_dir.join("build_info.rs"),
        format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
