//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time, and records the build time as the initial
//! wall-clock reference for the firmware.

use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    // Put memory layout in the output directory and ensure it's on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // Local wall-clock time of the build host, stored as if it were UTC so the
    // watch shows local time without a timezone database.
    let now = chrono::offset::Local::now().naive_local();
    File::create(out.join("utc.rs"))
        .unwrap()
        .write_fmt(format_args!(
            "const UTC_EPOCH: i64 = {:?};",
            now.and_utc().timestamp()
        ))
        .unwrap();

    // Without `rerun-if-changed` Cargo re-runs this on every source change,
    // which keeps the epoch fresh.
}
