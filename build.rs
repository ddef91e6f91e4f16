// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Build script for the add-on board drivers
//!
//! The library itself needs no build step. The `robot` firmware binary
//! (feature `rp2350`) links through `cortex-m-rt`, which looks for a
//! `memory.x` describing the RP2350 memory map:
//! - **FLASH**: 4MB starting at 0x10000000
//! - **RAM**: 512KB starting at 0x20000000
//! - **SRAM8** / **SRAM9**: 4KB banks at 0x20080000 and 0x20081000
//!
//! Host builds and unit tests skip the copy entirely.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_RP2350").is_none() {
        return;
    }

    // Copy memory.x next to the other build artifacts for the linker
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("cargo sets OUT_DIR"));
    fs::write(out.join("memory.x"), include_bytes!("memory.x"))
        .expect("failed to write memory.x to OUT_DIR");
    println!("cargo:rustc-link-search={}", out.display());
}
