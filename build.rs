use std::error::Error;

use vergen::{BuildBuilder, CargoBuilder, Emitter, RustcBuilder};
use vergen_git2::Git2Builder;

// VERGEN_* values are read with option_env! in src/main.rs and logged at startup.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let git = Git2Builder::all_git()?;
    let rustc = RustcBuilder::all_rustc()?;
    let cargo = CargoBuilder::all_cargo()?;
    let build = BuildBuilder::all_build()?;

    // Outside a git checkout the git values fall back to defaults instead of failing.
    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&cargo)?
        .add_instructions(&rustc)?
        .add_instructions(&git)?
        .emit()?;

    Ok(())
}
