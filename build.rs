use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    // Rerun when textures/fonts change so the copy next to the binary stays fresh.
    println!("cargo:rerun-if-changed=assets/*");

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    // The demo runs with an empty scene when no assets are present, so a
    // missing directory is not an error.
    if assets_src.exists() {
        copy_items(&["assets/"], out_dir, &copy_options)?;
    }

    Ok(())
}
