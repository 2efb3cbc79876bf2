#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    /// Static splash scene with a live tweak panel.
    #[derive(Parser)]
    #[command(version, about)]
    struct Cli {
        /// Directory the textures, matcap and font are loaded from.
        #[arg(long, default_value = "assets")]
        assets: String,

        /// Log at debug level instead of the RUST_LOG default.
        #[arg(short, long)]
        verbose: bool,
    }

    let cli = Cli::parse();
    flagwave::app::run(flagwave::app::RunConfig {
        assets_base: cli.assets,
        verbose: cli.verbose,
    })
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build starts through the wasm-bindgen entry point instead.
}
