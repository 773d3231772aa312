// main.rs - CLI entry point

use nestloader::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(2);
    }
}

fn run_main() -> Result<(), String> {
    let args: Args = argh::from_env();

    println!("🚀 nestloader v{}", env!("CARGO_PKG_VERSION"));
    println!("⚡ NeST model → per-assembly interaction networks → NDEx");
    if args.dryrun {
        println!("💡 Dry run: networks will be built but not uploaded");
    }

    let validation_result = validate_args(&args)?;
    let mut loader = NestLoader::new(&args, validation_result);
    loader.run()
}
