fn main() {
    if let Err(err) = gratis::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
