fn main() {
    if let Err(e) = labelexport::run() {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
