fn main() {
    if let Err(error) = picklist_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
