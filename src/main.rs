fn main() {
    if let Err(err) = equipment_analyzer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
