fn main() {
    if let Err(e) = sqlrow_cli::run(std::env::args().collect()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
