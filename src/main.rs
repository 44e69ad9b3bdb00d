fn main() {
    if let Err(err) = carscope::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
