fn main() {
    if let Err(err) = code_city_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
