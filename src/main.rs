fn main() {
    if !path_layers::cli::init_tracing() {
        eprintln!("warning: a tracing subscriber is already installed; keeping it");
    }
    if let Err(err) = path_layers::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
