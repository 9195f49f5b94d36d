fn main() {
    let code = agentic_ops_launcher::run_launcher();
    std::process::exit(code);
}
