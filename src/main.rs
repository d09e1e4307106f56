fn main() {
    std::process::exit(cadence::cli::run());
}
