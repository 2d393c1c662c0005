//! simrun CLI entry point

fn main() {
    simrun::cli::run();
}
