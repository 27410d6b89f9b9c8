fn main() {
    ncm::app::cli::run();
}
