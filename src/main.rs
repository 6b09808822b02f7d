fn main() {
    tester::cli::run();
}
