fn main() {
    if std::env::var_os("CARGO_FEATURE_SOXR").is_some() {
        println!("cargo:rustc-link-search=native=/opt/homebrew/lib");
        println!("cargo:rustc-link-lib=soxr");
    }
}
