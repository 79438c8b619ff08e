fn main() {
    // Expose the crate version for --version and the outbound HTTP user-agent
    println!(
        "cargo:rustc-env=RAHYAB_VERSION={}",
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string())
    );

    println!("cargo:rerun-if-changed=src/");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
