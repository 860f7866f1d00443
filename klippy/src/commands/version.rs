/// Get the version string for klippy and libklippy
pub fn get_version_string() -> String {
    format!(
        "klippy {}\nlibklippy {}",
        env!("CARGO_PKG_VERSION"),
        libklippy::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
