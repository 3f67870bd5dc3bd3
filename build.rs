fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let git = |args: &[&str]| {
        std::process::Command::new("git")
            .args(args)
            .output()
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
    };

    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let on_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();

    // Tagged builds report the crate version, everything else the commit.
    let version = if on_tag {
        pkg_version
    } else {
        match git(&["rev-parse", "--short", "HEAD"]) {
            Some(hash) if !hash.is_empty() => format!("{pkg_version}-dev@{hash}"),
            _ => format!("{pkg_version}-dev"),
        }
    };

    println!("cargo:rustc-env=LINKSHELF_VERSION={version}");
}
