// Embeds the service version reported by /version and the CMS client user agent.
// Release builds may stamp a numeric build number over the patch segment.

use std::env;

const PATCH_OVERRIDE: &str = "DISCOVERY_PATCH_VERSION";

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION not set");

    let (release, patch) = match version.rsplit_once('.') {
        Some((release, patch)) if release.split('.').count() == 2 => (release, patch),
        _ => panic!("Cargo.toml version must be MAJOR.MINOR.PATCH, got {version}"),
    };

    let patch = match env::var(PATCH_OVERRIDE) {
        Ok(stamp) if stamp.parse::<u32>().is_ok() => stamp,
        Ok(stamp) => {
            println!("cargo:warning=ignoring non-numeric {PATCH_OVERRIDE}={stamp}");
            patch.to_string()
        }
        Err(_) => patch.to_string(),
    };

    println!("cargo:rustc-env=DISCOVERY_VERSION={release}.{patch}");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed={PATCH_OVERRIDE}");
}
