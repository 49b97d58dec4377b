use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Runs git and returns trimmed stdout, or `None` if git is missing or fails
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

/// Describes the most recently created tag across all branches
fn latest_tag() -> Option<String> {
    let commit = git(&["rev-list", "--tags", "--max-count=1"])?;
    if commit.is_empty() {
        return None;
    }
    git(&["describe", "--tags", &commit])
}

fn main() {
    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let tag = latest_tag().unwrap_or_default();
    fs::write(Path::new(&out_dir).join("latest_tag.txt"), tag)
        .expect("failed to write latest_tag.txt");

    println!("cargo:rerun-if-changed=build.rs");
    for path in [".git/HEAD", ".git/refs/tags", ".git/packed-refs"] {
        if Path::new(path).exists() {
            println!("cargo:rerun-if-changed={}", path);
        }
    }
}
