use std::{env, process::Command};

/// Короткий хэш коммита; `MSGBUS_BUILD_COMMIT` имеет приоритет (сборка вне git).
fn git_commit() -> String {
    if let Ok(commit) = env::var("MSGBUS_BUILD_COMMIT") {
        return commit;
    }
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".into())
}

fn main() {
    println!("cargo:rerun-if-env-changed=MSGBUS_BUILD_COMMIT");
    println!("cargo:rerun-if-changed=.git/HEAD");

    println!("cargo:rustc-env=GIT_COMMIT={}", git_commit());
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
}
