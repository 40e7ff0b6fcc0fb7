use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

const STATIC_DIR: &str = "static";

/// Hashes every file directly under `dir`, in name order.
fn hash_dir(dir: &Path, hasher: &mut DefaultHasher) {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return;
    };

    let mut files: Vec<_> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    for path in files {
        if let (Some(name), Ok(contents)) = (path.file_name(), fs::read(&path)) {
            name.hash(hasher);
            contents.hash(hasher);
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed={STATIC_DIR}/");
    println!("cargo:rerun-if-changed=migrations/");

    let mut hasher = DefaultHasher::new();
    hash_dir(Path::new(STATIC_DIR), &mut hasher);

    let hash = format!("{:016x}", hasher.finish());
    println!("cargo:rustc-env=STATIC_HASH={}", &hash[..8]);
}
