use std::fs;
use std::path::Path;

/// Finds the next unused two-digit extension for `prefix` in `directory`
/// (e.g. `model.p01`, `model.p02`, ...), per spec §4.7: "writing new
/// plan+flow text files with an auto-incremented two-digit extension
/// (`.p01 … .p99`, `.f01 … .f99`)".
pub fn next_extension(directory: &Path, stem: &str, kind: char) -> String {
    let mut taken = [false; 100];
    if let Ok(entries) = fs::read_dir(directory) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(rest) = name.strip_prefix(&format!("{stem}.{kind}")) {
                if let Ok(n) = rest.parse::<usize>() {
                    if n < 100 {
                        taken[n] = true;
                    }
                }
            }
        }
    }
    let n = taken.iter().position(|&used| !used).unwrap_or(99);
    format!("{kind}{n:02}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn picks_the_first_unused_extension() {
        let dir = std::env::temp_dir().join(format!("ripple1d-naming-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("2823960.p01"), "").unwrap();
        std::fs::write(dir.join("2823960.p02"), "").unwrap();
        let ext = next_extension(&dir, "2823960", 'p');
        assert_eq!(ext, "p03");
        std::fs::remove_dir_all(&dir).ok();
    }
}
