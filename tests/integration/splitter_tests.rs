//! pp-split binary tests

#[cfg(test)]
mod tests {
    use std::fs;
    use std::process::Command;

    fn pp_split() -> Command {
        Command::new(env!("CARGO_BIN_EXE_pp-split"))
    }

    #[test]
    fn test_creates_batch_folder_and_moves_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("file_{}.dat", i)), b"dummy").unwrap();
        }

        let output = pp_split().arg(dir.path()).output().unwrap();
        assert!(output.status.success());

        let batch = dir.path().join("batch_001");
        assert!(batch.is_dir());
        assert_eq!(fs::read_dir(&batch).unwrap().count(), 3);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Found 3 files. Resuming split at batch_001"));
        assert!(stdout.contains("Processed batch_001: 3 images."));
    }

    #[test]
    fn test_batch_size_flag_and_resume() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("batch_001")).unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("img_{}.jpg", i)), b"x").unwrap();
        }

        let status = pp_split()
            .arg(dir.path())
            .args(["--batch-size", "2"])
            .status()
            .unwrap();
        assert!(status.success());

        assert_eq!(fs::read_dir(dir.path().join("batch_001")).unwrap().count(), 0);
        assert_eq!(fs::read_dir(dir.path().join("batch_002")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(dir.path().join("batch_003")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(dir.path().join("batch_004")).unwrap().count(), 1);
    }

    #[test]
    fn test_nothing_to_split() {
        let dir = tempfile::tempdir().unwrap();
        let output = pp_split().arg(dir.path()).output().unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("No loose files found"));
    }

    #[test]
    fn test_file_argument_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir.txt");
        fs::write(&file, b"x").unwrap();

        let status = pp_split().arg(&file).status().unwrap();
        assert_eq!(status.code(), Some(1));
    }
}
