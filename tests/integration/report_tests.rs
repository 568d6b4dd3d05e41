//! Error report tests

#[cfg(test)]
mod tests {
    use pixelpuritan::client::{
        BatchSummary, ERROR_REPORT_FILE, ScanResult, report_dir, write_error_report,
    };
    use std::fs;

    #[test]
    fn test_report_has_header_and_one_row_per_failure() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            ScanResult::success(dir.path().join("ok.png"), false, 90.0),
            ScanResult::failure(dir.path().join("a.png"), "HTTP 404"),
            ScanResult::success(dir.path().join("hot.png"), true, 99.0),
            ScanResult::failure(dir.path().join("b.png"), "network/timeout: timed out"),
        ];

        let path = write_error_report(dir.path(), &results).unwrap().unwrap();
        assert_eq!(path, dir.path().join(ERROR_REPORT_FILE));

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file,error");
        assert_eq!(
            lines[1],
            format!("{},HTTP 404", dir.path().join("a.png").display())
        );
        assert!(lines[2].ends_with(",network/timeout: timed out"));
        assert_eq!(BatchSummary::from_results(&results).error_count, lines.len() - 1);
    }

    #[test]
    fn test_no_report_without_errors() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![ScanResult::success(dir.path().join("ok.png"), false, 90.0)];

        assert!(write_error_report(dir.path(), &results).unwrap().is_none());
        assert!(!dir.path().join(ERROR_REPORT_FILE).exists());
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![ScanResult::failure(
            dir.path().join("one, two.png"),
            "invalid response: expected value, found \"<\"",
        )];

        let path = write_error_report(dir.path(), &results).unwrap().unwrap();
        let text = fs::read_to_string(path).unwrap();
        let row = text.lines().nth(1).unwrap();

        assert!(row.starts_with('"'));
        assert!(row.contains("one, two.png\","));
        assert!(row.ends_with("\"invalid response: expected value, found \"\"<\"\"\""));
    }

    #[test]
    fn test_report_failure_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does/not/exist");
        let results = vec![ScanResult::failure("x.png", "HTTP 500")];

        assert!(write_error_report(&missing, &results).is_err());
    }

    #[test]
    fn test_report_lands_next_to_scanned_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.png");
        fs::write(&file, b"x").unwrap();

        let results = vec![ScanResult::failure(&file, "HTTP 500")];
        let path = write_error_report(&report_dir(&file), &results)
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("errors.csv"));
    }
}
