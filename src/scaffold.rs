//! MLプロジェクト雛形の生成
//!
//! 固定のパス一覧に従って、空のディレクトリ・ファイル構成を作成します。

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 既定のパッケージ名
pub const DEFAULT_PROJECT_NAME: &str = "cnnClassifier";

/// 雛形に含めるファイル一覧（作成順）
pub fn scaffold_files(project_name: &str) -> Vec<PathBuf> {
    let package = format!("src/{}", project_name);

    let mut files = vec![PathBuf::from(".github/workflows/.gitkeep")];
    files.push(PathBuf::from(format!("{}/__init__.py", package)));
    for sub in ["components", "utils", "config", "pipeline", "entity", "constants"] {
        files.push(PathBuf::from(format!("{}/{}/__init__.py", package, sub)));
    }
    files.extend(
        [
            "config/config.yaml",
            "dvc.yaml",
            "params.yaml",
            "requirements.txt",
            "setup.py",
            "research/trials.ipynb",
            "templates/index.html",
        ]
        .into_iter()
        .map(PathBuf::from),
    );

    files
}

/// 既存ファイルの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingFilePolicy {
    /// 空ファイルで上書きする（中身は失われる）
    #[default]
    Truncate,
    /// 既存ファイルには触れない
    Keep,
}

/// 生成結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    /// 新しく作成したディレクトリ
    pub created_dirs: Vec<PathBuf>,
    /// 作成（または空にした）ファイル
    pub written_files: Vec<PathBuf>,
    /// 中身があったのに空にしたファイル
    pub truncated: Vec<PathBuf>,
    /// 既存のため触れなかったファイル
    pub skipped: Vec<PathBuf>,
}

/// 雛形ジェネレータ
#[derive(Debug, Clone)]
pub struct Scaffold {
    files: Vec<PathBuf>,
    policy: ExistingFilePolicy,
}

impl Scaffold {
    pub fn new(project_name: &str) -> Self {
        Self::with_files(scaffold_files(project_name))
    }

    pub fn with_files(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            policy: ExistingFilePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExistingFilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// `root` 以下に雛形を作成
    ///
    /// ディレクトリは存在しなければ作成します。ファイルは `Truncate` の場合
    /// 毎回空で作り直すため、再実行すると既存の内容は消えます。
    pub fn generate(&self, root: &Path) -> Result<ScaffoldReport> {
        let mut report = ScaffoldReport::default();

        for relative in &self.files {
            let filepath = root.join(relative);

            if let Some(filedir) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
                let dir = root.join(filedir);
                if !dir.exists() {
                    fs::create_dir_all(&dir)
                        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
                    info!("Created directory: {}", filedir.display());
                    report.created_dirs.push(filedir.to_path_buf());
                }
            }

            if filepath.exists() {
                if self.policy == ExistingFilePolicy::Keep {
                    info!("Kept existing file: {}", relative.display());
                    report.skipped.push(relative.clone());
                    continue;
                }
                let len = fs::metadata(&filepath)
                    .with_context(|| format!("Failed to stat file: {}", filepath.display()))?
                    .len();
                if len > 0 {
                    warn!("Truncating non-empty file: {} ({} bytes)", relative.display(), len);
                    report.truncated.push(relative.clone());
                }
            }

            File::create(&filepath)
                .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
            info!("Created file: {}", relative.display());
            report.written_files.push(relative.clone());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// fmtレイヤーの出力先として使うメモリバッファ
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn generate_with_logs(scaffold: &Scaffold, root: &Path) -> (ScaffoldReport, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .finish();

        let report = tracing::subscriber::with_default(subscriber, || scaffold.generate(root)).unwrap();
        (report, buffer.contents())
    }

    #[test]
    fn test_scaffold_files_order() {
        let files = scaffold_files("demo");
        assert_eq!(files.len(), 15);
        assert_eq!(files[0], PathBuf::from(".github/workflows/.gitkeep"));
        assert_eq!(files[1], PathBuf::from("src/demo/__init__.py"));
        assert_eq!(files[2], PathBuf::from("src/demo/components/__init__.py"));
        assert_eq!(files[7], PathBuf::from("src/demo/constants/__init__.py"));
        assert_eq!(files[14], PathBuf::from("templates/index.html"));
    }

    #[test]
    fn test_generate_creates_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = Scaffold::new(DEFAULT_PROJECT_NAME).generate(dir.path()).unwrap();

        assert_eq!(report.written_files.len(), 15);
        for file in &report.written_files {
            let path = dir.path().join(file);
            assert!(path.is_file(), "{} missing", path.display());
            assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        }
        // 親が同じファイルではディレクトリは一度だけ作成される
        assert!(report.created_dirs.contains(&PathBuf::from("src/cnnClassifier")));
        assert!(!report.created_dirs.iter().any(|d| d.as_os_str().is_empty()));
        assert!(report.truncated.is_empty());
    }

    #[test]
    fn test_top_level_files_need_no_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = Scaffold::with_files(vec![PathBuf::from("dvc.yaml")])
            .generate(dir.path())
            .unwrap();

        assert!(report.created_dirs.is_empty());
        assert_eq!(report.written_files, vec![PathBuf::from("dvc.yaml")]);
    }

    #[test]
    fn test_keep_policy_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("params.yaml"), "lr: 0.01\n").unwrap();

        let report = Scaffold::with_files(vec![PathBuf::from("params.yaml"), PathBuf::from("setup.py")])
            .with_policy(ExistingFilePolicy::Keep)
            .generate(dir.path())
            .unwrap();

        assert_eq!(report.skipped, vec![PathBuf::from("params.yaml")]);
        assert_eq!(report.written_files, vec![PathBuf::from("setup.py")]);
        assert_eq!(fs::read_to_string(dir.path().join("params.yaml")).unwrap(), "lr: 0.01\n");
    }

    #[test]
    fn test_generate_fails_when_path_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        // ディレクトリを作るべき場所にファイルがある
        fs::write(dir.path().join("config"), "").unwrap();

        let result = Scaffold::with_files(vec![PathBuf::from("config/config.yaml")]).generate(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_logs_each_creation() {
        let dir = tempfile::tempdir().unwrap();
        let scaffold = Scaffold::new(DEFAULT_PROJECT_NAME);

        let (_, logs) = generate_with_logs(&scaffold, dir.path());
        assert_eq!(logs.matches("Created file: ").count(), 15);
        assert!(logs.contains("Created file: templates/index.html"));
        assert_eq!(logs.matches("Created directory: src/cnnClassifier\n").count(), 1);
        assert_eq!(logs.matches("Created directory: ").count(), 11);

        fs::write(dir.path().join("dvc.yaml"), "stages: {}\n").unwrap();
        let (_, logs) = generate_with_logs(&scaffold, dir.path());
        assert_eq!(logs.matches("Created directory: ").count(), 0);
        assert_eq!(logs.matches("Created file: ").count(), 15);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Truncating non-empty file: dvc.yaml"));
    }
}
