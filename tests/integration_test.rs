use anyhow::Result;
use commitsmith::git::{collect_diff, repo_root, split_by_file, BinaryFile, GitError, Scope};
use commitsmith::prompt::compose::listed_files;
use commitsmith::prompt::{PromptComposer, PromptMode, Style};
use git2::{Repository, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x01];

/// Temporary repository driven through git2; the code under test uses the
/// git CLI against the same directory.
struct TestRepo {
    _temp_dir: TempDir,
    repo_path: PathBuf,
    repo: Repository,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo_path = temp_dir.path().to_path_buf();
        let repo = Repository::init(&repo_path)?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(Self {
            _temp_dir: temp_dir,
            repo_path,
            repo,
        })
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let full = self.repo_path.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
        Ok(())
    }

    fn stage(&self, path: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_path(Path::new(path))?;
        index.write()?;
        Ok(())
    }

    fn stage_removal(&self, path: &str) -> Result<()> {
        fs::remove_file(self.repo_path.join(path))?;
        let mut index = self.repo.index()?;
        index.remove_path(Path::new(path))?;
        index.write()?;
        Ok(())
    }

    /// Commits the current index.
    fn commit(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = Signature::now("Test User", "test@example.com")?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(())
    }

    fn git_stdout(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()?;
        Ok(String::from_utf8(output.stdout)?)
    }
}

fn text_of_len(len: usize) -> String {
    let line = "line of ordinary text\n";
    line.repeat(len / line.len() + 1)
}

#[test]
fn small_staged_change_is_collected_untouched() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("src/lib.txt", b"alpha\nbeta\ngamma\n")?;
    repo.stage("src/lib.txt")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;
    let expected = repo.git_stdout(&["diff", "--no-color", "--no-ext-diff", "--cached"])?;

    assert!(result.binary_files.is_empty());
    assert!(result.truncated_paths.is_empty());
    assert_eq!(result.diff, expected.trim());
    assert_eq!(result.total_original_len, result.diff.len());
    assert!(result.diff.contains("+beta"));
    Ok(())
}

#[test]
fn oversized_file_is_truncated() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("big.txt", text_of_len(5000).as_bytes())?;
    repo.write("small.txt", b"tiny\n")?;
    repo.stage("big.txt")?;
    repo.stage("small.txt")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;

    assert_eq!(result.truncated_paths, vec!["big.txt".to_string()]);
    assert!(result.diff.contains("[commitsmith] diff truncated for big.txt"));
    assert!(result.diff.contains("+tiny"));
    assert!(result.total_original_len > 5000);
    assert!(result.diff.len() < result.total_original_len);
    Ok(())
}

#[test]
fn zero_limit_disables_truncation() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("big.txt", text_of_len(5000).as_bytes())?;
    repo.stage("big.txt")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 0)?;

    assert!(result.truncated_paths.is_empty());
    assert_eq!(result.diff.len(), result.total_original_len);
    Ok(())
}

#[test]
fn staged_binary_is_listed_not_diffed() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("assets/logo.png", PNG_BYTES)?;
    repo.stage("assets/logo.png")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;

    assert_eq!(
        result.binary_files,
        vec![BinaryFile {
            path: "assets/logo.png".to_string(),
            size: Some(PNG_BYTES.len() as u64),
        }]
    );
    assert!(!result.diff.contains("Binary files"));
    assert_eq!(result.total_original_len, 0);
    assert!(!result.is_empty());
    Ok(())
}

#[test]
fn deleted_binary_has_unknown_size() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("data.bin", PNG_BYTES)?;
    repo.stage("data.bin")?;
    repo.commit("add data")?;
    repo.stage_removal("data.bin")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;

    assert_eq!(result.binary_files.len(), 1);
    assert_eq!(result.binary_files[0].path, "data.bin");
    assert_eq!(result.binary_files[0].size, None);
    assert_eq!(result.binary_files[0].size_label(), "unknown");
    Ok(())
}

#[test]
fn unstaged_changes_need_wider_scope() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("notes.txt", b"one\n")?;
    repo.stage("notes.txt")?;
    repo.commit("initial")?;
    repo.write("notes.txt", b"one\ntwo\n")?;

    let staged = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;
    assert!(staged.is_empty());

    let wider = collect_diff(&repo.repo_path, Scope::StagedUnstaged, 1000)?;
    assert!(wider.diff.contains("+two"));
    assert_eq!(wider.total_original_len, wider.diff.len());
    Ok(())
}

#[test]
fn untracked_files_only_in_widest_scope() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("tracked.txt", b"base\n")?;
    repo.stage("tracked.txt")?;
    repo.commit("initial")?;
    repo.write("fresh.txt", b"brand new\n")?;
    repo.write("image.png", PNG_BYTES)?;

    let narrow = collect_diff(&repo.repo_path, Scope::StagedUnstaged, 1000)?;
    assert!(narrow.is_empty());

    let all = collect_diff(&repo.repo_path, Scope::All, 1000)?;
    assert!(all.diff.contains("fresh.txt"));
    assert!(all.diff.contains("+brand new"));
    assert_eq!(
        all.binary_files,
        vec![BinaryFile {
            path: "image.png".to_string(),
            size: Some(PNG_BYTES.len() as u64),
        }]
    );
    Ok(())
}

#[test]
fn ignored_files_are_skipped() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write(".gitignore", b"*.log\n")?;
    repo.stage(".gitignore")?;
    repo.commit("ignore logs")?;
    repo.write("debug.log", b"noise\n")?;

    let all = collect_diff(&repo.repo_path, Scope::All, 1000)?;
    assert!(all.is_empty());
    Ok(())
}

#[test]
fn tiers_are_combined() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("a.txt", b"a\n")?;
    repo.stage("a.txt")?;
    repo.commit("initial")?;
    repo.write("b.txt", b"staged\n")?;
    repo.stage("b.txt")?;
    repo.write("a.txt", b"a\nchanged\n")?;
    repo.write("c.txt", b"untracked\n")?;

    let all = collect_diff(&repo.repo_path, Scope::All, 1000)?;
    let b = all.diff.find("b/b.txt").unwrap_or(usize::MAX);
    let a = all.diff.find("b/a.txt").unwrap_or(usize::MAX);
    let c = all.diff.find("b/c.txt").unwrap_or(usize::MAX);
    assert!(b < a && a < c, "tier order wrong:\n{}", all.diff);
    assert_eq!(all.total_original_len + 2, all.diff.len());
    Ok(())
}

#[test]
fn non_ascii_paths_are_not_quoted() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("café.png", PNG_BYTES)?;
    repo.write("naïve.txt", b"plain words\n")?;
    repo.stage("café.png")?;
    repo.stage("naïve.txt")?;

    let result = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;

    assert_eq!(
        result.binary_files,
        vec![BinaryFile {
            path: "café.png".to_string(),
            size: Some(PNG_BYTES.len() as u64),
        }]
    );
    assert!(result.diff.contains("+++ b/naïve.txt"), "{}", result.diff);
    assert!(!result.diff.contains("\\303"));

    let chunks = split_by_file(&result.diff);
    assert_eq!(
        listed_files(&chunks, &result.binary_files),
        vec!["naïve.txt".to_string(), "café.png (binary)".to_string()]
    );

    let prompt = PromptComposer::new(Style::Conventional, Scope::Staged)
        .with_max_chars(2000)
        .compose(PromptMode::Single, &result);
    assert!(prompt.text.contains("- naïve.txt"));
    assert!(prompt.text.contains("café.png"));
    assert!(!prompt.text.contains("\\303"));
    Ok(())
}

#[test]
fn untracked_non_ascii_text_is_diffed_verbatim() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("tracked.txt", b"base\n")?;
    repo.stage("tracked.txt")?;
    repo.commit("initial")?;
    repo.write("notes/résumé.md", b"fresh\n")?;

    let all = collect_diff(&repo.repo_path, Scope::All, 1000)?;
    let chunks = split_by_file(&all.diff);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].path.as_deref(), Some("notes/résumé.md"));
    assert!(all.diff.contains("+fresh"));
    Ok(())
}

#[test]
fn staged_text_with_binary_working_copy_is_in_both_lists() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("doc.txt", b"one\n")?;
    repo.stage("doc.txt")?;
    repo.commit("initial")?;
    repo.write("doc.txt", b"one\ntwo\n")?;
    repo.stage("doc.txt")?;
    repo.write("doc.txt", PNG_BYTES)?;

    let result = collect_diff(&repo.repo_path, Scope::StagedUnstaged, 1000)?;

    assert_eq!(
        result.binary_files,
        vec![BinaryFile {
            path: "doc.txt".to_string(),
            size: Some(PNG_BYTES.len() as u64),
        }]
    );
    let chunks = split_by_file(&result.diff);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].path.as_deref(), Some("doc.txt"));
    assert!(chunks[0].content.contains("+two"));
    assert!(!result.diff.contains("Binary files"));
    assert_eq!(
        listed_files(&chunks, &result.binary_files),
        vec!["doc.txt (binary)".to_string()]
    );

    // The staged tier alone sees only the text change.
    let staged = collect_diff(&repo.repo_path, Scope::Staged, 1000)?;
    assert!(staged.binary_files.is_empty());
    assert!(staged.diff.contains("+two"));
    Ok(())
}

#[test]
fn staged_binary_with_text_working_copy_stays_binary() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("asset.dat", PNG_BYTES)?;
    repo.stage("asset.dat")?;
    repo.write("asset.dat", b"now plain text\n")?;

    let result = collect_diff(&repo.repo_path, Scope::StagedUnstaged, 1000)?;

    // git compares the binary index blob against the text file, so both
    // tiers report the path as binary; the later tier's size wins.
    assert_eq!(
        result.binary_files,
        vec![BinaryFile {
            path: "asset.dat".to_string(),
            size: Some(b"now plain text\n".len() as u64),
        }]
    );
    assert!(!result.diff.contains("now plain text"));
    Ok(())
}

#[test]
fn composed_prompt_fits_budget_for_real_diff() -> Result<()> {
    let repo = TestRepo::new()?;
    for i in 0..6 {
        let path = format!("file{i}.txt");
        repo.write(&path, text_of_len(800).as_bytes())?;
        repo.stage(&path)?;
    }

    let result = collect_diff(&repo.repo_path, Scope::Staged, 0)?;
    let prompt = PromptComposer::new(Style::Conventional, Scope::Staged)
        .with_max_chars(2500)
        .compose(PromptMode::Single, &result);

    assert!(prompt.text.len() <= 2500);
    assert!(!prompt.partial);
    for i in 0..6 {
        assert!(prompt.text.contains(&format!("- file{i}.txt")));
    }
    Ok(())
}

#[test]
fn repo_root_found_from_subdirectory() -> Result<()> {
    let repo = TestRepo::new()?;
    repo.write("nested/deeper/file.txt", b"x\n")?;

    let root = repo_root(&repo.repo_path.join("nested/deeper"))?;
    assert_eq!(root.canonicalize()?, repo.repo_path.canonicalize()?);
    Ok(())
}

#[test]
fn outside_a_repository_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let err = repo_root(dir.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GitError>(),
        Some(GitError::RepositoryNotFound(_))
    ));

    assert!(collect_diff(dir.path(), Scope::Staged, 1000).is_err());
    Ok(())
}
