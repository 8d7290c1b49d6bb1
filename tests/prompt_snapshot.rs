use commitsmith::git::{BinaryFile, DiffResult, Scope};
use commitsmith::prompt::{PromptComposer, PromptMode, Style};

fn sample_result() -> DiffResult {
    let diff = "diff --git a/a.txt b/a.txt\n+hello".to_string();
    DiffResult {
        total_original_len: diff.len(),
        diff,
        binary_files: vec![BinaryFile {
            path: "logo.png".to_string(),
            size: Some(1234),
        }],
        truncated_paths: vec!["big.txt".to_string()],
    }
}

#[test]
fn single_freeform_prompt() {
    let prompt =
        PromptComposer::new(Style::Freeform, Scope::Staged).compose(PromptMode::Single, &sample_result());

    assert!(!prompt.partial);
    insta::assert_snapshot!("single_freeform_prompt", prompt.text);
}

#[test]
fn composing_twice_is_byte_identical() {
    let composer = PromptComposer::new(Style::Conventional, Scope::All).with_max_chars(400);
    let result = sample_result();
    assert_eq!(
        composer.compose(PromptMode::Split, &result),
        composer.compose(PromptMode::Split, &result)
    );
}
