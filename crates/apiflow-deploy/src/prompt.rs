//! 確認プロンプト

use std::io::{self, BufRead, Write};

/// はい/いいえの確認を取る
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// 標準入力で確認する
///
/// プロンプトは stderr に出す（`--json` の stdout を汚さない）。
/// 読み取りに失敗した場合や入力が閉じている場合は「いいえ」とみなす。
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, message: &str) -> bool {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{} [y/N]: ", message);
        let _ = stderr.flush();

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(e) => {
                tracing::debug!("failed to read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
