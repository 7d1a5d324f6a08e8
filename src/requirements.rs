// ABOUTME: Pre-flight check that required external commands are resolvable.

/// Return the subset of `commands` that cannot be resolved on PATH.
pub fn missing_commands<S: AsRef<str>>(commands: &[S]) -> Vec<String> {
    commands
        .iter()
        .map(AsRef::as_ref)
        .filter(|command| which::which(command).is_err())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_missing_commands() {
        let missing = missing_commands(&["sh", "definitely-not-a-real-command-xyz"]);
        assert_eq!(missing, vec!["definitely-not-a-real-command-xyz"]);
    }

    #[test]
    fn empty_input_is_satisfied() {
        assert!(missing_commands::<&str>(&[]).is_empty());
    }
}
