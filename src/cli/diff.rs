//! Rendering of push/pull change sets.

use crate::cli::output;
use crate::core::diff::{ChangeKind, DiffResult};

/// Which way a change set goes.
#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Push,
    Pull,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Push => "push",
            Direction::Pull => "pull",
        }
    }
}

/// `3 changes (1 added, 1 modified, 1 deleted)`
pub fn summary(diff: &DiffResult) -> String {
    let noun = if diff.total_count() == 1 {
        "change"
    } else {
        "changes"
    };
    format!(
        "{} {} ({} added, {} modified, {} deleted)",
        diff.total_count(),
        noun,
        diff.added_count(),
        diff.modified_count(),
        diff.deleted_count()
    )
}

/// Print the change set. Values are never shown.
pub fn render(diff: &DiffResult, direction: Direction, environment: &str, target: &str, apply: bool) {
    if diff.is_empty() {
        output::success(&format!("{} is in sync with {}", environment, target));
        return;
    }

    let (from, to) = match direction {
        Direction::Push => (environment, target),
        Direction::Pull => (target, environment),
    };
    output::header(&format!("{} {} → {}", direction.verb(), from, to));
    for change in diff.changes() {
        let marker = match change.kind() {
            ChangeKind::Added => '+',
            ChangeKind::Modified => '~',
            ChangeKind::Deleted => '-',
        };
        output::change(marker, change.key());
    }

    if apply {
        output::success(&format!("{}ed {}", direction.verb(), summary(diff)));
    } else {
        output::dimmed(&summary(diff));
        output::hint(&format!("run: envsync {} --apply", direction.verb()));
    }
}
