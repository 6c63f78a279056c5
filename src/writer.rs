use std::path::Path;

use crate::runner::Outcome;

/// Overwrites both output files with the partitioned outcomes. Empty
/// partitions still produce (empty) files. Write failures are logged so the
/// summary can still be reported.
pub async fn write_results(
    outcomes: &[Outcome],
    eligible_path: impl AsRef<Path>,
    not_eligible_path: impl AsRef<Path>,
) {
    let mut eligible = String::new();
    let mut not_eligible = String::new();

    for outcome in outcomes {
        if outcome.eligible {
            eligible.push_str(&format!(
                "{}:{}:{}\n",
                outcome.private_key, outcome.public_key, outcome.amount
            ));
        } else {
            not_eligible.push_str(&format!(
                "{}:{}\n",
                outcome.private_key, outcome.public_key
            ));
        }
    }

    if let Err(e) = tokio::fs::write(&eligible_path, eligible).await {
        tracing::error!(
            "Failed to write {}: {e}",
            eligible_path.as_ref().display()
        );
    }
    if let Err(e) = tokio::fs::write(&not_eligible_path, not_eligible).await {
        tracing::error!(
            "Failed to write {}: {e}",
            not_eligible_path.as_ref().display()
        );
    }
}
