//! What has to happen around a history rewrite, beyond running the tools.

pub struct ChecklistItem {
    pub title: &'static str,
    pub detail: &'static str,
}

pub struct Reference {
    pub title: &'static str,
    pub url: &'static str,
}

pub const CHECKLIST: &[ChecklistItem] = &[
    ChecklistItem {
        title: "Notify developers",
        detail: "Tell everyone with a clone that history is about to be rewritten and ask them to merge or park open work.",
    },
    ChecklistItem {
        title: "Disable push access",
        detail: "Freeze pushes to the remote for the duration of the rewrite so no new commits land on the old history.",
    },
    ChecklistItem {
        title: "Rewrite and force-push",
        detail: "Clean the branch heads first, then rewrite history and force-push every branch and tag.",
    },
    ChecklistItem {
        title: "Re-clone everywhere",
        detail: "Every developer and CI runner must delete stale clones and clone again; pulling or rebasing a stale clone reintroduces the removed data.",
    },
    ChecklistItem {
        title: "Expect broken pull request diffs",
        detail: "Open pull requests reference commits that no longer exist and may show empty or wrong diffs.",
    },
    ChecklistItem {
        title: "Expect broken CI/CD references",
        detail: "Pipelines, deployments and release notes that pin commit hashes need to be updated to the new hashes.",
    },
    ChecklistItem {
        title: "Signatures are lost",
        detail: "Rewritten commits and tags lose their GPG/SSH signatures and must be re-signed if signatures are required.",
    },
    ChecklistItem {
        title: "Revoke every leaked secret",
        detail: "Rewriting history does not un-leak anything. Rotate or revoke each credential found, including ones in forks, caches and stale clones.",
    },
];

pub const REFERENCES: &[Reference] = &[
    Reference {
        title: "git filter-repo",
        url: "https://github.com/newren/git-filter-repo",
    },
    Reference {
        title: "GitHub: Removing sensitive data from a repository",
        url: "https://docs.github.com/en/authentication/keeping-your-account-and-data-secure/removing-sensitive-data-from-a-repository",
    },
    Reference {
        title: "BFG Repo-Cleaner",
        url: "https://rtyley.github.io/bfg-repo-cleaner/",
    },
];

pub fn render_markdown() -> String {
    let mut out = String::from("# Sensitive data cleanup checklist\n\n");
    for (i, item) in CHECKLIST.iter().enumerate() {
        out.push_str(&format!("{}. **{}**: {}\n", i + 1, item.title, item.detail));
    }
    out.push_str("\n## References\n\n");
    for reference in REFERENCES {
        out.push_str(&format!("- [{}]({})\n", reference.title, reference.url));
    }
    out
}

/// Logged after a force-push, when the remaining steps are up to people.
pub fn log_reminders() {
    tracing::warn!("History was rewritten. Remaining steps:");
    for item in CHECKLIST.iter().skip(3) {
        tracing::warn!("  - {}: {}", item.title, item.detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_references_are_https_urls() {
        assert_eq!(REFERENCES.len(), 3);
        for reference in REFERENCES {
            let url = url::Url::parse(reference.url).unwrap();
            assert_eq!(url.scheme(), "https", "{}", reference.url);
            assert!(url.host_str().is_some());
        }
    }

    #[test]
    fn test_markdown_lists_every_item_and_link() {
        let markdown = render_markdown();
        assert!(markdown.starts_with("# "));
        for (i, item) in CHECKLIST.iter().enumerate() {
            assert!(markdown.contains(&format!("{}. **{}**", i + 1, item.title)));
        }
        for reference in REFERENCES {
            assert!(markdown.contains(&format!("]({})", reference.url)));
        }
    }

    #[test]
    fn test_checklist_contains_no_secret_shaped_tokens() {
        let patterns = [
            r"AKIA[0-9A-Z]{16}",
            r"gh[pousr]_[A-Za-z0-9]{36}",
            r"sk_live_[A-Za-z0-9]{10,}",
            r"-----BEGIN [A-Z ]*PRIVATE KEY-----",
            r"xox[baprs]-[A-Za-z0-9-]{10,}",
        ];
        let markdown = render_markdown();
        for pattern in patterns {
            let re = Regex::new(pattern).unwrap();
            assert!(!re.is_match(&markdown), "matched {}", pattern);
        }
    }
}
