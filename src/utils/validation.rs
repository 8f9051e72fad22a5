use crate::utils::error::{CleanError, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> CleanError {
    CleanError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn scp_like_remote() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^\s]+$").expect("static regex is valid")
    })
}

/// Accepts anything `git clone` would: a URL with a git-capable scheme,
/// an scp-like `user@host:path` remote, or an existing local path.
pub fn validate_repo_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "Repository URL cannot be empty"));
    }

    if scp_like_remote().is_match(url_str) {
        return Ok(());
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "ssh" | "git" | "file" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(_) if Path::new(url_str).exists() => Ok(()),
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Not a URL, scp-like remote, or existing path: {}", e),
        )),
    }
}

pub fn validate_http_url(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_jar_path(field_name: &str, path: &Path) -> Result<()> {
    let shown = path.display().to_string();
    validate_path(field_name, &shown)?;

    if path.extension().and_then(|ext| ext.to_str()) != Some("jar") {
        return Err(invalid(field_name, &shown, "Expected a .jar file"));
    }
    if !path.is_file() {
        return Err(invalid(field_name, &shown, "File does not exist"));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CleanError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// Subset of `git check-ref-format` rules that matter for names typed at
/// the branch prompt.
pub fn validate_branch_name(field_name: &str, branch: &str) -> Result<()> {
    validate_non_empty_string(field_name, branch)?;

    if branch.starts_with('-') {
        return Err(invalid(field_name, branch, "Branch names cannot start with '-'"));
    }
    if branch.contains("..") || branch.contains("@{") || branch.contains("//") {
        return Err(invalid(field_name, branch, "Branch name contains an illegal sequence"));
    }
    if let Some(bad) = branch
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(*c))
    {
        return Err(invalid(
            field_name,
            branch,
            format!("Branch name contains illegal character {:?}", bad),
        ));
    }
    if branch.ends_with('/') || branch.ends_with('.') || branch.ends_with(".lock") {
        return Err(invalid(field_name, branch, "Branch name has an illegal ending"));
    }
    Ok(())
}
