#![forbid(unsafe_code)]

use crate::engine::CpeHint;
use crate::error::Error;
use std::path::Path;
use tracing::trace;

/// Detect platform identity hints by reading `etc/os-release` under a
/// target's root directory.
///
/// A root that is not a directory is an error (the target cannot be
/// inspected at all); a missing or unparseable os-release merely yields no
/// hints, leaving content selection to the configuration.
pub(crate) fn detect_root(root: &Path) -> Result<Vec<CpeHint>, Error> {
    if !root.is_dir() {
        return Err(Error::TargetUnreachable(root.to_path_buf()));
    }

    let os_release = root.join("etc/os-release");
    let text = match std::fs::read_to_string(&os_release) {
        Ok(text) => text,
        Err(_) => {
            trace!(path = %os_release.display(), "no readable os-release");
            return Ok(Vec::new());
        }
    };

    Ok(hints_from_os_release(&text))
}

fn hints_from_os_release(text: &str) -> Vec<CpeHint> {
    let mut id = None;
    let mut version_id = None;
    let mut cpe_name = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        match key.trim() {
            "ID" => id = Some(value.to_string()),
            "VERSION_ID" => version_id = Some(value.to_string()),
            "CPE_NAME" => cpe_name = Some(value.to_string()),
            _ => {}
        }
    }

    // os-release usually carries the authoritative CPE directly.
    if let Some(cpe) = cpe_name {
        return vec![CpeHint::new(cpe)];
    }

    match (id, version_id) {
        (Some(id), Some(version)) => vec![CpeHint::new(format!("cpe:/o:{id}:{id}:{version}"))],
        (Some(id), None) => vec![CpeHint::new(format!("cpe:/o:{id}:{id}"))],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefers_cpe_name_when_present() {
        let hints = hints_from_os_release(
            "NAME=\"Fedora Linux\"\nID=fedora\nVERSION_ID=40\nCPE_NAME=\"cpe:/o:fedoraproject:fedora:40\"\n",
        );
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].as_str(), "cpe:/o:fedoraproject:fedora:40");
    }

    #[test]
    fn falls_back_to_id_and_version() {
        let hints = hints_from_os_release("ID=debian\nVERSION_ID=\"12\"\n");
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].as_str(), "cpe:/o:debian:debian:12");
    }

    #[test]
    fn no_identity_yields_no_hints() {
        assert!(hints_from_os_release("PRETTY_NAME=\"Mystery OS\"\n").is_empty());
    }

    #[test]
    fn detect_reads_os_release_under_root() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("etc")).unwrap();
        std::fs::write(
            root.path().join("etc/os-release"),
            "ID=fedora\nVERSION_ID=40\n",
        )
        .unwrap();

        let hints = detect_root(root.path()).unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].as_str(), "cpe:/o:fedora:fedora:40");
    }

    #[test]
    fn missing_os_release_is_not_an_error() {
        let root = tempdir().unwrap();
        assert!(detect_root(root.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempdir().unwrap();
        let missing = root.path().join("gone");
        assert!(matches!(
            detect_root(&missing),
            Err(Error::TargetUnreachable(_))
        ));
    }
}
