#![forbid(unsafe_code)]

use crate::error::Error;
use crate::target::Target;
use std::path::Path;
use tracing::{debug, trace};

/// Resolve meta descriptors into concrete, directly-scannable targets.
///
/// Non-meta targets pass through unchanged and keep their relative order;
/// each `chroots-in-dir://` descriptor is replaced in place by one
/// `chroot://` target per direct subdirectory. The children appear in
/// directory enumeration order, which is not sorted.
///
/// Any enumeration failure aborts the whole run: a scan list that silently
/// lost targets would report a clean run over the wrong set.
pub fn expand_targets(descriptors: &[Target]) -> Result<Vec<Target>, Error> {
    let mut expanded = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        match descriptor {
            Target::ChrootsInDir(dir) => expand_chroot_dir(dir, &mut expanded)?,
            concrete => expanded.push(concrete.clone()),
        }
    }
    debug!(
        requested = descriptors.len(),
        expanded = expanded.len(),
        "target list expanded"
    );
    Ok(expanded)
}

fn expand_chroot_dir(dir: &Path, expanded: &mut Vec<Target>) -> Result<(), Error> {
    let dir = std::fs::canonicalize(dir).map_err(|source| Error::Expand {
        path: dir.to_path_buf(),
        source,
    })?;
    let entries = std::fs::read_dir(&dir).map_err(|source| Error::Expand {
        path: dir.clone(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::Expand {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        // Follows symlinks, so a linked chroot counts as one.
        if path.is_dir() {
            trace!(chroot = %path.display(), "found chroot");
            expanded.push(Target::Chroot(path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn non_meta_targets_pass_through_in_order() {
        let descriptors = vec![
            Target::Local,
            Target::Remote("a.example.org".into()),
            Target::Chroot(PathBuf::from("/srv/one")),
        ];
        let expanded = expand_targets(&descriptors).unwrap();
        assert_eq!(expanded, descriptors);
    }

    #[test]
    fn meta_descriptor_expands_in_place() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("f40")).unwrap();
        std::fs::create_dir(dir.path().join("rhel9")).unwrap();
        std::fs::write(dir.path().join("README"), "not a chroot").unwrap();

        let descriptors = vec![
            Target::Remote("first.example.org".into()),
            Target::ChrootsInDir(dir.path().to_path_buf()),
            Target::Remote("last.example.org".into()),
        ];
        let expanded = expand_targets(&descriptors).unwrap();

        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0], descriptors[0]);
        assert_eq!(expanded[3], descriptors[2]);

        // The two chroots sit between their neighbors, in no guaranteed order.
        let middle: HashSet<String> = expanded[1..3].iter().map(|t| t.to_string()).collect();
        let canonical = std::fs::canonicalize(dir.path()).unwrap();
        let expected: HashSet<String> = ["f40", "rhel9"]
            .into_iter()
            .map(|name| Target::Chroot(canonical.join(name)).to_string())
            .collect();
        assert_eq!(middle, expected);
    }

    #[test]
    fn empty_directory_expands_to_nothing() {
        let dir = tempdir().unwrap();
        let descriptors = vec![Target::ChrootsInDir(dir.path().to_path_buf())];
        let expanded = expand_targets(&descriptors).unwrap();
        assert!(expanded.is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let descriptors = vec![Target::Local, Target::ChrootsInDir(missing.clone())];
        let err = expand_targets(&descriptors).unwrap_err();
        match err {
            Error::Expand { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn expanded_children_are_absolute() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("guest")).unwrap();

        let descriptors = vec![Target::ChrootsInDir(dir.path().to_path_buf())];
        let expanded = expand_targets(&descriptors).unwrap();
        match &expanded[0] {
            Target::Chroot(path) => assert!(path.is_absolute()),
            other => panic!("unexpected target: {other}"),
        }
    }
}
