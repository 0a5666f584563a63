#![forbid(unsafe_code)]

use crate::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const CHROOT_SCHEME: &str = "chroot://";
pub const CHROOTS_IN_DIR_SCHEME: &str = "chroots-in-dir://";

/// A scannable entity, parsed from an operator-supplied descriptor string.
///
/// `localhost` is the local system, `chroot://PATH` an offline chroot tree,
/// and a bare hostname a remote machine reached over SSH.
/// `chroots-in-dir://PATH` is a meta descriptor: it stands for every chroot
/// directly under `PATH` and is resolved away by [`expand_targets`] before
/// any scanning starts.
///
/// [`expand_targets`]: crate::expand::expand_targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Local,
    Chroot(PathBuf),
    ChrootsInDir(PathBuf),
    Remote(String),
}

impl Target {
    /// Whether this descriptor must be expanded before it can be scanned.
    pub fn is_meta(&self) -> bool {
        matches!(self, Target::ChrootsInDir(_))
    }

    /// Deterministic, filesystem-safe stem for result file names.
    ///
    /// The first `://` collapses to `__`; every remaining `:` or `/` becomes
    /// `_`. Descriptors that differ only in scheme stay distinct because the
    /// scheme text itself is part of the stem.
    pub fn sanitized_name(&self) -> String {
        let descriptor = self.to_string();
        descriptor
            .replacen("://", "__", 1)
            .chars()
            .map(|c| match c {
                ':' | '/' | '\\' => '_',
                other => other,
            })
            .collect()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local => write!(f, "localhost"),
            Target::Chroot(path) => write!(f, "{CHROOT_SCHEME}{}", path.display()),
            Target::ChrootsInDir(path) => {
                write!(f, "{CHROOTS_IN_DIR_SCHEME}{}", path.display())
            }
            Target::Remote(host) => write!(f, "{host}"),
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor == "localhost" {
            return Ok(Target::Local);
        }
        if let Some(path) = descriptor.strip_prefix(CHROOT_SCHEME) {
            if path.is_empty() {
                return Err(Error::InvalidTarget(descriptor.to_string()));
            }
            return Ok(Target::Chroot(PathBuf::from(path)));
        }
        if let Some(path) = descriptor.strip_prefix(CHROOTS_IN_DIR_SCHEME) {
            if path.is_empty() {
                return Err(Error::InvalidTarget(descriptor.to_string()));
            }
            return Ok(Target::ChrootsInDir(PathBuf::from(path)));
        }
        // Anything else with a scheme is a descriptor we do not understand.
        if descriptor.contains("://") || descriptor.is_empty() {
            return Err(Error::InvalidTarget(descriptor.to_string()));
        }
        Ok(Target::Remote(descriptor.to_string()))
    }
}
