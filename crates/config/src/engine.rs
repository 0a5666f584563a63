use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Engine {
    /// Path to the `oscap` binary. The `oscap-chroot` and `oscap-ssh`
    /// wrappers used for offline and remote targets are looked up next to
    /// it, so pointing this at a custom build picks up all three.
    pub oscap_path: PathBuf,

    /// Directory holding SCAP source datastreams. When no explicit
    /// `datastream` is configured, the standard compliance content for a
    /// target is picked from here based on the platform detected on the
    /// target (`ssg-<product><major>-ds.xml`, then `ssg-<product>-ds.xml`).
    pub content_dir: PathBuf,

    /// OVAL definitions file used for the CVE evaluation. There is no
    /// default: CVE feeds are distribution specific and usually downloaded
    /// out of band, so leaving this unset while CVE scanning is enabled
    /// fails every target with a clear error.
    pub cve_feed: Option<PathBuf>,

    /// Explicit SCAP source datastream for the standard compliance
    /// evaluation. Overrides the `content_dir` lookup for every target.
    pub datastream: Option<PathBuf>,

    /// XCCDF profile id passed to the engine for the standard compliance
    /// evaluation. Unset evaluates the datastream's default profile.
    pub profile: Option<String>,

    /// User name for remote (SSH) targets.
    pub ssh_user: String,

    /// Port for remote (SSH) targets.
    pub ssh_port: u16,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            oscap_path: PathBuf::from("oscap"),
            content_dir: PathBuf::from("/usr/share/xml/scap/ssg/content"),
            cve_feed: None,
            datastream: None,
            profile: None,
            ssh_user: "root".to_string(),
            ssh_port: 22,
        }
    }
}
